//! A library for palette quantization with optional ordered dithering.
//!
//! `pixquant` remaps every pixel of an image to the nearest color of a fixed palette.
//! Colors are compared with a weighted squared distance in linear sRGB by default,
//! alpha is handled for straight, premultiplied, and opaque pixel representations,
//! and fully transparent pixels are never modified.
//! Palettes can be given directly or computed from the image with median cut,
//! and ordered dithering uses Bayer matrices of any power of two size.
//!
//! # Features
//! To reduce dependencies and compile times, `pixquant` has several `cargo` features
//! that can be turned off or on:
//! - `pipelines`: exposes builder structs that serve as the high-level API (more details below).
//! - `threads`: exposes parallel versions of the palette builder and the remapping passes via [`rayon`].
//!
//! # High-Level API
//! To get started with the high-level API, see [`ImagePipeline`].
//! If you want a color palette instead of a quantized image, see [`PalettePipeline`] instead.
//! Both of these have examples in their documentation, but here is an additional example:
//! ```no_run
//! # use pixquant::{ImagePipeline, Dither, MatrixKind};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = image::open("some image")?;
//!
//! let pipeline = ImagePipeline::new(img)
//!     .median_cut(4) // compute a palette of 16 colors from the image
//!     .dither(Dither::ordered(MatrixKind::Bayer { width: 8, height: 8 }));
//!
//! // Run the pipeline in parallel and convert the result back for encoding
//! let quantized = pipeline.quantized_par()?.into_dynamic();
//! # Ok(())
//! # }
//! ```
//!
//! # Low-Level API
//! The [`median_cut`], [`matrix`], [`nearest`], and [`quantize`] modules expose each stage directly.
//! ```
//! # use pixquant::{quantize, Bitmap, Palette, QuantizeError};
//! # use image::{Rgb, RgbImage};
//! # use palette::Srgb;
//! # fn main() -> Result<(), QuantizeError> {
//! let image = Bitmap::from(RgbImage::from_pixel(16, 16, Rgb([128, 128, 128])));
//! let palette = Palette::from_srgb8([Srgb::new(0, 0, 0), Srgb::new(255, 255, 255)])?;
//!
//! let quantized = quantize::quantize_ordered(image, &palette, 4, 4, 1.0)?;
//! # Ok(())
//! # }
//! ```
//!
//! Note that some of the options and functions above require certain features to be enabled.

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::expect_used,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    clippy::missing_docs_in_private_items,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::many_single_char_names,
    clippy::missing_panics_doc,
    clippy::unreadable_literal,
    clippy::wildcard_imports
)]

mod bitmap;
mod colorspace;
mod error;
mod types;

#[cfg(feature = "pipelines")]
mod api;

pub mod matrix;
pub mod median_cut;
pub mod nearest;
pub mod quantize;

pub use bitmap::*;
pub use colorspace::*;
pub use error::*;
pub use matrix::{BiasMatrix, MatrixKind, ThresholdMatrix};
pub use quantize::Remapper;
pub use types::*;

#[cfg(feature = "pipelines")]
pub use api::*;

/// The maximum supported number of median cut rounds is `16`, giving `65536` colors.
pub const MAX_LEVELS: u8 = 16;

/// The maximum supported number of cells in a threshold matrix is `65536` (for example, `256x256`).
pub const MAX_MATRIX_CELLS: u32 = 1 << 16;
