//! Contains the quantization driver, which remaps every pixel of an image to a palette color.
//!
//! For each pixel that is not fully transparent, the driver recovers its straight color,
//! moves it into the matching [`ColorSpace`], optionally adds an ordered dithering bias,
//! finds the nearest palette color, and writes that color back with the pixel's original alpha.
//! Fully transparent pixels are never written.
//!
//! # Examples
//! ```
//! # use pixquant::{quantize, Bitmap, Palette, QuantizeError};
//! # use image::{Rgb, RgbImage};
//! # use palette::Srgb;
//! # fn main() -> Result<(), QuantizeError> {
//! let palette = Palette::from_srgb8([Srgb::new(0, 0, 0), Srgb::new(255, 255, 255)])?;
//! let image = Bitmap::from(RgbImage::from_pixel(2, 2, Rgb([200, 200, 200])));
//!
//! let Bitmap::Rgb8(quantized) = quantize::quantize(image, &palette) else { unreachable!() };
//! assert_eq!(quantized.get_pixel(0, 0), &Rgb([255, 255, 255]));
//! # Ok(())
//! # }
//! ```

use crate::{
    bitmap::{dispatch, Canvas},
    colorspace::{linearize, premultiply, AlphaMode, Linear},
    nearest::LinearPalette,
    BiasMatrix, Bitmap, ColorSpace, Palette, PremultipliedImage, QuantizeError, ThresholdMatrix,
};
use tracing::debug;

#[cfg(feature = "threads")]
use rayon::prelude::*;

/// Remaps pixels to the colors of a [`Palette`], optionally with ordered dithering.
///
/// All per-call state (the transformed palette and the bias matrix) is built on construction
/// and only read afterwards, so a [`Remapper`] can be shared across threads.
#[derive(Debug, Clone)]
pub struct Remapper<'a> {
    /// The palette whose colors get written.
    palette: &'a Palette,
    /// The palette in the matching color space.
    linear: LinearPalette,
    /// The ordered dithering offsets, if dithering.
    bias: Option<BiasMatrix>,
}

impl<'a> Remapper<'a> {
    /// Creates a new [`Remapper`] without dithering.
    #[must_use]
    pub fn new(palette: &'a Palette, space: ColorSpace) -> Self {
        Self {
            palette,
            linear: LinearPalette::new(palette, space),
            bias: None,
        }
    }

    /// Creates a new [`Remapper`] that adds the given bias to each pixel before matching.
    #[must_use]
    pub fn with_bias(palette: &'a Palette, space: ColorSpace, bias: BiasMatrix) -> Self {
        Self { bias: Some(bias), ..Self::new(palette, space) }
    }

    /// Returns the palette that colors are written from.
    #[must_use]
    pub fn palette(&self) -> &'a Palette {
        self.palette
    }

    /// Returns the bias matrix, if dithering.
    #[must_use]
    pub fn bias(&self) -> Option<&BiasMatrix> {
        self.bias.as_ref()
    }

    /// Returns the index of the palette color the pixel at `(x, y)` maps to.
    ///
    /// Returns `None` for fully transparent pixels.
    #[must_use]
    #[inline]
    pub fn map_index(&self, x: u32, y: u32, raw: [u16; 4], mode: AlphaMode) -> Option<usize> {
        self.map(x, y, raw, mode).map(|(index, _)| index)
    }

    /// Returns the premultiplied color to write for the pixel at `(x, y)`,
    /// given the pixel as stored with the given [`AlphaMode`].
    ///
    /// Returns `None` for fully transparent pixels, which must be left untouched.
    #[must_use]
    #[inline]
    pub fn map_pixel(&self, x: u32, y: u32, raw: [u16; 4], mode: AlphaMode) -> Option<[u16; 4]> {
        self.map(x, y, raw, mode)
            .map(|(index, alpha)| premultiply(self.palette[index], alpha))
    }

    /// Returns the nearest palette index and the original alpha of a pixel.
    #[inline]
    fn map(&self, x: u32, y: u32, raw: [u16; 4], mode: AlphaMode) -> Option<(usize, u16)> {
        let Linear { rgb, alpha } = linearize(raw, mode, self.linear.space())?;
        let rgb = match &self.bias {
            Some(bias) => bias.apply(x, y, rgb),
            None => rgb,
        };
        Some((self.linear.closest(rgb), alpha))
    }

    /// Remaps every pixel of the canvas in place.
    fn remap_canvas<C: Canvas>(&self, canvas: &mut C) {
        let (width, height) = canvas.dimensions();
        for y in 0..height {
            for x in 0..width {
                if let Some((index, alpha)) = self.map(x, y, canvas.read_raw(x, y), C::ALPHA) {
                    canvas.write_color(x, y, self.palette[index], alpha);
                }
            }
        }
    }

    /// Remaps every pixel of the canvas in place, computing rows in parallel.
    #[cfg(feature = "threads")]
    fn remap_canvas_par<C: Canvas + Sync>(&self, canvas: &mut C) {
        let (width, height) = canvas.dimensions();

        let source = &*canvas;
        let rows = (0..height)
            .into_par_iter()
            .map(|y| {
                (0..width)
                    .map(|x| self.map(x, y, source.read_raw(x, y), C::ALPHA))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        for (y, row) in (0..height).zip(rows) {
            for (x, mapped) in (0..width).zip(row) {
                if let Some((index, alpha)) = mapped {
                    canvas.write_color(x, y, self.palette[index], alpha);
                }
            }
        }
    }

    /// Decides whether the image can be remapped in its own buffer,
    /// and otherwise converts it into one that can.
    ///
    /// Indexed images can only hold their own table's colors, so they are remapped in place
    /// only when their table holds the same colors as the palette.
    fn prepare(&self, image: Bitmap) -> Bitmap {
        let (width, height) = image.dimensions();
        let image = match image {
            Bitmap::Indexed(indexed) if !self.palette.same_colors_as_table(indexed.palette()) => {
                debug!(width, height, "indexed table differs from palette, remapping a copy");
                Bitmap::PremultipliedRgba8(PremultipliedImage::from_canvas(&indexed))
            }
            image => image,
        };

        debug!(
            width,
            height,
            palette_len = self.palette.len(),
            space = ?self.linear.space(),
            bias = ?self.bias.as_ref().map(|b| (b.width(), b.height())),
            "remapping image"
        );

        image
    }

    /// Remaps every pixel of the image to the palette.
    ///
    /// The image is remapped in its own buffer, except for an indexed image whose
    /// table does not hold the same colors as the palette: that is remapped into a
    /// [`Bitmap::PremultipliedRgba8`] copy instead.
    #[must_use]
    pub fn remap(&self, image: Bitmap) -> Bitmap {
        let mut image = self.prepare(image);
        dispatch!(&mut image, canvas => self.remap_canvas(canvas));
        image
    }

    /// Remaps every pixel of the image to the palette in parallel.
    ///
    /// The result is identical to [`Remapper::remap`].
    #[cfg(feature = "threads")]
    #[must_use]
    pub fn remap_par(&self, image: Bitmap) -> Bitmap {
        let mut image = self.prepare(image);
        dispatch!(&mut image, canvas => self.remap_canvas_par(canvas));
        image
    }
}

/// Builds the bias matrix for a Bayer matrix of the given size and strength.
fn bayer_bias(width: u32, height: u32, strength: f32) -> Result<BiasMatrix, QuantizeError> {
    ThresholdMatrix::bayer(width, height)?.to_bias(strength)
}

/// Remaps every pixel of the image to the nearest palette color in linear sRGB.
///
/// See [`Remapper::remap`] for when the image is remapped in place.
#[must_use]
pub fn quantize(image: Bitmap, palette: &Palette) -> Bitmap {
    Remapper::new(palette, ColorSpace::default()).remap(image)
}

/// Remaps every pixel of the image to the nearest palette color in linear sRGB
/// with ordered dithering using a Bayer matrix of the given size and strength.
///
/// # Errors
/// Returns an error for invalid matrix dimensions (see [`ThresholdMatrix::bayer`])
/// or a `strength` outside `0.0..=1.0`. No pixel is touched in that case.
pub fn quantize_ordered(
    image: Bitmap,
    palette: &Palette,
    width: u32,
    height: u32,
    strength: f32,
) -> Result<Bitmap, QuantizeError> {
    let bias = bayer_bias(width, height, strength)?;
    Ok(Remapper::with_bias(palette, ColorSpace::default(), bias).remap(image))
}

/// Remaps every pixel of the image to the nearest palette color in linear sRGB in parallel.
///
/// The result is identical to [`quantize`].
#[cfg(feature = "threads")]
#[must_use]
pub fn quantize_par(image: Bitmap, palette: &Palette) -> Bitmap {
    Remapper::new(palette, ColorSpace::default()).remap_par(image)
}

/// Remaps every pixel of the image with ordered dithering in parallel.
///
/// The result is identical to [`quantize_ordered`].
///
/// # Errors
/// Returns an error for invalid matrix dimensions (see [`ThresholdMatrix::bayer`])
/// or a `strength` outside `0.0..=1.0`. No pixel is touched in that case.
#[cfg(feature = "threads")]
pub fn quantize_ordered_par(
    image: Bitmap,
    palette: &Palette,
    width: u32,
    height: u32,
    strength: f32,
) -> Result<Bitmap, QuantizeError> {
    let bias = bayer_bias(width, height, strength)?;
    Ok(Remapper::with_bias(palette, ColorSpace::default(), bias).remap_par(image))
}
