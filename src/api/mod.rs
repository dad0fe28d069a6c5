//! Contains the types and functions for the high level pipeline builder API.

mod image_pipeline;
mod palette_pipeline;

pub use image_pipeline::ImagePipeline;
pub use palette_pipeline::PalettePipeline;

use crate::{BiasMatrix, MatrixKind, Palette, QuantizeError};

/// The dithering to apply when remapping an image.
///
/// # Examples
/// ```
/// # use pixquant::{Dither, MatrixKind};
/// let dither = Dither::ordered(MatrixKind::Bayer { width: 4, height: 4 });
/// assert_eq!(
///     dither,
///     Dither::Ordered { matrix: MatrixKind::Bayer { width: 4, height: 4 }, strength: 1.0 },
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Dither {
    /// Map each pixel to its nearest palette color.
    #[default]
    None,
    /// Add a tiled, per-pixel bias from a threshold matrix before matching.
    Ordered {
        /// The threshold matrix to tile over the image.
        matrix: MatrixKind,
        /// How strongly to bias pixels, in `0.0..=1.0`.
        strength: f32,
    },
}

impl Dither {
    /// The default strength used by [`Dither::ordered`].
    pub const DEFAULT_STRENGTH: f32 = 1.0;

    /// Creates an ordered [`Dither`] with the given matrix at [`Dither::DEFAULT_STRENGTH`].
    #[must_use]
    pub const fn ordered(matrix: MatrixKind) -> Self {
        Dither::Ordered { matrix, strength: Self::DEFAULT_STRENGTH }
    }

    /// Builds the bias matrix, if any.
    pub(crate) fn bias(self) -> Result<Option<BiasMatrix>, QuantizeError> {
        match self {
            Dither::None => Ok(None),
            Dither::Ordered { matrix, strength } => matrix.bias(strength).map(Some),
        }
    }
}

/// Where an [`ImagePipeline`] gets its palette from.
#[derive(Debug, Clone, PartialEq)]
pub enum PaletteSource {
    /// Use the given palette.
    Fixed(Palette),
    /// Compute a median cut palette of `2^levels` colors from the image.
    MedianCut {
        /// The number of median cut rounds.
        levels: u8,
    },
}

impl Default for PaletteSource {
    fn default() -> Self {
        PaletteSource::MedianCut { levels: PalettePipeline::DEFAULT_LEVELS }
    }
}

impl From<Palette> for PaletteSource {
    fn from(palette: Palette) -> Self {
        PaletteSource::Fixed(palette)
    }
}
