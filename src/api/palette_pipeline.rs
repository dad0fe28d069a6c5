//! Contains the [`PalettePipeline`] builder struct for the high level API.

use crate::{median_cut, Bitmap, Palette, QuantizeError};

/// A builder struct to specify options to create a median cut palette from an image.
///
/// # Examples
/// ```
/// # use pixquant::{Bitmap, PalettePipeline, QuantizeError};
/// # use image::{Rgb, RgbImage};
/// # fn main() -> Result<(), QuantizeError> {
/// let image = Bitmap::from(RgbImage::from_pixel(8, 8, Rgb([255, 0, 0])));
///
/// let palette = PalettePipeline::new(&image).levels(3).palette()?;
/// assert_eq!(palette.len(), 8);
/// # Ok(())
/// # }
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct PalettePipeline<'a> {
    /// The image to sample.
    image: &'a Bitmap,
    /// The number of median cut rounds.
    levels: u8,
}

impl<'a> PalettePipeline<'a> {
    /// The default number of median cut rounds, giving `32` colors.
    pub const DEFAULT_LEVELS: u8 = 5;

    /// Creates a new [`PalettePipeline`] with default options.
    pub fn new(image: &'a Bitmap) -> Self {
        Self { image, levels: Self::DEFAULT_LEVELS }
    }

    /// Sets the number of median cut rounds. The palette will have exactly `2^levels` colors.
    ///
    /// The default is [`PalettePipeline::DEFAULT_LEVELS`].
    pub fn levels(mut self, levels: u8) -> Self {
        self.levels = levels;
        self
    }

    /// Runs the pipeline and returns the computed palette.
    ///
    /// # Errors
    /// Returns [`QuantizeError::LevelsAboveMax`] if the levels are above [`MAX_LEVELS`](crate::MAX_LEVELS).
    pub fn palette(&self) -> Result<Palette, QuantizeError> {
        median_cut::palette(self.image, self.levels)
    }

    /// Runs the pipeline in parallel and returns the computed palette.
    ///
    /// # Errors
    /// Returns [`QuantizeError::LevelsAboveMax`] if the levels are above [`MAX_LEVELS`](crate::MAX_LEVELS).
    #[cfg(feature = "threads")]
    pub fn palette_par(&self) -> Result<Palette, QuantizeError> {
        median_cut::palette_par(self.image, self.levels)
    }
}

impl<'a> From<&'a Bitmap> for PalettePipeline<'a> {
    fn from(image: &'a Bitmap) -> Self {
        Self::new(image)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{tests::*, MAX_LEVELS};

    #[test]
    fn default_levels() {
        let image = test_bitmap();
        let palette = PalettePipeline::new(&image).palette().unwrap();
        assert_eq!(palette.len(), 32);
        assert_eq!(palette, median_cut::palette(&image, 5).unwrap());
    }

    #[test]
    fn levels_above_max() {
        let image = test_bitmap();
        assert!(PalettePipeline::from(&image).levels(MAX_LEVELS + 1).palette().is_err());
    }

    #[test]
    #[cfg(feature = "threads")]
    fn single_and_multi_threaded_match() {
        let image = test_bitmap();
        let pipeline = PalettePipeline::new(&image).levels(6);
        assert_eq!(pipeline.palette(), pipeline.palette_par());
    }
}
