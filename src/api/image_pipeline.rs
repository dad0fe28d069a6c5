//! Contains the [`ImagePipeline`] builder struct for the high level API.

use crate::{
    median_cut, Bitmap, ColorSpace, Dither, Palette, PaletteSource, QuantizeError, Remapper,
};
use std::borrow::Cow;
use tracing::debug;

/// A builder struct to specify options to quantize an image.
///
/// # Examples
/// To start, create an [`ImagePipeline`] from a [`Bitmap`]
/// (or anything that converts into one, like an `image::DynamicImage`):
/// ```no_run
/// # use pixquant::ImagePipeline;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let img = image::open("some image")?;
/// let pipeline = ImagePipeline::new(img);
/// # Ok(())
/// # }
/// ```
///
/// Then, choose a palette, a dither, and the color space to match colors in:
/// ```
/// # use pixquant::{ImagePipeline, ColorSpace, Dither, MatrixKind, Palette, QuantizeError};
/// # use image::RgbImage;
/// # use palette::Srgb;
/// # fn main() -> Result<(), QuantizeError> {
/// # let img = RgbImage::new(4, 4);
/// let palette = Palette::from_srgb8([Srgb::new(0, 0, 0), Srgb::new(255, 255, 255)])?;
/// let pipeline = ImagePipeline::new(img)
///     .palette(palette)
///     .dither(Dither::ordered(MatrixKind::Bayer { width: 8, height: 8 }))
///     .colorspace(ColorSpace::Srgb);
/// # Ok(())
/// # }
/// ```
///
/// Finally, run the pipeline:
/// ```
/// # use pixquant::{ImagePipeline, QuantizeError};
/// # use image::RgbImage;
/// # fn main() -> Result<(), QuantizeError> {
/// # let img = RgbImage::new(4, 4);
/// let quantized = ImagePipeline::new(img).median_cut(2).quantized()?;
/// # Ok(())
/// # }
/// ```
///
/// Or, in parallel across multiple threads (needs the `threads` feature):
/// ```
/// # use pixquant::{ImagePipeline, QuantizeError};
/// # use image::RgbImage;
/// # fn main() -> Result<(), QuantizeError> {
/// # let img = RgbImage::new(4, 4);
/// let quantized = ImagePipeline::new(img).quantized_par()?;
/// # Ok(())
/// # }
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct ImagePipeline {
    /// The image to quantize.
    image: Bitmap,
    /// Where the palette comes from.
    palette: PaletteSource,
    /// The dithering to apply.
    dither: Dither,
    /// The color space to match colors in.
    colorspace: ColorSpace,
}

impl ImagePipeline {
    /// Creates a new [`ImagePipeline`] with default options.
    pub fn new(image: impl Into<Bitmap>) -> Self {
        Self {
            image: image.into(),
            palette: PaletteSource::default(),
            dither: Dither::default(),
            colorspace: ColorSpace::default(),
        }
    }

    /// Sets the palette to remap the image to.
    ///
    /// By default, a median cut palette of
    /// [`PalettePipeline::DEFAULT_LEVELS`](crate::PalettePipeline::DEFAULT_LEVELS)
    /// levels is computed from the image.
    pub fn palette(mut self, palette: Palette) -> Self {
        self.palette = PaletteSource::Fixed(palette);
        self
    }

    /// Sets the palette to a median cut palette of `2^levels` colors computed from the image.
    pub fn median_cut(mut self, levels: u8) -> Self {
        self.palette = PaletteSource::MedianCut { levels };
        self
    }

    /// Sets where the palette comes from.
    pub fn palette_source(mut self, source: PaletteSource) -> Self {
        self.palette = source;
        self
    }

    /// Sets the dithering to apply.
    ///
    /// The default is [`Dither::None`].
    pub fn dither(mut self, dither: Dither) -> Self {
        self.dither = dither;
        self
    }

    /// Sets the color space to match colors in.
    ///
    /// The default color space is [`ColorSpace::LinearSrgb`].
    pub fn colorspace(mut self, colorspace: ColorSpace) -> Self {
        self.colorspace = colorspace;
        self
    }

    /// Returns the palette the image would be remapped to.
    ///
    /// # Errors
    /// Returns [`QuantizeError::LevelsAboveMax`] for a median cut with too many levels.
    pub fn computed_palette(&self) -> Result<Cow<'_, Palette>, QuantizeError> {
        resolve_palette(&self.palette, &self.image, median_cut::palette)
    }

    /// Runs the pipeline and returns the quantized image.
    ///
    /// The result has the same representation as the input image,
    /// except for indexed images whose table differs from the palette
    /// (see [`Remapper::remap`]).
    ///
    /// # Errors
    /// Returns an error for invalid dithering options or median cut levels.
    /// No pixel is touched in that case.
    pub fn quantized(self) -> Result<Bitmap, QuantizeError> {
        let Self { image, palette, dither, colorspace } = self;
        let bias = dither.bias()?;
        let palette = resolve_palette(&palette, &image, median_cut::palette)?;
        let remapper = match bias {
            Some(bias) => Remapper::with_bias(&palette, colorspace, bias),
            None => Remapper::new(&palette, colorspace),
        };
        Ok(remapper.remap(image))
    }

    /// Runs the pipeline in parallel and returns the quantized image.
    ///
    /// The result is identical to [`ImagePipeline::quantized`].
    ///
    /// # Errors
    /// Returns an error for invalid dithering options or median cut levels.
    /// No pixel is touched in that case.
    #[cfg(feature = "threads")]
    pub fn quantized_par(self) -> Result<Bitmap, QuantizeError> {
        let Self { image, palette, dither, colorspace } = self;
        let bias = dither.bias()?;
        let palette = resolve_palette(&palette, &image, median_cut::palette_par)?;
        let remapper = match bias {
            Some(bias) => Remapper::with_bias(&palette, colorspace, bias),
            None => Remapper::new(&palette, colorspace),
        };
        Ok(remapper.remap_par(image))
    }
}

/// Returns the fixed palette or builds one from the image.
fn resolve_palette<'a>(
    source: &'a PaletteSource,
    image: &Bitmap,
    build: impl FnOnce(&Bitmap, u8) -> Result<Palette, QuantizeError>,
) -> Result<Cow<'a, Palette>, QuantizeError> {
    match source {
        PaletteSource::Fixed(palette) => Ok(Cow::Borrowed(palette)),
        &PaletteSource::MedianCut { levels } => {
            let palette = build(image, levels)?;
            debug!(levels, len = palette.len(), "computed median cut palette");
            Ok(Cow::Owned(palette))
        }
    }
}

impl From<Bitmap> for ImagePipeline {
    fn from(image: Bitmap) -> Self {
        Self::new(image)
    }
}
