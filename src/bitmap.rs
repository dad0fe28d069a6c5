//! Contains the bitmap abstraction that the palette builder reads from
//! and the quantizer reads from and writes to.
//!
//! [`Bitmap`] is a closed set of pixel representations. Each representation implements
//! [`Canvas`], whose [`AlphaMode`] is an associated constant, so the quantizer resolves
//! the representation once per image and runs a monomorphized loop over the pixels.

use crate::{
    colorspace::{premultiply, unpremultiply, AlphaMode},
    types::{widen, widen_srgb},
    QuantizeError,
};
use image::{
    DynamicImage, GrayImage, ImageBuffer, Luma, Pixel, Primitive, Rgb, RgbImage, Rgba, RgbaImage,
};
use palette::{Srgb, Srgba};

/// A 16-bit grayscale image.
pub type Gray16Image = ImageBuffer<Luma<u16>, Vec<u16>>;

/// A 16-bit RGB image.
pub type Rgb16Image = ImageBuffer<Rgb<u16>, Vec<u16>>;

/// A 16-bit RGBA image with straight (unpremultiplied) alpha.
pub type Rgba16Image = ImageBuffer<Rgba<u16>, Vec<u16>>;

/// A channel type that can be widened to and narrowed from the canonical 16-bit range.
pub trait Component: Primitive {
    /// Widens this component to 16 bits.
    fn to_canonical(self) -> u16;

    /// Narrows a 16-bit component to this type (truncating).
    fn from_canonical(value: u16) -> Self;
}

impl Component for u8 {
    #[inline]
    fn to_canonical(self) -> u16 {
        widen(self)
    }

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    fn from_canonical(value: u16) -> Self {
        (value >> 8) as u8
    }
}

impl Component for u16 {
    #[inline]
    fn to_canonical(self) -> u16 {
        self
    }

    #[inline]
    fn from_canonical(value: u16) -> Self {
        value
    }
}

/// Per-pixel read and write access to an in-memory image.
///
/// All colors cross this interface in the canonical 16-bit per channel form.
pub trait Canvas {
    /// How the stored color channels relate to the stored alpha.
    const ALPHA: AlphaMode;

    /// The width and height of the image.
    fn dimensions(&self) -> (u32, u32);

    /// Reads the pixel at `(x, y)` as stored, widened to 16 bits.
    ///
    /// For [`AlphaMode::Opaque`] representations, the alpha component is always `u16::MAX`.
    fn read_raw(&self, x: u32, y: u32) -> [u16; 4];

    /// Writes a premultiplied 16-bit pixel at `(x, y)`,
    /// converting it into this representation's color model.
    fn write_premultiplied(&mut self, x: u32, y: u32, color: [u16; 4]);

    /// Writes an opaque color at `(x, y)` with the given alpha.
    ///
    /// Defaults to premultiplying and calling [`Canvas::write_premultiplied`].
    #[inline]
    fn write_color(&mut self, x: u32, y: u32, color: Srgb<u16>, alpha: u16) {
        self.write_premultiplied(x, y, premultiply(color, alpha));
    }

    /// Reads the pixel at `(x, y)` as a premultiplied 16-bit pixel.
    #[inline]
    fn read_premultiplied(&self, x: u32, y: u32) -> [u16; 4] {
        let raw = self.read_raw(x, y);
        match Self::ALPHA {
            AlphaMode::Straight => {
                let [r, g, b, a] = raw;
                premultiply(Srgb::new(r, g, b), a)
            }
            AlphaMode::Opaque | AlphaMode::Premultiplied => raw,
        }
    }
}

/// Converts a premultiplied 16-bit pixel to straight alpha.
#[inline]
fn to_straight(color: [u16; 4]) -> [u16; 4] {
    unpremultiply(color, AlphaMode::Premultiplied).unwrap_or([0; 4])
}

/// Converts a premultiplied 16-bit pixel to 16-bit gray using the usual luma weights.
#[inline]
#[allow(clippy::cast_possible_truncation)]
fn to_gray(color: [u16; 4]) -> u16 {
    let [r, g, b, _] = color.map(u32::from);
    ((19595 * r + 38470 * g + 7471 * b + (1 << 15)) >> 16) as u16
}

impl<T: Component> Canvas for ImageBuffer<Luma<T>, Vec<T>>
where
    Luma<T>: Pixel<Subpixel = T>,
{
    const ALPHA: AlphaMode = AlphaMode::Opaque;

    fn dimensions(&self) -> (u32, u32) {
        ImageBuffer::dimensions(self)
    }

    #[inline]
    fn read_raw(&self, x: u32, y: u32) -> [u16; 4] {
        let Luma([l]) = *self.get_pixel(x, y);
        let l = l.to_canonical();
        [l, l, l, u16::MAX]
    }

    #[inline]
    fn write_premultiplied(&mut self, x: u32, y: u32, color: [u16; 4]) {
        self.put_pixel(x, y, Luma([T::from_canonical(to_gray(color))]));
    }
}

impl<T: Component> Canvas for ImageBuffer<Rgb<T>, Vec<T>>
where
    Rgb<T>: Pixel<Subpixel = T>,
{
    const ALPHA: AlphaMode = AlphaMode::Opaque;

    fn dimensions(&self) -> (u32, u32) {
        ImageBuffer::dimensions(self)
    }

    #[inline]
    fn read_raw(&self, x: u32, y: u32) -> [u16; 4] {
        let Rgb([r, g, b]) = *self.get_pixel(x, y);
        [r.to_canonical(), g.to_canonical(), b.to_canonical(), u16::MAX]
    }

    #[inline]
    fn write_premultiplied(&mut self, x: u32, y: u32, color: [u16; 4]) {
        let [r, g, b, _] = color;
        self.put_pixel(x, y, Rgb([r, g, b].map(T::from_canonical)));
    }
}

impl<T: Component> Canvas for ImageBuffer<Rgba<T>, Vec<T>>
where
    Rgba<T>: Pixel<Subpixel = T>,
{
    const ALPHA: AlphaMode = AlphaMode::Straight;

    fn dimensions(&self) -> (u32, u32) {
        ImageBuffer::dimensions(self)
    }

    #[inline]
    fn read_raw(&self, x: u32, y: u32) -> [u16; 4] {
        self.get_pixel(x, y).0.map(T::to_canonical)
    }

    #[inline]
    fn write_premultiplied(&mut self, x: u32, y: u32, color: [u16; 4]) {
        self.put_pixel(x, y, Rgba(to_straight(color).map(T::from_canonical)));
    }

    #[inline]
    fn write_color(&mut self, x: u32, y: u32, color: Srgb<u16>, alpha: u16) {
        let Srgb { red, green, blue, .. } = color;
        self.put_pixel(x, y, Rgba([red, green, blue, alpha].map(T::from_canonical)));
    }
}

/// An RGBA image whose color channels are premultiplied by alpha.
///
/// The `image` crate only models straight alpha,
/// so this wraps an RGBA buffer and reinterprets its channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PremultipliedImage<T: Component>(ImageBuffer<Rgba<T>, Vec<T>>)
where
    Rgba<T>: Pixel<Subpixel = T>;

impl<T: Component> PremultipliedImage<T>
where
    Rgba<T>: Pixel<Subpixel = T>,
{
    /// Creates a new, fully transparent [`PremultipliedImage`].
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self(ImageBuffer::new(width, height))
    }

    /// Wraps a raw buffer of premultiplied RGBA channels.
    ///
    /// # Errors
    /// Returns [`QuantizeError::DimensionMismatch`] if `buf` does not hold
    /// exactly `width * height * 4` components.
    pub fn from_raw(width: u32, height: u32, buf: Vec<T>) -> Result<Self, QuantizeError> {
        let len = buf.len();
        if len != width as usize * height as usize * 4 {
            return Err(QuantizeError::DimensionMismatch { len, width, height });
        }
        ImageBuffer::from_raw(width, height, buf)
            .map(Self)
            .ok_or(QuantizeError::DimensionMismatch { len, width, height })
    }

    /// Creates a premultiplied copy of the given canvas.
    #[must_use]
    pub fn from_canvas(canvas: &impl Canvas) -> Self {
        let (width, height) = canvas.dimensions();
        Self(ImageBuffer::from_fn(width, height, |x, y| {
            Rgba(canvas.read_premultiplied(x, y).map(T::from_canonical))
        }))
    }

    /// Returns the underlying buffer of premultiplied channels.
    #[must_use]
    pub fn as_inner(&self) -> &ImageBuffer<Rgba<T>, Vec<T>> {
        &self.0
    }

    /// Consumes the image and returns the underlying buffer of premultiplied channels.
    #[must_use]
    pub fn into_inner(self) -> ImageBuffer<Rgba<T>, Vec<T>> {
        self.0
    }

    /// Returns a straight alpha copy of this image.
    #[must_use]
    pub fn to_straight(&self) -> ImageBuffer<Rgba<T>, Vec<T>> {
        let (width, height) = self.0.dimensions();
        ImageBuffer::from_fn(width, height, |x, y| {
            Rgba(to_straight(self.read_raw(x, y)).map(T::from_canonical))
        })
    }
}

impl<T: Component> From<&ImageBuffer<Rgba<T>, Vec<T>>> for PremultipliedImage<T>
where
    Rgba<T>: Pixel<Subpixel = T>,
{
    fn from(straight: &ImageBuffer<Rgba<T>, Vec<T>>) -> Self {
        Self::from_canvas(straight)
    }
}

impl<T: Component> Canvas for PremultipliedImage<T>
where
    Rgba<T>: Pixel<Subpixel = T>,
{
    const ALPHA: AlphaMode = AlphaMode::Premultiplied;

    fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    #[inline]
    fn read_raw(&self, x: u32, y: u32) -> [u16; 4] {
        self.0.get_pixel(x, y).0.map(T::to_canonical)
    }

    #[inline]
    fn write_premultiplied(&mut self, x: u32, y: u32, color: [u16; 4]) {
        self.0.put_pixel(x, y, Rgba(color.map(T::from_canonical)));
    }
}

/// An image stored as a table of up to `256` colors and one table index per pixel.
///
/// Table colors use straight alpha. Writing a pixel stores the index of the table color
/// nearest to it, so only colors present in the table can be represented.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedImage {
    /// The image width.
    width: u32,
    /// The image height.
    height: u32,
    /// The color table.
    palette: Vec<Srgba<u8>>,
    /// The color table, premultiplied and widened to 16 bits.
    premultiplied: Vec<[u16; 4]>,
    /// The row-major table index of each pixel.
    indices: Vec<u8>,
}

impl IndexedImage {
    /// Creates a new [`IndexedImage`].
    ///
    /// # Errors
    /// Returns an error if the table does not hold between `1` and `256` colors,
    /// if `indices` does not hold `width * height` entries,
    /// or if an index is past the end of the table.
    pub fn new(
        width: u32,
        height: u32,
        palette: Vec<Srgba<u8>>,
        indices: Vec<u8>,
    ) -> Result<Self, QuantizeError> {
        if palette.is_empty() || palette.len() > usize::from(u8::MAX) + 1 {
            return Err(QuantizeError::IndexedPaletteSize(palette.len()));
        }

        let len = indices.len();
        if len != width as usize * height as usize {
            return Err(QuantizeError::DimensionMismatch { len, width, height });
        }

        if let Some(&index) = indices.iter().find(|&&i| usize::from(i) >= palette.len()) {
            return Err(QuantizeError::IndexOutOfRange { index, len: palette.len() });
        }

        let premultiplied = palette
            .iter()
            .map(|c| premultiply(widen_srgb(c.color), widen(c.alpha)))
            .collect();

        Ok(Self { width, height, palette, premultiplied, indices })
    }

    /// Returns the color table.
    #[must_use]
    pub fn palette(&self) -> &[Srgba<u8>] {
        &self.palette
    }

    /// Returns the row-major table index of each pixel.
    #[must_use]
    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    /// Returns the table index of the pixel at `(x, y)`.
    #[must_use]
    pub fn index(&self, x: u32, y: u32) -> u8 {
        self.indices[self.offset(x, y)]
    }

    /// Returns the offset of `(x, y)` into `indices`.
    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Returns the index of the table color nearest to the given premultiplied pixel,
    /// by unweighted squared distance over all four channels. Ties go to the first color.
    #[must_use]
    pub fn nearest_index(&self, color: [u16; 4]) -> u8 {
        let sq_diff = |a: u16, b: u16| (u32::from(a.abs_diff(b)).pow(2)) >> 2;

        let mut best = (0, u32::MAX);
        for (i, entry) in self.premultiplied.iter().enumerate() {
            let dist = (0..4).map(|c| sq_diff(color[c], entry[c])).sum::<u32>();
            if dist < best.1 {
                #[allow(clippy::cast_possible_truncation)]
                let i = i as u8;
                if dist == 0 {
                    return i;
                }
                best = (i, dist);
            }
        }
        best.0
    }

    /// Returns a straight alpha RGBA copy of this image.
    #[must_use]
    pub fn to_rgba8(&self) -> RgbaImage {
        ImageBuffer::from_fn(self.width, self.height, |x, y| {
            let Srgba { color, alpha } = self.palette[usize::from(self.index(x, y))];
            Rgba([color.red, color.green, color.blue, alpha])
        })
    }
}

impl Canvas for IndexedImage {
    const ALPHA: AlphaMode = AlphaMode::Straight;

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    fn read_raw(&self, x: u32, y: u32) -> [u16; 4] {
        let Srgba { color, alpha } = self.palette[usize::from(self.index(x, y))];
        [widen(color.red), widen(color.green), widen(color.blue), widen(alpha)]
    }

    #[inline]
    fn read_premultiplied(&self, x: u32, y: u32) -> [u16; 4] {
        self.premultiplied[usize::from(self.index(x, y))]
    }

    #[inline]
    fn write_premultiplied(&mut self, x: u32, y: u32, color: [u16; 4]) {
        let index = self.nearest_index(color);
        let offset = self.offset(x, y);
        self.indices[offset] = index;
    }
}

/// An in-memory image in one of the supported pixel representations.
///
/// Use `From` to wrap `image` buffers or a [`DynamicImage`],
/// and [`Bitmap::into_dynamic`] to hand the result to an encoder.
#[derive(Debug, Clone, PartialEq)]
pub enum Bitmap {
    /// 8-bit grayscale, opaque.
    Luma8(GrayImage),
    /// 16-bit grayscale, opaque.
    Luma16(Gray16Image),
    /// 8-bit RGB, opaque.
    Rgb8(RgbImage),
    /// 16-bit RGB, opaque.
    Rgb16(Rgb16Image),
    /// 8-bit RGBA with straight alpha.
    Rgba8(RgbaImage),
    /// 16-bit RGBA with straight alpha.
    Rgba16(Rgba16Image),
    /// 8-bit RGBA with premultiplied alpha.
    PremultipliedRgba8(PremultipliedImage<u8>),
    /// 16-bit RGBA with premultiplied alpha.
    PremultipliedRgba16(PremultipliedImage<u16>),
    /// A color table and per-pixel indices into it.
    Indexed(IndexedImage),
}

/// Evaluates `$body` with `$canvas` bound to the [`Canvas`] inside the given [`Bitmap`].
///
/// The body is expanded once per representation, so it is monomorphized for each of them.
macro_rules! dispatch {
    ($bitmap:expr, $canvas:ident => $body:expr) => {
        match $bitmap {
            $crate::Bitmap::Luma8($canvas) => $body,
            $crate::Bitmap::Luma16($canvas) => $body,
            $crate::Bitmap::Rgb8($canvas) => $body,
            $crate::Bitmap::Rgb16($canvas) => $body,
            $crate::Bitmap::Rgba8($canvas) => $body,
            $crate::Bitmap::Rgba16($canvas) => $body,
            $crate::Bitmap::PremultipliedRgba8($canvas) => $body,
            $crate::Bitmap::PremultipliedRgba16($canvas) => $body,
            $crate::Bitmap::Indexed($canvas) => $body,
        }
    };
}

pub(crate) use dispatch;

impl Bitmap {
    /// Returns the width and height of the image.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        dispatch!(self, image => Canvas::dimensions(image))
    }

    /// Returns the [`AlphaMode`] of this image's representation.
    #[must_use]
    pub fn alpha_mode(&self) -> AlphaMode {
        /// Returns the alpha mode of the given canvas type.
        fn mode<C: Canvas>(_: &C) -> AlphaMode {
            C::ALPHA
        }

        dispatch!(self, image => mode(image))
    }

    /// Reads the pixel at `(x, y)` as a premultiplied 16-bit pixel.
    ///
    /// This dispatches on the representation for every call;
    /// prefer the [`Canvas`] implementations for whole-image passes.
    #[must_use]
    pub fn premultiplied_pixel(&self, x: u32, y: u32) -> [u16; 4] {
        dispatch!(self, image => image.read_premultiplied(x, y))
    }

    /// Converts this image into a [`DynamicImage`] for encoding.
    ///
    /// Premultiplied images are converted to straight alpha,
    /// and indexed images are expanded to RGBA.
    #[must_use]
    pub fn into_dynamic(self) -> DynamicImage {
        match self {
            Bitmap::Luma8(image) => DynamicImage::ImageLuma8(image),
            Bitmap::Luma16(image) => DynamicImage::ImageLuma16(image),
            Bitmap::Rgb8(image) => DynamicImage::ImageRgb8(image),
            Bitmap::Rgb16(image) => DynamicImage::ImageRgb16(image),
            Bitmap::Rgba8(image) => DynamicImage::ImageRgba8(image),
            Bitmap::Rgba16(image) => DynamicImage::ImageRgba16(image),
            Bitmap::PremultipliedRgba8(image) => DynamicImage::ImageRgba8(image.to_straight()),
            Bitmap::PremultipliedRgba16(image) => DynamicImage::ImageRgba16(image.to_straight()),
            Bitmap::Indexed(image) => DynamicImage::ImageRgba8(image.to_rgba8()),
        }
    }
}

impl From<DynamicImage> for Bitmap {
    fn from(image: DynamicImage) -> Self {
        match image {
            DynamicImage::ImageLuma8(image) => Bitmap::Luma8(image),
            DynamicImage::ImageLuma16(image) => Bitmap::Luma16(image),
            DynamicImage::ImageRgb8(image) => Bitmap::Rgb8(image),
            DynamicImage::ImageRgb16(image) => Bitmap::Rgb16(image),
            DynamicImage::ImageRgba8(image) => Bitmap::Rgba8(image),
            DynamicImage::ImageRgba16(image) => Bitmap::Rgba16(image),
            other @ DynamicImage::ImageLumaA8(_) => Bitmap::Rgba8(other.to_rgba8()),
            other => Bitmap::Rgba16(other.to_rgba16()),
        }
    }
}

impl From<GrayImage> for Bitmap {
    fn from(image: GrayImage) -> Self {
        Bitmap::Luma8(image)
    }
}

impl From<Gray16Image> for Bitmap {
    fn from(image: Gray16Image) -> Self {
        Bitmap::Luma16(image)
    }
}

impl From<RgbImage> for Bitmap {
    fn from(image: RgbImage) -> Self {
        Bitmap::Rgb8(image)
    }
}

impl From<Rgb16Image> for Bitmap {
    fn from(image: Rgb16Image) -> Self {
        Bitmap::Rgb16(image)
    }
}

impl From<RgbaImage> for Bitmap {
    fn from(image: RgbaImage) -> Self {
        Bitmap::Rgba8(image)
    }
}

impl From<Rgba16Image> for Bitmap {
    fn from(image: Rgba16Image) -> Self {
        Bitmap::Rgba16(image)
    }
}

impl From<PremultipliedImage<u8>> for Bitmap {
    fn from(image: PremultipliedImage<u8>) -> Self {
        Bitmap::PremultipliedRgba8(image)
    }
}

impl From<PremultipliedImage<u16>> for Bitmap {
    fn from(image: PremultipliedImage<u16>) -> Self {
        Bitmap::PremultipliedRgba16(image)
    }
}

impl From<IndexedImage> for Bitmap {
    fn from(image: IndexedImage) -> Self {
        Bitmap::Indexed(image)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn gray_uses_luma_weights() {
        let mut image = GrayImage::new(1, 1);
        image.write_premultiplied(0, 0, [65535, 0, 0, 65535]);
        assert_eq!(image.get_pixel(0, 0).0, [76]);
        image.write_premultiplied(0, 0, [65535; 4]);
        assert_eq!(image.get_pixel(0, 0).0, [255]);
    }

    #[test]
    fn straight_alpha_unpremultiplies_on_write() {
        let mut image = RgbaImage::new(1, 1);
        image.write_premultiplied(0, 0, [32768, 0, 0, 32768]);
        assert_eq!(image.get_pixel(0, 0).0, [255, 0, 0, 128]);
        assert_eq!(image.read_premultiplied(0, 0), [128 * 257, 0, 0, 128 * 257]);
    }

    #[test]
    fn straight_alpha_keeps_exact_color() {
        let mut image = RgbaImage::new(2, 1);
        let color = Srgb::new(100 * 257, 150 * 257, 200 * 257);
        image.write_color(0, 0, color, 257);
        image.write_color(1, 0, color, 0);
        assert_eq!(image.get_pixel(0, 0).0, [100, 150, 200, 1]);
        assert_eq!(image.get_pixel(1, 0).0, [100, 150, 200, 0]);

        // other representations still go through the premultiplied color
        let mut image = PremultipliedImage::<u16>::new(1, 1);
        image.write_color(0, 0, Srgb::new(65535, 0, 32768), 32768);
        assert_eq!(image.read_raw(0, 0), [32768, 0, 16384, 32768]);
    }

    #[test]
    fn sixteen_bit_canvases_keep_full_precision() {
        let straight = Rgba16Image::from_pixel(1, 1, Rgba([1, 2, 65534, 40000]));
        assert_eq!(straight.read_raw(0, 0), [1, 2, 65534, 40000]);

        let premultiplied = PremultipliedImage::<u16>::from_raw(1, 1, vec![3, 4, 5, 6]).unwrap();
        assert_eq!(premultiplied.read_raw(0, 0), [3, 4, 5, 6]);

        let mut rgb = Rgb16Image::new(1, 1);
        rgb.write_premultiplied(0, 0, [7, 8, 9, 65535]);
        assert_eq!(rgb.read_raw(0, 0), [7, 8, 9, 65535]);
        assert_eq!(u8::from_canonical(65535), 255);
        assert_eq!(200_u8.to_canonical(), 200 * 257);
    }

    #[test]
    fn premultiplied_round_trips_straight() {
        let straight = RgbaImage::from_raw(2, 1, vec![255, 0, 0, 255, 0, 0, 0, 0]).unwrap();
        let premultiplied = PremultipliedImage::from(&straight);
        assert_eq!(premultiplied.to_straight(), straight);
        assert_eq!(
            PremultipliedImage::<u8>::from_raw(2, 2, vec![0; 4]),
            Err(QuantizeError::DimensionMismatch { len: 4, width: 2, height: 2 })
        );
    }

    #[test]
    fn indexed_validation() {
        let black = Srgba::new(0, 0, 0, 255);
        assert_eq!(
            IndexedImage::new(1, 1, Vec::new(), vec![0]),
            Err(QuantizeError::IndexedPaletteSize(0))
        );
        assert_eq!(
            IndexedImage::new(2, 1, vec![black], vec![0]),
            Err(QuantizeError::DimensionMismatch { len: 1, width: 2, height: 1 })
        );
        assert_eq!(
            IndexedImage::new(1, 1, vec![black], vec![1]),
            Err(QuantizeError::IndexOutOfRange { index: 1, len: 1 })
        );
    }

    #[test]
    fn indexed_write_picks_nearest_table_color() {
        let table = vec![
            Srgba::new(0, 0, 0, 255),
            Srgba::new(255, 255, 255, 255),
            Srgba::new(0, 0, 0, 0),
        ];
        let mut image = IndexedImage::new(3, 1, table, vec![0, 0, 0]).unwrap();
        image.write_premultiplied(0, 0, [65535, 65535, 65535, 65535]);
        image.write_premultiplied(1, 0, [1000, 1000, 1000, 65535]);
        image.write_premultiplied(2, 0, [0; 4]);
        assert_eq!(image.indices(), &[1, 0, 2]);
        assert_eq!(image.read_raw(0, 0), [65535; 4]);
    }

    #[test]
    fn dynamic_image_conversion() {
        let gray_alpha = DynamicImage::new_luma_a8(2, 3);
        let bitmap = Bitmap::from(gray_alpha);
        assert!(matches!(bitmap, Bitmap::Rgba8(_)));
        assert_eq!(bitmap.dimensions(), (2, 3));
        assert_eq!(bitmap.alpha_mode(), AlphaMode::Straight);

        let float = DynamicImage::new_rgb32f(4, 1);
        assert!(matches!(Bitmap::from(float), Bitmap::Rgba16(_)));

        let indexed = IndexedImage::new(1, 1, vec![Srgba::new(1, 2, 3, 4)], vec![0]).unwrap();
        let dynamic = Bitmap::from(indexed).into_dynamic();
        assert_eq!(dynamic.to_rgba8().get_pixel(0, 0).0, [1, 2, 3, 4]);
    }
}
