//! Contains the color space transforms and the per-pixel linearizer.
//!
//! Every pixel and every palette color goes through the same transform before
//! distances are computed, so relative distances stay meaningful.

use palette::{LinSrgb, Srgb};
use std::sync::OnceLock;

/// The color space that nearest color matching is performed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorSpace {
    /// Compare raw (gamma encoded) sRGB channel values.
    Srgb,
    /// Decode sRGB to linear light before comparing,
    /// so that distances follow physical intensity more closely.
    #[default]
    LinearSrgb,
}

impl ColorSpace {
    /// Applies this color space's transfer function to a single 16-bit component.
    #[must_use]
    #[inline]
    pub fn transfer(self, component: u16) -> u16 {
        match self {
            ColorSpace::Srgb => component,
            ColorSpace::LinearSrgb => srgb_to_linear_table()[usize::from(component)],
        }
    }

    /// Applies this color space's transfer function to each of the RGB components.
    #[must_use]
    #[inline]
    pub fn transfer_rgb(self, rgb: [u16; 3]) -> [u16; 3] {
        rgb.map(|c| self.transfer(c))
    }
}

/// Returns the lookup table for decoding 16-bit sRGB components to 16-bit linear components.
///
/// The table is built once and never modified afterwards.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn srgb_to_linear_table() -> &'static [u16] {
    static TABLE: OnceLock<Box<[u16]>> = OnceLock::new();
    TABLE.get_or_init(|| {
        (0..=u16::MAX)
            .map(|c| {
                let v = f32::from(c) / 65535.0;
                let linear: LinSrgb<f32> = Srgb::new(v, v, v).into_linear();
                (linear.red.clamp(0.0, 1.0) * 65535.0).round() as u16
            })
            .collect()
    })
}

/// How the color channels of a pixel representation relate to its alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlphaMode {
    /// The representation has no alpha channel; every pixel is fully opaque.
    Opaque,
    /// The color channels are stored independently of alpha.
    Straight,
    /// The color channels are stored pre-scaled by the alpha fraction.
    Premultiplied,
}

/// An unpremultiplied pixel in the matching color space, in the canonical 16-bit range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Linear {
    /// The red, green, and blue components after the color space transfer.
    pub rgb: [u16; 3],
    /// The (unchanged) alpha of the pixel.
    pub alpha: u16,
}

/// Recovers the unpremultiplied RGBA of a raw 16-bit pixel stored with the given [`AlphaMode`].
///
/// Returns `None` for fully transparent pixels: their color is undetermined,
/// and callers must leave such pixels untouched.
#[must_use]
#[inline]
pub fn unpremultiply(raw: [u16; 4], mode: AlphaMode) -> Option<[u16; 4]> {
    let [r, g, b, a] = raw;
    match mode {
        AlphaMode::Opaque => Some([r, g, b, u16::MAX]),
        AlphaMode::Straight if a == 0 => None,
        AlphaMode::Straight => Some(raw),
        AlphaMode::Premultiplied => match a {
            0 => None,
            u16::MAX => Some(raw),
            a => {
                let a32 = u32::from(a);
                #[allow(clippy::cast_possible_truncation)]
                let div = |c: u16| (u32::from(c) * 0xffff / a32).min(0xffff) as u16;
                Some([div(r), div(g), div(b), a])
            }
        },
    }
}

/// Unpremultiplies a raw pixel and moves it into the given [`ColorSpace`].
///
/// Returns `None` for fully transparent pixels (see [`unpremultiply`]).
#[must_use]
#[inline]
pub fn linearize(raw: [u16; 4], mode: AlphaMode, space: ColorSpace) -> Option<Linear> {
    unpremultiply(raw, mode).map(|[r, g, b, alpha]| Linear {
        rgb: space.transfer_rgb([r, g, b]),
        alpha,
    })
}

/// Premultiplies an (opaque) palette color against the given alpha,
/// returning a premultiplied 16-bit RGBA pixel.
#[must_use]
#[inline]
pub fn premultiply(color: Srgb<u16>, alpha: u16) -> [u16; 4] {
    match alpha {
        0 => [0; 4],
        u16::MAX => [color.red, color.green, color.blue, u16::MAX],
        a => {
            let a32 = u32::from(a);
            #[allow(clippy::cast_possible_truncation)]
            let mul = |c: u16| (u32::from(c) * a32 / 0xffff) as u16;
            [mul(color.red), mul(color.green), mul(color.blue), a]
        }
    }
}
