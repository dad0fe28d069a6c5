//! Contains the palette type shared across the crate.

use crate::QuantizeError;
use palette::{Srgb, Srgba};
use std::ops::Deref;

/// Widens an 8-bit component to the canonical 16-bit range (`255 * 257 == 65535`).
#[inline]
pub(crate) const fn widen(component: u8) -> u16 {
    component as u16 * 257
}

/// Widens an 8-bit color to the canonical 16-bit range.
#[inline]
pub(crate) fn widen_srgb(color: Srgb<u8>) -> Srgb<u16> {
    Srgb::new(widen(color.red), widen(color.green), widen(color.blue))
}

/// An ordered, non-empty list of colors that pixels get remapped to.
///
/// Colors are stored in the canonical 16-bit per channel form.
/// Palette entries are always treated as opaque: the output alpha of a remapped pixel
/// comes from the source pixel, so any alpha given at construction is dropped.
/// Duplicate entries are allowed.
///
/// # Examples
/// ```
/// # use pixquant::{Palette, QuantizeError};
/// # use palette::Srgb;
/// # fn main() -> Result<(), QuantizeError> {
/// let palette = Palette::from_srgb8([Srgb::new(0, 0, 0), Srgb::new(255, 255, 255)])?;
/// assert_eq!(palette.len(), 2);
///
/// assert_eq!(Palette::new(Vec::new()), Err(QuantizeError::EmptyPalette));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Palette(Vec<Srgb<u16>>);

impl Palette {
    /// Creates a new [`Palette`] from 16-bit colors.
    ///
    /// # Errors
    /// Returns [`QuantizeError::EmptyPalette`] if `colors` is empty.
    pub fn new(colors: Vec<Srgb<u16>>) -> Result<Self, QuantizeError> {
        if colors.is_empty() {
            Err(QuantizeError::EmptyPalette)
        } else {
            Ok(Self(colors))
        }
    }

    /// Creates a new [`Palette`] from 8-bit colors.
    ///
    /// # Errors
    /// Returns [`QuantizeError::EmptyPalette`] if `colors` is empty.
    pub fn from_srgb8(colors: impl IntoIterator<Item = Srgb<u8>>) -> Result<Self, QuantizeError> {
        Self::new(colors.into_iter().map(widen_srgb).collect())
    }

    /// Creates a new [`Palette`] from 8-bit colors with alpha, dropping the alpha channel.
    ///
    /// # Errors
    /// Returns [`QuantizeError::EmptyPalette`] if `colors` is empty.
    pub fn from_srgba8(colors: impl IntoIterator<Item = Srgba<u8>>) -> Result<Self, QuantizeError> {
        Self::from_srgb8(colors.into_iter().map(|c| c.color))
    }

    /// Returns the palette colors.
    #[must_use]
    pub fn colors(&self) -> &[Srgb<u16>] {
        &self.0
    }

    /// Consumes the palette and returns the inner colors.
    #[must_use]
    pub fn into_inner(self) -> Vec<Srgb<u16>> {
        self.0
    }

    /// Returns the palette colors narrowed to 8 bits per channel.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_srgb8(&self) -> Vec<Srgb<u8>> {
        self.0
            .iter()
            .map(|c| Srgb::new((c.red >> 8) as u8, (c.green >> 8) as u8, (c.blue >> 8) as u8))
            .collect()
    }

    /// Whether both palettes hold the same multiset of colors, regardless of order.
    #[must_use]
    pub fn same_colors(&self, other: &Palette) -> bool {
        self.len() == other.len()
            && sorted_components(self.iter().copied()) == sorted_components(other.iter().copied())
    }

    /// Whether the color table of an indexed image holds the same multiset of colors as this palette.
    ///
    /// Tables with any non-opaque entry never match, since palette entries are opaque.
    #[must_use]
    pub fn same_colors_as_table(&self, table: &[Srgba<u8>]) -> bool {
        self.len() == table.len()
            && table.iter().all(|c| c.alpha == u8::MAX)
            && sorted_components(self.iter().copied())
                == sorted_components(table.iter().map(|c| widen_srgb(c.color)))
    }
}

/// Collects the components of the given colors and sorts them.
fn sorted_components(colors: impl Iterator<Item = Srgb<u16>>) -> Vec<[u16; 3]> {
    let mut components = colors.map(|c| [c.red, c.green, c.blue]).collect::<Vec<_>>();
    components.sort_unstable();
    components
}

impl Deref for Palette {
    type Target = [Srgb<u16>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[Srgb<u16>]> for Palette {
    fn as_ref(&self) -> &[Srgb<u16>] {
        self
    }
}

impl TryFrom<Vec<Srgb<u16>>> for Palette {
    type Error = QuantizeError;

    fn try_from(colors: Vec<Srgb<u16>>) -> Result<Self, Self::Error> {
        Self::new(colors)
    }
}

impl TryFrom<&[Srgb<u8>]> for Palette {
    type Error = QuantizeError;

    fn try_from(colors: &[Srgb<u8>]) -> Result<Self, Self::Error> {
        Self::from_srgb8(colors.iter().copied())
    }
}

impl From<Palette> for Vec<Srgb<u16>> {
    fn from(palette: Palette) -> Self {
        palette.into_inner()
    }
}
