//! Contains the nearest color matcher.
//!
//! Distances are squared, per-channel weighted, and computed in integer arithmetic.
//! The weights favor green over red over blue, roughly following perceived luminance.

use crate::{ColorSpace, Palette};

/// Returns a quarter of the squared difference of two components.
///
/// The quarter keeps `65535^2` within a `u32`.
#[inline]
fn sq_diff(a: u16, b: u16) -> u32 {
    u32::from(a.abs_diff(b)).pow(2) >> 2
}

/// Returns the weighted squared distance between two colors.
///
/// The channel weights are `1063/5000`, `447/625`, and `361/5000` for red, green, and blue.
#[must_use]
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub fn weighted_distance(a: [u16; 3], b: [u16; 3]) -> u32 {
    let [dr, dg, db] = [0, 1, 2].map(|i| u64::from(sq_diff(a[i], b[i])));
    (1063 * dr / 5000 + 447 * dg / 625 + 361 * db / 5000) as u32
}

/// Returns the index of the color in `palette` nearest to `color` by [`weighted_distance`].
///
/// The first of several equally near colors wins, and an exact match returns immediately.
///
/// `palette` must not be empty. This is checked in debug builds;
/// release builds return `0` for an empty `palette`.
#[must_use]
#[inline]
pub fn closest_color(color: [u16; 3], palette: &[[u16; 3]]) -> usize {
    debug_assert!(!palette.is_empty(), "cannot match against an empty palette");
    let mut best = (0, u32::MAX);
    for (i, &entry) in palette.iter().enumerate() {
        let dist = weighted_distance(color, entry);
        if dist < best.1 {
            if dist == 0 {
                return i;
            }
            best = (i, dist);
        }
    }
    best.0
}

/// A [`Palette`] transformed into the color space that matching happens in.
///
/// Pixels must go through the same [`ColorSpace`] before being matched against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearPalette {
    /// The transformed palette colors, in palette order.
    colors: Vec<[u16; 3]>,
    /// The color space the colors were transformed into.
    space: ColorSpace,
}

impl LinearPalette {
    /// Transforms each palette color into the given color space.
    #[must_use]
    pub fn new(palette: &Palette, space: ColorSpace) -> Self {
        let colors = palette
            .iter()
            .map(|c| space.transfer_rgb([c.red, c.green, c.blue]))
            .collect();

        Self { colors, space }
    }

    /// Returns the transformed colors.
    #[must_use]
    pub fn colors(&self) -> &[[u16; 3]] {
        &self.colors
    }

    /// Returns the color space the colors were transformed into.
    #[must_use]
    pub fn space(&self) -> ColorSpace {
        self.space
    }

    /// Returns the index of the palette color nearest to an already transformed color.
    #[must_use]
    #[inline]
    pub fn closest(&self, color: [u16; 3]) -> usize {
        closest_color(color, &self.colors)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tests::*;

    fn widened_test_colors() -> Vec<[u16; 3]> {
        test_data_256()
            .into_iter()
            .map(|c| [c.red, c.green, c.blue].map(|v| u16::from(v) * 257))
            .collect()
    }

    #[test]
    fn distance_weights() {
        let black = [0; 3];
        assert_eq!(weighted_distance(black, black), 0);
        // 65535^2 / 4 = 1073709056
        assert_eq!(weighted_distance(black, [65535, 0, 0]), 228270545);
        assert_eq!(weighted_distance(black, [0, 65535, 0]), 767916716);
        assert_eq!(weighted_distance(black, [0, 0, 65535]), 77521793);
        assert_eq!(weighted_distance([1, 2, 3], [4, 5, 6]), weighted_distance([4, 5, 6], [1, 2, 3]));
    }

    #[test]
    fn closest_matches_brute_force() {
        let palette = widened_test_colors();
        let palette = &palette[..64];
        for color in widened_test_colors() {
            let index = closest_color(color, palette);
            let min = palette.iter().map(|&c| weighted_distance(color, c)).min().unwrap();
            let first = palette.iter().position(|&c| weighted_distance(color, c) == min).unwrap();
            assert_eq!(index, first);
        }
    }

    #[test]
    fn ties_go_to_first_entry() {
        let palette = [[100, 0, 0], [0, 0, 0], [0, 0, 0], [200, 0, 0]];
        assert_eq!(closest_color([0, 0, 0], &palette), 1);
        assert_eq!(closest_color([150, 0, 0], &palette), 0);
        assert_eq!(closest_color([50, 0, 0], &[[0, 0, 0], [100, 0, 0]]), 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "empty palette")]
    fn empty_palette_is_rejected() {
        let _ = closest_color([1, 2, 3], &[]);
    }

    #[test]
    fn linear_palette_transforms_colors() {
        let palette = Palette::new(vec![palette::Srgb::new(0, 32768, 65535)]).unwrap();
        let linear = LinearPalette::new(&palette, ColorSpace::LinearSrgb);
        let [r, g, b] = linear.colors()[0];
        assert_eq!((r, b), (0, 65535));
        assert!(g < 32768);
        assert_eq!(linear.space(), ColorSpace::LinearSrgb);

        let raw = LinearPalette::new(&palette, ColorSpace::Srgb);
        assert_eq!(raw.colors(), &[[0, 32768, 65535]]);
        assert_eq!(raw.closest([0, 30000, 60000]), 0);
    }
}
