//! Contains the median cut palette builder.
//!
//! The builder samples every pixel of an image at 8 bits per channel, then repeatedly
//! splits each partition of samples in half along the channel with the largest spread.
//! After `levels` rounds, each of the `2^levels` partitions contributes its mean color
//! to the palette, in partition order.
//!
//! # Examples
//! ```
//! # use pixquant::{median_cut, Bitmap, QuantizeError};
//! # use image::RgbImage;
//! # fn main() -> Result<(), QuantizeError> {
//! let image = Bitmap::from(RgbImage::from_pixel(4, 4, image::Rgb([10, 20, 30])));
//! let palette = median_cut::palette(&image, 3)?;
//! assert_eq!(palette.len(), 8);
//! # Ok(())
//! # }
//! ```

use crate::{
    bitmap::{dispatch, Canvas},
    Bitmap, Palette, QuantizeError, MAX_LEVELS,
};
use palette::Srgb;
use tracing::debug;

#[cfg(feature = "threads")]
use rayon::prelude::*;

/// Narrows a premultiplied 16-bit pixel to an 8-bit sample, dropping alpha.
#[inline]
#[allow(clippy::cast_possible_truncation)]
fn to_sample([r, g, b, _]: [u16; 4]) -> Srgb<u8> {
    Srgb::new((r >> 8) as u8, (g >> 8) as u8, (b >> 8) as u8)
}

/// Returns every pixel of the canvas as a sample, visiting columns left to right
/// and each column top to bottom.
fn canvas_samples(canvas: &impl Canvas) -> Vec<Srgb<u8>> {
    let (width, height) = canvas.dimensions();
    (0..width)
        .flat_map(|x| (0..height).map(move |y| to_sample(canvas.read_premultiplied(x, y))))
        .collect()
}

/// Returns every pixel of the canvas as a sample in parallel.
#[cfg(feature = "threads")]
fn canvas_samples_par(canvas: &(impl Canvas + Sync)) -> Vec<Srgb<u8>> {
    let (width, height) = canvas.dimensions();
    (0..width)
        .into_par_iter()
        .flat_map_iter(|x| (0..height).map(move |y| to_sample(canvas.read_premultiplied(x, y))))
        .collect()
}

/// Returns every pixel of the image as an 8-bit sample.
///
/// Pixels are premultiplied before narrowing, so translucent pixels are darkened
/// and fully transparent pixels sample as black.
/// Columns are visited left to right and each column top to bottom.
#[must_use]
pub fn samples(image: &Bitmap) -> Vec<Srgb<u8>> {
    dispatch!(image, canvas => canvas_samples(canvas))
}

/// Returns every pixel of the image as an 8-bit sample in parallel.
///
/// The samples are in the same order as [`samples`].
#[cfg(feature = "threads")]
#[must_use]
pub fn samples_par(image: &Bitmap) -> Vec<Srgb<u8>> {
    dispatch!(image, canvas => canvas_samples_par(canvas))
}

/// Returns the difference between the largest and smallest value of each channel.
///
/// Returns all zeros for an empty slice.
#[must_use]
pub fn spread(samples: &[Srgb<u8>]) -> [u8; 3] {
    let Some(first) = samples.first() else {
        return [0; 3];
    };

    let first = [first.red, first.green, first.blue];
    let (min, max) = samples.iter().fold((first, first), |(mut min, mut max), c| {
        for (i, v) in [c.red, c.green, c.blue].into_iter().enumerate() {
            min[i] = min[i].min(v);
            max[i] = max[i].max(v);
        }
        (min, max)
    });

    [0, 1, 2].map(|i| max[i] - min[i])
}

/// Splits the samples in half along the channel with the largest spread.
///
/// Ties prefer red over green and green over blue. The samples are stably sorted by the
/// chosen channel, and the first `len / 2` samples make up the lower half.
pub fn partition(samples: &mut [Srgb<u8>]) -> (&mut [Srgb<u8>], &mut [Srgb<u8>]) {
    let [dr, dg, db] = spread(samples);

    if dr >= dg && dr >= db {
        samples.sort_by_key(|c| c.red);
    } else if dg >= db {
        samples.sort_by_key(|c| c.green);
    } else {
        samples.sort_by_key(|c| c.blue);
    }

    let mid = samples.len() / 2;
    samples.split_at_mut(mid)
}

/// Returns the truncated mean of each channel, or black for an empty slice.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn average(samples: &[Srgb<u8>]) -> Srgb<u8> {
    if samples.is_empty() {
        return Srgb::new(0, 0, 0);
    }

    let mut sum = [0u64; 3];
    for c in samples {
        sum[0] += u64::from(c.red);
        sum[1] += u64::from(c.green);
        sum[2] += u64::from(c.blue);
    }

    let n = samples.len() as u64;
    let [r, g, b] = sum.map(|s| (s / n) as u8);
    Srgb::new(r, g, b)
}

/// Returns an error if `levels` is above [`MAX_LEVELS`].
fn check_levels(levels: u8) -> Result<(), QuantizeError> {
    if levels > MAX_LEVELS {
        Err(QuantizeError::LevelsAboveMax { levels, max: MAX_LEVELS })
    } else {
        Ok(())
    }
}

/// Logs the result of a median cut run.
fn log_result(num_samples: usize, levels: u8, partitions: &[&mut [Srgb<u8>]]) {
    let empty = partitions.iter().filter(|p| p.is_empty()).count();
    debug!(num_samples, levels, empty, "median cut finished");
}

/// Computes a palette of exactly `2^levels` colors from the given samples.
///
/// The samples are reordered in place. Partitions left empty
/// (when there are fewer samples than palette entries) contribute black.
///
/// # Errors
/// Returns [`QuantizeError::LevelsAboveMax`] if `levels` is above [`MAX_LEVELS`].
pub fn palette_from_samples(
    samples: &mut [Srgb<u8>],
    levels: u8,
) -> Result<Vec<Srgb<u8>>, QuantizeError> {
    check_levels(levels)?;

    let num_samples = samples.len();
    let mut partitions = vec![samples];
    for _ in 0..levels {
        partitions = partitions
            .into_iter()
            .flat_map(|p| {
                let (lower, upper) = partition(p);
                [lower, upper]
            })
            .collect();
    }

    log_result(num_samples, levels, &partitions);

    Ok(partitions.iter().map(|p| average(p)).collect())
}

/// Computes a palette of exactly `2^levels` colors from the given samples in parallel.
///
/// The result is identical to [`palette_from_samples`].
///
/// # Errors
/// Returns [`QuantizeError::LevelsAboveMax`] if `levels` is above [`MAX_LEVELS`].
#[cfg(feature = "threads")]
pub fn palette_from_samples_par(
    samples: &mut [Srgb<u8>],
    levels: u8,
) -> Result<Vec<Srgb<u8>>, QuantizeError> {
    check_levels(levels)?;

    let num_samples = samples.len();
    let mut partitions = vec![samples];
    for _ in 0..levels {
        partitions = partitions
            .into_par_iter()
            .flat_map_iter(|p| {
                let (lower, upper) = partition(p);
                [lower, upper]
            })
            .collect();
    }

    log_result(num_samples, levels, &partitions);

    Ok(partitions.par_iter().map(|p| average(p)).collect())
}

/// Computes a median cut palette of exactly `2^levels` colors for the given image.
///
/// # Errors
/// Returns [`QuantizeError::LevelsAboveMax`] if `levels` is above [`MAX_LEVELS`].
pub fn palette(image: &Bitmap, levels: u8) -> Result<Palette, QuantizeError> {
    check_levels(levels)?;
    let colors = palette_from_samples(&mut samples(image), levels)?;
    Palette::from_srgb8(colors)
}

/// Computes a median cut palette of exactly `2^levels` colors for the given image in parallel.
///
/// The result is identical to [`palette`].
///
/// # Errors
/// Returns [`QuantizeError::LevelsAboveMax`] if `levels` is above [`MAX_LEVELS`].
#[cfg(feature = "threads")]
pub fn palette_par(image: &Bitmap, levels: u8) -> Result<Palette, QuantizeError> {
    check_levels(levels)?;
    let colors = palette_from_samples_par(&mut samples_par(image), levels)?;
    Palette::from_srgb8(colors)
}
