//! Error types returned by palette, matrix, and image construction.

use thiserror::Error;

/// An error returned when an input violates one of the preconditions of this crate.
///
/// All of these are detected before any pixel is written,
/// so a returned error never leaves a partially quantized image behind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuantizeError {
    /// A [`Palette`](crate::Palette) must hold at least one color.
    #[error("palette must contain at least one color")]
    EmptyPalette,

    /// Neither dimension of a threshold matrix may be zero.
    #[error("threshold matrix dimensions cannot be zero, got {width}x{height}")]
    ZeroMatrixDimension {
        /// The requested matrix width.
        width: u32,
        /// The requested matrix height.
        height: u32,
    },

    /// Outside of the `3x3`, `5x3`, and `3x5` special cases,
    /// both dimensions of a Bayer matrix must be powers of two.
    #[error("threshold matrix dimensions must both be powers of two (or 3x3, 5x3, 3x5), got {width}x{height}")]
    NonPowerOfTwoMatrix {
        /// The requested matrix width.
        width: u32,
        /// The requested matrix height.
        height: u32,
    },

    /// The matrix has more than [`MAX_MATRIX_CELLS`](crate::MAX_MATRIX_CELLS) cells.
    #[error("threshold matrix of {width}x{height} is above the maximum of {max} cells")]
    MatrixTooLarge {
        /// The requested matrix width.
        width: u32,
        /// The requested matrix height.
        height: u32,
        /// The maximum supported number of cells.
        max: u32,
    },

    /// A custom threshold matrix is ragged, empty, or not a permutation of `0..width * height`.
    #[error("threshold matrix of {width}x{height} is not a permutation of its cell positions")]
    NotAPermutation {
        /// The width of the first row.
        width: u32,
        /// The number of rows.
        height: u32,
    },

    /// The dither strength must lie in `0.0..=1.0`.
    #[error("dither strength must be in 0.0..=1.0, got {0}")]
    InvalidStrength(f32),

    /// The median cut level count is above [`MAX_LEVELS`](crate::MAX_LEVELS).
    #[error("median cut levels must be at most {max}, got {levels}")]
    LevelsAboveMax {
        /// The requested number of levels.
        levels: u8,
        /// The maximum supported number of levels.
        max: u8,
    },

    /// A raw pixel or index buffer does not have `width * height` entries.
    #[error("buffer length {len} does not match dimensions {width}x{height}")]
    DimensionMismatch {
        /// The length of the buffer.
        len: usize,
        /// The image width.
        width: u32,
        /// The image height.
        height: u32,
    },

    /// An indexed image refers to a color past the end of its table.
    #[error("palette index {index} is out of range for a table of {len} colors")]
    IndexOutOfRange {
        /// The offending index.
        index: u8,
        /// The length of the color table.
        len: usize,
    },

    /// An indexed image table must hold between `1` and `256` colors.
    #[error("indexed images hold between 1 and 256 colors, got {0}")]
    IndexedPaletteSize(usize),
}

/// An error returned when parsing an unknown [`MatrixKind`](crate::MatrixKind) name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized threshold matrix `{0}` (expected e.g. `bayer8x8` or `clustered-dot-4x4`)")]
pub struct ParseMatrixKindError(pub String);
