//! Contains threshold matrices for ordered dithering and their conversion into bias offsets.
//!
//! A [`ThresholdMatrix`] is a grid of ranks. For ordered dithering, each rank is turned into
//! a signed offset centered on zero (a [`BiasMatrix`]) that gets added to every color channel
//! of the pixels it tiles over before nearest color matching.
//!
//! # Examples
//! ```
//! # use pixquant::{ThresholdMatrix, QuantizeError};
//! # fn main() -> Result<(), QuantizeError> {
//! let matrix = ThresholdMatrix::bayer(2, 2)?;
//! assert_eq!(matrix.rows().collect::<Vec<_>>(), [[0, 2], [3, 1]]);
//!
//! let bias = matrix.to_bias(1.0)?;
//! assert_eq!(bias.apply(0, 0, [0, 0, 0]), [0, 0, 0]);
//! # Ok(())
//! # }
//! ```

use crate::{ParseMatrixKindError, QuantizeError, MAX_MATRIX_CELLS};
use std::{fmt, str::FromStr};

/// The next `f32` after `0.5`.
///
/// Centering ranks on this instead of `0.5` keeps the middle rank's offset slightly negative,
/// so pure black is never dithered upwards.
const HALF_PLUS_ULP: f32 = 0.5 + f32::EPSILON / 2.0;

/// The `3x3` matrix.
const BAYER_3X3: [[u32; 3]; 3] = [[0, 5, 2], [3, 8, 7], [6, 1, 4]];

/// The `5x3` (width 5, height 3) matrix.
const BAYER_5X3: [[u32; 5]; 3] = [[0, 12, 7, 3, 9], [14, 8, 1, 5, 11], [6, 4, 10, 13, 2]];

/// The `3x5` (width 3, height 5) matrix.
const BAYER_3X5: [[u32; 3]; 5] = [[0, 14, 6], [12, 8, 4], [7, 1, 10], [3, 5, 13], [9, 11, 2]];

/// The `4x4` clustered dot matrix.
const CLUSTERED_DOT_4X4: [[u32; 4]; 4] = [[12, 5, 6, 13], [4, 0, 1, 7], [11, 3, 2, 8], [15, 10, 9, 14]];

/// The `8x8` diagonal clustered dot matrix with `64` levels.
const CLUSTERED_DOT_DIAGONAL_8X8: [[u32; 8]; 8] = [
    [24, 10, 12, 26, 35, 47, 49, 37],
    [8, 0, 2, 14, 45, 59, 61, 51],
    [22, 6, 4, 16, 43, 57, 63, 53],
    [30, 20, 18, 28, 33, 41, 55, 39],
    [34, 46, 48, 36, 25, 11, 13, 27],
    [44, 58, 60, 50, 9, 1, 3, 15],
    [42, 56, 62, 52, 23, 7, 5, 17],
    [32, 40, 54, 38, 31, 21, 19, 29],
];

/// The `5x3` matrix of vertical lines.
const VERTICAL_5X3: [[u32; 5]; 3] = [[9, 3, 0, 6, 12], [10, 4, 1, 7, 13], [11, 5, 2, 8, 14]];

/// The `3x5` matrix of horizontal lines.
const HORIZONTAL_3X5: [[u32; 3]; 5] = [[9, 10, 11], [3, 4, 5], [0, 1, 2], [6, 7, 8], [12, 13, 14]];

/// The `6x6` clustered dot matrix.
const CLUSTERED_DOT_6X6: [[u32; 6]; 6] = [
    [34, 29, 17, 21, 30, 35],
    [28, 14, 9, 16, 20, 31],
    [13, 8, 4, 5, 15, 19],
    [12, 3, 0, 1, 10, 18],
    [27, 7, 2, 6, 23, 24],
    [33, 26, 11, 22, 25, 32],
];

/// The `5x5` clustered dot matrix that grows in a spiral.
const CLUSTERED_DOT_SPIRAL_5X5: [[u32; 5]; 5] = [
    [20, 21, 22, 23, 24],
    [19, 6, 7, 8, 9],
    [18, 5, 0, 1, 10],
    [17, 4, 3, 2, 11],
    [16, 15, 14, 13, 12],
];

/// The `6x6` line screen that grows horizontal lines out from the middle row.
const CLUSTERED_DOT_HORIZONTAL_LINE: [[u32; 6]; 6] = [
    [35, 33, 31, 30, 32, 34],
    [23, 21, 19, 18, 20, 22],
    [11, 9, 7, 6, 8, 10],
    [5, 3, 1, 0, 2, 4],
    [17, 15, 13, 12, 14, 16],
    [29, 27, 25, 24, 26, 28],
];

/// The `6x6` line screen that grows vertical lines out from the middle column.
const CLUSTERED_DOT_VERTICAL_LINE: [[u32; 6]; 6] = [
    [35, 23, 11, 5, 17, 29],
    [33, 21, 9, 3, 15, 27],
    [31, 19, 7, 1, 13, 25],
    [30, 18, 6, 0, 12, 24],
    [32, 20, 8, 2, 14, 26],
    [34, 22, 10, 4, 16, 28],
];

/// The dot of the `6x6` diagonal clustered dot matrix.
const DIAGONAL_6X6_DOT: [[u32; 3]; 3] = [[8, 6, 7], [5, 0, 1], [4, 3, 2]];

/// The dot of the second `8x8` diagonal clustered dot matrix.
const DIAGONAL_8X8_DOT: [[u32; 4]; 4] = [[13, 9, 5, 12], [6, 1, 0, 8], [10, 2, 3, 4], [14, 7, 11, 15]];

/// A rectangular grid of threshold ranks, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdMatrix {
    /// The number of columns.
    width: u32,
    /// The number of rows.
    height: u32,
    /// The number of distinct ranks, each in `0..levels`.
    levels: u32,
    /// The row-major ranks.
    cells: Vec<u32>,
}

impl ThresholdMatrix {
    /// Creates a matrix from fixed-size rows holding each rank once, without validation.
    #[allow(clippy::cast_possible_truncation)]
    fn from_table<const W: usize, const H: usize>(table: &[[u32; W]; H]) -> Self {
        Self {
            width: W as u32,
            height: H as u32,
            levels: (W * H) as u32,
            cells: table.concat(),
        }
    }

    /// Creates a `size x size` matrix that grows one round dot out from the center.
    ///
    /// Ranks follow the distance from the center, ties in row-major order. The center lies
    /// between the four middle cells, or on the cell right of and below it if `on_cell`.
    #[allow(clippy::cast_possible_truncation)]
    fn round_dot(size: u32, on_cell: bool) -> Self {
        let n = i64::from(size);
        let offset = i64::from(!on_cell);
        let mut order = (0..size * size).collect::<Vec<_>>();
        order.sort_by_key(|&i| {
            let dx = 2 * i64::from(i % size) + offset - n;
            let dy = 2 * i64::from(i / size) + offset - n;
            (dx * dx + dy * dy, i)
        });

        let mut cells = vec![0; order.len()];
        for (rank, &i) in order.iter().enumerate() {
            cells[i as usize] = rank as u32;
        }

        Self { width: size, height: size, levels: size * size, cells }
    }

    /// Tiles a square dot matrix into a diagonal screen of twice the size.
    ///
    /// The top left and bottom right quadrants grow the dot, and the other two quadrants
    /// grow the inverted dot, so each of the `2 * levels` ranks appears twice.
    fn diagonal(&self) -> Self {
        let n = self.width;
        let levels = 2 * self.levels;
        let cells = (0..2 * n)
            .flat_map(|y| {
                (0..2 * n).map(move |x| {
                    let rank = self.get(x % n, y % n);
                    if x / n == y / n {
                        rank
                    } else {
                        levels - 1 - rank
                    }
                })
            })
            .collect();

        Self { width: 2 * n, height: 2 * n, levels, cells }
    }

    /// Creates a Bayer matrix of the given dimensions.
    ///
    /// The `3x3`, `5x3`, and `3x5` matrices are fixed tables.
    /// For every other size, both `width` and `height` must be powers of two, and the ranks
    /// come from interleaving the bits of the cell coordinates. Square power of two sizes
    /// give the usual recursive Bayer matrices, for example:
    /// ```text
    /// 0 2     0  8  2 10
    /// 3 1    12  4 14  6
    ///         3 11  1  9
    ///        15  7 13  5
    /// ```
    ///
    /// # Errors
    /// Returns an error if either dimension is zero, if the dimensions are not both powers
    /// of two (outside the special cases), or if the matrix would have more than
    /// [`MAX_MATRIX_CELLS`] cells.
    pub fn bayer(width: u32, height: u32) -> Result<Self, QuantizeError> {
        if width == 0 || height == 0 {
            return Err(QuantizeError::ZeroMatrixDimension { width, height });
        }

        match (width, height) {
            (3, 3) => return Ok(Self::from_table(&BAYER_3X3)),
            (5, 3) => return Ok(Self::from_table(&BAYER_5X3)),
            (3, 5) => return Ok(Self::from_table(&BAYER_3X5)),
            _ => (),
        }

        if !(width.is_power_of_two() && height.is_power_of_two()) {
            return Err(QuantizeError::NonPowerOfTwoMatrix { width, height });
        }

        if u64::from(width) * u64::from(height) > u64::from(MAX_MATRIX_CELLS) {
            return Err(QuantizeError::MatrixTooLarge { width, height, max: MAX_MATRIX_CELLS });
        }

        let cells = (0..height)
            .flat_map(|y| (0..width).map(move |x| bayer_rank(y, x, height, width)))
            .collect();

        Ok(Self { width, height, levels: width * height, cells })
    }

    /// Creates a matrix from custom rows of ranks.
    ///
    /// # Errors
    /// Returns [`QuantizeError::NotAPermutation`] if the rows are empty, ragged,
    /// or do not hold each of `0..width * height` exactly once,
    /// and [`QuantizeError::MatrixTooLarge`] if there are more than [`MAX_MATRIX_CELLS`] cells.
    pub fn from_rows<R: AsRef<[u32]>>(rows: &[R]) -> Result<Self, QuantizeError> {
        let width = rows.first().map_or(0, |row| row.as_ref().len());
        let height = rows.len();
        let len = width * height;

        let dims = |w: usize, h: usize| {
            (
                u32::try_from(w).unwrap_or(u32::MAX),
                u32::try_from(h).unwrap_or(u32::MAX),
            )
        };
        let (w, h) = dims(width, height);

        if len > MAX_MATRIX_CELLS as usize {
            return Err(QuantizeError::MatrixTooLarge { width: w, height: h, max: MAX_MATRIX_CELLS });
        }

        let not_a_permutation = QuantizeError::NotAPermutation { width: w, height: h };

        if len == 0 || rows.iter().any(|row| row.as_ref().len() != width) {
            return Err(not_a_permutation);
        }

        let mut seen = vec![false; len];
        for &rank in rows.iter().flat_map(|row| row.as_ref()) {
            match seen.get_mut(rank as usize) {
                Some(slot) if !*slot => *slot = true,
                _ => return Err(not_a_permutation),
            }
        }

        Ok(Self {
            width: w,
            height: h,
            levels: w * h,
            cells: rows.iter().flat_map(|row| row.as_ref().iter().copied()).collect(),
        })
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the number of distinct ranks.
    ///
    /// This is the number of cells, except for diagonal screens where each rank appears twice.
    #[must_use]
    pub fn levels(&self) -> u32 {
        self.levels
    }

    /// Returns the rank at column `x` and row `y`.
    ///
    /// # Panics
    /// Panics if `x` or `y` is out of bounds.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> u32 {
        assert!(x < self.width && y < self.height);
        self.cells[y as usize * self.width as usize + x as usize]
    }

    /// Returns an iterator over the rows of the matrix.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[u32]> + '_ {
        self.cells.chunks_exact(self.width as usize)
    }

    /// Converts the ranks into per-cell bias offsets scaled by `strength`.
    ///
    /// A rank `v` in a matrix of `n` [levels](ThresholdMatrix::levels) becomes
    /// `strength * 65535 * ((v + 1) / n - 0.5)`, offset slightly towards negative.
    ///
    /// # Errors
    /// Returns [`QuantizeError::InvalidStrength`] if `strength` is not in `0.0..=1.0`.
    pub fn to_bias(&self, strength: f32) -> Result<BiasMatrix, QuantizeError> {
        if !(0.0..=1.0).contains(&strength) {
            return Err(QuantizeError::InvalidStrength(strength));
        }

        let scale = f32::from(u16::MAX) * strength;
        #[allow(clippy::cast_precision_loss)]
        let n = self.levels as f32;

        #[allow(clippy::cast_precision_loss)]
        let cells = self
            .cells
            .iter()
            .map(|&v| scale * ((v + 1) as f32 / n - HALF_PLUS_ULP))
            .collect();

        Ok(BiasMatrix { width: self.width, height: self.height, cells })
    }
}

/// Computes the rank of cell `(x, y)` in a matrix of `xdim` by `ydim` cells
/// by interleaving the bits of the (xor-folded) coordinates.
///
/// The interleave order depends on which dimension has more bits. `bayer` calls this
/// with the axes swapped so that the first rank after zero lands in the first row.
fn bayer_rank(x: u32, y: u32, xdim: u32, ydim: u32) -> u32 {
    let m = xdim.ilog2();
    let l = ydim.ilog2();

    let mut v = 0;
    let mut offset = 0;
    let mut xmask = m;
    let mut ymask = l;
    let mut bit = 0;

    if m == 0 || (m > l && l != 0) {
        let xc = x ^ ((y << m) >> l);
        let yc = y;
        while bit < m + l {
            ymask -= 1;
            v |= ((yc >> ymask) & 1) << bit;
            bit += 1;
            offset += m;
            while offset >= l {
                xmask -= 1;
                v |= ((xc >> xmask) & 1) << bit;
                bit += 1;
                offset -= l;
            }
        }
    } else {
        let xc = x;
        let yc = y ^ ((x << l) >> m);
        while bit < m + l {
            xmask -= 1;
            v |= ((xc >> xmask) & 1) << bit;
            bit += 1;
            offset += l;
            while offset >= m {
                ymask -= 1;
                v |= ((yc >> ymask) & 1) << bit;
                bit += 1;
                offset -= m;
            }
        }
    }

    v
}

/// Clamps `value` into `0.0..=65535.0` and rounds it to the nearest integer, ties to even.
#[must_use]
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn round_clamp(value: f32) -> u16 {
    if value < 0.0 {
        0
    } else if value > 65535.0 {
        u16::MAX
    } else {
        value.round_ties_even() as u16
    }
}

/// Per-cell bias offsets derived from a [`ThresholdMatrix`], tiled over an image.
#[derive(Debug, Clone, PartialEq)]
pub struct BiasMatrix {
    /// The number of columns.
    width: u32,
    /// The number of rows.
    height: u32,
    /// The row-major offsets.
    cells: Vec<f32>,
}

impl BiasMatrix {
    /// Returns the number of columns.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the offset for the pixel at `(x, y)`, tiling the matrix over the image.
    #[must_use]
    #[inline]
    pub fn at(&self, x: u32, y: u32) -> f32 {
        let x = x % self.width;
        let y = y % self.height;
        self.cells[y as usize * self.width as usize + x as usize]
    }

    /// Adds the offset for the pixel at `(x, y)` to each channel, rounding and clamping.
    #[must_use]
    #[inline]
    pub fn apply(&self, x: u32, y: u32, rgb: [u16; 3]) -> [u16; 3] {
        let bias = self.at(x, y);
        rgb.map(|c| round_clamp(f32::from(c) + bias))
    }
}

/// A named threshold matrix.
///
/// Parses from and displays as names like `bayer8x8` or `clustered-dot-4x4`.
/// Parsing ignores case, `-`, and `_`, so `ClusteredDotDiagonal8x8_2` works as well.
///
/// # Examples
/// ```
/// # use pixquant::MatrixKind;
/// let kind = "bayer4x2".parse::<MatrixKind>().unwrap();
/// assert_eq!(kind, MatrixKind::Bayer { width: 4, height: 2 });
/// assert_eq!(kind.to_string(), "bayer4x2");
///
/// let kind = "clustereddotspiral5x5".parse::<MatrixKind>().unwrap();
/// assert_eq!(kind, MatrixKind::ClusteredDotSpiral5x5);
/// assert_eq!(kind.to_string(), "clustered-dot-spiral-5x5");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixKind {
    /// A Bayer matrix of the given dimensions (see [`ThresholdMatrix::bayer`]).
    Bayer {
        /// The number of columns.
        width: u32,
        /// The number of rows.
        height: u32,
    },
    /// A `4x4` clustered dot matrix, which gives a halftone look.
    ClusteredDot4x4,
    /// An `8x8` diagonal clustered dot matrix with `64` levels.
    ClusteredDotDiagonal8x8,
    /// A `5x3` matrix that grows vertical lines.
    Vertical5x3,
    /// A `3x5` matrix that grows horizontal lines.
    Horizontal3x5,
    /// A `6x6` diagonal clustered dot matrix with `18` levels.
    ClusteredDotDiagonal6x6,
    /// An `8x8` diagonal clustered dot matrix with `32` levels.
    ClusteredDotDiagonal8x8_2,
    /// A `16x16` diagonal clustered dot matrix with `128` levels.
    ClusteredDotDiagonal16x16,
    /// A `6x6` clustered dot matrix.
    ClusteredDot6x6,
    /// A `5x5` clustered dot matrix that grows in a spiral.
    ClusteredDotSpiral5x5,
    /// A `6x6` line screen of horizontal lines.
    ClusteredDotHorizontalLine,
    /// A `6x6` line screen of vertical lines.
    ClusteredDotVerticalLine,
    /// An `8x8` matrix that grows a round dot.
    ClusteredDot8x8,
    /// A `6x6` matrix that grows a round dot.
    ClusteredDot6x6_2,
    /// A `6x6` matrix that grows a round dot from a single center cell.
    ClusteredDot6x6_3,
    /// An `8x8` diagonal screen of the `4x4` clustered dot, with `32` levels.
    ClusteredDotDiagonal8x8_3,
}

impl MatrixKind {
    /// Every named (non-Bayer) matrix.
    pub const NAMED: [MatrixKind; 15] = [
        MatrixKind::ClusteredDot4x4,
        MatrixKind::ClusteredDotDiagonal8x8,
        MatrixKind::Vertical5x3,
        MatrixKind::Horizontal3x5,
        MatrixKind::ClusteredDotDiagonal6x6,
        MatrixKind::ClusteredDotDiagonal8x8_2,
        MatrixKind::ClusteredDotDiagonal16x16,
        MatrixKind::ClusteredDot6x6,
        MatrixKind::ClusteredDotSpiral5x5,
        MatrixKind::ClusteredDotHorizontalLine,
        MatrixKind::ClusteredDotVerticalLine,
        MatrixKind::ClusteredDot8x8,
        MatrixKind::ClusteredDot6x6_2,
        MatrixKind::ClusteredDot6x6_3,
        MatrixKind::ClusteredDotDiagonal8x8_3,
    ];

    /// Returns the name of a named matrix, or `None` for [`MatrixKind::Bayer`].
    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        Some(match self {
            MatrixKind::Bayer { .. } => return None,
            MatrixKind::ClusteredDot4x4 => "clustered-dot-4x4",
            MatrixKind::ClusteredDotDiagonal8x8 => "clustered-dot-diagonal-8x8",
            MatrixKind::Vertical5x3 => "vertical-5x3",
            MatrixKind::Horizontal3x5 => "horizontal-3x5",
            MatrixKind::ClusteredDotDiagonal6x6 => "clustered-dot-diagonal-6x6",
            MatrixKind::ClusteredDotDiagonal8x8_2 => "clustered-dot-diagonal-8x8-2",
            MatrixKind::ClusteredDotDiagonal16x16 => "clustered-dot-diagonal-16x16",
            MatrixKind::ClusteredDot6x6 => "clustered-dot-6x6",
            MatrixKind::ClusteredDotSpiral5x5 => "clustered-dot-spiral-5x5",
            MatrixKind::ClusteredDotHorizontalLine => "clustered-dot-horizontal-line",
            MatrixKind::ClusteredDotVerticalLine => "clustered-dot-vertical-line",
            MatrixKind::ClusteredDot8x8 => "clustered-dot-8x8",
            MatrixKind::ClusteredDot6x6_2 => "clustered-dot-6x6-2",
            MatrixKind::ClusteredDot6x6_3 => "clustered-dot-6x6-3",
            MatrixKind::ClusteredDotDiagonal8x8_3 => "clustered-dot-diagonal-8x8-3",
        })
    }

    /// Builds the threshold matrix for this kind.
    ///
    /// # Errors
    /// Returns an error for invalid Bayer dimensions (see [`ThresholdMatrix::bayer`]).
    pub fn threshold_matrix(self) -> Result<ThresholdMatrix, QuantizeError> {
        Ok(match self {
            MatrixKind::Bayer { width, height } => return ThresholdMatrix::bayer(width, height),
            MatrixKind::ClusteredDot4x4 => ThresholdMatrix::from_table(&CLUSTERED_DOT_4X4),
            MatrixKind::ClusteredDotDiagonal8x8 => {
                ThresholdMatrix::from_table(&CLUSTERED_DOT_DIAGONAL_8X8)
            }
            MatrixKind::Vertical5x3 => ThresholdMatrix::from_table(&VERTICAL_5X3),
            MatrixKind::Horizontal3x5 => ThresholdMatrix::from_table(&HORIZONTAL_3X5),
            MatrixKind::ClusteredDotDiagonal6x6 => {
                ThresholdMatrix::from_table(&DIAGONAL_6X6_DOT).diagonal()
            }
            MatrixKind::ClusteredDotDiagonal8x8_2 => {
                ThresholdMatrix::from_table(&DIAGONAL_8X8_DOT).diagonal()
            }
            MatrixKind::ClusteredDotDiagonal16x16 => ThresholdMatrix::round_dot(8, false).diagonal(),
            MatrixKind::ClusteredDot6x6 => ThresholdMatrix::from_table(&CLUSTERED_DOT_6X6),
            MatrixKind::ClusteredDotSpiral5x5 => ThresholdMatrix::from_table(&CLUSTERED_DOT_SPIRAL_5X5),
            MatrixKind::ClusteredDotHorizontalLine => {
                ThresholdMatrix::from_table(&CLUSTERED_DOT_HORIZONTAL_LINE)
            }
            MatrixKind::ClusteredDotVerticalLine => {
                ThresholdMatrix::from_table(&CLUSTERED_DOT_VERTICAL_LINE)
            }
            MatrixKind::ClusteredDot8x8 => ThresholdMatrix::round_dot(8, false),
            MatrixKind::ClusteredDot6x6_2 => ThresholdMatrix::round_dot(6, false),
            MatrixKind::ClusteredDot6x6_3 => ThresholdMatrix::round_dot(6, true),
            MatrixKind::ClusteredDotDiagonal8x8_3 => {
                ThresholdMatrix::from_table(&CLUSTERED_DOT_4X4).diagonal()
            }
        })
    }

    /// Builds the bias matrix for this kind at the given strength.
    ///
    /// # Errors
    /// Returns an error for invalid Bayer dimensions or a strength outside `0.0..=1.0`.
    pub fn bias(self, strength: f32) -> Result<BiasMatrix, QuantizeError> {
        self.threshold_matrix()?.to_bias(strength)
    }
}

impl Default for MatrixKind {
    fn default() -> Self {
        MatrixKind::Bayer { width: 8, height: 8 }
    }
}

impl fmt::Display for MatrixKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixKind::Bayer { width, height } => write!(f, "bayer{width}x{height}"),
            kind => f.write_str(kind.name().unwrap_or_default()),
        }
    }
}

/// Lowercases a matrix name and drops `-` and `_`.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '_'))
        .collect::<String>()
        .to_ascii_lowercase()
}

impl FromStr for MatrixKind {
    type Err = ParseMatrixKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = normalize(s);

        let named = MatrixKind::NAMED
            .into_iter()
            .find(|kind| kind.name().is_some_and(|n| normalize(n) == name));
        if let Some(kind) = named {
            return Ok(kind);
        }

        name.strip_prefix("bayer")
            .and_then(|dims| dims.split_once('x'))
            .and_then(|(w, h)| Some((w.parse().ok()?, h.parse().ok()?)))
            .map(|(width, height)| MatrixKind::Bayer { width, height })
            .ok_or_else(|| ParseMatrixKindError(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rows(matrix: &ThresholdMatrix) -> Vec<Vec<u32>> {
        matrix.rows().map(<[u32]>::to_vec).collect()
    }

    fn assert_permutation(matrix: &ThresholdMatrix) {
        let mut ranks = matrix.rows().flatten().copied().collect::<Vec<_>>();
        ranks.sort_unstable();
        assert!(ranks.into_iter().eq(0..matrix.width() * matrix.height()));
    }

    #[test]
    fn bayer_2x2() {
        assert_eq!(rows(&ThresholdMatrix::bayer(2, 2).unwrap()), [[0, 2], [3, 1]]);
    }

    #[test]
    fn bayer_4x4() {
        assert_eq!(
            rows(&ThresholdMatrix::bayer(4, 4).unwrap()),
            [[0, 8, 2, 10], [12, 4, 14, 6], [3, 11, 1, 9], [15, 7, 13, 5]]
        );
    }

    #[test]
    fn bayer_8x8() {
        assert_eq!(
            rows(&ThresholdMatrix::bayer(8, 8).unwrap()),
            [
                [0, 32, 8, 40, 2, 34, 10, 42],
                [48, 16, 56, 24, 50, 18, 58, 26],
                [12, 44, 4, 36, 14, 46, 6, 38],
                [60, 28, 52, 20, 62, 30, 54, 22],
                [3, 35, 11, 43, 1, 33, 9, 41],
                [51, 19, 59, 27, 49, 17, 57, 25],
                [15, 47, 7, 39, 13, 45, 5, 37],
                [63, 31, 55, 23, 61, 29, 53, 21],
            ]
        );
    }

    #[test]
    fn bayer_rectangular() {
        assert_eq!(rows(&ThresholdMatrix::bayer(4, 2).unwrap()), [[0, 4, 2, 6], [3, 7, 1, 5]]);
        assert_eq!(rows(&ThresholdMatrix::bayer(2, 4).unwrap()), [[0, 3], [4, 7], [2, 1], [6, 5]]);
        assert_eq!(rows(&ThresholdMatrix::bayer(1, 4).unwrap()), [[0], [2], [1], [3]]);
        assert_eq!(rows(&ThresholdMatrix::bayer(1, 1).unwrap()), [[0]]);
    }

    #[test]
    fn power_of_two_shapes_are_permutations() {
        for w in 0..=5 {
            for h in 0..=5 {
                let matrix = ThresholdMatrix::bayer(1 << w, 1 << h).unwrap();
                assert_eq!((matrix.width(), matrix.height()), (1 << w, 1 << h));
                assert_permutation(&matrix);
            }
        }
        assert_permutation(&ThresholdMatrix::bayer(256, 256).unwrap());
    }

    #[test]
    fn special_cases() {
        assert_eq!(rows(&ThresholdMatrix::bayer(3, 3).unwrap()), [[0, 5, 2], [3, 8, 7], [6, 1, 4]]);
        assert_eq!(
            rows(&ThresholdMatrix::bayer(5, 3).unwrap()),
            [[0, 12, 7, 3, 9], [14, 8, 1, 5, 11], [6, 4, 10, 13, 2]]
        );
        assert_eq!(
            rows(&ThresholdMatrix::bayer(3, 5).unwrap()),
            [[0, 14, 6], [12, 8, 4], [7, 1, 10], [3, 5, 13], [9, 11, 2]]
        );
        for (w, h) in [(3, 3), (5, 3), (3, 5)] {
            let matrix = ThresholdMatrix::bayer(w, h).unwrap();
            assert_eq!((matrix.width(), matrix.height(), matrix.levels()), (w, h, w * h));
            assert_permutation(&matrix);
        }
    }

    #[test]
    fn invalid_dimensions() {
        assert_eq!(
            ThresholdMatrix::bayer(0, 4),
            Err(QuantizeError::ZeroMatrixDimension { width: 0, height: 4 })
        );
        assert_eq!(
            ThresholdMatrix::bayer(6, 4),
            Err(QuantizeError::NonPowerOfTwoMatrix { width: 6, height: 4 })
        );
        assert_eq!(
            ThresholdMatrix::bayer(3, 4),
            Err(QuantizeError::NonPowerOfTwoMatrix { width: 3, height: 4 })
        );
        assert_eq!(
            ThresholdMatrix::bayer(512, 256),
            Err(QuantizeError::MatrixTooLarge { width: 512, height: 256, max: MAX_MATRIX_CELLS })
        );
    }

    #[test]
    fn custom_rows() {
        let matrix = ThresholdMatrix::from_rows(&[[1, 0, 2], [5, 4, 3]]).unwrap();
        assert_eq!((matrix.width(), matrix.height()), (3, 2));
        assert_eq!(matrix.get(0, 1), 5);

        let err = |w, h| Err(QuantizeError::NotAPermutation { width: w, height: h });
        assert_eq!(ThresholdMatrix::from_rows(&[[0, 0]]), err(2, 1));
        assert_eq!(ThresholdMatrix::from_rows(&[[0, 2]]), err(2, 1));
        assert_eq!(ThresholdMatrix::from_rows(&[vec![0, 1], vec![2]]), err(2, 2));
        assert_eq!(ThresholdMatrix::from_rows::<[u32; 0]>(&[]), err(0, 0));
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn bias_offsets() {
        let bias = ThresholdMatrix::bayer(2, 2).unwrap().to_bias(1.0).unwrap();
        assert!((bias.at(0, 0) - -16383.75).abs() < 0.01);
        assert!(bias.at(1, 1).abs() < 0.01);
        assert!(bias.at(1, 1) < 0.0);
        assert!((bias.at(0, 1) - 32767.5).abs() < 0.01);

        // tiles over the image
        assert_eq!(bias.at(2, 3), bias.at(0, 1));
        assert_eq!(bias.apply(4, 4, [0, 32768, 65535]), [0, 16384, 49151]);

        let zero = ThresholdMatrix::bayer(4, 4).unwrap().to_bias(0.0).unwrap();
        assert_eq!(zero.apply(1, 2, [0, 12345, 65535]), [0, 12345, 65535]);
    }

    #[test]
    fn black_and_white_survive_full_strength() {
        let bias = ThresholdMatrix::bayer(8, 8).unwrap().to_bias(1.0).unwrap();
        for y in 0..8 {
            for x in 0..8 {
                let [black, ..] = bias.apply(x, y, [0; 3]);
                let [white, ..] = bias.apply(x, y, [u16::MAX; 3]);
                assert!(black < 32768 && white >= 32768);
            }
        }
        // the middle rank keeps black black
        assert_eq!(bias.apply(1, 7, [0; 3]), [0; 3]);
        assert!(bias.at(1, 7) < 0.0);
    }

    #[test]
    fn invalid_strength() {
        let matrix = ThresholdMatrix::bayer(2, 2).unwrap();
        assert_eq!(matrix.to_bias(1.5), Err(QuantizeError::InvalidStrength(1.5)));
        assert_eq!(matrix.to_bias(-0.1), Err(QuantizeError::InvalidStrength(-0.1)));
        assert!(matches!(matrix.to_bias(f32::NAN), Err(QuantizeError::InvalidStrength(_))));
    }

    #[test]
    fn round_clamp_ties_to_even() {
        assert_eq!(round_clamp(-3.0), 0);
        assert_eq!(round_clamp(70000.0), u16::MAX);
        assert_eq!(round_clamp(2.5), 2);
        assert_eq!(round_clamp(3.5), 4);
        assert_eq!(round_clamp(65534.6), 65535);
    }

    #[test]
    fn matrix_kind_names() {
        assert_eq!("bayer8x8".parse(), Ok(MatrixKind::Bayer { width: 8, height: 8 }));
        assert_eq!("Bayer_3x5".parse(), Ok(MatrixKind::Bayer { width: 3, height: 5 }));
        assert_eq!("clustered-dot-4x4".parse(), Ok(MatrixKind::ClusteredDot4x4));
        assert_eq!("ClusteredDot4x4".parse(), Ok(MatrixKind::ClusteredDot4x4));
        assert_eq!("clustereddotdiagonal8x8_2".parse(), Ok(MatrixKind::ClusteredDotDiagonal8x8_2));
        assert_eq!("clustereddotdiagonal8x8".parse(), Ok(MatrixKind::ClusteredDotDiagonal8x8));
        assert_eq!("horizontal3x5".parse(), Ok(MatrixKind::Horizontal3x5));
        assert_eq!(
            "bayer8".parse::<MatrixKind>(),
            Err(ParseMatrixKindError("bayer8".to_owned()))
        );

        assert_eq!(MatrixKind::default().to_string(), "bayer8x8");
        assert_eq!(MatrixKind::default().name(), None);
        for kind in MatrixKind::NAMED.into_iter().chain([MatrixKind::default()]) {
            assert_eq!(kind.to_string().parse(), Ok(kind));
        }

        let mut names = MatrixKind::NAMED.map(|kind| normalize(kind.name().unwrap())).to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), MatrixKind::NAMED.len());
    }

    #[test]
    fn named_matrices_use_every_level_equally() {
        for kind in MatrixKind::NAMED {
            let matrix = kind.threshold_matrix().unwrap();
            let cells = matrix.width() * matrix.height();
            let levels = matrix.levels();
            assert_eq!(cells % levels, 0, "{kind}");

            let mut counts = vec![0; levels as usize];
            for &rank in matrix.rows().flatten() {
                counts[rank as usize] += 1;
            }
            assert!(counts.iter().all(|&c| c == cells / levels), "{kind}");

            if levels == cells {
                assert_permutation(&matrix);
            }
        }
    }

    #[test]
    fn named_matrices_keep_black_and_white() {
        for kind in MatrixKind::NAMED {
            let bias = kind.bias(1.0).unwrap();
            for y in 0..bias.height() {
                for x in 0..bias.width() {
                    let [black, ..] = bias.apply(x, y, [0; 3]);
                    let [white, ..] = bias.apply(x, y, [u16::MAX; 3]);
                    assert!(black < 32768 && white >= 32768, "{kind} at ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn named_matrix_shapes() {
        let shape = |kind: MatrixKind| {
            let matrix = kind.threshold_matrix().unwrap();
            (matrix.width(), matrix.height(), matrix.levels())
        };
        assert_eq!(shape(MatrixKind::ClusteredDot4x4), (4, 4, 16));
        assert_eq!(shape(MatrixKind::ClusteredDotDiagonal8x8), (8, 8, 64));
        assert_eq!(shape(MatrixKind::Vertical5x3), (5, 3, 15));
        assert_eq!(shape(MatrixKind::Horizontal3x5), (3, 5, 15));
        assert_eq!(shape(MatrixKind::ClusteredDotDiagonal6x6), (6, 6, 18));
        assert_eq!(shape(MatrixKind::ClusteredDotDiagonal8x8_2), (8, 8, 32));
        assert_eq!(shape(MatrixKind::ClusteredDotDiagonal16x16), (16, 16, 128));
        assert_eq!(shape(MatrixKind::ClusteredDot6x6), (6, 6, 36));
        assert_eq!(shape(MatrixKind::ClusteredDotSpiral5x5), (5, 5, 25));
        assert_eq!(shape(MatrixKind::ClusteredDotHorizontalLine), (6, 6, 36));
        assert_eq!(shape(MatrixKind::ClusteredDotVerticalLine), (6, 6, 36));
        assert_eq!(shape(MatrixKind::ClusteredDot8x8), (8, 8, 64));
        assert_eq!(shape(MatrixKind::ClusteredDot6x6_2), (6, 6, 36));
        assert_eq!(shape(MatrixKind::ClusteredDot6x6_3), (6, 6, 36));
        assert_eq!(shape(MatrixKind::ClusteredDotDiagonal8x8_3), (8, 8, 32));
    }

    #[test]
    fn diagonal_screens() {
        assert_eq!(
            rows(&MatrixKind::ClusteredDotDiagonal6x6.threshold_matrix().unwrap()),
            [
                [8, 6, 7, 9, 11, 10],
                [5, 0, 1, 12, 17, 16],
                [4, 3, 2, 13, 14, 15],
                [9, 11, 10, 8, 6, 7],
                [12, 17, 16, 5, 0, 1],
                [13, 14, 15, 4, 3, 2],
            ]
        );
        assert_eq!(
            rows(&MatrixKind::ClusteredDotDiagonal8x8_2.threshold_matrix().unwrap()),
            [
                [13, 9, 5, 12, 18, 22, 26, 19],
                [6, 1, 0, 8, 25, 30, 31, 23],
                [10, 2, 3, 4, 21, 29, 28, 27],
                [14, 7, 11, 15, 17, 24, 20, 16],
                [18, 22, 26, 19, 13, 9, 5, 12],
                [25, 30, 31, 23, 6, 1, 0, 8],
                [21, 29, 28, 27, 10, 2, 3, 4],
                [17, 24, 20, 16, 14, 7, 11, 15],
            ]
        );

        // the 2x2 diagonal of a single cell holds both ranks of each level
        let bias = MatrixKind::ClusteredDotDiagonal6x6.bias(1.0).unwrap();
        assert_eq!(bias.at(1, 1), bias.at(4, 4));
    }

    #[test]
    fn round_dots() {
        assert_eq!(
            rows(&MatrixKind::ClusteredDot6x6_2.threshold_matrix().unwrap()),
            [
                [32, 24, 16, 17, 25, 33],
                [26, 12, 4, 5, 13, 27],
                [18, 6, 0, 1, 7, 19],
                [20, 8, 2, 3, 9, 21],
                [28, 14, 10, 11, 15, 29],
                [34, 30, 22, 23, 31, 35],
            ]
        );
        assert_eq!(
            rows(&MatrixKind::ClusteredDot6x6_3.threshold_matrix().unwrap()),
            [
                [35, 31, 27, 25, 28, 32],
                [33, 21, 13, 9, 14, 22],
                [29, 15, 5, 1, 6, 16],
                [26, 10, 2, 0, 3, 11],
                [30, 17, 7, 4, 8, 18],
                [34, 23, 19, 12, 20, 24],
            ]
        );
        let matrix = MatrixKind::ClusteredDot8x8.threshold_matrix().unwrap();
        assert_eq!([matrix.get(3, 3), matrix.get(4, 3), matrix.get(3, 4), matrix.get(4, 4)], [0, 1, 2, 3]);
        assert_eq!(matrix.get(7, 7), 63);
    }
}
