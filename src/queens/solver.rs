#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

use crate::dlx::{Matrix, RowId};
use crate::error::{DlxError, Result};
use itertools::Itertools;
use std::fmt::{self, Display};
use tracing::debug;

/// A column of the N-queens matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueensConstraint {
    /// Exactly one queen on this rank.
    Rank(usize),
    /// Exactly one queen on this file.
    File(usize),
    /// At most one queen on the diagonal where `rank + file` is constant.
    Diagonal(usize),
    /// At most one queen on the diagonal where `rank - file` is constant,
    /// shifted by `n - 1`.
    AntiDiagonal(usize),
}

impl Display for QueensConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rank(rank) => write!(f, "R{rank}"),
            Self::File(file) => write!(f, "F{file}"),
            Self::Diagonal(d) => write!(f, "A{d}"),
            Self::AntiDiagonal(d) => write!(f, "B{d}"),
        }
    }
}

/// A square of the board, 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square {
    /// Row of the board.
    pub rank: usize,
    /// Column of the board.
    pub file: usize,
}

/// An `n` by `n` board to place `n` queens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Queens {
    n: usize,
}

impl Queens {
    /// Creates the problem for an `n` by `n` board.
    ///
    /// # Errors
    ///
    /// [`DlxError::InvalidPuzzle`] if `n` is zero.
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(DlxError::InvalidPuzzle(
                "board must be at least 1x1".to_string(),
            ));
        }
        Ok(Self { n })
    }

    /// Side length of the board.
    #[must_use]
    pub const fn n(&self) -> usize {
        self.n
    }

    /// Column ids covered by a queen on `square`: rank, file, diagonal,
    /// anti-diagonal.
    const fn columns(&self, square: Square) -> [usize; 4] {
        let n = self.n;
        let Square { rank, file } = square;
        [
            1 + rank,
            1 + n + file,
            1 + 2 * n + rank + file,
            1 + 2 * n + (2 * n - 1) + (rank + n - 1 - file),
        ]
    }

    /// Encodes the board as an exact cover matrix with `2n` primary and
    /// `4n - 2` secondary columns, one row per square.
    ///
    /// Returns the matrix and the square each row id stands for.
    #[must_use]
    pub fn to_matrix(&self) -> (Matrix<QueensConstraint>, Vec<Square>) {
        let n = self.n;
        let primary = (0..n)
            .map(QueensConstraint::Rank)
            .chain((0..n).map(QueensConstraint::File));
        let secondary = (0..2 * n - 1)
            .map(QueensConstraint::Diagonal)
            .chain((0..2 * n - 1).map(QueensConstraint::AntiDiagonal));

        let mut matrix = Matrix::from_labels(primary, secondary);

        let squares = (0..n)
            .cartesian_product(0..n)
            .map(|(rank, file)| Square { rank, file })
            .collect_vec();
        for &square in &squares {
            matrix.push_row(&self.columns(square));
        }

        debug!(
            n,
            columns = matrix.column_count(),
            rows = squares.len(),
            "encoded queens"
        );
        (matrix, squares)
    }

    /// Turns the chosen rows of a solution into a placement.
    #[must_use]
    pub fn decode(&self, squares: &[Square], rows: &[RowId]) -> Placement {
        let queens = rows
            .iter()
            .filter_map(|&row| squares.get(row).copied())
            .sorted()
            .collect();
        Placement { n: self.n, queens }
    }
}

/// Queens placed on a board, sorted by rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    n: usize,
    /// The occupied squares.
    pub queens: Vec<Square>,
}

impl Placement {
    /// Whether there are `n` queens and no two share a rank, file or
    /// diagonal.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.queens.len() == self.n
            && self.queens.iter().tuple_combinations().all(|(a, b)| {
                a.rank != b.rank
                    && a.file != b.file
                    && a.rank.abs_diff(b.rank) != a.file.abs_diff(b.file)
            })
    }
}

impl Display for Placement {
    /// Draws the board, `Q` for a queen and `.` for an empty square.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in 0..self.n {
            let line = (0..self.n)
                .map(|file| {
                    if self.queens.contains(&Square { rank, file }) {
                        'Q'
                    } else {
                        '.'
                    }
                })
                .join(" ");
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
