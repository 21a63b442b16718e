#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

use crate::dlx::{Matrix, RowId};
use crate::error::{DlxError, Result};
use bit_vec::BitVec;
use itertools::Itertools;
use std::fmt::{self, Display};
use std::path::Path;
use tracing::debug;

/// A square grid of numbers, `0` marking an empty cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board(Vec<Vec<usize>>);

impl Board {
    /// Wraps a grid without checking its shape.
    #[must_use]
    pub const fn new(board: Vec<Vec<usize>>) -> Self {
        Self(board)
    }

    /// The grid's rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<usize>] {
        &self.0
    }
}

impl From<Vec<Vec<usize>>> for Board {
    fn from(board: Vec<Vec<usize>>) -> Self {
        Self::new(board)
    }
}

impl<const N: usize> From<[[usize; N]; N]> for Board {
    fn from(board: [[usize; N]; N]) -> Self {
        Self::new(board.iter().map(|row| row.to_vec()).collect())
    }
}

impl From<Board> for Vec<Vec<usize>> {
    fn from(board: Board) -> Self {
        board.0
    }
}

/// A 4x4 puzzle with a unique solution.
pub const EXAMPLE_FOUR: [[usize; 4]; 4] = [[1, 0, 0, 4], [0, 4, 1, 0], [2, 0, 0, 3], [0, 3, 2, 0]];

/// A 9x9 puzzle with a unique solution.
pub const EXAMPLE_NINE: [[usize; 9]; 9] = [
    [5, 3, 0, 0, 7, 0, 0, 0, 0],
    [6, 0, 0, 1, 9, 5, 0, 0, 0],
    [0, 9, 8, 0, 0, 0, 0, 6, 0],
    [8, 0, 0, 0, 6, 0, 0, 0, 3],
    [4, 0, 0, 8, 0, 3, 0, 0, 1],
    [7, 0, 0, 0, 2, 0, 0, 0, 6],
    [0, 6, 0, 0, 0, 0, 2, 8, 0],
    [0, 0, 0, 4, 1, 9, 0, 0, 5],
    [0, 0, 0, 0, 8, 0, 0, 7, 9],
];

/// A 16x16 puzzle.
pub const EXAMPLE_SIXTEEN: [[usize; 16]; 16] = [
    [0, 11, 0, 0, 0, 2, 3, 14, 0, 0, 9, 12, 0, 0, 0, 16],
    [15, 12, 0, 0, 0, 11, 0, 1, 13, 10, 0, 0, 0, 0, 7, 2],
    [0, 0, 10, 0, 0, 0, 0, 0, 16, 11, 0, 1, 6, 4, 12, 3],
    [0, 16, 14, 1, 0, 4, 0, 6, 0, 3, 0, 15, 0, 8, 0, 0],
    [1, 6, 5, 12, 0, 0, 11, 0, 0, 9, 8, 0, 0, 0, 0, 0],
    [0, 0, 0, 7, 14, 1, 8, 0, 0, 15, 6, 0, 13, 5, 0, 4],
    [4, 15, 8, 0, 9, 13, 0, 0, 0, 0, 7, 16, 3, 0, 0, 0],
    [0, 9, 13, 0, 0, 0, 0, 15, 10, 0, 0, 0, 7, 6, 0, 11],
    [14, 0, 6, 11, 0, 0, 0, 12, 7, 0, 0, 0, 0, 3, 13, 0],
    [0, 0, 0, 5, 8, 14, 0, 0, 0, 0, 13, 11, 0, 1, 2, 6],
    [13, 0, 16, 4, 0, 15, 5, 0, 0, 1, 12, 6, 8, 0, 0, 0],
    [0, 0, 0, 0, 0, 16, 10, 0, 0, 8, 0, 0, 11, 9, 4, 5],
    [0, 0, 11, 0, 1, 0, 14, 0, 5, 0, 3, 0, 15, 7, 16, 0],
    [5, 13, 15, 3, 16, 0, 4, 7, 0, 0, 0, 0, 0, 2, 0, 0],
    [16, 1, 0, 0, 0, 0, 12, 2, 14, 0, 15, 0, 0, 0, 3, 8],
    [9, 0, 0, 0, 13, 5, 0, 0, 8, 6, 16, 0, 0, 0, 10, 0],
];

/// Supported board sizes.
#[derive(Debug, Clone, PartialEq, Eq, Copy, PartialOrd, Ord, Hash)]
pub enum Size {
    /// 4x4, 2x2 blocks.
    Four = 4,
    /// 9x9, 3x3 blocks.
    Nine = 9,
    /// 16x16, 4x4 blocks.
    Sixteen = 16,
    /// 25x25, 5x5 blocks.
    TwentyFive = 25,
}

impl TryFrom<usize> for Size {
    type Error = DlxError;

    fn try_from(value: usize) -> Result<Self> {
        match value {
            4 => Ok(Self::Four),
            9 => Ok(Self::Nine),
            16 => Ok(Self::Sixteen),
            25 => Ok(Self::TwentyFive),
            _ => Err(DlxError::InvalidPuzzle(format!(
                "unsupported board size {value}, expected 4, 9, 16 or 25"
            ))),
        }
    }
}

impl From<Size> for usize {
    fn from(size: Size) -> Self {
        size as Self
    }
}

impl Size {
    /// Side length of a block.
    #[must_use]
    pub const fn block_size(self) -> usize {
        match self {
            Self::Four => 2,
            Self::Nine => 3,
            Self::Sixteen => 4,
            Self::TwentyFive => 5,
        }
    }
}

/// One primary column of the Sudoku matrix. Rows, columns and blocks are
/// 0-based; numbers run from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constraint {
    /// The cell holds some number.
    Cell {
        /// Grid row.
        row: usize,
        /// Grid column.
        col: usize,
    },
    /// The row holds `num` somewhere.
    Row {
        /// Grid row.
        row: usize,
        /// Number placed.
        num: usize,
    },
    /// The column holds `num` somewhere.
    Column {
        /// Grid column.
        col: usize,
        /// Number placed.
        num: usize,
    },
    /// The block holds `num` somewhere. Blocks are numbered row-major.
    Block {
        /// Block index.
        block: usize,
        /// Number placed.
        num: usize,
    },
}

impl Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Cell { row, col } => write!(f, "r{row}c{col}"),
            Self::Row { row, num } => write!(f, "r{row}#{num}"),
            Self::Column { col, num } => write!(f, "c{col}#{num}"),
            Self::Block { block, num } => write!(f, "b{block}#{num}"),
        }
    }
}

/// Placing `num` at (`row`, `col`). One matrix row per candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// Grid row, 0-based.
    pub row: usize,
    /// Grid column, 0-based.
    pub col: usize,
    /// Number, 1-based.
    pub num: usize,
}

impl Candidate {
    /// Creates a candidate.
    #[must_use]
    pub const fn new(row: usize, col: usize, num: usize) -> Self {
        Self { row, col, num }
    }

    /// The four primary column ids this candidate covers, in the order the
    /// columns are declared.
    #[must_use]
    pub const fn columns(&self, size: Size) -> [usize; 4] {
        let n = size as usize;
        let b = size.block_size();
        let block = (self.row / b) * b + self.col / b;
        let num = self.num - 1;
        [
            1 + self.row * n + self.col,
            1 + n * n + self.row * n + num,
            1 + 2 * n * n + self.col * n + num,
            1 + 3 * n * n + block * n + num,
        ]
    }
}

/// A puzzle: a validated board together with its size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sudoku {
    /// The grid.
    pub board: Board,
    /// Its size.
    pub size: Size,
}

impl Sudoku {
    /// Checks the board is square with a supported size and every value
    /// is at most the side length.
    ///
    /// # Errors
    ///
    /// [`DlxError::InvalidPuzzle`] otherwise.
    pub fn new(board: Board) -> Result<Self> {
        let size = Size::try_from(board.0.len())?;
        let n = usize::from(size);

        for (r, row) in board.0.iter().enumerate() {
            if row.len() != n {
                return Err(DlxError::InvalidPuzzle(format!(
                    "row {} has {} cells, expected {n}",
                    r + 1,
                    row.len()
                )));
            }
            if let Some(&value) = row.iter().find(|&&value| value > n) {
                return Err(DlxError::InvalidPuzzle(format!(
                    "value {value} in row {} is larger than {n}",
                    r + 1
                )));
            }
        }

        Ok(Self { board, size })
    }

    /// Encodes the puzzle as an exact cover matrix.
    ///
    /// Returns the matrix and, indexed by row id, the candidate each row
    /// stands for. A given cell contributes only its given number; an empty
    /// cell contributes every number not already given in its row, column
    /// or block.
    #[must_use]
    pub fn to_matrix(&self) -> (Matrix<Constraint>, Vec<Candidate>) {
        let n = usize::from(self.size);
        let b = self.size.block_size();

        let cells = (0..n)
            .cartesian_product(0..n)
            .map(|(row, col)| Constraint::Cell { row, col });
        let rows = (0..n)
            .cartesian_product(1..=n)
            .map(|(row, num)| Constraint::Row { row, num });
        let cols = (0..n)
            .cartesian_product(1..=n)
            .map(|(col, num)| Constraint::Column { col, num });
        let blocks = (0..n)
            .cartesian_product(1..=n)
            .map(|(block, num)| Constraint::Block { block, num });

        let mut matrix = Matrix::from_labels(cells.chain(rows).chain(cols).chain(blocks), []);

        let grid = &self.board.0;
        let given = |row: usize, col: usize, num: usize| {
            let (br, bc) = ((row / b) * b, (col / b) * b);
            (0..n).any(|i| grid[row][i] == num || grid[i][col] == num)
                || (br..br + b)
                    .cartesian_product(bc..bc + b)
                    .any(|(r, c)| grid[r][c] == num)
        };

        let mut candidates = Vec::new();
        for (row, col) in (0..n).cartesian_product(0..n) {
            let nums = match grid[row][col] {
                0 => (1..=n).filter(|&num| !given(row, col, num)).collect_vec(),
                num => vec![num],
            };
            for num in nums {
                let candidate = Candidate::new(row, col, num);
                matrix.push_row(&candidate.columns(self.size));
                candidates.push(candidate);
            }
        }

        debug!(
            size = n,
            columns = matrix.column_count(),
            rows = candidates.len(),
            "encoded sudoku"
        );
        (matrix, candidates)
    }

    /// Fills a copy of the board from the chosen rows of a solution.
    #[must_use]
    pub fn decode_solution(&self, candidates: &[Candidate], rows: &[RowId]) -> Self {
        let mut board = self.board.clone();
        for candidate in rows.iter().filter_map(|&row| candidates.get(row)) {
            board.0[candidate.row][candidate.col] = candidate.num;
        }
        Self {
            board,
            size: self.size,
        }
    }

    /// Solves the puzzle, returning the first completed grid found.
    #[must_use]
    pub fn solve(&self) -> Option<Self> {
        let (mut matrix, candidates) = self.to_matrix();
        let rows = matrix.first_solution()?;
        Some(self.decode_solution(&candidates, &rows))
    }

    /// Whether every cell is filled and no row, column or block repeats a
    /// number.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        let n = usize::from(self.size);
        let b = self.size.block_size();
        let grid = &self.board.0;

        (0..n).all(|i| {
            let (br, bc) = ((i / b) * b, (i % b) * b);
            distinct(n, (0..n).map(|j| grid[i][j]))
                && distinct(n, (0..n).map(|j| grid[j][i]))
                && distinct(
                    n,
                    (br..br + b)
                        .cartesian_product(bc..bc + b)
                        .map(|(r, c)| grid[r][c]),
                )
        })
    }

    /// Iterates over the board's rows.
    pub fn iter(&self) -> impl Iterator<Item = &[usize]> {
        self.board.0.iter().map(Vec::as_slice)
    }
}

impl TryFrom<Board> for Sudoku {
    type Error = DlxError;

    fn try_from(board: Board) -> Result<Self> {
        Self::new(board)
    }
}

impl From<Sudoku> for Board {
    fn from(sudoku: Sudoku) -> Self {
        sudoku.board
    }
}

impl Display for Sudoku {
    /// One board row per line, blanks as `.`, in the form read by
    /// [`parse_sudoku`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = usize::from(self.size).to_string().len();
        for row in self.iter() {
            let line = row
                .iter()
                .map(|&num| match num {
                    0 => format!("{:>width$}", "."),
                    num => format!("{num:>width$}"),
                })
                .join(" ");
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Parses a puzzle, one board row per line.
///
/// Cells are separated by whitespace; `0` or `.` marks a blank. A line made
/// of a single token of more than one character is read one cell per
/// character, so `53..7....` is a valid 9x9 row. Empty lines and lines
/// starting with `c` or `#` are skipped.
///
/// # Errors
///
/// [`DlxError::InvalidPuzzle`] for an unreadable cell or a board
/// [`Sudoku::new`] rejects.
pub fn parse_sudoku(text: &str) -> Result<Sudoku> {
    let mut board = Vec::new();

    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('c') || line.starts_with('#') {
            continue;
        }

        let tokens = line.split_whitespace().collect_vec();
        let row: Vec<usize> = if let [compact] = tokens.as_slice()
            && compact.len() > 1
        {
            compact
                .chars()
                .map(|c| match c {
                    '.' => Ok(0),
                    c => c
                        .to_digit(10)
                        .and_then(|d| usize::try_from(d).ok())
                        .ok_or_else(|| bad_cell(&c.to_string())),
                })
                .collect::<Result<_>>()?
        } else {
            tokens
                .iter()
                .map(|&token| match token {
                    "." => Ok(0),
                    token => token.parse::<usize>().map_err(|_| bad_cell(token)),
                })
                .collect::<Result<_>>()?
        };
        board.push(row);
    }

    Sudoku::new(Board::new(board))
}

/// Reads and parses a puzzle file.
///
/// # Errors
///
/// [`DlxError::Io`] if the file cannot be read, otherwise see
/// [`parse_sudoku`].
pub fn parse_sudoku_file(path: &Path) -> Result<Sudoku> {
    let text = std::fs::read_to_string(path)?;
    parse_sudoku(&text)
}

/// Whether `cells` holds each of `1..=n` at most once and no blanks.
fn distinct(n: usize, cells: impl Iterator<Item = usize>) -> bool {
    let mut seen = BitVec::from_elem(n + 1, false);
    for num in cells {
        if num == 0 || seen.get(num).unwrap_or(true) {
            return false;
        }
        seen.set(num, true);
    }
    true
}

fn bad_cell(token: &str) -> DlxError {
    DlxError::InvalidPuzzle(format!("invalid cell '{token}'"))
}
