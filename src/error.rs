//! Error types shared by the matrix builder, the text format and the puzzle encoders.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DlxError>;

/// Errors raised while building or loading an exact cover problem.
///
/// The search itself never fails; every variant here is detected before the
/// matrix is handed to [`crate::dlx::Matrix::search`].
#[derive(Debug, Error)]
pub enum DlxError {
    /// `declare_columns` was called on a matrix that already has columns.
    #[error("columns have already been declared")]
    ColumnsAlreadyDeclared,

    /// The requested column count does not fit in `usize`.
    #[error("{primary} primary and {secondary} secondary columns overflow the column count")]
    TooManyColumns {
        /// Requested primary columns.
        primary: usize,
        /// Requested secondary columns.
        secondary: usize,
    },

    /// A row was appended before any columns were declared.
    #[error("columns must be declared before rows are appended")]
    ColumnsNotDeclared,

    /// A row referenced a column outside `1..=columns`.
    #[error("column {column} is out of range (matrix has {columns} columns)")]
    ColumnOutOfRange {
        /// The offending column index.
        column: usize,
        /// Number of declared columns.
        columns: usize,
    },

    /// A row named the same column twice.
    #[error("column {column} appears more than once in the same row")]
    DuplicateColumn {
        /// The repeated column index.
        column: usize,
    },

    /// Malformed text input.
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number of the offending token.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// The input ended before all announced rows were read.
    #[error("expected {expected} rows but input ended after {found}")]
    MissingRows {
        /// Row count announced by the header line.
        expected: usize,
        /// Rows actually read.
        found: usize,
    },

    /// A puzzle description could not be turned into a matrix.
    #[error("invalid puzzle: {0}")]
    InvalidPuzzle(String),

    /// The linked structure failed a consistency check.
    #[error("matrix is inconsistent: {0}")]
    Corrupted(String),

    /// Reading input failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
