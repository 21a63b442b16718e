#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Dancing links: Algorithm X over a toroidal sparse matrix.
//!
//! Build a [`Matrix`] by declaring its columns and appending rows, then
//! call [`Matrix::search`] with a [`SolutionSink`] to receive every exact
//! cover. Primary columns must be covered exactly once; secondary columns
//! at most once.
//!
//! ```
//! use dlx_solver::dlx::Matrix;
//!
//! let mut matrix = Matrix::with_columns(4, 0);
//! for row in [[1, 2], [3, 4], [1, 3], [2, 4]] {
//!     matrix.append_row(row).unwrap();
//! }
//! assert_eq!(matrix.count_solutions(), 2);
//! ```

/// The text format used by the command line and matrix export.
pub mod format;
/// The toroidal matrix and its row builder.
pub mod matrix;
/// Arena nodes and link surgery.
pub mod node;
/// The recursive search and its statistics.
pub mod search;
/// Sinks receiving solutions from the search.
pub mod solution;

mod cover;

pub use matrix::{Matrix, RowColumns};
pub use node::{ColumnId, RowId};
pub use search::SearchStats;
pub use solution::{Collect, Count, Limit, Solution, SolutionRow, SolutionSink};
