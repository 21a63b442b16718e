#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A plain-text format for exact cover problems.
//!
//! ```text
//! c Comment lines start with 'c' or '#'.
//! 4 4
//! 2 1 2
//! 2 3 4
//! 2 1 3
//! 2 2 4
//! ```
//!
//! The first non-comment line is the header `primary rows [secondary]`.
//! After it come `rows` row descriptions, each a count followed by that many
//! 1-based column ids. Row tokens are whitespace separated and may be split
//! across lines freely.

use crate::dlx::matrix::Matrix;
use crate::dlx::node::ColumnId;
use crate::error::{DlxError, Result};
use itertools::Itertools;
use smallvec::SmallVec;
use std::fmt::{self, Display};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::iter;
use std::path::Path;
use tracing::{debug, warn};

/// Parses a matrix from any buffered reader.
///
/// # Errors
///
/// [`DlxError::Parse`] for a malformed header or a token that is not a
/// non-negative integer, [`DlxError::MissingRows`] if the input ends before
/// every declared row is complete, [`DlxError::Io`] if reading fails, and
/// any error [`Matrix::append_row`] reports for an invalid row.
pub fn parse_matrix<R: BufRead>(reader: R) -> Result<Matrix> {
    let mut header = None;
    let mut tokens: Vec<(usize, usize)> = Vec::new();
    let mut lines_read = 0;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let number = index + 1;
        lines_read = number;

        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('c') || trimmed.starts_with('#') {
            continue;
        }

        let values: Vec<usize> = trimmed
            .split_whitespace()
            .map(|token| parse_number(number, token))
            .collect::<Result<_>>()?;

        if header.is_none() {
            header = Some(parse_header(number, &values)?);
        } else {
            tokens.extend(values.into_iter().map(|value| (number, value)));
        }
    }

    let Some((primary, rows, secondary)) = header else {
        return Err(DlxError::Parse {
            line: lines_read,
            message: "missing header line".to_string(),
        });
    };

    let mut matrix: Matrix = Matrix::new();
    matrix.declare_columns(primary, secondary)?;
    let mut tokens = tokens.into_iter();

    for found in 0..rows {
        let missing = DlxError::MissingRows {
            expected: rows,
            found,
        };
        let Some((_, count)) = tokens.next() else {
            return Err(missing);
        };
        let columns: SmallVec<[ColumnId; 8]> = tokens
            .by_ref()
            .take(count)
            .map(|(_, column)| column)
            .collect();
        if columns.len() < count {
            return Err(missing);
        }
        matrix.append_row(columns)?;
    }

    if let Some((line, _)) = tokens.next() {
        warn!(
            line,
            remaining = tokens.len() + 1,
            "ignoring tokens after the last row"
        );
    }

    debug!(
        primary,
        secondary,
        rows,
        nodes = matrix.node_count(),
        "parsed matrix"
    );
    Ok(matrix)
}

/// Parses a matrix from a string.
///
/// # Errors
///
/// See [`parse_matrix`].
pub fn parse_text(text: &str) -> Result<Matrix> {
    parse_matrix(text.as_bytes())
}

/// Opens and parses a matrix file.
///
/// # Errors
///
/// [`DlxError::Io`] if the file cannot be opened, otherwise see
/// [`parse_matrix`].
pub fn parse_file(path: &Path) -> Result<Matrix> {
    let file = File::open(path)?;
    parse_matrix(BufReader::new(file))
}

fn parse_number(line: usize, token: &str) -> Result<usize> {
    token.parse().map_err(|e| DlxError::Parse {
        line,
        message: format!("invalid number '{token}': {e}"),
    })
}

fn parse_header(line: usize, values: &[usize]) -> Result<(usize, usize, usize)> {
    let (primary, rows, secondary) = match *values {
        [primary, rows] => (primary, rows, 0),
        [primary, rows, secondary] => (primary, rows, secondary),
        _ => {
            return Err(DlxError::Parse {
                line,
                message: format!(
                    "expected header 'primary rows [secondary]', found {} values",
                    values.len()
                ),
            });
        }
    };
    if primary.checked_add(secondary).is_none() {
        return Err(DlxError::Parse {
            line,
            message: format!("column count {primary} + {secondary} overflows"),
        });
    }
    Ok((primary, rows, secondary))
}

impl<L> Display for Matrix<L> {
    /// Writes the matrix in the text format read by [`parse_matrix`],
    /// listing column ids rather than labels.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.primary_count(), self.row_count())?;
        if self.secondary_count() > 0 {
            write!(f, " {}", self.secondary_count())?;
        }
        writeln!(f)?;

        for row in self.rows() {
            let columns = row.collect_vec();
            writeln!(
                f,
                "{}",
                iter::once(columns.len()).chain(columns).join(" ")
            )?;
        }
        Ok(())
    }
}
