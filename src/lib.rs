#![deny(missing_docs)]
//! This crate provides an exact cover solver based on dancing links, along
//! with Sudoku and N-queens encoders built on top of it.

/// The `dlx` module implements the toroidal matrix, the cover/uncover engine and Algorithm X.
pub mod dlx;

/// The `error` module defines the error type shared by the whole crate.
pub mod error;

/// The `queens` module encodes the N-queens problem as an exact cover with secondary columns.
pub mod queens;

/// The `sudoku` module encodes Sudoku puzzles of size 4, 9, 16 and 25 as exact cover problems.
pub mod sudoku;
