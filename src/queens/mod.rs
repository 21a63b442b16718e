#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The N-queens problem as an exact cover with secondary columns.
//!
//! Ranks and files are primary: each holds exactly one queen. Diagonals are
//! secondary: each holds at most one.

/// The encoder and placement decoding.
pub mod solver;
