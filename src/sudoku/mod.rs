#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Sudoku as an exact cover problem.
//!
//! Every cell, every (row, number), (column, number) and (block, number)
//! pair is a primary column. Placing number `k` in a cell is a row touching
//! four of them, so an exact cover is exactly a filled grid.

/// Boards, the exact cover encoding, and the puzzle file reader.
pub mod solver;
