//! Argument parsing and the solve-and-report drivers behind the `dlx` binary.

pub(crate) mod cli;
