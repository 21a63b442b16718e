//! # dlx
//!
//! `dlx` is a command-line exact cover solver built on Knuth's dancing links
//! (Algorithm X over a toroidal doubly-linked sparse matrix). It reads
//! matrices from files or plain text and also encodes Sudoku and N-queens
//! into exact cover problems.
//!
//! ## Features
//!
//! -   **Multiple Input Formats**:
//!     -   Matrix files (`.dlx`, `.txt`)
//!     -   Plain text matrices
//!     -   Sudoku puzzle files (`.sudoku`)
//!     -   N-queens boards of any size
//! -   **Secondary columns**: columns that may be covered at most once.
//! -   **Debugging**: `--debug` raises the log level to show search progress.
//! -   **Verification**: every reported solution is checked against the matrix.
//! -   **Statistics**: parse time, solve time, search nodes, dead ends,
//!     maximum depth and memory usage.
//! -   **Solution Printing**: print each solution as it is found.
//! -   **Matrix Export**: for Sudoku puzzles, the generated matrix can be
//!     written out in the text format.
//! -   **Memory Management**: uses `tikv-jemallocator` for memory allocation and
//!     reports its statistics.
//!
//! ## Usage
//!
//! ```sh
//! dlx [GLOBAL_OPTIONS] [SUBCOMMAND]
//! ```
//!
//! A bare path is solved as a matrix file, or walked recursively if it is
//! a directory. `-` reads a matrix from standard input:
//!
//! ```sh
//! dlx problem.dlx
//! dlx puzzles/
//! dlx -p - < problem.dlx
//! ```
//!
//! Common options may be given before or after the subcommand.
//!
//! ### Subcommands
//!
//! 1.  **`file`**: `dlx file --path <matrix_file> [OPTIONS]`
//! 2.  **`text`**: `dlx text --input "4 4\n2 1 2\n2 3 4\n2 1 3\n2 2 4" [OPTIONS]`
//! 3.  **`sudoku`**: `dlx sudoku --path <puzzle_file> [--export] [OPTIONS]`
//! 4.  **`queens`**: `dlx queens --n 8 [OPTIONS]`
//! 5.  **`completions`**: `dlx completions bash`
//!
//! ### Common Options
//!
//! -   `-d, --debug`: Enable debug logging (default: `false`).
//! -   `-v, --verify`: Verify each solution (default: `true`).
//! -   `-s, --stats`: Print statistics (default: `true`).
//! -   `-p, --print-solution`: Print every solution as it is found (default: `false`).
//! -   `-l, --limit <N>`: Stop after `N` solutions.
//!
//! Log output goes to stderr and can also be tuned with `RUST_LOG`.

use crate::command_line::cli::{
    Cli, Commands, CommonOptions, solve_dir, solve_file, solve_queens, solve_reader, solve_sudoku,
    solve_text,
};
use clap::{CommandFactory, Parser};
use std::path::Path;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod command_line;

/// Global allocator using `tikv-jemallocator` for performance and memory
/// usage tracking.
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// Main entry point of the `dlx` application.
fn main() {
    let cli = Cli::parse();
    let top = cli.common;

    let command = cli.command.map(|command| match command {
        Commands::File { path, common } => Commands::File {
            path,
            common: common.merged(&top),
        },
        Commands::Text { input, common } => Commands::Text {
            input,
            common: common.merged(&top),
        },
        Commands::Sudoku {
            path,
            export,
            common,
        } => Commands::Sudoku {
            path,
            export,
            common: common.merged(&top),
        },
        Commands::Queens { n, common } => Commands::Queens {
            n,
            common: common.merged(&top),
        },
        Commands::Completions { shell } => Commands::Completions { shell },
    });

    let debug = match &command {
        Some(
            Commands::File { common, .. }
            | Commands::Text { common, .. }
            | Commands::Sudoku { common, .. }
            | Commands::Queens { common, .. },
        ) => common.debug,
        Some(Commands::Completions { .. }) => false,
        None => top.debug,
    };
    init_tracing(debug);

    let result = match command {
        Some(Commands::File { path, common }) => solve_file(&path, &common),
        Some(Commands::Text { input, common }) => solve_text(&input, &common),
        Some(Commands::Sudoku {
            path,
            export,
            common,
        }) => solve_sudoku(&path, export, &common),
        Some(Commands::Queens { n, common }) => solve_queens(n, &common),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
        None => match cli.path {
            Some(path) => solve_path(&path, &top),
            None => Err("No command provided. Use --help for more information.".to_string()),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Solves a bare path: `-` is standard input, a directory is walked,
/// anything else is a matrix file.
fn solve_path(path: &Path, common: &CommonOptions) -> Result<(), String> {
    if path == Path::new("-") {
        solve_reader(std::io::stdin().lock(), common).map(|_| ())
    } else if path.is_dir() {
        solve_dir(path, common)
    } else if path.extension().is_some_and(|ext| ext == "sudoku") {
        solve_sudoku(path, false, common)
    } else {
        solve_file(path, common)
    }
}

/// Logs to stderr at `info`, or `debug` with `--debug`, unless `RUST_LOG`
/// says otherwise.
fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
