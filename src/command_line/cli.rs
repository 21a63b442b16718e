#![allow(clippy::cast_precision_loss)]

use clap::{Args, Parser, Subcommand};
use dlx_solver::dlx::format::{parse_file, parse_matrix, parse_text};
use dlx_solver::dlx::{Limit, Matrix, RowId, SearchStats, Solution, SolutionSink};
use dlx_solver::queens::solver::Queens;
use dlx_solver::sudoku::solver::parse_sudoku_file;
use std::fmt::Display;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tikv_jemalloc_ctl::{epoch, stats};
use tracing::debug;

/// Defines the command-line interface for the exact cover solver.
///
/// Uses `clap` for parsing arguments.
#[derive(Parser, Debug)]
#[command(name = "dlx", version, about = "An exact cover solver using dancing links")]
pub(crate) struct Cli {
    /// An optional path argument. If provided without a subcommand,
    /// it's treated as a matrix file to solve, or a directory to walk.
    /// `-` reads the matrix from standard input.
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Specifies the subcommand to execute (e.g. `file`, `text`, `sudoku`, `queens`).
    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// Common options applicable to all commands.
    #[command(flatten)]
    pub common: CommonOptions,
}

/// Enumerates the available subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Solve an exact cover matrix file.
    File {
        /// Path to the matrix file.
        #[arg(long)]
        path: PathBuf,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve an exact cover matrix provided as plain text.
    Text {
        /// Matrix text, e.g. "4 4\n2 1 2\n2 3 4\n2 1 3\n2 2 4".
        /// A literal `\n` is read as a line break.
        #[arg(short, long)]
        input: String,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a Sudoku puzzle by encoding it as an exact cover matrix.
    Sudoku {
        /// Path to the Sudoku file, one board row per line.
        #[arg(long)]
        path: PathBuf,

        /// Print the generated matrix and save it next to the puzzle with a `.dlx` extension.
        #[arg(short, long, default_value_t = false)]
        export: bool,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Place N queens on an N by N board so no two attack each other.
    Queens {
        /// Side length of the board.
        #[arg(short, long)]
        n: usize,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Defines common command-line options shared across different subcommands.
#[derive(Args, Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct CommonOptions {
    /// Enable debug output, logging search progress at debug level.
    #[arg(short, long, default_value_t = false)]
    pub(crate) debug: bool,

    /// Check every reported solution against the matrix.
    #[arg(short, long, default_value_t = true)]
    pub(crate) verify: bool,

    /// Enable printing of problem and search statistics after solving.
    #[arg(short, long, default_value_t = true)]
    pub(crate) stats: bool,

    /// Print every solution as it is found, one parenthesised group per row.
    #[arg(short, long, default_value_t = false)]
    pub(crate) print_solution: bool,

    /// Stop after this many solutions.
    #[arg(short, long)]
    pub(crate) limit: Option<usize>,
}

impl CommonOptions {
    /// Combines options given before a subcommand with the subcommand's own.
    /// A flag set in either place is set; a limit given to the subcommand
    /// wins.
    #[must_use]
    pub(crate) fn merged(self, top: &Self) -> Self {
        Self {
            debug: self.debug || top.debug,
            verify: self.verify && top.verify,
            stats: self.stats && top.stats,
            print_solution: self.print_solution || top.print_solution,
            limit: self.limit.or(top.limit),
        }
    }
}

/// Everything a search produced.
pub(crate) struct Outcome {
    /// Row ids of the first solution found.
    pub first: Option<Vec<RowId>>,
    /// The first solution that was not an exact cover, by 1-based index.
    pub failed: Option<(usize, Vec<RowId>)>,
    /// Counters from the search.
    pub stats: SearchStats,
    /// Time spent searching.
    pub elapsed: Duration,
}

/// Keeps the first solution, optionally printing and verifying each one as
/// it arrives.
struct Reporter {
    print: bool,
    verify: bool,
    found: usize,
    first: Option<Vec<RowId>>,
    failed: Option<(usize, Vec<RowId>)>,
}

impl<L: Display> SolutionSink<L> for Reporter {
    fn on_solution(&mut self, solution: &Solution<'_, L>) {
        self.found += 1;
        if self.print {
            println!("{solution}");
        }
        if self.first.is_none() {
            self.first = Some(solution.row_ids().collect());
        }
        if self.verify && self.failed.is_none() && !solution.verify() {
            self.failed = Some((self.found, solution.row_ids().collect()));
        }
    }
}

/// Solves every matrix and Sudoku file under a directory.
///
/// Files ending in `.dlx` or `.txt` are read as matrices, `.sudoku` files as
/// puzzles; anything else is skipped.
///
/// # Errors
///
/// If the path is not a directory or any file fails to solve.
pub(crate) fn solve_dir(path: &Path, common: &CommonOptions) -> Result<(), String> {
    if !path.is_dir() {
        return Err(format!("Provided path is not a directory: {}", path.display()));
    }

    for entry in walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
    {
        let file_path = entry.path();
        match file_path.extension().and_then(|ext| ext.to_str()) {
            Some("sudoku") => solve_sudoku(file_path, false, common)?,
            Some("dlx" | "txt") => solve_file(file_path, common)?,
            _ => debug!(path = %file_path.display(), "skipping unrecognised file"),
        }
    }

    Ok(())
}

/// Parses and solves a matrix file.
///
/// # Errors
///
/// If the file cannot be parsed or a solution fails verification.
pub(crate) fn solve_file(path: &Path, common: &CommonOptions) -> Result<(), String> {
    let time = Instant::now();
    let mut matrix = parse_file(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let parse_time = time.elapsed();

    solve_and_report(&mut matrix, common, Some(path), parse_time).map(|_| ())
}

/// Parses and solves a matrix given as text.
///
/// # Errors
///
/// If the text cannot be parsed or a solution fails verification.
pub(crate) fn solve_text(input: &str, common: &CommonOptions) -> Result<(), String> {
    let time = Instant::now();
    let mut matrix = parse_text(&unescape_newlines(input)).map_err(|e| e.to_string())?;
    let parse_time = time.elapsed();

    solve_and_report(&mut matrix, common, None, parse_time).map(|_| ())
}

/// Reads a matrix from `reader` and solves it.
///
/// # Errors
///
/// If the input cannot be parsed or a solution fails verification.
pub(crate) fn solve_reader<R: BufRead>(reader: R, common: &CommonOptions) -> Result<Outcome, String> {
    let time = Instant::now();
    let mut matrix = parse_matrix(reader).map_err(|e| format!("<stdin>: {e}"))?;
    let parse_time = time.elapsed();

    solve_and_report(&mut matrix, common, None, parse_time)
}

/// Turns the two characters `\n` into a line break, so a whole matrix can
/// be passed as one shell argument.
pub(crate) fn unescape_newlines(input: &str) -> String {
    input.replace("\\n", "\n")
}

/// Runs the search with the sink the options ask for.
pub(crate) fn solve<L: Display>(matrix: &mut Matrix<L>, common: &CommonOptions) -> Outcome {
    let reporter = Reporter {
        print: common.print_solution,
        verify: common.verify,
        found: 0,
        first: None,
        failed: None,
    };

    let time = Instant::now();
    let (reporter, stats) = match common.limit {
        Some(limit) => {
            let mut sink = Limit::new(reporter, limit);
            let stats = matrix.search(&mut sink);
            (sink.into_inner(), stats)
        }
        None => {
            let mut sink = reporter;
            let stats = matrix.search(&mut sink);
            (sink, stats)
        }
    };
    let elapsed = time.elapsed();

    debug!(?elapsed, solutions = stats.solutions, "search complete");

    Outcome {
        first: reporter.first,
        failed: reporter.failed,
        stats,
        elapsed,
    }
}

/// Reports the verification result recorded during the search.
///
/// # Errors
///
/// Names the first solution that was not an exact cover.
pub(crate) fn check_verified(outcome: &Outcome) -> Result<(), String> {
    if let Some((index, rows)) = &outcome.failed {
        return Err(format!("Solution {index} failed verification: rows {rows:?}"));
    }
    println!("Verified: {} solution(s)", outcome.stats.solutions);
    Ok(())
}

/// Solves a matrix and reports the results, including stats and verification.
///
/// # Errors
///
/// If a solution fails verification.
pub(crate) fn solve_and_report<L: Display>(
    matrix: &mut Matrix<L>,
    common: &CommonOptions,
    label: Option<&Path>,
    parse_time: Duration,
) -> Result<Outcome, String> {
    if let Some(name) = label {
        println!("Solving: {}", name.display());
    }

    debug!(
        primary = matrix.primary_count(),
        secondary = matrix.secondary_count(),
        rows = matrix.row_count(),
        nodes = matrix.node_count(),
        "problem loaded"
    );
    if common.debug {
        matrix.validate().map_err(|e| e.to_string())?;
    }

    let outcome = solve(matrix, common);
    let (allocated, resident) = memory_usage();

    if common.verify {
        check_verified(&outcome)?;
    }

    if common.stats {
        print_stats(parse_time, matrix, &outcome, allocated, resident);
    }

    Ok(outcome)
}

/// Allocated and resident memory in MiB, or zero if jemalloc cannot say.
fn memory_usage() -> (f64, f64) {
    if epoch::advance().is_err() {
        return (0.0, 0.0);
    }

    let allocated = stats::allocated::mib().and_then(|mib| mib.read()).unwrap_or(0);
    let resident = stats::resident::mib().and_then(|mib| mib.read()).unwrap_or(0);

    (
        allocated as f64 / (1024.0 * 1024.0),
        resident as f64 / (1024.0 * 1024.0),
    )
}

/// Helper function to print a single statistic line in a formatted table row.
pub(crate) fn stat_line(label: &str, value: impl Display) {
    println!("|  {label:<28} {value:>18}  |");
}

/// Helper function to print a statistic line that includes a rate (value/second).
pub(crate) fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

/// Prints a summary of problem and search statistics.
pub(crate) fn print_stats<L>(
    parse_time: Duration,
    matrix: &Matrix<L>,
    outcome: &Outcome,
    allocated: f64,
    resident: f64,
) {
    let s = &outcome.stats;
    let elapsed_secs = outcome.elapsed.as_secs_f64();

    println!("\n=======================[ Problem Statistics ]=========================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line("Primary columns", matrix.primary_count());
    stat_line("Secondary columns", matrix.secondary_count());
    stat_line("Rows", matrix.row_count());
    stat_line("Nodes", matrix.node_count());

    println!("========================[ Search Statistics ]========================");
    stat_line_with_rate("Solutions", s.solutions, elapsed_secs);
    stat_line_with_rate("Search nodes", s.nodes, elapsed_secs);
    stat_line_with_rate("Dead ends", s.dead_ends, elapsed_secs);
    stat_line("Max depth", s.max_depth);
    stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
    stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    stat_line("CPU time (s)", format!("{elapsed_secs:.3}"));
    println!("=====================================================================");

    if s.solutions > 0 {
        println!("\nSOLVED ({} solution(s))", s.solutions);
    } else {
        println!("\nNO SOLUTION");
    }
}

/// Solve a sudoku file.
///
/// # Errors
///
/// If the sudoku doesn't exist, cannot be parsed, or the matrix cannot be
/// exported.
pub(crate) fn solve_sudoku(path: &Path, export: bool, common: &CommonOptions) -> Result<(), String> {
    if !path.is_file() {
        return Err(format!("Provided path is not a file: {}", path.display()));
    }

    let time = Instant::now();
    let sudoku =
        parse_sudoku_file(path).map_err(|e| format!("Error parsing Sudoku file: {e}"))?;
    println!("Parsed Sudoku:\n{sudoku}");

    let (mut matrix, candidates) = sudoku.to_matrix();

    if export {
        let text = matrix.to_string();
        println!("Matrix:\n{text}");

        let export_path = path.with_extension("dlx");
        std::fs::write(&export_path, text)
            .map_err(|e| format!("Unable to write {}: {e}", export_path.display()))?;
        println!("Matrix written to: {}", export_path.display());
    }

    let parse_time = time.elapsed();
    let outcome = solve_and_report(&mut matrix, common, Some(path), parse_time)?;

    match &outcome.first {
        Some(rows) => println!("Solution:\n{}", sudoku.decode_solution(&candidates, rows)),
        None => println!("No solution found"),
    }
    Ok(())
}

/// Solve the N-queens problem for an `n` by `n` board.
///
/// # Errors
///
/// If `n` is zero or a solution fails verification.
pub(crate) fn solve_queens(n: usize, common: &CommonOptions) -> Result<(), String> {
    let time = Instant::now();
    let queens = Queens::new(n).map_err(|e| e.to_string())?;
    let (mut matrix, squares) = queens.to_matrix();
    let parse_time = time.elapsed();

    let outcome = solve_and_report(&mut matrix, common, None, parse_time)?;

    match &outcome.first {
        Some(rows) => println!("First placement:\n{}", queens.decode(&squares, rows)),
        None => println!("No placement found"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_path() {
        let cli = Cli::try_parse_from(["dlx", "problem.dlx"]).unwrap();
        assert_eq!(cli.path, Some(PathBuf::from("problem.dlx")));
        assert!(cli.command.is_none());
        assert!(cli.common.verify);
        assert!(cli.common.stats);
    }

    #[test]
    fn test_parse_dash_as_stdin_path() {
        let cli = Cli::try_parse_from(["dlx", "-p", "-"]).unwrap();
        assert_eq!(cli.path, Some(PathBuf::from("-")));
        assert!(cli.common.print_solution);
    }

    #[test]
    fn test_parse_queens_with_options() {
        let cli = Cli::try_parse_from(["dlx", "queens", "--n", "8", "--limit", "3", "-p"]).unwrap();
        match cli.command {
            Some(Commands::Queens { n, common }) => {
                assert_eq!(n, 8);
                assert_eq!(common.limit, Some(3));
                assert!(common.print_solution);
                assert!(!common.debug);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unescape_newlines() {
        assert_eq!(unescape_newlines("2 1\\n1 1\\n1 2"), "2 1\n1 1\n1 2");
        assert_eq!(unescape_newlines("2 1\n1 1"), "2 1\n1 1");
    }

    #[test]
    fn test_parse_top_level_options_before_subcommand() {
        let cli = Cli::try_parse_from(["dlx", "-p", "--limit", "2", "queens", "--n", "8"]).unwrap();
        assert!(cli.common.print_solution);
        let Some(Commands::Queens { n, common }) = cli.command else {
            panic!("expected queens command");
        };
        assert_eq!(n, 8);

        let common = common.merged(&cli.common);
        assert!(common.print_solution);
        assert!(!common.debug);
        assert_eq!(common.limit, Some(2));
    }

    #[test]
    fn test_merged_prefers_subcommand_limit() {
        let top = CommonOptions {
            debug: true,
            limit: Some(10),
            ..CommonOptions::default()
        };
        let own = CommonOptions {
            limit: Some(3),
            ..CommonOptions::default()
        };
        let common = own.merged(&top);
        assert!(common.debug);
        assert_eq!(common.limit, Some(3));
    }

    #[test]
    fn test_solve_keeps_first_solution() {
        let mut matrix = parse_text("4 4\n2 1 2\n2 3 4\n2 1 3\n2 2 4\n").unwrap();
        let common = CommonOptions {
            verify: true,
            ..CommonOptions::default()
        };
        let outcome = solve(&mut matrix, &common);

        assert_eq!(outcome.stats.solutions, 2);
        assert_eq!(outcome.first, Some(vec![0, 1]));
        assert!(outcome.failed.is_none());
        assert!(check_verified(&outcome).is_ok());
    }

    #[test]
    fn test_solve_respects_limit() {
        let (mut matrix, _) = Queens::new(8).unwrap().to_matrix();
        let common = CommonOptions {
            limit: Some(5),
            ..CommonOptions::default()
        };
        let outcome = solve(&mut matrix, &common);

        assert_eq!(outcome.stats.solutions, 5);
        assert!(outcome.first.is_some());
    }

    #[test]
    fn test_solve_reader_from_cursor() {
        let input = std::io::Cursor::new("c from a pipe\n3 3\n2 1 2\n1 3\n1 1\n");
        let common = CommonOptions {
            verify: true,
            ..CommonOptions::default()
        };
        let outcome = solve_reader(input, &common).unwrap();

        assert_eq!(outcome.stats.solutions, 1);
        assert_eq!(outcome.first, Some(vec![0, 1]));
    }

    #[test]
    fn test_solve_reader_reports_parse_errors() {
        let input = std::io::Cursor::new("3\n");
        assert!(solve_reader(input, &CommonOptions::default()).is_err());
    }

    #[test]
    fn test_check_verified_rejects_recorded_failure() {
        let outcome = Outcome {
            first: Some(vec![0]),
            failed: Some((2, vec![0, 0])),
            stats: SearchStats::default(),
            elapsed: Duration::ZERO,
        };
        let error = check_verified(&outcome).unwrap_err();
        assert!(error.contains("Solution 2"));
    }
}
