#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Algorithm X: the recursive backtracking driver.
//!
//! At each level the search picks the active primary column with the
//! fewest live rows, covers it, and tries each of its rows in turn:
//! covering the row's other columns, recursing, then uncovering them in
//! reverse. A column with no live rows yields an empty loop, which is how
//! dead ends are pruned. When the master ring is empty every primary
//! column has been covered exactly once and the chosen rows are reported.

use crate::dlx::matrix::Matrix;
use crate::dlx::node::{ColumnId, Links, NodeId, ROOT, RowId};
use crate::dlx::solution::{Collect, Count, Limit, Solution, SolutionSink};
use std::ops::ControlFlow;
use tracing::{debug, trace};

/// Counters gathered during a search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Exact covers reported to the sink.
    pub solutions: usize,
    /// Recursive search calls made, including the top-level one.
    pub nodes: usize,
    /// Columns selected with no live rows left.
    pub dead_ends: usize,
    /// Deepest level reached.
    pub max_depth: usize,
}

/// The rows chosen so far, one per search depth.
///
/// The frame at depth `k` pushes its candidate before recursing and pops
/// it on return, so slot `k` is only ever written by that frame.
#[derive(Debug, Default)]
struct SolutionStack {
    nodes: Vec<NodeId>,
}

impl SolutionStack {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    fn depth(&self) -> usize {
        self.nodes.len()
    }

    fn push(&mut self, node: NodeId) {
        self.nodes.push(node);
    }

    fn pop(&mut self) -> Option<NodeId> {
        self.nodes.pop()
    }

    fn as_slice(&self) -> &[NodeId] {
        &self.nodes
    }
}

impl<L> Matrix<L> {
    /// Picks the active primary column with the smallest live count. Ties
    /// go to the column met first in ring order. Returns `None` once every
    /// primary column is covered.
    #[must_use]
    pub fn choose_column(&self) -> Option<ColumnId> {
        let mut column = self.right(ROOT);
        if column == ROOT {
            return None;
        }

        let mut best = column;
        let mut best_size = self.size(column);
        loop {
            column = self.right(column);
            if column == ROOT {
                break;
            }
            let size = self.size(column);
            if size < best_size {
                best = column;
                best_size = size;
            }
        }
        Some(best)
    }

    /// Enumerates every exact cover, handing each to `sink` as it is found.
    ///
    /// The matrix is mutated during the search and restored to its initial
    /// state before this returns, including when the sink stops the search
    /// early.
    pub fn search<S>(&mut self, sink: &mut S) -> SearchStats
    where
        S: SolutionSink<L>,
    {
        debug!(
            primary = self.primary_count(),
            secondary = self.secondary_count(),
            rows = self.row_count(),
            nodes = self.node_count(),
            "starting search"
        );

        let mut searcher = Searcher {
            stack: SolutionStack::with_capacity(self.primary_count()),
            matrix: self,
            sink,
            stats: SearchStats::default(),
        };
        let flow = searcher.search();
        let stats = searcher.stats;

        debug!(
            solutions = stats.solutions,
            nodes = stats.nodes,
            dead_ends = stats.dead_ends,
            max_depth = stats.max_depth,
            stopped = flow.is_break(),
            "search finished"
        );
        stats
    }

    /// Returns the row ids of every solution.
    pub fn solve_all(&mut self) -> Vec<Vec<RowId>> {
        let mut collect = Collect::default();
        self.search(&mut collect);
        collect.solutions
    }

    /// Counts the solutions.
    pub fn count_solutions(&mut self) -> usize {
        let mut count = Count::default();
        self.search(&mut count);
        count.0
    }

    /// Returns the first solution found, if any.
    pub fn first_solution(&mut self) -> Option<Vec<RowId>> {
        let mut first = Limit::new(Collect::default(), 1);
        self.search(&mut first);
        first.into_inner().solutions.pop()
    }
}

struct Searcher<'m, 's, L, S> {
    matrix: &'m mut Matrix<L>,
    sink: &'s mut S,
    stack: SolutionStack,
    stats: SearchStats,
}

impl<L, S: SolutionSink<L>> Searcher<'_, '_, L, S> {
    fn search(&mut self) -> ControlFlow<()> {
        if self.sink.is_done() {
            return ControlFlow::Break(());
        }

        self.stats.nodes += 1;
        self.stats.max_depth = self.stats.max_depth.max(self.stack.depth());

        let Some(column) = self.matrix.choose_column() else {
            self.stats.solutions += 1;
            trace!(depth = self.stack.depth(), "solution found");
            let solution = Solution::new(&*self.matrix, self.stack.as_slice());
            self.sink.on_solution(&solution);
            return ControlFlow::Continue(());
        };

        if self.matrix.size(column) == 0 {
            self.stats.dead_ends += 1;
        }

        self.matrix.cover(column);

        let mut flow = ControlFlow::Continue(());
        let mut row = self.matrix.down(column);
        while row != column {
            self.stack.push(row);
            self.matrix.cover_row(row);

            flow = self.search();

            let chosen = self.stack.pop();
            debug_assert_eq!(chosen, Some(row), "solution stack slot overwritten");
            self.matrix.uncover_row(row);

            if flow.is_break() {
                break;
            }
            row = self.matrix.down(row);
        }

        self.matrix.uncover(column);
        flow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    fn matrix(primary: usize, secondary: usize, rows: &[&[usize]]) -> Matrix {
        let mut matrix = Matrix::with_columns(primary, secondary);
        for row in rows {
            matrix.append_row(row.iter().copied()).unwrap();
        }
        matrix
    }

    /// Solutions as sorted sets of sorted rows, for order-independent comparison.
    fn solution_sets(matrix: &mut Matrix) -> Vec<Vec<Vec<usize>>> {
        let mut found = Vec::new();
        matrix.search(&mut |solution: &Solution<'_, usize>| {
            let rows = solution
                .rows()
                .map(|row| row.labels().copied().sorted().collect_vec())
                .sorted()
                .collect_vec();
            found.push(rows);
        });
        found.sort();
        found
    }

    /// Every subset of rows that forms an exact cover, by exhaustion.
    fn brute_force(matrix: &Matrix) -> Vec<Vec<RowId>> {
        let rows = matrix.row_count();
        (0..1usize << rows)
            .map(|mask| (0..rows).filter(|r| mask & (1 << r) != 0).collect_vec())
            .filter(|rows| matrix.verify(rows))
            .collect()
    }

    #[test]
    fn test_scenario_two_solutions() {
        let mut matrix = matrix(4, 0, &[&[1, 2], &[3, 4], &[1, 3], &[2, 4]]);
        let found = solution_sets(&mut matrix);

        assert_eq!(
            found,
            vec![
                vec![vec![1, 2], vec![3, 4]],
                vec![vec![1, 3], vec![2, 4]],
            ]
        );
    }

    #[test]
    fn test_scenario_single_solution() {
        let mut matrix = matrix(2, 0, &[&[1], &[2]]);
        assert_eq!(solution_sets(&mut matrix), vec![vec![vec![1], vec![2]]]);
    }

    #[test]
    fn test_scenario_uncoverable_column() {
        let mut matrix = matrix(1, 0, &[]);
        let mut count = Count::default();
        let stats = matrix.search(&mut count);

        assert_eq!(count.0, 0);
        assert_eq!(stats.solutions, 0);
        assert_eq!(stats.dead_ends, 1);
    }

    #[test]
    fn test_scenario_secondary_column_is_optional() {
        let mut matrix = matrix(1, 1, &[&[1], &[1, 2]]);
        assert_eq!(
            solution_sets(&mut matrix),
            vec![vec![vec![1]], vec![vec![1, 2]]]
        );
    }

    #[test]
    fn test_secondary_column_claimed_at_most_once() {
        // Both rows touch secondary column 3, so they cannot be combined.
        let mut matrix = matrix(2, 1, &[&[1, 3], &[2, 3], &[1], &[2]]);
        let mut found = matrix.solve_all();
        for solution in &mut found {
            solution.sort_unstable();
        }
        found.sort();

        assert_eq!(found, vec![vec![0, 3], vec![1, 2], vec![2, 3]]);
    }

    #[test]
    fn test_no_primary_columns_yields_empty_solution() {
        let mut matrix = matrix(0, 2, &[&[1], &[2]]);
        let found = matrix.solve_all();

        assert_eq!(found, vec![Vec::<RowId>::new()]);
    }

    #[test]
    fn test_knuth_example() {
        let mut matrix = matrix(
            7,
            0,
            &[
                &[3, 5, 6],
                &[1, 4, 7],
                &[2, 3, 6],
                &[1, 4],
                &[2, 7],
                &[4, 5, 7],
            ],
        );
        let mut found = matrix.solve_all();
        assert_eq!(found.len(), 1);
        found[0].sort_unstable();
        assert_eq!(found[0], vec![0, 3, 4]);
    }

    #[test]
    fn test_search_restores_matrix() {
        let mut matrix = matrix(4, 1, &[&[1, 2], &[3, 4, 5], &[1, 3], &[2, 4], &[5]]);
        let original = matrix.clone();

        matrix.count_solutions();
        assert_eq!(matrix, original);

        matrix.first_solution();
        assert_eq!(matrix, original);
    }

    #[test]
    fn test_solution_depth_and_labels() {
        let mut matrix = Matrix::new();
        matrix
            .declare_labelled_columns(["x", "y", "z"], [])
            .unwrap();
        matrix.append_row([1, 2]).unwrap();
        matrix.append_row([3]).unwrap();

        let mut seen = Vec::new();
        matrix.search(&mut |solution: &Solution<'_, &str>| {
            seen.push((solution.depth(), solution.to_string()));
        });

        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, 2);
        // The search branches on "x" first, so its row is reported first.
        assert_eq!(seen[0].1, "(x y) (z)");
    }

    #[test]
    fn test_choose_column_prefers_smallest_then_first() {
        let matrix = matrix(3, 0, &[&[1, 2], &[1, 3], &[2], &[3]]);
        // All three columns have two rows; the first in ring order wins.
        assert_eq!(matrix.choose_column(), Some(1));

        let matrix2 = self::matrix(3, 0, &[&[1], &[1, 2], &[2], &[3]]);
        assert_eq!(matrix2.choose_column(), Some(3));
    }

    #[test]
    fn test_choose_column_picks_empty_column() {
        let mut matrix = matrix(3, 0, &[&[1, 2], &[2, 3], &[3]]);
        assert_eq!(matrix.choose_column(), Some(1));

        // Covering column 2 removes row [1, 2], leaving column 1 empty.
        matrix.cover(2);
        assert_eq!(matrix.size(1), 0);
        assert_eq!(matrix.choose_column(), Some(1));
        matrix.uncover(2);
    }

    #[test]
    fn test_choose_column_none_when_ring_empty() {
        let mut matrix = matrix(1, 0, &[&[1]]);
        matrix.cover(1);
        assert_eq!(matrix.choose_column(), None);
        assert_eq!(matrix.right(ROOT), ROOT);
        matrix.uncover(1);
    }

    #[test]
    fn test_dead_end_prunes_without_iterating() {
        // Column 4 has no rows, so the very first selection is a dead end.
        let mut matrix = matrix(4, 0, &[&[1, 2], &[3], &[1], &[2, 3]]);
        let mut count = Count::default();
        let stats = matrix.search(&mut count);

        assert_eq!(count.0, 0);
        assert_eq!(stats.nodes, 1);
        assert_eq!(stats.dead_ends, 1);
        assert_eq!(stats.max_depth, 0);
    }

    #[test]
    fn test_limit_stops_early_and_restores() {
        // Four independent pairs: 2^4 solutions.
        let mut matrix = matrix(
            4,
            0,
            &[&[1], &[1], &[2], &[2], &[3], &[3], &[4], &[4]],
        );
        assert_eq!(matrix.count_solutions(), 16);
        let original = matrix.clone();

        let mut limit = Limit::new(Collect::default(), 3);
        let stats = matrix.search(&mut limit);

        assert_eq!(limit.inner().solutions.len(), 3);
        assert_eq!(stats.solutions, 3);
        assert_eq!(matrix, original);
    }

    #[test]
    fn test_zero_limit_does_nothing() {
        let mut matrix = matrix(1, 0, &[&[1]]);
        let mut limit = Limit::new(Count::default(), 0);
        let stats = matrix.search(&mut limit);

        assert_eq!(stats, SearchStats::default());
        assert_eq!(limit.into_inner(), Count(0));
    }

    #[test]
    fn test_first_solution() {
        let mut matrix = matrix(2, 0, &[&[1], &[2], &[1, 2]]);
        let first = matrix.first_solution().unwrap();
        assert!(matrix.verify(&first));

        let mut none = self::matrix(2, 0, &[&[1]]);
        assert_eq!(none.first_solution(), None);
    }

    #[test]
    fn test_out_of_order_rows_solve_the_same() {
        let mut sorted = matrix(4, 0, &[&[1, 2], &[3, 4], &[1, 3], &[2, 4]]);
        let mut shuffled = matrix(4, 0, &[&[2, 1], &[4, 3], &[3, 1], &[4, 2]]);
        assert!(shuffled.validate().is_ok());

        assert_eq!(solution_sets(&mut shuffled), solution_sets(&mut sorted));
    }

    #[test]
    fn test_empty_row_is_never_chosen() {
        let mut matrix = matrix(1, 0, &[&[], &[1]]);
        assert_eq!(matrix.solve_all(), vec![vec![1]]);
    }

    #[test]
    fn test_every_solution_is_an_exact_cover() {
        let mut matrix = matrix(
            6,
            2,
            &[
                &[1, 4, 7],
                &[2, 5],
                &[3, 6, 8],
                &[1, 2, 3],
                &[4, 5, 6],
                &[1, 7],
                &[4],
                &[2, 8],
                &[3, 5, 6, 7],
            ],
        );
        let solutions = matrix.solve_all();
        assert!(!solutions.is_empty());
        for solution in &solutions {
            assert!(matrix.verify(solution), "not an exact cover: {solution:?}");
        }
    }

    #[test]
    fn test_matches_brute_force_on_random_matrices() {
        let mut rng = fastrand::Rng::with_seed(0x5eed_d1c7);
        for _ in 0..200 {
            let primary = rng.usize(1..6);
            let secondary = rng.usize(0..3);
            let columns = primary + secondary;
            let mut m = Matrix::with_columns(primary, secondary);
            for _ in 0..rng.usize(0..11) {
                let mut row = (1..=columns).filter(|_| rng.u8(0..3) == 0).collect_vec();
                // Empty rows would pad brute-force covers without ever being chosen.
                if row.is_empty() {
                    continue;
                }
                rng.shuffle(&mut row);
                m.append_row(row).unwrap();
            }
            let original = m.clone();

            let mut found = m.solve_all();
            for solution in &mut found {
                solution.sort_unstable();
            }
            found.sort();

            assert_eq!(found, brute_force(&m));
            assert_eq!(m, original);
        }
    }
}
