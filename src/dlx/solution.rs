#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Result sinks and the read-only view of a solution handed to them.

use crate::dlx::matrix::{Matrix, RowColumns};
use crate::dlx::node::{NodeId, RowId};
use itertools::Itertools;
use std::fmt::{self, Display};

/// Receives every exact cover found by [`Matrix::search`].
///
/// The search calls [`SolutionSink::on_solution`] once per solution, in the
/// order they are discovered, and asks [`SolutionSink::is_done`] before
/// every step so a sink can end the search early.
///
/// Any `FnMut(&Solution<'_, L>)` closure is a sink that never stops.
pub trait SolutionSink<L> {
    /// Called with a view of the rows making up one exact cover. The view
    /// borrows the matrix and is only valid for the duration of the call.
    fn on_solution(&mut self, solution: &Solution<'_, L>);

    /// Returning `true` makes the search unwind and return. The matrix is
    /// fully restored either way.
    fn is_done(&self) -> bool {
        false
    }
}

impl<L, F> SolutionSink<L> for F
where
    F: FnMut(&Solution<'_, L>),
{
    fn on_solution(&mut self, solution: &Solution<'_, L>) {
        self(solution);
    }
}

/// A solution as seen from inside the search: the row chosen at each depth.
#[derive(Debug, Clone, Copy)]
pub struct Solution<'a, L> {
    matrix: &'a Matrix<L>,
    stack: &'a [NodeId],
}

impl<'a, L> Solution<'a, L> {
    pub(crate) const fn new(matrix: &'a Matrix<L>, stack: &'a [NodeId]) -> Self {
        Self { matrix, stack }
    }

    /// Number of rows in the solution, i.e. the search depth it was found at.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Ids of the chosen rows, shallowest first.
    pub fn row_ids(&self) -> impl Iterator<Item = RowId> + use<'a, L> {
        let matrix = self.matrix;
        self.stack.iter().map(move |&node| matrix.nodes[node].row)
    }

    /// The chosen rows, shallowest first.
    pub fn rows(&self) -> impl Iterator<Item = SolutionRow<'a, L>> + use<'a, L> {
        let matrix = self.matrix;
        self.stack
            .iter()
            .map(move |&node| SolutionRow { matrix, node })
    }

    /// Whether the chosen rows are an exact cover of the matrix. Only the
    /// rows themselves are read, so this holds mid-search.
    #[must_use]
    pub fn verify(&self) -> bool {
        self.matrix.verify_rows(self.row_ids())
    }

    /// Copies out the labels of every chosen row.
    #[must_use]
    pub fn to_labels(&self) -> Vec<Vec<L>>
    where
        L: Clone,
    {
        self.rows()
            .map(|row| row.labels().cloned().collect())
            .collect()
    }
}

impl<L: Display> Display for Solution<'_, L> {
    /// Formats as `(a b) (c d)`: one parenthesised group per row.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self
            .rows()
            .map(|row| format!("({})", row.labels().join(" ")))
            .join(" ");
        write!(f, "{rows}")
    }
}

/// One chosen row of a [`Solution`].
#[derive(Debug, Clone, Copy)]
pub struct SolutionRow<'a, L> {
    matrix: &'a Matrix<L>,
    node: NodeId,
}

impl<'a, L> SolutionRow<'a, L> {
    /// Id the row was given by [`Matrix::append_row`].
    #[must_use]
    pub fn id(&self) -> RowId {
        self.matrix.nodes[self.node].row
    }

    /// Columns covered by the row, starting with the column the search
    /// branched on and following the row's right links round.
    #[must_use]
    pub fn columns(&self) -> RowColumns<'a> {
        RowColumns::from_node(&self.matrix.nodes, self.node)
    }

    /// Labels of the columns covered by the row, in [`SolutionRow::columns`] order.
    pub fn labels(&self) -> impl Iterator<Item = &'a L> + use<'a, L> {
        let matrix = self.matrix;
        self.columns().map(move |column| matrix.label(column))
    }
}

/// Collects the row ids of every solution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collect {
    /// One entry per solution, rows in search-depth order.
    pub solutions: Vec<Vec<RowId>>,
}

impl<L> SolutionSink<L> for Collect {
    fn on_solution(&mut self, solution: &Solution<'_, L>) {
        self.solutions.push(solution.row_ids().collect());
    }
}

/// Counts solutions without keeping them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Count(pub usize);

impl<L> SolutionSink<L> for Count {
    fn on_solution(&mut self, _: &Solution<'_, L>) {
        self.0 += 1;
    }
}

/// Forwards to another sink until `limit` solutions have been seen, then
/// stops the search.
#[derive(Debug, Clone)]
pub struct Limit<S> {
    inner: S,
    remaining: usize,
}

impl<S> Limit<S> {
    /// Wraps `inner`, stopping after `limit` solutions.
    #[must_use]
    pub const fn new(inner: S, limit: usize) -> Self {
        Self {
            inner,
            remaining: limit,
        }
    }

    /// Returns the wrapped sink.
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Borrows the wrapped sink.
    pub const fn inner(&self) -> &S {
        &self.inner
    }
}

impl<L, S: SolutionSink<L>> SolutionSink<L> for Limit<S> {
    fn on_solution(&mut self, solution: &Solution<'_, L>) {
        if self.remaining > 0 {
            self.remaining -= 1;
            self.inner.on_solution(solution);
        }
    }

    fn is_done(&self) -> bool {
        self.remaining == 0 || self.inner.is_done()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_rows() -> Matrix<&'static str> {
        let mut matrix = Matrix::new();
        matrix
            .declare_labelled_columns(["a", "b", "c"], [])
            .unwrap();
        matrix.append_row([1, 3]).unwrap();
        matrix.append_row([2]).unwrap();
        matrix
    }

    /// Builds a view over a hand-picked stack of body nodes.
    fn view<'a>(matrix: &'a Matrix<&'static str>, stack: &'a [NodeId]) -> Solution<'a, &'static str> {
        Solution::new(matrix, stack)
    }

    #[test]
    fn test_solution_view() {
        let matrix = two_rows();
        // Body nodes start after the master and three headers.
        let stack = [4, 6];
        let solution = view(&matrix, &stack);

        assert_eq!(solution.depth(), 2);
        assert_eq!(solution.row_ids().collect_vec(), vec![0, 1]);
        assert_eq!(solution.to_labels(), vec![vec!["a", "c"], vec!["b"]]);
        assert_eq!(solution.to_string(), "(a c) (b)");
    }

    #[test]
    fn test_row_columns_start_at_stored_node() {
        let matrix = two_rows();
        // Node 5 is the "c" entry of row 0.
        let stack = [5];
        let solution = view(&matrix, &stack);
        let row = solution.rows().next().unwrap();

        assert_eq!(row.id(), 0);
        assert_eq!(row.columns().collect_vec(), vec![3, 1]);
        assert_eq!(solution.to_string(), "(c a)");
    }

    #[test]
    fn test_solution_verify() {
        let matrix = two_rows();
        assert!(view(&matrix, &[4, 6]).verify());
        assert!(!view(&matrix, &[4]).verify());
        assert!(!view(&matrix, &[4, 4]).verify());
    }

    #[test]
    fn test_solution_verify_during_search() {
        let mut matrix = two_rows();
        let mut verdicts = Vec::new();
        matrix.search(&mut |s: &Solution<'_, &'static str>| verdicts.push(s.verify()));
        assert_eq!(verdicts, vec![true]);
    }

    #[test]
    fn test_collect_and_count() {
        let matrix = two_rows();
        let stack = [4, 6];
        let solution = view(&matrix, &stack);

        let mut collect = Collect::default();
        let mut count = Count::default();
        collect.on_solution(&solution);
        collect.on_solution(&solution);
        count.on_solution(&solution);

        assert_eq!(collect.solutions, vec![vec![0, 1], vec![0, 1]]);
        assert_eq!(count, Count(1));
        assert!(!SolutionSink::<&str>::is_done(&count));
    }

    #[test]
    fn test_limit_stops_after_n() {
        let matrix = two_rows();
        let stack = [4, 6];
        let solution = view(&matrix, &stack);

        let mut limit = Limit::new(Count::default(), 2);
        assert!(!SolutionSink::<&str>::is_done(&limit));
        limit.on_solution(&solution);
        assert!(!SolutionSink::<&str>::is_done(&limit));
        limit.on_solution(&solution);
        assert!(SolutionSink::<&str>::is_done(&limit));
        limit.on_solution(&solution);

        assert_eq!(limit.into_inner(), Count(2));
    }

    #[test]
    fn test_closure_is_a_sink() {
        let matrix = two_rows();
        let stack = [4];
        let solution = view(&matrix, &stack);

        let mut seen = Vec::new();
        let mut sink = |s: &Solution<'_, &'static str>| seen.push(s.depth());
        sink.on_solution(&solution);
        assert!(!SolutionSink::<&str>::is_done(&sink));

        assert_eq!(seen, vec![1]);
    }
}
