#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The matrix store and row builder.
//!
//! A [`Matrix`] owns every node of the problem for its whole lifetime. The
//! arena is laid out as:
//!
//! ```text
//! [ master ] [ primary headers ... ] [ secondary headers ... ] [ row nodes ... ]
//!     0       1 ..= primary           primary+1 ..= columns      columns+1 ..
//! ```
//!
//! Primary headers are threaded into a horizontal ring anchored at the
//! master sentinel; the search terminates when that ring is empty.
//! Secondary headers are self-looped and never join the ring, so they are
//! never required to be covered, yet any row touching one still removes the
//! conflicting rows when it is chosen.

use crate::dlx::node::{ColumnId, Links, NO_ROW, Node, NodeId, ROOT, RowId};
use crate::error::{DlxError, Result};
use bit_vec::BitVec;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

/// A toroidal sparse 0/1 matrix prepared for Algorithm X.
///
/// `L` is an opaque label attached to each column when it is declared. The
/// solver never looks at it; it is only handed back through
/// [`Matrix::label`] and the solution views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix<L = usize> {
    /// The node arena. Index zero is the master sentinel.
    pub(crate) nodes: Vec<Node>,
    /// Live count per column, indexed by column id. Slot zero is unused.
    pub(crate) sizes: Vec<usize>,
    /// Column labels; column `c` is labelled by `labels[c - 1]`.
    labels: Vec<L>,
    /// First node of each row, or `None` for a row with no entries.
    rows: Vec<Option<NodeId>>,
    primary: usize,
    declared: bool,
}

impl<L> Links for Matrix<L> {
    fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }
}

impl<L> Default for Matrix<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L> Matrix<L> {
    /// Creates a matrix holding only the master sentinel. Columns must be
    /// declared before any row is appended.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::header(ROOT)],
            sizes: vec![0],
            labels: Vec::new(),
            rows: Vec::new(),
            primary: 0,
            declared: false,
        }
    }

    /// Declares the primary and secondary columns, in that order, labelling
    /// each with the value yielded for it. Primary columns receive ids
    /// `1..=p`, secondary columns `p+1..=p+s`.
    ///
    /// # Errors
    ///
    /// [`DlxError::ColumnsAlreadyDeclared`] if called more than once.
    pub fn declare_labelled_columns<P, S>(&mut self, primary: P, secondary: S) -> Result<()>
    where
        P: IntoIterator<Item = L>,
        S: IntoIterator<Item = L>,
    {
        if self.declared {
            return Err(DlxError::ColumnsAlreadyDeclared);
        }
        self.push_columns(primary, secondary);
        Ok(())
    }

    /// Creates a matrix with the given labelled columns already declared.
    pub(crate) fn from_labels<P, S>(primary: P, secondary: S) -> Self
    where
        P: IntoIterator<Item = L>,
        S: IntoIterator<Item = L>,
    {
        let mut matrix = Self::new();
        matrix.push_columns(primary, secondary);
        matrix
    }

    fn push_columns<P, S>(&mut self, primary: P, secondary: S)
    where
        P: IntoIterator<Item = L>,
        S: IntoIterator<Item = L>,
    {
        self.declared = true;

        for label in primary {
            let header = self.push_header(label);
            // Insert just before the master, i.e. at the end of the ring.
            let last = self.left(ROOT);
            let node = &mut self.nodes[header];
            node.left = last;
            node.right = ROOT;
            self.relink_horizontal(header);
            self.primary += 1;
        }

        for label in secondary {
            self.push_header(label);
        }
    }

    fn push_header(&mut self, label: L) -> ColumnId {
        let header = self.nodes.len();
        self.nodes.push(Node::header(header));
        self.sizes.push(0);
        self.labels.push(label);
        header
    }

    /// Appends a row with a 1 in each of the given columns.
    ///
    /// Nodes are chained horizontally in the order given and each one is
    /// placed at the bottom of its column. Ascending order is the
    /// conventional way to list a row's columns, but nothing depends on
    /// it. An empty row is accepted and receives an id, but contributes no
    /// nodes and can never be selected.
    ///
    /// # Errors
    ///
    /// Fails without modifying the matrix if columns have not been
    /// declared, if a column is outside `1..=column_count()`, or if a
    /// column is repeated.
    pub fn append_row<I>(&mut self, columns: I) -> Result<RowId>
    where
        I: IntoIterator<Item = ColumnId>,
    {
        if !self.declared {
            return Err(DlxError::ColumnsNotDeclared);
        }

        let columns: SmallVec<[ColumnId; 8]> = columns.into_iter().collect();
        let mut seen = FxHashSet::default();
        for &column in &columns {
            if column == ROOT || column > self.column_count() {
                return Err(DlxError::ColumnOutOfRange {
                    column,
                    columns: self.column_count(),
                });
            }
            if !seen.insert(column) {
                return Err(DlxError::DuplicateColumn { column });
            }
        }

        Ok(self.push_row(&columns))
    }

    /// Appends a row whose columns are known to be declared, in range and
    /// distinct.
    pub(crate) fn push_row(&mut self, columns: &[ColumnId]) -> RowId {
        debug_assert!(self.declared);
        let row = self.rows.len();
        let first = self.nodes.len();
        let last = first + columns.len().saturating_sub(1);

        for (offset, &column) in columns.iter().enumerate() {
            let node = first + offset;
            let bottom = self.up(column);
            self.nodes.push(Node {
                left: if node == first { last } else { node - 1 },
                right: if node == last { first } else { node + 1 },
                up: bottom,
                down: column,
                column,
                row,
            });
            self.relink_vertical(node);
            self.sizes[column] += 1;
        }

        self.rows.push((!columns.is_empty()).then_some(first));
        row
    }

    /// Number of primary columns.
    #[must_use]
    pub const fn primary_count(&self) -> usize {
        self.primary
    }

    /// Number of secondary columns.
    #[must_use]
    pub fn secondary_count(&self) -> usize {
        self.labels.len() - self.primary
    }

    /// Total number of declared columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.labels.len()
    }

    /// Number of appended rows, empty ones included.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of 1-entries in the matrix.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.labels.len() - 1
    }

    /// Current live count of a column.
    #[must_use]
    pub fn size(&self, column: ColumnId) -> usize {
        self.sizes[column]
    }

    /// Label the column was declared with.
    ///
    /// # Panics
    ///
    /// If `column` is `0` or greater than [`Matrix::column_count`].
    #[must_use]
    pub fn label(&self, column: ColumnId) -> &L {
        &self.labels[column - 1]
    }

    /// All column labels in column-id order.
    #[must_use]
    pub fn labels(&self) -> &[L] {
        &self.labels
    }

    /// Whether the column must be covered exactly once.
    #[must_use]
    pub const fn is_primary(&self, column: ColumnId) -> bool {
        column != ROOT && column <= self.primary
    }

    /// Primary columns not currently covered, in ring order.
    pub fn active_columns(&self) -> impl Iterator<Item = ColumnId> + '_ {
        RingIter {
            nodes: &self.nodes,
            start: ROOT,
            next: self.right(ROOT),
        }
    }

    /// The columns of a row, in the order they were appended.
    ///
    /// Returns `None` for an unknown row id.
    #[must_use]
    pub fn row(&self, row: RowId) -> Option<RowColumns<'_>> {
        let first = *self.rows.get(row)?;
        Some(RowColumns {
            nodes: &self.nodes,
            start: first,
            next: first,
        })
    }

    /// Iterates over every row's columns in row-id order.
    pub fn rows(&self) -> impl Iterator<Item = RowColumns<'_>> + '_ {
        self.rows.iter().map(|&first| RowColumns {
            nodes: &self.nodes,
            start: first,
            next: first,
        })
    }

    /// Checks that `rows` form an exact cover: every primary column exactly
    /// once and every secondary column at most once.
    ///
    /// This walks the rows independently of the dancing-links state and can
    /// be used to double-check reported solutions.
    #[must_use]
    pub fn verify(&self, rows: &[RowId]) -> bool {
        self.verify_rows(rows.iter().copied())
    }

    pub(crate) fn verify_rows<I: IntoIterator<Item = RowId>>(&self, rows: I) -> bool {
        let mut covered = BitVec::from_elem(self.column_count() + 1, false);
        for row in rows {
            let Some(columns) = self.row(row) else {
                return false;
            };
            for column in columns {
                if covered.get(column).unwrap_or(true) {
                    return false;
                }
                covered.set(column, true);
            }
        }
        (1..=self.primary).all(|column| covered.get(column) == Some(true))
    }

    /// Checks the structural invariants of everything reachable from the
    /// active columns: symmetric links, nodes filed under the right header,
    /// and live counts matching the vertical rings.
    ///
    /// # Errors
    ///
    /// [`DlxError::Corrupted`] describing the first violation found.
    pub fn validate(&self) -> Result<()> {
        let mut column = ROOT;
        loop {
            let right = self.right(column);
            if self.left(right) != column {
                return corrupted(format!("master ring broken between {column} and {right}"));
            }
            column = right;
            if column == ROOT {
                break;
            }
            if !self.is_primary(column) {
                return corrupted(format!("column {column} in master ring is not primary"));
            }
        }

        let secondaries = self.primary + 1..=self.column_count();
        for column in self.active_columns().chain(secondaries) {
            let mut count = 0;
            let mut node = column;
            loop {
                let down = self.down(node);
                if self.up(down) != node {
                    return corrupted(format!("column {column} broken between {node} and {down}"));
                }
                node = down;
                if node == column {
                    break;
                }
                count += 1;
                if self.column_of(node) != column {
                    return corrupted(format!("node {node} filed under column {column}"));
                }
                let right = self.right(node);
                if self.left(right) != node || self.nodes[right].row != self.nodes[node].row {
                    return corrupted(format!("row of node {node} broken at {right}"));
                }
            }
            if count != self.sizes[column] {
                return corrupted(format!(
                    "column {column} has {count} live nodes but a count of {}",
                    self.sizes[column]
                ));
            }
        }

        Ok(())
    }
}

impl Matrix<usize> {
    /// Creates a matrix whose columns are labelled by their ids.
    ///
    /// # Panics
    ///
    /// If `primary + secondary` overflows `usize`.
    #[must_use]
    pub fn with_columns(primary: usize, secondary: usize) -> Self {
        assert!(
            primary.checked_add(secondary).is_some(),
            "column count overflowed usize"
        );
        Self::from_labels(1..=primary, secondary_ids(primary, secondary))
    }

    /// Declares `primary` primary and `secondary` secondary columns,
    /// labelled by their ids `1..=primary + secondary`.
    ///
    /// # Errors
    ///
    /// [`DlxError::ColumnsAlreadyDeclared`] if called more than once, or
    /// [`DlxError::TooManyColumns`] if the total overflows `usize`.
    pub fn declare_columns(&mut self, primary: usize, secondary: usize) -> Result<()> {
        if self.declared {
            return Err(DlxError::ColumnsAlreadyDeclared);
        }
        if primary.checked_add(secondary).is_none() {
            return Err(DlxError::TooManyColumns { primary, secondary });
        }
        self.push_columns(1..=primary, secondary_ids(primary, secondary));
        Ok(())
    }
}

/// Ids `primary + 1 ..= primary + secondary`, for a sum known to fit.
fn secondary_ids(primary: usize, secondary: usize) -> impl Iterator<Item = usize> {
    (1..=secondary).map(move |offset| primary + offset)
}

fn corrupted(message: String) -> Result<()> {
    Err(DlxError::Corrupted(message))
}

/// Walks a horizontal ring from `start`, excluding `start` itself.
struct RingIter<'a> {
    nodes: &'a [Node],
    start: NodeId,
    next: NodeId,
}

impl Iterator for RingIter<'_> {
    type Item = ColumnId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next == self.start {
            return None;
        }
        let current = self.next;
        self.next = self.nodes[current].right;
        Some(self.nodes[current].column)
    }
}

/// The columns of one row, following `right` links from a starting node
/// until it comes round again.
#[derive(Debug, Clone)]
pub struct RowColumns<'a> {
    nodes: &'a [Node],
    start: Option<NodeId>,
    next: Option<NodeId>,
}

impl<'a> RowColumns<'a> {
    pub(crate) const fn from_node(nodes: &'a [Node], node: NodeId) -> Self {
        Self {
            nodes,
            start: Some(node),
            next: Some(node),
        }
    }

    /// Id of the row, or `None` for an empty row.
    #[must_use]
    pub fn id(&self) -> Option<RowId> {
        self.start
            .map(|node| self.nodes[node].row)
            .filter(|&row| row != NO_ROW)
    }
}

impl Iterator for RowColumns<'_> {
    type Item = ColumnId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        let right = self.nodes[current].right;
        self.next = (Some(right) != self.start).then_some(right);
        Some(self.nodes[current].column)
    }
}
