#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The cover/uncover engine.
//!
//! `cover` removes a column from the master ring and every row that
//! intersects it from the other columns those rows touch. `uncover` replays
//! the removal backwards. Removed nodes keep their stale links, so the
//! restoration is only correct if it runs in exactly the reverse order:
//! bottom-to-top instead of top-to-bottom, right-to-left instead of
//! left-to-right.

use crate::dlx::matrix::Matrix;
use crate::dlx::node::{ColumnId, Links, NodeId};

impl<L> Matrix<L> {
    /// Covers `column`: unlinks its header from the master ring, then
    /// unlinks every other node of every row in the column from its own
    /// column, decrementing the live counts.
    ///
    /// Must be undone by [`Matrix::uncover`] in LIFO order with any other
    /// covers.
    pub fn cover(&mut self, column: ColumnId) {
        debug_assert!(column != 0 && column <= self.column_count());

        self.unlink_horizontal(column);

        let mut row = self.down(column);
        while row != column {
            let mut node = self.right(row);
            while node != row {
                self.unlink_vertical(node);
                let other = self.column_of(node);
                self.sizes[other] -= 1;
                node = self.right(node);
            }
            row = self.down(row);
        }
    }

    /// Uncovers `column`, restoring the state from before the matching
    /// [`Matrix::cover`].
    pub fn uncover(&mut self, column: ColumnId) {
        debug_assert!(column != 0 && column <= self.column_count());

        let mut row = self.up(column);
        while row != column {
            let mut node = self.left(row);
            while node != row {
                let other = self.column_of(node);
                self.sizes[other] += 1;
                self.relink_vertical(node);
                node = self.left(node);
            }
            row = self.up(row);
        }

        self.relink_horizontal(column);
    }

    /// Covers every column of the row containing `node`, other than the
    /// node's own column, walking rightwards.
    pub(crate) fn cover_row(&mut self, node: NodeId) {
        let mut other = self.right(node);
        while other != node {
            self.cover(self.column_of(other));
            other = self.right(other);
        }
    }

    /// Undoes [`Matrix::cover_row`], walking leftwards.
    pub(crate) fn uncover_row(&mut self, node: NodeId) {
        let mut other = self.left(node);
        while other != node {
            self.uncover(self.column_of(other));
            other = self.left(other);
        }
    }
}
