#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Arena records for the toroidal sparse matrix.
//!
//! Every link is an index into the matrix's node vector rather than a
//! pointer. A node that has been spliced out of a list keeps its own
//! `left`/`right` or `up`/`down` fields untouched, which is exactly the
//! information needed to splice it back in later.

/// Index of a column. Column `0` is the master sentinel; real columns are
/// numbered from `1`.
pub type ColumnId = usize;

/// Dense identifier of an appended row, starting at `0`.
pub type RowId = usize;

/// Index of a node in the arena.
pub type NodeId = usize;

/// The master sentinel always lives at index zero.
pub(crate) const ROOT: NodeId = 0;

/// Row id carried by header nodes, which belong to no row.
pub(crate) const NO_ROW: RowId = RowId::MAX;

/// A single 1-entry of the matrix, or a column header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Node {
    /// Previous node in the same row (or the master ring, for headers).
    pub left: NodeId,
    /// Next node in the same row (or the master ring, for headers).
    pub right: NodeId,
    /// Previous node in the same column.
    pub up: NodeId,
    /// Next node in the same column.
    pub down: NodeId,
    /// Header of the column this node belongs to. Headers point at themselves.
    pub column: ColumnId,
    /// Row this node was appended with.
    pub row: RowId,
}

impl Node {
    /// A header whose links all point back at itself.
    pub(crate) const fn header(index: NodeId) -> Self {
        Self {
            left: index,
            right: index,
            up: index,
            down: index,
            column: index,
            row: NO_ROW,
        }
    }
}

/// Link surgery on the arena. Kept free of any search logic so the cover
/// engine reads as a sequence of splices.
pub(crate) trait Links {
    fn nodes(&self) -> &[Node];
    fn nodes_mut(&mut self) -> &mut [Node];

    fn left(&self, node: NodeId) -> NodeId {
        self.nodes()[node].left
    }

    fn right(&self, node: NodeId) -> NodeId {
        self.nodes()[node].right
    }

    fn up(&self, node: NodeId) -> NodeId {
        self.nodes()[node].up
    }

    fn down(&self, node: NodeId) -> NodeId {
        self.nodes()[node].down
    }

    fn column_of(&self, node: NodeId) -> ColumnId {
        self.nodes()[node].column
    }

    /// `node.left.right <- node.right; node.right.left <- node.left`
    fn unlink_horizontal(&mut self, node: NodeId) {
        let Node { left, right, .. } = self.nodes()[node];
        let nodes = self.nodes_mut();
        nodes[left].right = right;
        nodes[right].left = left;
    }

    /// `node.left.right <- node; node.right.left <- node`
    fn relink_horizontal(&mut self, node: NodeId) {
        let Node { left, right, .. } = self.nodes()[node];
        let nodes = self.nodes_mut();
        nodes[right].left = node;
        nodes[left].right = node;
    }

    /// `node.up.down <- node.down; node.down.up <- node.up`
    fn unlink_vertical(&mut self, node: NodeId) {
        let Node { up, down, .. } = self.nodes()[node];
        let nodes = self.nodes_mut();
        nodes[down].up = up;
        nodes[up].down = down;
    }

    /// `node.up.down <- node; node.down.up <- node`
    fn relink_vertical(&mut self, node: NodeId) {
        let Node { up, down, .. } = self.nodes()[node];
        let nodes = self.nodes_mut();
        nodes[down].up = node;
        nodes[up].down = node;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Arena(Vec<Node>);

    impl Links for Arena {
        fn nodes(&self) -> &[Node] {
            &self.0
        }

        fn nodes_mut(&mut self) -> &mut [Node] {
            &mut self.0
        }
    }

    /// Three headers in a horizontal ring: 0 <-> 1 <-> 2 <-> 0.
    fn ring() -> Arena {
        let mut nodes: Vec<Node> = (0..3).map(Node::header).collect();
        for i in 0..3 {
            nodes[i].right = (i + 1) % 3;
            nodes[i].left = (i + 2) % 3;
        }
        Arena(nodes)
    }

    #[test]
    fn test_header_is_self_linked() {
        let node = Node::header(7);
        assert_eq!(node.left, 7);
        assert_eq!(node.right, 7);
        assert_eq!(node.up, 7);
        assert_eq!(node.down, 7);
        assert_eq!(node.column, 7);
        assert_eq!(node.row, NO_ROW);
    }

    #[test]
    fn test_unlink_keeps_own_links() {
        let mut arena = ring();
        arena.unlink_horizontal(1);

        assert_eq!(arena.right(0), 2);
        assert_eq!(arena.left(2), 0);
        // The removed node still remembers where it was.
        assert_eq!(arena.left(1), 0);
        assert_eq!(arena.right(1), 2);
    }

    #[test]
    fn test_relink_restores_ring() {
        let mut arena = ring();
        let before = arena.0.clone();

        arena.unlink_horizontal(1);
        arena.relink_horizontal(1);

        assert_eq!(arena.0, before);
    }

    #[test]
    fn test_vertical_unlink_relink() {
        let mut nodes: Vec<Node> = (0..3).map(Node::header).collect();
        for i in 0..3 {
            nodes[i].down = (i + 1) % 3;
            nodes[i].up = (i + 2) % 3;
        }
        let mut arena = Arena(nodes);
        let before = arena.0.clone();

        arena.unlink_vertical(2);
        assert_eq!(arena.down(1), 0);
        assert_eq!(arena.up(0), 1);

        arena.relink_vertical(2);
        assert_eq!(arena.0, before);
    }
}
