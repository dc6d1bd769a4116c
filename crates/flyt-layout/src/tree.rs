//! Tree reconstruction from begin/end markers, and pre-order traversal.

use tracing::trace;

use crate::group::{Group, GroupId};
use crate::header::Tag;
use crate::pane::{Pane, PaneId};
use crate::{Error, Result};

/// Decode-time state for one marker-delimited tree.
///
/// `current` is the node most recently placed (or returned to by an end
/// marker); the stack holds the open ancestors, its top being the parent of
/// the next node.
#[derive(Debug)]
pub(crate) struct TreeCursor<I> {
    begin: Tag,
    end: Tag,
    root: Option<I>,
    current: Option<I>,
    open: Vec<I>,
}

impl<I: Copy + std::fmt::Debug> TreeCursor<I> {
    pub(crate) fn new(begin: Tag, end: Tag) -> Self {
        Self {
            begin,
            end,
            root: None,
            current: None,
            open: Vec::new(),
        }
    }

    /// Parent for a node arriving at `offset`. `None` means the node is the
    /// root; a top-level node after the root is rejected.
    pub(crate) fn place(&self, tag: Tag, offset: usize) -> Result<Option<I>> {
        match (self.open.last(), self.root) {
            (Some(&parent), _) => Ok(Some(parent)),
            (None, None) => Ok(None),
            (None, Some(_)) => Err(Error::MultipleRoots { tag, offset }),
        }
    }

    /// Record a node that has just been attached.
    pub(crate) fn entered(&mut self, id: I) {
        if self.root.is_none() {
            self.root = Some(id);
        }
        trace!(?id, depth = self.open.len(), "node");
        self.current = Some(id);
    }

    /// Begin marker: the current node becomes the parent of what follows.
    /// Returns that node.
    pub(crate) fn push(&mut self, offset: usize) -> Result<I> {
        let current = self.current.ok_or(Error::BeginWithoutNode {
            tag: self.begin,
            offset,
        })?;
        self.open.push(current);
        trace!(?current, depth = self.open.len(), "open");
        Ok(current)
    }

    /// End marker: return to the innermost open node, which is returned.
    pub(crate) fn pop(&mut self, offset: usize) -> Result<I> {
        let closed = self.open.pop().ok_or(Error::UnmatchedEnd {
            tag: self.end,
            offset,
        })?;
        trace!(?closed, depth = self.open.len(), "close");
        self.current = Some(closed);
        Ok(closed)
    }

    /// Finish decoding and return the root.
    pub(crate) fn finish(self) -> Result<Option<I>> {
        if !self.open.is_empty() {
            return Err(Error::UnclosedBegin {
                tag: self.begin,
                open: self.open.len(),
            });
        }
        Ok(self.root)
    }
}

/// A node type stored in a document arena.
pub trait TreeNode {
    type Id: Copy;

    fn child_ids(&self) -> &[Self::Id];

    fn arena_index(id: Self::Id) -> usize;
}

impl TreeNode for Pane {
    type Id = PaneId;

    fn child_ids(&self) -> &[PaneId] {
        self.children()
    }

    fn arena_index(id: PaneId) -> usize {
        id.index()
    }
}

impl TreeNode for Group {
    type Id = GroupId;

    fn child_ids(&self) -> &[GroupId] {
        self.children()
    }

    fn arena_index(id: GroupId) -> usize {
        id.index()
    }
}

/// A node reached during a pre-order walk.
pub struct Visit<'a, N: TreeNode> {
    pub id: N::Id,
    pub node: &'a N,
    /// Distance from the root (the root has depth 0).
    pub depth: usize,
}

/// Pre-order iterator over an arena tree, children in file order.
pub struct PreOrder<'a, N: TreeNode> {
    nodes: &'a [N],
    stack: Vec<(N::Id, usize)>,
}

impl<'a, N: TreeNode> PreOrder<'a, N> {
    pub(crate) fn new(nodes: &'a [N], root: Option<N::Id>) -> Self {
        Self {
            nodes,
            stack: root.map(|id| (id, 0)).into_iter().collect(),
        }
    }
}

impl<'a, N: TreeNode> Iterator for PreOrder<'a, N> {
    type Item = Visit<'a, N>;

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.stack.pop()?;
        let node = self.nodes.get(N::arena_index(id))?;
        // Reverse so the first child is popped first.
        self.stack
            .extend(node.child_ids().iter().rev().map(|&child| (child, depth + 1)));
        Some(Visit { id, node, depth })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor() -> TreeCursor<usize> {
        TreeCursor::new(Tag::PANE_START, Tag::PANE_END)
    }

    #[test]
    fn test_nested_markers() {
        let mut tree = cursor();
        assert_eq!(tree.place(Tag::PANE, 0).unwrap(), None);
        tree.entered(0);
        tree.push(1).unwrap();
        assert_eq!(tree.place(Tag::PICTURE, 2).unwrap(), Some(0));
        tree.entered(1);
        tree.push(3).unwrap();
        assert_eq!(tree.place(Tag::TEXT, 4).unwrap(), Some(1));
        tree.entered(2);
        tree.pop(5).unwrap();
        // Back under the root after closing pane 1.
        assert_eq!(tree.place(Tag::BOUNDS, 6).unwrap(), Some(0));
        tree.entered(3);
        tree.pop(7).unwrap();
        assert_eq!(tree.finish().unwrap(), Some(0));
    }

    #[test]
    fn test_extra_end_marker() {
        let mut tree = cursor();
        tree.entered(0);
        for offset in 0..4 {
            tree.push(offset).unwrap();
        }
        for offset in 4..8 {
            tree.pop(offset).unwrap();
        }
        let err = tree.pop(8).unwrap_err();
        assert!(matches!(err, Error::UnmatchedEnd { offset: 8, .. }));
        assert!(err.is_format_error());
    }

    #[test]
    fn test_begin_without_node() {
        let mut tree = cursor();
        assert!(matches!(
            tree.push(0x20),
            Err(Error::BeginWithoutNode { offset: 0x20, .. })
        ));
    }

    #[test]
    fn test_unclosed_begin() {
        let mut tree = cursor();
        tree.entered(0);
        tree.push(0).unwrap();
        tree.push(1).unwrap();
        assert!(matches!(
            tree.finish(),
            Err(Error::UnclosedBegin { open: 2, .. })
        ));
    }

    #[test]
    fn test_second_root() {
        let mut tree = cursor();
        tree.entered(0);
        assert!(matches!(
            tree.place(Tag::PANE, 0x40),
            Err(Error::MultipleRoots { offset: 0x40, .. })
        ));
    }

    #[test]
    fn test_empty_tree() {
        assert_eq!(cursor().finish().unwrap(), None);
    }
}
