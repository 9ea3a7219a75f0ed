//! Iterative walkers over derivation trees.
//!
//! [`walk`] visits the root with an initial input; the visitor then decides
//! which children to traverse, and with which input, through the
//! [`WalkerHandle`] it receives. Nothing is visited unless it is scheduled,
//! which makes pruned searches (stop at the first match, skip error
//! subtrees, ...) straightforward.
//!
//! Traversal strategy
//! - Explicit stack, no recursion: deep trees cannot overflow the call stack.
//! - Children scheduled with [`WalkerHandle::schedule_visit`] during one visit are
//!   visited in the order they were scheduled, before any sibling of the current
//!   node. Scheduling every child in index order therefore yields a
//!   left-to-right pre-order (ingredient1 subtree before ingredient2 subtree).
//! - [`WalkerHandle::schedule_deferred`] appends to the back of the queue instead,
//!   for breadth-first sweeps.
//!
//! Example: count the recipe nodes of a tree
//! ```
//! use crafttree::prelude::*;
//!
//! let path = Path::new(vec![
//!     RecipeStep::new("Water", "Fire", "Steam"),
//!     RecipeStep::new("Steam", "Earth", "Geyser"),
//! ]);
//! let tree = TreeBuilder::default().build_tree(&path, "Geyser");
//!
//! let mut recipes = 0usize;
//! walk_no_input(&tree, |node| {
//!     if node.kind.is_recipe() {
//!         recipes += 1;
//!     }
//!     node.schedule_children(());
//! });
//! assert_eq!(recipes, 2);
//! ```
mod internal;

use std::ops::Deref;

use internal::{InternalWalkerHandle, InternalWalkerState};

use crate::node::{NodeRef, TreeNode};

/// Handle passed to the visitor, representing the current node plus scheduling control.
///
/// Derefs to the visited [`TreeNode`].
pub struct WalkerHandle<'s, 'a, I> {
    internal: InternalWalkerHandle<'s, 'a, I>,
}

impl<'s, 'a, I> WalkerHandle<'s, 'a, I> {
    /// Location of the visited node relative to the root.
    #[inline]
    pub fn node_ref(&self) -> &NodeRef {
        &self.internal.node_ref
    }

    /// The visited node, with the lifetime of the walked tree.
    #[inline]
    pub fn node(&self) -> &'a TreeNode {
        self.internal.node
    }

    /// Check if this node is the root of the walked tree.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.internal.node_ref.route.is_empty()
    }

    /// Schedule the `index`-th child for a depth-first visit.
    ///
    /// Returns `false` if the node has no such child.
    #[inline]
    pub fn schedule_visit(&self, index: usize, input: I) -> bool {
        self.internal.schedule_immediate(index, input)
    }

    /// Schedule the `index`-th child after everything already queued.
    #[inline]
    pub fn schedule_deferred(&self, index: usize, input: I) -> bool {
        self.internal.schedule_deferred(index, input)
    }

    /// Schedule every child, left to right, with a clone of `input`.
    pub fn schedule_children(&self, input: I)
    where
        I: Clone,
    {
        for index in 0..self.internal.node.children.len() {
            self.schedule_visit(index, input.clone());
        }
    }

    /// Stop the whole traversal once the visitor returns. Children scheduled
    /// during this visit are dropped as well.
    #[inline]
    pub fn break_(&self) {
        self.internal.break_();
    }
}

impl<'s, 'a, I> Deref for WalkerHandle<'s, 'a, I> {
    type Target = TreeNode;

    #[inline]
    fn deref(&self) -> &TreeNode {
        self.internal.node
    }
}

/// Walk a tree depth-first, visiting only what the visitor schedules.
///
/// Determinism: for a given tree and visitor the visiting order is fixed.
pub fn walk<'a, F, I>(root: &'a TreeNode, input: I, mut walker: F)
where
    F: FnMut(I, WalkerHandle<'_, 'a, I>),
{
    let state = InternalWalkerState::new(root, input);

    while let Some((node, node_ref, input)) = state.pop() {
        walker(
            input,
            WalkerHandle {
                internal: InternalWalkerHandle {
                    state: &state,
                    node,
                    node_ref,
                },
            },
        );
        state.flush();
    }
}

/// Convenience when no input/state needs to be threaded.
#[inline]
pub fn walk_no_input<'a, F>(root: &'a TreeNode, mut walker: F)
where
    F: FnMut(WalkerHandle<'_, 'a, ()>),
{
    walk(root, (), |(), node| walker(node));
}

/// Collect every node of the tree in left-to-right pre-order.
pub fn preorder(root: &TreeNode) -> Vec<(&TreeNode, NodeRef)> {
    let mut nodes = Vec::new();
    walk_no_input(root, |node| {
        nodes.push((node.node(), node.node_ref().clone()));
        node.schedule_children(());
    });
    nodes
}
