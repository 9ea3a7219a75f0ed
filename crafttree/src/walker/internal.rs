//! Internal primitives powering the public walker API.
//!
//! Scheduling state lives here so that the public [`WalkerHandle`](super::WalkerHandle)
//! only exposes the operations a visitor is allowed to perform.
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use smallvec::SmallVec;

use crate::node::{NodeRef, TreeNode};

/// Internal stack type: triples of (node, location, input).
pub(super) type WalkerStackType<'a, I> = VecDeque<(&'a TreeNode, NodeRef, I)>;

/// Children scheduled during one visit, flushed once the visitor returns.
pub(super) type PendingBuffer<'a, I> = RefCell<SmallVec<(&'a TreeNode, NodeRef, I), 2>>;

pub(super) struct InternalWalkerState<'a, I> {
    pub(super) stack: RefCell<WalkerStackType<'a, I>>,
    pub(super) immediate: PendingBuffer<'a, I>,
    pub(super) deferred: PendingBuffer<'a, I>,
    pub(super) broken: Cell<bool>,
}

impl<'a, I> InternalWalkerState<'a, I> {
    pub(super) fn new(root: &'a TreeNode, input: I) -> Self {
        let mut stack = VecDeque::new();
        stack.push_front((root, NodeRef::root(), input));
        Self {
            stack: RefCell::new(stack),
            immediate: RefCell::new(SmallVec::new()),
            deferred: RefCell::new(SmallVec::new()),
            broken: Cell::new(false),
        }
    }

    pub(super) fn pop(&self) -> Option<(&'a TreeNode, NodeRef, I)> {
        if self.broken.get() {
            return None;
        }
        self.stack.borrow_mut().pop_front()
    }

    /// Move the children scheduled by the last visit onto the stack.
    ///
    /// Immediate children are pushed in reverse so that the first scheduled
    /// child is visited first, which keeps the traversal a left-to-right
    /// pre-order when every child is scheduled in index order.
    pub(super) fn flush(&self) {
        let mut stack = self.stack.borrow_mut();
        if self.broken.get() {
            stack.clear();
            self.immediate.borrow_mut().clear();
            self.deferred.borrow_mut().clear();
            return;
        }
        for entry in self.immediate.borrow_mut().drain(..).rev() {
            stack.push_front(entry);
        }
        for entry in self.deferred.borrow_mut().drain(..) {
            stack.push_back(entry);
        }
    }
}

/// Handle for scheduling children of the node currently visited.
pub(super) struct InternalWalkerHandle<'s, 'a, I> {
    pub(super) state: &'s InternalWalkerState<'a, I>,
    pub(super) node: &'a TreeNode,
    pub(super) node_ref: NodeRef,
}

impl<'s, 'a, I> InternalWalkerHandle<'s, 'a, I> {
    fn child(&self, index: usize) -> Option<(&'a TreeNode, NodeRef)> {
        let child = self.node.children.get(index)?;
        let child_ref = self.node_ref.child(index, child.depth());
        Some((child.as_ref(), child_ref))
    }

    /// Schedule the child to be visited immediately (LIFO/DFS).
    pub(super) fn schedule_immediate(&self, index: usize, input: I) -> bool {
        let Some((child, child_ref)) = self.child(index) else {
            return false;
        };
        self.state
            .immediate
            .borrow_mut()
            .push((child, child_ref, input));
        true
    }

    /// Schedule the child to be visited later (FIFO/BFS).
    pub(super) fn schedule_deferred(&self, index: usize, input: I) -> bool {
        let Some((child, child_ref)) = self.child(index) else {
            return false;
        };
        self.state
            .deferred
            .borrow_mut()
            .push((child, child_ref, input));
        true
    }

    /// Stop the traversal once the current visitor returns.
    pub(super) fn break_(&self) {
        self.state.broken.set(true);
    }
}
