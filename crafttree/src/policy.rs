//! Node expansion policy for incremental tree reveal.
//!
//! Given a partially revealed tree and one recipe step, the policy picks the
//! element node the step should be attached to. Targets are searched in
//! left-to-right pre-order, so when an element occurs several times the
//! occurrence under `ingredient1` is always expanded before the one under
//! `ingredient2`.
//!
//! A node is an expansion target for a step when
//! - it is an element node (never a recipe or error node),
//! - it is not a base element,
//! - its name is the step's result,
//! - it does not already hold a recipe child with the step's two ingredients.
//!
//! The last rule makes expansion idempotent: once a node has been expanded
//! with a step, the same step can never be attached to it again.

use std::sync::Arc;

use log::warn;
use smallvec::smallvec;

use crate::{
    builder::TreeBuilder,
    node::{NodeKind, NodeRef, TreeNode, TreeRoot},
    recipe::RecipeStep,
    walker::walk_no_input,
};

/// Result of applying one step to a tree.
#[derive(Debug, Clone)]
pub struct Expansion {
    /// Tree after the expansion; the input snapshot if nothing was expanded.
    pub tree: TreeRoot,
    /// Node the step was attached to, if any.
    pub target: Option<NodeRef>,
}

impl Expansion {
    #[inline]
    pub fn expanded(&self) -> bool {
        self.target.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExpansionPolicy {
    builder: TreeBuilder,
}

impl ExpansionPolicy {
    pub fn new(builder: TreeBuilder) -> Self {
        Self { builder }
    }

    #[inline]
    pub fn builder(&self) -> &TreeBuilder {
        &self.builder
    }

    /// Whether `node` may receive `step`.
    pub fn is_expansion_target(&self, node: &TreeNode, step: &RecipeStep) -> bool {
        matches!(node.kind, NodeKind::Element { base: false })
            && !self.builder.is_base_element(node.element())
            && node.element() == step.result.as_str()
            && !node.has_recipe_child(&step.ingredient1, &step.ingredient2)
    }

    /// First expansion target for `step` in pre-order, if any remains.
    pub fn find_expansion_target(&self, tree: &TreeNode, step: &RecipeStep) -> Option<NodeRef> {
        let mut found = None;
        walk_no_input(tree, |node| {
            if self.is_expansion_target(&node, step) {
                found = Some(node.node_ref().clone());
                node.break_();
                return;
            }
            // Error nodes and collapsed leaves have no children to schedule.
            node.schedule_children(());
        });
        found
    }

    /// Whether some node of `tree` still qualifies as a target for `step`.
    ///
    /// This is the case when the step's result occurs more than once in the
    /// tree: the step has to be applied again before moving on, otherwise the
    /// other occurrences would stay collapsed.
    #[inline]
    pub fn needs_further_expansion(&self, tree: &TreeNode, step: &RecipeStep) -> bool {
        self.find_expansion_target(tree, step).is_some()
    }

    /// Attach `step` to the first target of `tree`.
    ///
    /// The target's children are replaced by a single recipe node whose two
    /// ingredients are collapsed element nodes; they are expanded later by
    /// their own steps. The input snapshot is left untouched.
    pub fn expand(&self, tree: &TreeRoot, step: &RecipeStep) -> Expansion {
        let Some(target) = self.find_expansion_target(tree, step) else {
            return Expansion {
                tree: Arc::clone(tree),
                target: None,
            };
        };

        let new_tree = TreeNode::replace_at(tree, &target, |node| {
            let mut expanded = node.clone();
            expanded.children = smallvec![Arc::new(
                self.builder.collapsed_recipe(step, node.depth())
            )];
            expanded
        });

        match new_tree {
            Some(new_tree) => Expansion {
                tree: new_tree,
                target: Some(target),
            },
            None => {
                warn!("Expansion target {target:?} for `{step}` does not resolve");
                Expansion {
                    tree: Arc::clone(tree),
                    target: None,
                }
            }
        }
    }
}
