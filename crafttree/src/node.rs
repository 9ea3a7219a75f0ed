//! Immutable derivation-tree nodes.
//!
//! A tree is a value: children are shared behind [`Arc`], and every change
//! ([`TreeNode::replace_at`]) path-copies the nodes from the root down to the
//! modified one. Snapshots handed out earlier are never affected, so the live
//! engine can publish one tree per tick without aliasing concerns.
//!
//! Equality is structural: two independently built trees compare equal when
//! they have the same shape, names, kinds and attributes.

use std::sync::Arc;

use serde::{Serialize, ser::SerializeMap};
use smallvec::SmallVec;
use strum::{EnumIs, IntoStaticStr};

use crate::recipe::RecipeStep;

/// Shared handle to a tree snapshot.
pub type TreeRoot = Arc<TreeNode>;

/// Children of a node. Recipe nodes hold exactly two, element nodes at most one.
pub type Children = SmallVec<Arc<TreeNode>, 2>;

/// What a node stands for.
#[derive(Debug, Clone, PartialEq, Eq, EnumIs, IntoStaticStr)]
pub enum NodeKind {
    /// A craftable or base element.
    #[strum(serialize = "Element")]
    Element { base: bool },
    /// One application of a recipe; its children are the two ingredients.
    #[strum(serialize = "Recipe")]
    Recipe(RecipeStep),
    /// Expansion cut off by the depth ceiling.
    #[strum(serialize = "Error")]
    Error { info: &'static str },
}

impl NodeKind {
    /// Label used by the renderer to pick a node style.
    pub fn type_label(&self) -> &'static str {
        match self {
            NodeKind::Element { base: true } => "Base Element",
            kind => kind.into(),
        }
    }
}

/// Display attributes carried by every node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAttributes {
    /// Layout depth; recipe nodes sit one level below their result.
    pub depth: u32,
    /// Element name (or recipe label) without any decoration.
    pub original_name: String,
    /// Image path from the solver's image table, if any.
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    pub kind: NodeKind,
    pub attributes: NodeAttributes,
    pub children: Children,
}

/// Location of a node: child indices from the root plus the node's depth.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NodeRef {
    pub route: SmallVec<u8, 16>,
    pub depth: u32,
}

impl NodeRef {
    pub fn root() -> Self {
        Self::default()
    }

    /// Reference to the `index`-th child of this node.
    pub fn child(&self, index: usize, depth: u32) -> Self {
        let mut route = self.route.clone();
        route.push(index as u8);
        Self { route, depth }
    }
}

impl TreeNode {
    #[inline]
    pub fn depth(&self) -> u32 {
        self.attributes.depth
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Element name this node was built for.
    pub fn element(&self) -> &str {
        &self.attributes.original_name
    }

    /// Recipe step carried by this node, if it is a recipe node.
    pub fn recipe(&self) -> Option<&RecipeStep> {
        match &self.kind {
            NodeKind::Recipe(step) => Some(step),
            _ => None,
        }
    }

    /// Whether a recipe child combining exactly these ingredients is attached.
    pub fn has_recipe_child(&self, ingredient1: &str, ingredient2: &str) -> bool {
        self.children.iter().any(|child| {
            child
                .recipe()
                .is_some_and(|step| step.same_ingredients(ingredient1, ingredient2))
        })
    }

    /// Follow `node_ref` from this node.
    pub fn get(&self, node_ref: &NodeRef) -> Option<&TreeNode> {
        let mut current = self;
        for &index in node_ref.route.iter() {
            current = current.children.get(index as usize)?.as_ref();
        }
        Some(current)
    }

    /// Produce a new tree where the node at `node_ref` is replaced by `f(node)`.
    ///
    /// Only the nodes along the route are copied; every other subtree is shared
    /// with `root`. Returns `None` if the route does not exist.
    pub fn replace_at(
        root: &TreeRoot,
        node_ref: &NodeRef,
        f: impl FnOnce(&TreeNode) -> TreeNode,
    ) -> Option<TreeRoot> {
        fn rebuild(
            node: &TreeRoot,
            route: &[u8],
            f: impl FnOnce(&TreeNode) -> TreeNode,
        ) -> Option<TreeRoot> {
            let Some((&head, tail)) = route.split_first() else {
                return Some(Arc::new(f(node)));
            };
            let child = node.children.get(head as usize)?;
            let new_child = rebuild(child, tail, f)?;

            let mut copy = TreeNode::clone(node);
            copy.children[head as usize] = new_child;
            Some(Arc::new(copy))
        }

        rebuild(root, &node_ref.route, f)
    }

    /// Number of nodes in this subtree.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(|c| c.count()).sum::<usize>()
    }

    /// Largest depth attribute found in this subtree.
    pub fn max_depth(&self) -> u32 {
        self.children
            .iter()
            .map(|c| c.max_depth())
            .fold(self.depth(), u32::max)
    }
}

struct RenderAttributes<'a>(&'a TreeNode);

impl Serialize for RenderAttributes<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let node = self.0;
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", node.kind.type_label())?;
        map.serialize_entry("depth", &node.attributes.depth)?;
        map.serialize_entry("originalName", &node.attributes.original_name)?;
        if let Some(url) = &node.attributes.image_url {
            map.serialize_entry("imageUrl", url)?;
        }
        match &node.kind {
            NodeKind::Recipe(step) => {
                map.serialize_entry("result", &step.result)?;
                map.serialize_entry("ingredient1", &step.ingredient1)?;
                map.serialize_entry("ingredient2", &step.ingredient2)?;
            }
            NodeKind::Error { info } => {
                map.serialize_entry("info", info)?;
            }
            NodeKind::Element { .. } => {}
        }
        map.end()
    }
}

/// Serialises into the nested `{ name, attributes, children }` shape consumed by
/// tree renderers.
impl Serialize for TreeNode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("attributes", &RenderAttributes(self))?;
        let children: Vec<&TreeNode> = self.children.iter().map(Arc::as_ref).collect();
        map.serialize_entry("children", &children)?;
        map.end()
    }
}

/// Convenience for the external renderer, which expects a one-element array.
pub fn render_json(root: &TreeNode) -> serde_json::Value {
    serde_json::Value::Array(vec![
        serde_json::to_value(root).unwrap_or(serde_json::Value::Null),
    ])
}
