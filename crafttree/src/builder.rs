//! Static derivation-tree construction.
//!
//! [`TreeBuilder::build_tree`] turns a whole path into its final tree in one
//! pass. The single-node constructors ([`TreeBuilder::element_node`],
//! [`TreeBuilder::recipe_node`], [`TreeBuilder::cutoff_node`]) are shared with
//! the expansion policy so that a tree revealed step by step ends up with
//! exactly the nodes the static builder would have produced.

use std::sync::Arc;

use log::debug;
use smallvec::smallvec;

use crate::{
    config::TreeConfig,
    element::BaseElements,
    images::ImageTable,
    magic::{DEFAULT_MAX_DEPTH, DEPTH_LIMIT_INFO, DEPTH_LIMIT_SUFFIX, UNKNOWN_ELEMENT},
    node::{NodeAttributes, NodeKind, TreeNode, TreeRoot},
    recipe::{Path, RecipeIndex, RecipeStep},
};

#[derive(Debug, Clone)]
pub struct TreeBuilder {
    base_elements: BaseElements,
    images: Arc<ImageTable>,
    max_depth: u32,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self {
            base_elements: BaseElements::canonical(),
            images: Arc::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl TreeBuilder {
    pub fn new(base_elements: BaseElements, images: Arc<ImageTable>, max_depth: u32) -> Self {
        Self {
            base_elements,
            images,
            max_depth,
        }
    }

    pub fn from_config(config: &TreeConfig, images: Arc<ImageTable>) -> Self {
        Self::new(config.base_elements.clone(), images, config.max_depth)
    }

    pub fn with_images(mut self, images: Arc<ImageTable>) -> Self {
        self.images = images;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[inline]
    pub fn base_elements(&self) -> &BaseElements {
        &self.base_elements
    }

    #[inline]
    pub fn images(&self) -> &Arc<ImageTable> {
        &self.images
    }

    #[inline]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    #[inline]
    pub fn is_base_element(&self, name: &str) -> bool {
        self.base_elements.contains(name)
    }

    /// Collapsed element node (no children) at `depth`.
    pub fn element_node(&self, name: &str, depth: u32) -> TreeNode {
        let name = if name.is_empty() { UNKNOWN_ELEMENT } else { name };
        TreeNode {
            name: name.to_string(),
            kind: NodeKind::Element {
                base: self.is_base_element(name),
            },
            attributes: NodeAttributes {
                depth,
                original_name: name.to_string(),
                image_url: self.images.get(name).map(str::to_string),
            },
            children: smallvec![],
        }
    }

    /// Node marking that `name` was cut off by the depth ceiling.
    pub fn cutoff_node(&self, name: &str, depth: u32) -> TreeNode {
        let name = if name.is_empty() { UNKNOWN_ELEMENT } else { name };
        TreeNode {
            name: format!("{name} {DEPTH_LIMIT_SUFFIX}"),
            kind: NodeKind::Error {
                info: DEPTH_LIMIT_INFO,
            },
            attributes: NodeAttributes {
                depth,
                original_name: name.to_string(),
                image_url: None,
            },
            children: smallvec![],
        }
    }

    /// Element node at `depth`, or a cutoff node if `depth` is past the ceiling.
    pub fn element_or_cutoff(&self, name: &str, depth: u32) -> TreeNode {
        if depth > self.max_depth {
            self.cutoff_node(name, depth)
        } else {
            self.element_node(name, depth)
        }
    }

    /// Recipe node for `step` at `depth` holding the two given ingredient nodes.
    pub fn recipe_node(
        &self,
        step: &RecipeStep,
        depth: u32,
        ingredient1: TreeNode,
        ingredient2: TreeNode,
    ) -> TreeNode {
        let label = step.label();
        TreeNode {
            name: label.clone(),
            kind: NodeKind::Recipe(step.clone()),
            attributes: NodeAttributes {
                depth,
                original_name: label,
                image_url: None,
            },
            children: smallvec![Arc::new(ingredient1), Arc::new(ingredient2)],
        }
    }

    /// Recipe node for `step` whose ingredients are collapsed leaves.
    ///
    /// `depth` is the depth of the element the recipe produces.
    pub fn collapsed_recipe(&self, step: &RecipeStep, depth: u32) -> TreeNode {
        self.recipe_node(
            step,
            depth + 1,
            self.element_or_cutoff(&step.ingredient1, depth + 2),
            self.element_or_cutoff(&step.ingredient2, depth + 2),
        )
    }

    /// Single leaf for `target`, as shown before any recipe is revealed.
    pub fn leaf(&self, target: &str) -> TreeRoot {
        Arc::new(self.element_node(target, 0))
    }

    /// Build the complete derivation tree of `target` from `path`.
    ///
    /// A base-element target or an empty path yields a single leaf. Otherwise
    /// every element produced by a step of the path is expanded, at every place
    /// it occurs, down to the base elements. When the path has several steps for
    /// the same result, the last one wins.
    pub fn build_tree(&self, path: &Path, target: &str) -> TreeRoot {
        if self.is_base_element(target) || path.is_empty() {
            return self.leaf(target);
        }

        let index = RecipeIndex::new(path);
        let root = self.expand_element(target, &index, 0);
        debug!(
            "Built tree for `{target}` from {} steps: {} nodes, depth {}",
            path.len(),
            root.count(),
            root.max_depth()
        );
        Arc::new(root)
    }

    fn expand_element(&self, name: &str, index: &RecipeIndex<'_>, depth: u32) -> TreeNode {
        if depth > self.max_depth {
            debug!("Depth ceiling reached at `{name}` (depth {depth})");
            return self.cutoff_node(name, depth);
        }

        let mut node = self.element_node(name, depth);
        if self.is_base_element(name) {
            return node;
        }

        if let Some(step) = index.get(name) {
            let ingredient1 = self.expand_element(&step.ingredient1, index, depth + 2);
            let ingredient2 = self.expand_element(&step.ingredient2, index, depth + 2);
            node.children
                .push(Arc::new(self.recipe_node(step, depth + 1, ingredient1, ingredient2)));
        }
        node
    }
}
