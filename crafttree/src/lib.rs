//! Crafttree: derivation trees for two-ingredient crafting recipes.
//!
//! An external solver answers "how do I craft X?" with a *path*: an ordered
//! list of steps `ingredient1 + ingredient2 => result`. This crate turns such a
//! path into the tree that explains it, and provides the pieces needed to
//! reveal that tree one step at a time.
//!
//! - [`recipe`]: steps, paths and the result-to-step index.
//! - [`builder`]: the static builder producing the final tree of a path.
//! - [`policy`]: the expansion policy used by the incremental reveal.
//! - [`node`]: immutable tree snapshots and their JSON render contract.
//! - [`walker`]: an explicit-stack tree walker used to search snapshots.
//! - [`search`]: ingestion of the solver's search result.
//! - [`pretty`]: colored terminal rendering of trees.
//!
//! Trees are immutable: every change produces a new root that shares all
//! untouched subtrees with the previous one.
//!
//! ```
//! use crafttree::prelude::*;
//!
//! let path = Path::new(vec![RecipeStep::new("Fire", "Earth", "Lava")]);
//! let tree = TreeBuilder::default().build_tree(&path, "Lava");
//! assert_eq!(tree.name, "Lava");
//! assert_eq!(tree.children[0].name, "Fire + Earth");
//! assert_eq!(tree.count(), 4);
//! ```

pub mod builder;
pub mod config;
pub mod element;
pub mod images;
pub mod magic;
pub mod node;
pub mod policy;
pub mod pretty;
pub mod recipe;
pub mod search;
pub mod utils;
pub mod walker;

pub mod prelude {
    pub use crate::builder::TreeBuilder;
    pub use crate::config::{CraftConfig, LiveConfig, TreeConfig};
    pub use crate::element::{BaseElements, CanonicalElement, ElementName};
    pub use crate::images::ImageTable;
    pub use crate::node::{NodeKind, NodeRef, TreeNode, TreeRoot, render_json};
    pub use crate::policy::{Expansion, ExpansionPolicy};
    pub use crate::pretty::PrettyTree;
    pub use crate::recipe::{Path, RecipeIndex, RecipeStep};
    pub use crate::search::{PathKey, PathView, SearchMode, SearchResult, StaticViews};
    pub use crate::utils::error::{CraftError, CraftResult};
    pub use crate::walker::{WalkerHandle, preorder, walk, walk_no_input};
}
