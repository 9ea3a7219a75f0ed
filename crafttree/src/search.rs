//! Ingestion of the external solver's search result.
//!
//! The solver answers with either one shortest path or several alternative
//! paths. Each path gets a stable [`PathKey`] under which its static tree and
//! its live session are stored.

use std::{collections::BTreeMap, fmt, sync::Arc};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumIs, EnumString};

use crate::{
    builder::TreeBuilder,
    element::ElementName,
    images::ImageTable,
    node::TreeRoot,
    recipe::Path,
    utils::error::{CraftError, CraftResult},
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIs,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SearchMode {
    Shortest,
    Multiple,
}

/// Answer of the external solver.
///
/// Paths are kept as raw JSON so that each one can be validated on its own: a
/// broken entry only loses that path, not the whole result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub search_target: ElementName,
    #[serde(default)]
    pub algorithm: Option<String>,
    pub mode: SearchMode,
    #[serde(default)]
    pub max_recipes: Option<u32>,
    pub path_found: bool,
    #[serde(default)]
    pub path: Option<Value>,
    #[serde(default)]
    pub paths: Option<Value>,
    #[serde(default, rename = "imageURLs")]
    pub image_urls: ImageTable,
    #[serde(default)]
    pub nodes_visited: Option<i64>,
    #[serde(default)]
    pub duration_millis: Option<i64>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Stable identifier of one visualised path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathKey {
    /// The single path of a `shortest` search.
    Shortest,
    /// The `n`-th path of a `multiple` search.
    Multiple(usize),
    /// The trivial "path" of a base-element target.
    Base(ElementName),
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKey::Shortest => write!(f, "path-block-shortest-0"),
            PathKey::Multiple(index) => write!(f, "path-block-multiple-{index}"),
            PathKey::Base(element) => write!(f, "path-block-{element}-base"),
        }
    }
}

impl SearchResult {
    pub fn from_json_str(json: &str) -> CraftResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader(reader: impl std::io::Read) -> CraftResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Validated paths of this result, keyed by their path key.
    ///
    /// Only results with `pathFound` set contribute. A path value that is not
    /// an array is reported as [`CraftError::InvalidPath`] and left out;
    /// malformed steps inside a path are dropped by [`Path::from_json`].
    pub fn paths(&self) -> Vec<(PathKey, CraftResult<Path>)> {
        if !self.path_found {
            return Vec::new();
        }

        let validate = |key: PathKey, value: &Value| {
            let path = Path::from_json(value).ok_or_else(|| CraftError::InvalidPath {
                key: key.clone(),
                reason: format!("expected an array, found {}", json_kind(value)),
            });
            (key, path)
        };

        match self.mode {
            SearchMode::Shortest => self
                .path
                .iter()
                .map(|value| validate(PathKey::Shortest, value))
                .collect(),
            SearchMode::Multiple => match &self.paths {
                Some(Value::Array(paths)) => paths
                    .iter()
                    .enumerate()
                    .map(|(index, value)| validate(PathKey::Multiple(index), value))
                    .collect(),
                Some(other) => {
                    warn!("`paths` is not an array ({}), ignoring it", json_kind(other));
                    Vec::new()
                }
                None => Vec::new(),
            },
        }
    }

    /// One-line statistics summary, with `N/A` for unknown values.
    pub fn summary(&self) -> String {
        let nodes = match self.nodes_visited {
            Some(n) if n >= 0 => n.to_string(),
            _ => "N/A".to_string(),
        };
        let duration = match self.duration_millis {
            Some(ms) => format!("{ms} ms"),
            None => "N/A".to_string(),
        };
        let algorithm = self
            .algorithm
            .as_deref()
            .map(str::to_uppercase)
            .unwrap_or_else(|| "N/A".to_string());
        let mut line = format!(
            "{} ({algorithm} / {}",
            self.search_target, self.mode
        );
        if self.mode.is_multiple() {
            match self.max_recipes {
                Some(max) => line.push_str(&format!(" - max: {max}")),
                None => line.push_str(" - max: N/A"),
            }
        }
        line.push_str(&format!(") nodes visited: {nodes}, duration: {duration}"));
        line
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A visualised path: its validated steps and its final tree.
#[derive(Debug, Clone)]
pub struct PathView {
    pub path: Path,
    pub tree: TreeRoot,
}

/// Final trees of every path of a search result.
#[derive(Debug, Clone, Default)]
pub struct StaticViews {
    pub target: Option<ElementName>,
    pub images: Arc<ImageTable>,
    pub views: BTreeMap<PathKey, PathView>,
}

impl StaticViews {
    /// Build the static tree of every usable path of `result`.
    ///
    /// A base-element target without any path still gets a single-leaf view
    /// under [`PathKey::Base`]. Invalid paths are logged and skipped.
    pub fn from_search_result(result: &SearchResult, builder: &TreeBuilder) -> Self {
        let images = Arc::new(result.image_urls.clone());
        let builder = builder.clone().with_images(Arc::clone(&images));
        let target = &result.search_target;
        let mut views = BTreeMap::new();

        for (key, path) in result.paths() {
            match path {
                Ok(path) => {
                    let tree = builder.build_tree(&path, target);
                    views.insert(key, PathView { path, tree });
                }
                Err(e) => warn!("{e}"),
            }
        }

        if result.path_found && views.is_empty() && builder.is_base_element(target) {
            let path = Path::default();
            let tree = builder.build_tree(&path, target);
            views.insert(PathKey::Base(target.clone()), PathView { path, tree });
        }

        info!(
            "Prepared {} static view(s) for `{target}`",
            views.len()
        );
        Self {
            target: Some(target.clone()),
            images,
            views,
        }
    }

    pub fn get(&self, key: &PathKey) -> Option<&PathView> {
        self.views.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PathKey, &PathView)> {
        self.views.iter()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_keys_render_as_block_ids() {
        assert_eq!(PathKey::Shortest.to_string(), "path-block-shortest-0");
        assert_eq!(PathKey::Multiple(3).to_string(), "path-block-multiple-3");
        assert_eq!(
            PathKey::Base(ElementName::new("Fire")).to_string(),
            "path-block-Fire-base"
        );
    }

    #[test]
    fn summary_uses_na_for_missing_values() {
        let result = SearchResult::from_json_str(
            r#"{ "searchTarget": "Lava", "mode": "multiple", "pathFound": true, "nodesVisited": -1 }"#,
        )
        .unwrap();
        assert_eq!(
            result.summary(),
            "Lava (N/A / multiple - max: N/A) nodes visited: N/A, duration: N/A"
        );
    }

    #[test]
    fn missing_path_found_is_an_error() {
        let err = SearchResult::from_json_str(r#"{ "searchTarget": "Lava", "mode": "shortest" }"#)
            .unwrap_err();
        assert!(matches!(err, CraftError::Json(_)));
    }
}
