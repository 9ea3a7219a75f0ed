use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::element::ElementName;

/// Read-only lookup from element name to the image path reported by the solver.
///
/// The table is only used to annotate nodes; resolving the path against a
/// server and fetching the asset is left to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageTable {
    urls: HashMap<ElementName, String>,
}

impl ImageTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<ElementName>, url: impl Into<String>) {
        self.urls.insert(name.into(), url.into());
    }

    /// Image path for `name`; empty entries count as missing.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.urls
            .get(name)
            .map(String::as_str)
            .filter(|url| !url.is_empty())
    }

    /// Image path for `name` joined onto `base_url`, if both exist.
    pub fn resolve(&self, name: &str, base_url: Option<&str>) -> Option<String> {
        let partial = self.get(name)?;
        match base_url {
            Some(base) => Some(format!("{}{}", base.trim_end_matches('/'), partial)),
            None => Some(partial.to_string()),
        }
    }

    /// Copy of this table with every entry resolved against `base_url`.
    pub fn rebased(&self, base_url: Option<&str>) -> Self {
        self.urls
            .keys()
            .filter_map(|name| Some((name.clone(), self.resolve(name, base_url)?)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

impl<K: Into<ElementName>, V: Into<String>> FromIterator<(K, V)> for ImageTable {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            urls: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
