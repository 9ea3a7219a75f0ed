use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    element::BaseElements,
    magic::{
        DEFAULT_MAX_DEPTH, DEFAULT_MAX_TICKS_PER_SESSION, DEFAULT_TICK_DELAY_MS, ENV_CONFIG_PATH,
    },
    utils::error::{CraftError, CraftResult},
};

/// Settings for tree construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Nodes deeper than this become error nodes.
    pub max_depth: u32,
    /// Elements that are always leaves.
    pub base_elements: BaseElements,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            base_elements: BaseElements::canonical(),
        }
    }
}

/// Settings for the live build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    pub tick_delay_ms: u64,
    pub max_ticks_per_session: usize,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            tick_delay_ms: DEFAULT_TICK_DELAY_MS,
            max_ticks_per_session: DEFAULT_MAX_TICKS_PER_SESSION,
        }
    }
}

impl LiveConfig {
    pub fn tick_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_delay_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CraftConfig {
    /// Prefix joined onto the image paths reported by the solver.
    pub image_base_url: Option<String>,
    pub tree: TreeConfig,
    pub live: LiveConfig,
}

impl CraftConfig {
    /// `$CRAFTTREE_CONFIG` if set, else `crafttree/config.toml` under the
    /// user configuration directory.
    pub fn default_path() -> PathBuf {
        match std::env::var_os(ENV_CONFIG_PATH) {
            Some(path) => path.into(),
            None => config_file_under(user_config_dir()),
        }
    }

    pub fn from_toml_str(toml_str: &str, file: &str) -> CraftResult<Self> {
        toml::from_str(toml_str).map_err(|e| CraftError::ConfigParse {
            source: e,
            file: file.to_string(),
        })
    }

    /// Load the configuration from a TOML file.
    pub fn load_from_toml(path: &Path) -> CraftResult<Self> {
        let toml_str = std::fs::read_to_string(path)?;
        Self::from_toml_str(&toml_str, &path.display().to_string())
    }

    /// Load the configuration at `path`, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> CraftResult<Self> {
        if !path.exists() {
            log::debug!(
                "No configuration at `{}`, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_toml(path)
    }

    /// Save the configuration to a TOML file.
    pub fn save_to_toml(&self, path: &Path) -> CraftResult<()> {
        let toml_str = toml::to_string(self).map_err(|e| {
            CraftError::Unknown(format!(
                "Failed during serialization of TOML to path `{}`: {}",
                path.display(),
                e
            ))
        })?;

        // Saving may be the first write under a fresh config home.
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, toml_str)?;
        Ok(())
    }
}

fn config_file_under(dir: Option<PathBuf>) -> PathBuf {
    dir.unwrap_or_default().join("crafttree").join("config.toml")
}

#[cfg(target_os = "windows")]
fn user_config_dir() -> Option<PathBuf> {
    std::env::var_os("APPDATA").map(PathBuf::from)
}

#[cfg(not(target_os = "windows"))]
fn user_config_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = CraftConfig::from_toml_str("", "<inline>").unwrap();
        assert_eq!(config, CraftConfig::default());
        assert_eq!(config.tree.max_depth, 20);
        assert_eq!(config.live.tick_delay_ms, 800);
    }

    #[test]
    fn partial_document_overrides_fields() {
        let config = CraftConfig::from_toml_str(
            r#"
            image_base_url = "http://localhost:8080"

            [tree]
            base_elements = ["Light", "Dark"]

            [live]
            tick_delay_ms = 50
            "#,
            "<inline>",
        )
        .unwrap();
        assert_eq!(config.tree.max_depth, 20);
        assert!(config.tree.base_elements.contains("Light"));
        assert!(!config.tree.base_elements.contains("Fire"));
        assert_eq!(config.live.tick_delay().as_millis(), 50);
        assert_eq!(config.live.max_ticks_per_session, 10_000);
        assert_eq!(config.image_base_url.as_deref(), Some("http://localhost:8080"));
    }

    #[test]
    fn config_file_lives_in_a_crafttree_directory() {
        let home = PathBuf::from("home").join(".config");
        let file = config_file_under(Some(home.clone()));
        assert!(file.starts_with(&home));
        assert!(file.ends_with(Path::new("crafttree").join("config.toml")));
        assert_eq!(file.components().count(), 4);

        assert_eq!(config_file_under(None), Path::new("crafttree").join("config.toml"));
    }

    #[test]
    fn invalid_document_reports_file() {
        let err = CraftConfig::from_toml_str("[tree]\nmax_depth = \"deep\"", "cfg.toml").unwrap_err();
        match err {
            CraftError::ConfigParse { file, .. } => assert_eq!(file, "cfg.toml"),
            other => panic!("unexpected error {other}"),
        }
    }
}
