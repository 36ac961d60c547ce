//! Configuration for evalsurvey

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use resultlog::Metric;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::Category;
use crate::reconcile::OrderingKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root of the image tree, one sub-directory per category
    #[serde(default = "default_image_dir")]
    pub image_dir: PathBuf,

    /// Directory holding the per-respondent result logs
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    /// Categories in presentation order
    #[serde(default = "default_categories")]
    pub categories: Vec<Category>,

    /// Question text per metric key
    #[serde(default = "default_metric_prompts")]
    pub metric_prompts: BTreeMap<String, String>,

    /// Presentation order used when a session does not choose one
    #[serde(default)]
    pub ordering: OrderingKind,

    /// External command used to display the current image
    #[serde(default)]
    pub viewer: Option<String>,

    /// Refuse submissions while the current image cannot be loaded
    #[serde(default)]
    pub require_render: bool,

    /// Display name for origin codes that match no category
    #[serde(default = "default_unknown_region_label")]
    pub unknown_region_label: String,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(default)]
    pub log_level: Option<String>,
}

fn default_image_dir() -> PathBuf {
    PathBuf::from("images")
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results_eval")
}

fn default_categories() -> Vec<Category> {
    vec![
        Category::new("saga", "佐賀"),
        Category::new("miyazaki", "宮崎"),
        Category::new("osaka", "大阪"),
        Category::new("nara", "奈良"),
        Category::new("shiga", "滋賀"),
        Category::new("saitama", "埼玉"),
    ]
}

fn default_metric_prompts() -> BTreeMap<String, String> {
    Metric::ALL
        .iter()
        .map(|m| (m.key().to_string(), m.default_prompt().to_string()))
        .collect()
}

fn default_unknown_region_label() -> String {
    "不明".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_dir: default_image_dir(),
            results_dir: default_results_dir(),
            categories: default_categories(),
            metric_prompts: default_metric_prompts(),
            ordering: OrderingKind::default(),
            viewer: None,
            require_render: false,
            unknown_region_label: default_unknown_region_label(),
            log_level: None,
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            return Self::load_from(config_path);
        }

        for path in Self::default_paths().iter() {
            if path.exists() {
                return Self::load_from(path);
            }
        }

        debug!("Config::load: no config file found, using defaults");
        Ok(Config::default())
    }

    /// Read only the log level, before logging is set up
    pub fn load_log_level(path: Option<&PathBuf>) -> Option<String> {
        Self::load(path).ok().and_then(|c| c.log_level)
    }

    fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("evalsurvey").join("config.yml")),
            Some(PathBuf::from("evalsurvey.yml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn load_from(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).context(format!("Failed to read config file: {}", path.display()))?;
        let config: Config =
            serde_yaml::from_str(&content).context(format!("Failed to parse config file: {}", path.display()))?;
        debug!(path = %path.display(), "Config::load_from: loaded");
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Question text for a metric, falling back to the built-in wording
    pub fn metric_prompt(&self, metric: Metric) -> &str {
        self.metric_prompts
            .get(metric.key())
            .map(String::as_str)
            .unwrap_or_else(|| metric.default_prompt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        let codes: Vec<&str> = config.categories.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["saga", "miyazaki", "osaka", "nara", "shiga", "saitama"]);
        assert_eq!(config.results_dir, PathBuf::from("results_eval"));
        assert_eq!(config.ordering, OrderingKind::Canonical);
        assert!(!config.require_render);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
image_dir: /data/images
ordering: shuffled
categories:
  - code: kyoto
    name: 京都
metric_prompts:
  harmony: "Fits the streetscape?"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.image_dir, PathBuf::from("/data/images"));
        assert_eq!(config.ordering, OrderingKind::Shuffled);
        assert_eq!(config.categories, vec![Category::new("kyoto", "京都")]);
        assert_eq!(config.results_dir, PathBuf::from("results_eval"));
        assert_eq!(config.metric_prompt(Metric::Harmony), "Fits the streetscape?");
        assert_eq!(config.metric_prompt(Metric::Fidelity), Metric::Fidelity.default_prompt());
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        let mut config = Config::default();
        config.viewer = Some("feh".to_string());
        config.log_level = Some("debug".to_string());
        config.save(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.viewer.as_deref(), Some("feh"));
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("debug"));
        assert_eq!(loaded.categories, config.categories);
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nope.yml");
        assert!(Config::load(Some(&path)).is_err());
    }
}
