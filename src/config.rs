use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

static DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub catalogue: CatalogueConfig,
    pub images: ImagesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogueConfig {
    pub title: String,
    pub subtitle: String,
    pub currency_symbol: String,
}

impl Default for CatalogueConfig {
    fn default() -> Self {
        Self {
            title: "Product Catalogue".to_string(),
            subtitle: "Premium Office Solutions".to_string(),
            currency_symbol: "₹".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Per-request limit for remote image fetches.
    pub fetch_timeout_secs: u64,
    /// Size of the pool resolving images in parallel.
    pub workers: usize,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 10,
            workers: 4,
        }
    }
}

impl ImagesConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Config {
    /// The built-in defaults from `default_config.toml`.
    pub fn compiled_default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    /// Load config from a TOML file, or return the built-in defaults if not found.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Ignoring invalid config {}: {}", path.display(), e);
                    Self::compiled_default()
                }
            },
            Err(_) => Self::compiled_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiled_default_matches_struct_default() {
        let config = Config::compiled_default();
        assert_eq!(config.catalogue.title, "Product Catalogue");
        assert_eq!(config.catalogue.currency_symbol, "₹");
        assert_eq!(config.images.fetch_timeout(), Duration::from_secs(10));
        assert_eq!(config.images.workers, 4);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: Config = toml::from_str("[images]\nworkers = 8\n").unwrap();
        assert_eq!(config.images.workers, 8);
        assert_eq!(config.images.fetch_timeout_secs, 10);
        assert_eq!(config.catalogue.subtitle, "Premium Office Solutions");
    }

    #[test]
    fn load_falls_back_on_missing_or_invalid() {
        let missing = Config::load(Path::new("/definitely/not/here.toml"));
        assert_eq!(missing.images.workers, 4);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[images\nworkers = ").unwrap();
        assert_eq!(Config::load(&path).catalogue.currency_symbol, "₹");
    }
}
