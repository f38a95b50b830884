//! CLI configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sw_core::WorkerConfig;

/// CLI configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Worker origin and cache region names.
    #[serde(default = "default_worker")]
    pub worker: WorkerConfig,

    /// Build output to serve.
    #[serde(default)]
    pub bundle: BundleConfig,

    /// Where cache regions are persisted.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            worker: default_worker(),
            bundle: BundleConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

fn default_worker() -> WorkerConfig {
    WorkerConfig::new("http://localhost:8080")
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }
}

/// Build bundle location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleConfig {
    /// Path to the build manifest JSON (`{"resources": {...}, "core": [...]}`).
    #[serde(default = "default_manifest_path")]
    pub manifest: PathBuf,
}

fn default_manifest_path() -> PathBuf {
    PathBuf::from("build/asset-manifest.json")
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest_path(),
        }
    }
}

/// Cache storage location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one subdirectory per cache region.
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from(".sw-cache")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
        }
    }
}

/// Generate a default sw.toml config file.
pub fn generate_default_config(origin: &str) -> String {
    format!(
        r#"# Asset worker configuration

[worker]
origin = "{origin}"

# Cache region names. Change them to isolate two apps sharing an origin.
[worker.regions]
content = "app-cache"
temp = "app-temp-cache"
manifest = "app-manifest"

[bundle]
# {{"resources": {{"<key>": "<hash>", ...}}, "core": ["/", "main.js", ...]}}
manifest = "build/asset-manifest.json"

[storage]
dir = ".sw-cache"
"#,
        origin = origin
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config: CliConfig = toml::from_str(&generate_default_config("https://app.test")).unwrap();

        assert_eq!(config.worker.origin, "https://app.test");
        assert_eq!(config.worker.regions.temp, "app-temp-cache");
        assert_eq!(config.storage.dir, PathBuf::from(".sw-cache"));
    }

    #[test]
    fn test_sections_are_optional() {
        let config: CliConfig = toml::from_str("[worker]\norigin = \"http://127.0.0.1:3000\"\n").unwrap();

        assert_eq!(config.worker.regions.content, "app-cache");
        assert_eq!(
            config.bundle.manifest,
            PathBuf::from("build/asset-manifest.json")
        );
    }

    #[test]
    fn test_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sw.json");
        std::fs::write(
            &path,
            r#"{"worker": {"origin": "https://json.test"}, "storage": {"dir": "/var/cache/sw"}}"#,
        )
        .unwrap();

        let loaded = CliConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded.worker.origin, "https://json.test");
        assert_eq!(loaded.storage.dir, PathBuf::from("/var/cache/sw"));
    }
}
