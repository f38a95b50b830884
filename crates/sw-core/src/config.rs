//! Worker configuration.

use serde::{Deserialize, Serialize};

use crate::key::ROOT_KEY;

/// Error type for configuration problems.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid origin '{origin}': {reason}")]
    InvalidOrigin { origin: String, reason: String },

    #[error("Region names must be distinct and non-empty")]
    InvalidRegions,
}

/// Names of the three cache regions the worker owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionNames {
    /// Long-lived region served to users.
    #[serde(default = "default_content")]
    pub content: String,
    /// Staging region filled during install.
    #[serde(default = "default_temp")]
    pub temp: String,
    /// Holds the manifest recorded by the last activation.
    #[serde(default = "default_manifest")]
    pub manifest: String,
}

fn default_content() -> String {
    "app-cache".to_string()
}

fn default_temp() -> String {
    "app-temp-cache".to_string()
}

fn default_manifest() -> String {
    "app-manifest".to_string()
}

impl Default for RegionNames {
    fn default() -> Self {
        Self {
            content: default_content(),
            temp: default_temp(),
            manifest: default_manifest(),
        }
    }
}

impl RegionNames {
    /// All three region names, content first.
    pub fn all(&self) -> [&str; 3] {
        [&self.content, &self.temp, &self.manifest]
    }
}

/// Configuration for a worker instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Origin the worker is scoped to (e.g., "https://app.example.com").
    pub origin: String,
    /// Cache region names.
    #[serde(default)]
    pub regions: RegionNames,
}

impl WorkerConfig {
    /// Create a configuration with default region names.
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            regions: RegionNames::default(),
        }
    }

    /// Override the region names.
    pub fn with_regions(mut self, regions: RegionNames) -> Self {
        self.regions = regions;
        self
    }

    /// Validate and normalize the configuration.
    ///
    /// The origin is reduced to `scheme://host[:port]`.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidOrigin {
            origin: self.origin.clone(),
            reason: reason.to_string(),
        };

        let parsed = url::Url::parse(&self.origin).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if parsed.path() != "/" || parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(invalid("origin must not carry a path, query or fragment"));
        }

        let [content, temp, manifest] = self.regions.all();
        if content.is_empty()
            || temp.is_empty()
            || manifest.is_empty()
            || content == temp
            || content == manifest
            || temp == manifest
        {
            return Err(ConfigError::InvalidRegions);
        }

        self.origin = parsed.origin().ascii_serialization();
        Ok(self)
    }

    /// Absolute request URL for a logical resource key.
    pub fn url_for(&self, key: &str) -> String {
        let origin = self.origin.trim_end_matches('/');
        if key == ROOT_KEY {
            format!("{}/", origin)
        } else {
            format!("{}/{}", origin, key.trim_start_matches('/'))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_normalizes_origin() {
        let config = WorkerConfig::new("https://App.Example.com/").validate().unwrap();
        assert_eq!(config.origin, "https://app.example.com");
    }

    #[test]
    fn test_validate_keeps_port() {
        let config = WorkerConfig::new("http://localhost:8080").validate().unwrap();
        assert_eq!(config.origin, "http://localhost:8080");
    }

    #[test]
    fn test_validate_rejects_path() {
        let err = WorkerConfig::new("https://example.com/app").validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOrigin { .. }));
    }

    #[test]
    fn test_validate_rejects_scheme() {
        assert!(WorkerConfig::new("ftp://example.com").validate().is_err());
        assert!(WorkerConfig::new("not a url").validate().is_err());
    }

    #[test]
    fn test_validate_rejects_clashing_regions() {
        let regions = RegionNames {
            content: "same".to_string(),
            temp: "same".to_string(),
            manifest: "other".to_string(),
        };
        let err = WorkerConfig::new("https://example.com")
            .with_regions(regions)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRegions));
    }

    #[test]
    fn test_url_for() {
        let config = WorkerConfig::new("https://example.com");
        assert_eq!(config.url_for("/"), "https://example.com/");
        assert_eq!(config.url_for("main.dart.js"), "https://example.com/main.dart.js");
        assert_eq!(
            config.url_for("assets/FontManifest.json"),
            "https://example.com/assets/FontManifest.json"
        );
    }

    #[test]
    fn test_regions_default_from_toml_like_json() {
        let config: WorkerConfig =
            serde_json::from_str(r#"{"origin": "https://example.com", "regions": {"temp": "t"}}"#)
                .unwrap();
        assert_eq!(config.regions.content, "app-cache");
        assert_eq!(config.regions.temp, "t");
        assert_eq!(config.regions.manifest, "app-manifest");
    }
}
