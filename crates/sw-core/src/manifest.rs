//! Build-time resource tables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Error type for manifest loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Invalid manifest JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Core shell entry '{0}' is not listed in the resource manifest")]
    UnknownCoreKey(String),

    #[error("Resource '{0}' has an empty content hash")]
    EmptyHash(String),
}

/// Mapping from logical resource key to content hash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceManifest {
    entries: BTreeMap<String, String>,
}

impl ResourceManifest {
    /// Create an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource.
    pub fn with_resource(mut self, key: impl Into<String>, hash: impl Into<String>) -> Self {
        self.entries.insert(key.into(), hash.into());
        self
    }

    /// Parse from the flat JSON object form.
    pub fn from_json(json: &[u8]) -> Result<Self, ManifestError> {
        Ok(serde_json::from_slice(json)?)
    }

    /// Serialize to the flat JSON object form.
    pub fn to_json(&self) -> Vec<u8> {
        // A string-to-string map always serializes.
        serde_json::to_vec(&self.entries).unwrap_or_default()
    }

    /// Content hash for a key.
    pub fn hash(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|s| s.as_str())
    }

    /// Whether the manifest lists a key.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// All keys, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|s| s.as_str())
    }

    /// Iterate over `(key, hash)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of resources.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a cached copy of `key` recorded under `previous` may be reused.
    ///
    /// True only when this manifest still lists the key with the same hash.
    pub fn is_unchanged_since(&self, previous: &ResourceManifest, key: &str) -> bool {
        match (self.hash(key), previous.hash(key)) {
            (Some(current), Some(old)) => current == old,
            _ => false,
        }
    }
}

impl FromIterator<(String, String)> for ResourceManifest {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Ordered list of resources that must be cached before the worker is ready.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoreShell(Vec<String>);

impl CoreShell {
    /// Create a core shell from keys.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keys.into_iter().map(Into::into).collect())
    }

    /// Iterate over keys in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Resource manifest and core shell as emitted by a build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildManifest {
    /// Resource key to content hash.
    pub resources: ResourceManifest,
    /// Application shell keys.
    #[serde(default)]
    pub core: CoreShell,
}

impl BuildManifest {
    /// Create a build manifest.
    pub fn new(resources: ResourceManifest, core: CoreShell) -> Self {
        Self { resources, core }
    }

    /// Parse `{"resources": {...}, "core": [...]}` and validate it.
    pub fn from_json(json: &[u8]) -> Result<Self, ManifestError> {
        let manifest: Self = serde_json::from_slice(json)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Check that every core key is a listed resource and no hash is empty.
    pub fn validate(&self) -> Result<(), ManifestError> {
        if let Some((key, _)) = self.resources.iter().find(|(_, hash)| hash.is_empty()) {
            return Err(ManifestError::EmptyHash(key.to_string()));
        }
        if let Some(key) = self.core.iter().find(|k| !self.resources.contains(k)) {
            return Err(ManifestError::UnknownCoreKey(key.to_string()));
        }
        Ok(())
    }
}

/// Key-level comparison between a recorded manifest and the current one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ManifestDiff {
    /// Keys only in the current manifest.
    pub added: Vec<String>,
    /// Keys only in the previous manifest.
    pub removed: Vec<String>,
    /// Keys in both with different hashes.
    pub changed: Vec<String>,
    /// Keys in both with equal hashes.
    pub unchanged: Vec<String>,
}

impl ManifestDiff {
    /// Compare `previous` against `current`.
    pub fn between(previous: &ResourceManifest, current: &ResourceManifest) -> Self {
        let mut diff = Self::default();

        for (key, hash) in current.iter() {
            match previous.hash(key) {
                None => diff.added.push(key.to_string()),
                Some(old) if old == hash => diff.unchanged.push(key.to_string()),
                Some(_) => diff.changed.push(key.to_string()),
            }
        }
        diff.removed = previous
            .keys()
            .filter(|k| !current.contains(k))
            .map(String::from)
            .collect();

        diff
    }

    /// Whether the two manifests are identical.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(pairs: &[(&str, &str)]) -> ResourceManifest {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_json_is_flat_object() {
        let m = manifest(&[("/", "aa"), ("main.dart.js", "bb")]);
        let json = String::from_utf8(m.to_json()).unwrap();
        assert_eq!(json, r#"{"/":"aa","main.dart.js":"bb"}"#);
        assert_eq!(ResourceManifest::from_json(json.as_bytes()).unwrap(), m);
    }

    #[test]
    fn test_is_unchanged_since() {
        let old = manifest(&[("a", "1"), ("b", "2"), ("gone", "3")]);
        let new = manifest(&[("a", "1"), ("b", "9"), ("fresh", "4")]);

        assert!(new.is_unchanged_since(&old, "a"));
        assert!(!new.is_unchanged_since(&old, "b"));
        assert!(!new.is_unchanged_since(&old, "gone"));
        assert!(!new.is_unchanged_since(&old, "fresh"));
        assert!(!new.is_unchanged_since(&old, "never"));
    }

    #[test]
    fn test_build_manifest_from_json() {
        let json = br#"{
            "resources": {"index.html": "x", "/": "x", "main.dart.js": "y"},
            "core": ["main.dart.js", "index.html"]
        }"#;
        let build = BuildManifest::from_json(json).unwrap();
        assert_eq!(build.resources.len(), 3);
        assert_eq!(
            build.core.iter().collect::<Vec<_>>(),
            vec!["main.dart.js", "index.html"]
        );
    }

    #[test]
    fn test_build_manifest_core_defaults_empty() {
        let build = BuildManifest::from_json(br#"{"resources": {"a": "1"}}"#).unwrap();
        assert!(build.core.is_empty());
    }

    #[test]
    fn test_build_manifest_rejects_unknown_core_key() {
        let json = br#"{"resources": {"a": "1"}, "core": ["b"]}"#;
        let err = BuildManifest::from_json(json).unwrap_err();
        assert!(matches!(err, ManifestError::UnknownCoreKey(k) if k == "b"));
    }

    #[test]
    fn test_build_manifest_rejects_empty_hash() {
        let json = br#"{"resources": {"a": ""}}"#;
        assert!(matches!(
            BuildManifest::from_json(json),
            Err(ManifestError::EmptyHash(_))
        ));
    }

    #[test]
    fn test_diff() {
        let old = manifest(&[("a", "1"), ("b", "2"), ("gone", "3")]);
        let new = manifest(&[("a", "1"), ("b", "9"), ("fresh", "4")]);

        let diff = ManifestDiff::between(&old, &new);
        assert_eq!(diff.added, vec!["fresh"]);
        assert_eq!(diff.removed, vec!["gone"]);
        assert_eq!(diff.changed, vec!["b"]);
        assert_eq!(diff.unchanged, vec!["a"]);
        assert!(!diff.is_empty());
        assert!(ManifestDiff::between(&new, &new).is_empty());
    }
}
