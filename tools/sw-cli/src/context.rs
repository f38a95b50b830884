//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use sw_cache::FsCacheStorage;
use sw_core::{BuildManifest, WorkerConfig};
use sw_observability::LogFormat;
use sw_worker::{AssetWorker, DetachedHost};

use crate::config::CliConfig;
use crate::net::ReqwestFetcher;
use crate::output::Output;

/// Config file names searched for, in order, from the working directory up.
const CONFIG_NAMES: [&str; 3] = ["sw.toml", ".sw.toml", "sw.json"];

/// Worker wired to the filesystem store and the real network.
pub type CliWorker = AssetWorker<FsCacheStorage, ReqwestFetcher, DetachedHost>;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
    /// The config file in effect, if one was found.
    pub config_path: Option<PathBuf>,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = if let Some(path) = config_path {
            (CliConfig::load(path)?, Some(PathBuf::from(path)))
        } else {
            match Self::find_config(&cwd) {
                Some((config, path)) => (config, Some(path)),
                None => (CliConfig::default(), None),
            }
        };

        Ok(Self {
            config,
            output,
            cwd,
            config_path,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<(CliConfig, PathBuf)> {
        let mut current = start.to_path_buf();
        loop {
            for name in &CONFIG_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    if let Ok(config) = CliConfig::load(config_path.to_str()?) {
                        return Some((config, config_path));
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Directory relative config paths are resolved against.
    pub fn base_dir(&self) -> PathBuf {
        self.config_path
            .as_ref()
            .and_then(|p| p.parent())
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| self.resolve_path(p))
            .unwrap_or_else(|| self.cwd.clone())
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    fn resolve_from_base(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir().join(path)
        }
    }

    /// The validated worker configuration.
    pub fn worker_config(&self) -> Result<WorkerConfig> {
        Ok(self.config.worker.clone().validate()?)
    }

    /// Directory holding the cache regions.
    pub fn storage_dir(&self) -> PathBuf {
        self.resolve_from_base(&self.config.storage.dir)
    }

    /// The filesystem cache storage.
    pub fn storage(&self) -> FsCacheStorage {
        FsCacheStorage::new(self.storage_dir())
    }

    /// Load and validate the build manifest.
    pub fn load_build(&self) -> Result<BuildManifest> {
        let path = self.resolve_from_base(&self.config.bundle.manifest);
        let raw = std::fs::read(&path)
            .with_context(|| format!("Failed to read build manifest: {}", path.display()))?;
        BuildManifest::from_json(&raw)
            .with_context(|| format!("Invalid build manifest: {}", path.display()))
    }

    /// Build a worker for the current bundle.
    pub fn worker(&self) -> Result<CliWorker> {
        let fetcher = ReqwestFetcher::new().context("Failed to create HTTP client")?;
        let format = if self.output.is_json() {
            LogFormat::Json
        } else {
            LogFormat::Human
        };

        Ok(AssetWorker::new(
            self.worker_config()?,
            self.load_build()?,
            self.storage(),
            fetcher,
            DetachedHost,
        )
        .with_log_format(format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".sw.toml"),
            "[worker]\norigin = \"https://found.test\"\n",
        )
        .unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let (config, path) = Context::find_config(&nested).unwrap();

        assert_eq!(config.worker.origin, "https://found.test");
        assert_eq!(path, dir.path().join(".sw.toml"));
    }

    #[test]
    fn test_paths_resolve_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("sw.toml");
        std::fs::write(&config_path, "[storage]\ndir = \"cache\"\n").unwrap();

        let ctx = Context::load(config_path.to_str(), Output::new(false, true)).unwrap();

        assert_eq!(ctx.storage_dir(), dir.path().join("cache"));
    }
}
