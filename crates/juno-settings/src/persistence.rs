//! Working directory layout and cache persistence
//!
//! Everything Juno writes lives under `<base>/.juno/`:
//! - `juno_config.json`, the trusted cache of resolved paths
//! - `juno.properties`, the manual override file

use std::path::{Path, PathBuf};

use crate::config::ToolchainConfiguration;
use crate::error::SettingsResult;
use crate::overrides::OverrideFile;
use juno_core::Platform;

/// Default cache file name
pub const CACHE_FILE_NAME: &str = "juno_config.json";

/// Locations of the cache and override files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigStore {
    workdir: PathBuf,
    cache_file: PathBuf,
}

impl ConfigStore {
    /// Store rooted at `<base>/.juno`
    pub fn new(base: &Path) -> Self {
        let workdir = Platform::workdir(base);
        Self {
            cache_file: workdir.join(CACHE_FILE_NAME),
            workdir,
        }
    }

    /// Use a different cache file name; `.toml` switches the format
    pub fn with_cache_file_name(mut self, name: &str) -> Self {
        self.cache_file = self.workdir.join(name);
        self
    }

    /// The `.juno` working directory
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Cache file path
    pub fn cache_path(&self) -> &Path {
        &self.cache_file
    }

    /// Override file in the working directory
    pub fn override_file(&self) -> OverrideFile {
        OverrideFile::in_workdir(&self.workdir)
    }

    /// Check if a cache file exists
    pub fn has_cache(&self) -> bool {
        self.cache_file.is_file()
    }

    /// Load the cache verbatim, or `None` when there is none
    pub fn load_cache(&self) -> SettingsResult<Option<ToolchainConfiguration>> {
        if !self.has_cache() {
            return Ok(None);
        }
        let config = ToolchainConfiguration::load_from_file(&self.cache_file)?;
        tracing::info!("Loaded config from {}", self.cache_file.display());
        Ok(Some(config))
    }

    /// Replace the cache with `config`
    pub fn save_cache(&self, config: &ToolchainConfiguration) -> SettingsResult<()> {
        config.save_to_file(&self.cache_file)?;
        tracing::info!("Config saved to {}", self.cache_file.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigField;
    use tempfile::tempdir;

    #[test]
    fn test_layout() {
        let store = ConfigStore::new(Path::new("/work"));
        assert_eq!(store.workdir(), Path::new("/work/.juno"));
        assert_eq!(store.cache_path(), Path::new("/work/.juno/juno_config.json"));
        assert_eq!(
            store.override_file().path(),
            Path::new("/work/.juno/juno.properties")
        );
    }

    #[test]
    fn test_save_then_load() {
        let temp = tempdir().unwrap();
        let store = ConfigStore::new(temp.path());
        assert_eq!(store.load_cache().unwrap(), None);

        let mut config = ToolchainConfiguration::new();
        for field in ConfigField::all() {
            config.set(field, Some(format!("/x/{}", field.name())));
        }
        store.save_cache(&config).unwrap();

        assert_eq!(store.load_cache().unwrap(), Some(config));
    }

    #[test]
    fn test_toml_cache() {
        let temp = tempdir().unwrap();
        let store = ConfigStore::new(temp.path()).with_cache_file_name("juno_config.toml");

        let mut config = ToolchainConfiguration::new();
        config.idf_path = Some("/esp/esp-idf".to_string());
        config.serial_port = Some("/dev/ttyUSB0".to_string());
        store.save_cache(&config).unwrap();

        let text = std::fs::read_to_string(store.cache_path()).unwrap();
        assert!(text.contains("idfPath"));
        assert_eq!(store.load_cache().unwrap(), Some(config));
    }

    #[test]
    fn test_corrupt_cache_is_an_error() {
        let temp = tempdir().unwrap();
        let store = ConfigStore::new(temp.path());
        std::fs::create_dir_all(store.workdir()).unwrap();
        std::fs::write(store.cache_path(), "{ not json").unwrap();

        assert!(store.load_cache().is_err());
    }
}
