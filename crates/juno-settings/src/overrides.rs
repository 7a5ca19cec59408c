//! Manual override file utilities.
//!
//! Reads the human-editable `juno.properties` file and layers its values
//! under detection: an override only fills a field detection left unset.
//! The file is never rewritten once created, so comments and unknown keys
//! survive.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{is_unset, ConfigField, ToolchainConfiguration};
use crate::error::{SettingsError, SettingsResult};

/// File name of the override file inside the working directory
pub const OVERRIDE_FILE_NAME: &str = "juno.properties";

const TEMPLATE_HEADER: &str = "\
# Juno Properties Template
# This file is auto-generated by Juno. You can edit it to override paths.
# Values here are used only for fields automatic detection could not find.

# Note: From 'juno.idfPath' to 'juno.serialPort' these are mandatory paths.

# --- Examples ---
# Windows:
# juno.idfPath=C:/Espressif/frameworks/esp-idf-v5.3.1
# juno.toolchainPath=C:/Espressif/tools/xtensa-esp-elf/esp-13.2.0_20240530/xtensa-esp-elf/bin
# juno.pythonPath=C:/Espressif/python_env/idf5.3_py3.11_env/Scripts
# juno.pythonExecutablePath=C:/Espressif/python_env/idf5.3_py3.11_env/Scripts/python.exe

# Linux:
# juno.idfPath=/home/username/esp/esp-idf
# juno.pythonExecutablePath=/home/username/.espressif/python_env/idf5.x_py3.x_env/bin/python

# macOS:
# juno.idfPath=/Users/username/esp/esp-idf
# juno.pythonExecutablePath=/Users/username/.espressif/python_env/idf5.x_py3.x_env/bin/python
# ----------------
";

/// Commented template listing every recognised key with an empty value
pub fn template() -> String {
    let mut out = String::from(TEMPLATE_HEADER);
    out.push('\n');
    for field in ConfigField::MANDATORY {
        out.push_str(&format!("{}=\n", field.property_key()));
    }
    out.push_str("\n# These are optional paths, can be left empty if not needed.\n");
    for field in ConfigField::all().filter(|f| !f.is_mandatory()) {
        out.push_str(&format!("{}=\n", field.property_key()));
    }
    out.push_str("# Any other custom properties may be added below; Juno ignores them.\n");
    out
}

/// Parsed key/value pairs from an override file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    values: BTreeMap<String, String>,
}

impl Overrides {
    /// Parse `key=value` lines
    ///
    /// Lines starting with `#` or `!` are comments. The key ends at the
    /// first `=` or `:`. Keys and values are trimmed and a later duplicate
    /// key replaces an earlier one.
    pub fn parse(text: &str) -> Self {
        let values = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
            .filter_map(|line| {
                let split = line.find(['=', ':'])?;
                let (key, value) = (&line[..split], &line[split + 1..]);
                Some((key.trim().to_string(), value.trim().to_string()))
            })
            .collect();
        Self { values }
    }

    /// Read and parse `path`; a missing file yields no overrides
    pub fn load(path: &Path) -> SettingsResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|e| {
            SettingsError::Override(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Ok(Self::parse(&text))
    }

    /// Raw value for `key`, including blanks
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Usable override for `field`; blank and `"null"` count as unset
    pub fn get(&self, field: ConfigField) -> Option<&str> {
        self.raw(&field.property_key())
            .filter(|v| !is_unset(Some(v)))
    }

    /// Number of parsed keys, including unknown ones
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no keys were parsed
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fill every unset field of `config` from these overrides
    ///
    /// Fields that already hold a value are never touched, so applying the
    /// same overrides twice changes nothing. Returns the fields filled.
    pub fn apply(&self, config: &mut ToolchainConfiguration) -> Vec<ConfigField> {
        let mut filled = Vec::new();
        for field in ConfigField::all() {
            if !is_unset(config.get(field)) {
                continue;
            }
            if let Some(value) = self.get(field) {
                config.set(field, Some(value.to_string()));
                filled.push(field);
            }
        }
        filled
    }
}

/// Location of the override file and its template lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideFile {
    path: PathBuf,
}

impl OverrideFile {
    /// Override file inside `workdir`
    pub fn in_workdir(workdir: &Path) -> Self {
        Self {
            path: workdir.join(OVERRIDE_FILE_NAME),
        }
    }

    /// Path of the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the template if the file does not exist yet
    ///
    /// Returns `true` when the template was created.
    pub fn ensure_template(&self) -> SettingsResult<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, template()).map_err(|e| {
            SettingsError::Override(format!("Failed to create {}: {}", self.path.display(), e))
        })?;
        tracing::info!("Created override template {}", self.path.display());
        Ok(true)
    }

    /// Parse the current contents
    pub fn load(&self) -> SettingsResult<Overrides> {
        Overrides::load(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use juno_toolchain::ToolKind;
    use tempfile::tempdir;

    #[test]
    fn test_parse_comments_blanks_and_separators() {
        let overrides = Overrides::parse(
            "# comment\n! also comment\n\n juno.idfPath = /custom/idf \njuno.serialPort:COM5\njuno.ninjaPath=\ncustom.key=kept\n",
        );
        assert_eq!(overrides.get(ConfigField::Tool(ToolKind::IdfPath)), Some("/custom/idf"));
        assert_eq!(overrides.get(ConfigField::SerialPort), Some("COM5"));
        assert_eq!(overrides.get(ConfigField::Tool(ToolKind::NinjaPath)), None);
        assert_eq!(overrides.raw("juno.ninjaPath"), Some(""));
        assert_eq!(overrides.raw("custom.key"), Some("kept"));
        assert_eq!(overrides.len(), 4);
    }

    #[test]
    fn test_windows_path_keeps_drive_colon() {
        let overrides = Overrides::parse("juno.idfPath=C:/Espressif/frameworks/esp-idf-v5.3.1\n");
        assert_eq!(
            overrides.get(ConfigField::Tool(ToolKind::IdfPath)),
            Some("C:/Espressif/frameworks/esp-idf-v5.3.1")
        );
    }

    #[test]
    fn test_apply_fills_only_unset() {
        let overrides = Overrides::parse("juno.idfPath=/override\njuno.gitPath=/git\njuno.cMakePath=/cmake\n");
        let mut config = ToolchainConfiguration::new();
        config.idf_path = Some("/detected".to_string());
        config.cmake_path = Some("null".to_string());

        let filled = overrides.apply(&mut config);

        assert_eq!(config.idf_path.as_deref(), Some("/detected"));
        assert_eq!(config.cmake_path.as_deref(), Some("/cmake"));
        assert_eq!(config.git_path.as_deref(), Some("/git"));
        assert_eq!(filled.len(), 2);
    }

    #[test]
    fn test_template_lists_every_key_blank() {
        let overrides = Overrides::parse(&template());
        for field in ConfigField::all() {
            assert_eq!(overrides.raw(&field.property_key()), Some(""), "{}", field.name());
            assert_eq!(overrides.get(field), None);
        }
    }

    #[test]
    fn test_template_created_once() {
        let temp = tempdir().unwrap();
        let file = OverrideFile::in_workdir(&temp.path().join(".juno"));

        assert!(file.ensure_template().unwrap());
        fs::write(file.path(), "juno.idfPath=/mine\n").unwrap();
        assert!(!file.ensure_template().unwrap());

        let overrides = file.load().unwrap();
        assert_eq!(overrides.get(ConfigField::Tool(ToolKind::IdfPath)), Some("/mine"));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let temp = tempdir().unwrap();
        let overrides = Overrides::load(&temp.path().join("absent.properties")).unwrap();
        assert!(overrides.is_empty());
    }
}
