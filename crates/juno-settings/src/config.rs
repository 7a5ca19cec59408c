//! Toolchain configuration
//!
//! The aggregate of every resolved tool path plus the serial port. Only
//! present values are written; the file is always replaced wholesale.

use crate::error::{SettingsError, SettingsResult};
use juno_core::ResolutionError;
use juno_toolchain::{DetectionReport, ToolKind};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// Prefix of every override key
pub const KEY_NAMESPACE: &str = "juno";

/// Sentinel some editors and older caches leave in place of a value
pub const NULL_SENTINEL: &str = "null";

/// One configurable value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigField {
    /// A resolved tool path
    Tool(ToolKind),
    /// The ESP32 serial port
    SerialPort,
}

impl ConfigField {
    /// Mandatory fields in validation order
    pub const MANDATORY: [ConfigField; 8] = [
        ConfigField::Tool(ToolKind::IdfPath),
        ConfigField::Tool(ToolKind::IdfPyPath),
        ConfigField::Tool(ToolKind::PythonPath),
        ConfigField::Tool(ToolKind::PythonExecutablePath),
        ConfigField::Tool(ToolKind::ToolchainPath),
        ConfigField::Tool(ToolKind::CMakePath),
        ConfigField::Tool(ToolKind::NinjaPath),
        ConfigField::SerialPort,
    ];

    /// Every field: mandatory first, then the optional tools
    pub fn all() -> impl Iterator<Item = ConfigField> {
        Self::MANDATORY.into_iter().chain(
            ToolKind::ALL
                .into_iter()
                .filter(|k| !k.is_mandatory())
                .map(ConfigField::Tool),
        )
    }

    /// Field name as written in the cache file
    pub fn name(self) -> &'static str {
        match self {
            ConfigField::Tool(kind) => kind.field_name(),
            ConfigField::SerialPort => "serialPort",
        }
    }

    /// Override file key, e.g. `juno.idfPath`
    pub fn property_key(self) -> String {
        format!("{KEY_NAMESPACE}.{}", self.name())
    }

    /// Check if validation requires this field
    pub fn is_mandatory(self) -> bool {
        match self {
            ConfigField::Tool(kind) => kind.is_mandatory(),
            ConfigField::SerialPort => true,
        }
    }
}

/// Check if a value counts as unset: absent, blank or `"null"`
pub fn is_unset(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) => v.trim().is_empty() || v.trim() == NULL_SENTINEL,
    }
}

/// Every resolved path plus the serial port
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolchainConfiguration {
    /// ESP-IDF framework root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idf_path: Option<String>,
    /// Directory holding `idf.py`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idf_py_path: Option<String>,
    /// Directory of the IDF Python interpreter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub python_path: Option<String>,
    /// IDF Python interpreter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub python_executable_path: Option<String>,
    /// Xtensa compiler `bin` directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toolchain_path: Option<String>,
    /// CMake version directory
    #[serde(default, rename = "cMakePath", skip_serializing_if = "Option::is_none")]
    pub cmake_path: Option<String>,
    /// Ninja version directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ninja_path: Option<String>,
    /// Serial port of the attached ESP32
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_port: Option<String>,

    /// Git executable shipped with the IDF tools
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_path: Option<String>,
    /// Xtensa gdb directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xtensa_gdb_path: Option<String>,
    /// Xtensa toolchain directory (debug tooling)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xtensa_toolchain_path: Option<String>,
    /// Espressif clang directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub esp_clang_path: Option<String>,
    /// OpenOCD binary directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_ocd_bin: Option<String>,
    /// ccache directory
    #[serde(default, rename = "cCacheBinPath", skip_serializing_if = "Option::is_none")]
    pub ccache_bin_path: Option<String>,
    /// dfu-util directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dfu_util_bin_path: Option<String>,
    /// OpenOCD scripts directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_ocd_scripts_path: Option<String>,
}

impl ToolchainConfiguration {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from a detection pass and a detected port
    pub fn from_detection(report: &DetectionReport, serial_port: Option<String>) -> Self {
        let mut config = Self::new();
        for tool in &report.tools {
            if let Some(path) = &tool.value {
                config.set(
                    ConfigField::Tool(tool.kind),
                    Some(path.to_string_lossy().into_owned()),
                );
            }
        }
        config.serial_port = serial_port;
        config
    }

    /// Value of `field`
    pub fn get(&self, field: ConfigField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Value of `field` when it is set to something usable
    pub fn value(&self, field: ConfigField) -> Option<&str> {
        self.get(field).filter(|v| !is_unset(Some(v)))
    }

    /// Replace the value of `field`
    pub fn set(&mut self, field: ConfigField, value: Option<String>) {
        *self.slot_mut(field) = value;
    }

    /// Usable value of a tool path
    pub fn tool(&self, kind: ToolKind) -> Option<&str> {
        self.value(ConfigField::Tool(kind))
    }

    /// Mandatory fields that are still unset
    pub fn missing_mandatory(&self) -> Vec<ConfigField> {
        ConfigField::MANDATORY
            .into_iter()
            .filter(|f| is_unset(self.get(*f)))
            .collect()
    }

    /// Validation gate: every mandatory field must be set
    ///
    /// Reports the first missing field in [`ConfigField::MANDATORY`] order.
    pub fn validate(&self, override_file: &Path) -> Result<(), ResolutionError> {
        match self.missing_mandatory().first() {
            Some(field) => Err(ResolutionError::MissingMandatory {
                key: field.property_key(),
                override_file: override_file.to_path_buf(),
            }),
            None => Ok(()),
        }
    }

    fn slot(&self, field: ConfigField) -> &Option<String> {
        match field {
            ConfigField::SerialPort => &self.serial_port,
            ConfigField::Tool(kind) => match kind {
                ToolKind::IdfPath => &self.idf_path,
                ToolKind::IdfPyPath => &self.idf_py_path,
                ToolKind::PythonPath => &self.python_path,
                ToolKind::PythonExecutablePath => &self.python_executable_path,
                ToolKind::ToolchainPath => &self.toolchain_path,
                ToolKind::CMakePath => &self.cmake_path,
                ToolKind::NinjaPath => &self.ninja_path,
                ToolKind::GitPath => &self.git_path,
                ToolKind::XtensaGdbPath => &self.xtensa_gdb_path,
                ToolKind::XtensaToolchainPath => &self.xtensa_toolchain_path,
                ToolKind::EspClangPath => &self.esp_clang_path,
                ToolKind::OpenOcdBin => &self.open_ocd_bin,
                ToolKind::CCacheBinPath => &self.ccache_bin_path,
                ToolKind::DfuUtilBinPath => &self.dfu_util_bin_path,
                ToolKind::OpenOcdScriptsPath => &self.open_ocd_scripts_path,
            },
        }
    }

    fn slot_mut(&mut self, field: ConfigField) -> &mut Option<String> {
        match field {
            ConfigField::SerialPort => &mut self.serial_port,
            ConfigField::Tool(kind) => match kind {
                ToolKind::IdfPath => &mut self.idf_path,
                ToolKind::IdfPyPath => &mut self.idf_py_path,
                ToolKind::PythonPath => &mut self.python_path,
                ToolKind::PythonExecutablePath => &mut self.python_executable_path,
                ToolKind::ToolchainPath => &mut self.toolchain_path,
                ToolKind::CMakePath => &mut self.cmake_path,
                ToolKind::NinjaPath => &mut self.ninja_path,
                ToolKind::GitPath => &mut self.git_path,
                ToolKind::XtensaGdbPath => &mut self.xtensa_gdb_path,
                ToolKind::XtensaToolchainPath => &mut self.xtensa_toolchain_path,
                ToolKind::EspClangPath => &mut self.esp_clang_path,
                ToolKind::OpenOcdBin => &mut self.open_ocd_bin,
                ToolKind::CCacheBinPath => &mut self.ccache_bin_path,
                ToolKind::DfuUtilBinPath => &mut self.dfu_util_bin_path,
                ToolKind::OpenOcdScriptsPath => &mut self.open_ocd_scripts_path,
            },
        }
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)?
        } else {
            return Err(SettingsError::LoadError(
                "Config file must be .json or .toml".to_string(),
            ));
        };

        Ok(config)
    }

    /// Save config to file (JSON or TOML), replacing any previous content
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::to_string_pretty(self)?
        } else {
            return Err(SettingsError::SaveError(
                "Config file must be .json or .toml".to_string(),
            ));
        };

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        // Write beside the target and rename so readers never see a partial file
        let mut staged = tempfile::NamedTempFile::new_in(parent)?;
        staged.write_all(content.as_bytes())?;
        staged.flush()?;
        staged.persist(path).map_err(|e| {
            SettingsError::SaveError(format!("Failed to write {}: {}", path.display(), e.error))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use juno_toolchain::ToolPath;
    use std::path::PathBuf;

    fn complete() -> ToolchainConfiguration {
        let mut config = ToolchainConfiguration::new();
        for field in ConfigField::MANDATORY {
            config.set(field, Some(format!("/opt/{}", field.name())));
        }
        config
    }

    #[test]
    fn test_field_keys() {
        assert_eq!(ConfigField::SerialPort.property_key(), "juno.serialPort");
        assert_eq!(
            ConfigField::Tool(ToolKind::CMakePath).property_key(),
            "juno.cMakePath"
        );
        assert_eq!(ConfigField::all().count(), 16);
        assert_eq!(ConfigField::all().filter(|f| f.is_mandatory()).count(), 8);
    }

    #[test]
    fn test_validate_reports_first_missing() {
        let mut config = complete();
        assert!(config.validate(Path::new("juno.properties")).is_ok());

        config.ninja_path = None;
        config.python_path = Some("null".to_string());
        let err = config.validate(Path::new("juno.properties")).unwrap_err();
        assert_eq!(err.key(), "juno.pythonPath");
    }

    #[test]
    fn test_validate_rejects_blank_and_null() {
        for bad in [None, Some(""), Some("   "), Some("null")] {
            let mut config = complete();
            config.serial_port = bad.map(str::to_string);
            let err = config.validate(Path::new("p")).unwrap_err();
            assert_eq!(err.key(), "juno.serialPort");
        }
    }

    #[test]
    fn test_optional_fields_do_not_block_validation() {
        let config = complete();
        assert!(config.git_path.is_none());
        assert!(config.missing_mandatory().is_empty());
    }

    #[test]
    fn test_from_detection() {
        let report = DetectionReport {
            tools: vec![
                ToolPath {
                    kind: ToolKind::IdfPath,
                    value: Some(PathBuf::from("/esp/esp-idf")),
                    validated: true,
                    source: None,
                },
                ToolPath::absent(ToolKind::NinjaPath),
            ],
        };
        let config = ToolchainConfiguration::from_detection(&report, Some("COM3".to_string()));
        assert_eq!(config.tool(ToolKind::IdfPath), Some("/esp/esp-idf"));
        assert_eq!(config.tool(ToolKind::NinjaPath), None);
        assert_eq!(config.value(ConfigField::SerialPort), Some("COM3"));
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_string(&complete()).unwrap();
        assert!(json.contains("\"cMakePath\""));
        assert!(json.contains("\"pythonExecutablePath\""));
        assert!(json.contains("\"serialPort\""));
        assert!(!json.contains("gitPath"));
    }

    #[test]
    fn test_save_replaces_file_in_place() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("cache").join("juno_config.json");

        complete().save_to_file(&path).unwrap();
        let mut updated = complete();
        updated.serial_port = Some("COM9".to_string());
        updated.save_to_file(&path).unwrap();

        let loaded = ToolchainConfiguration::load_from_file(&path).unwrap();
        assert_eq!(loaded.serial_port.as_deref(), Some("COM9"));
        let entries = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1, "no staging file left behind");
    }
}
