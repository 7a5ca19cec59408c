//! Tool identities known to the resolver.

use serde::{Deserialize, Serialize};

/// Every external tool Juno resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolKind {
    /// ESP-IDF checkout root
    IdfPath,
    /// `<idf>/tools`, the directory holding `idf.py`
    IdfPyPath,
    /// Directory containing the Python interpreter
    PythonPath,
    /// Python interpreter executable
    PythonExecutablePath,
    /// Directory containing `xtensa-esp-elf-gcc`
    ToolchainPath,
    /// CMake version directory
    CMakePath,
    /// Ninja version directory
    NinjaPath,
    /// Git shipped with the IDF installer
    GitPath,
    /// Directory containing the Xtensa GDB
    XtensaGdbPath,
    /// Directory containing the Xtensa compiler (debug tooling view)
    XtensaToolchainPath,
    /// Directory containing Espressif's clang
    EspClangPath,
    /// Directory containing `openocd`
    OpenOcdBin,
    /// Directory containing `ccache`
    CCacheBinPath,
    /// Directory containing `dfu-util`
    DfuUtilBinPath,
    /// OpenOCD script directory
    OpenOcdScriptsPath,
}

impl ToolKind {
    /// All kinds in resolution order
    pub const ALL: [ToolKind; 15] = [
        ToolKind::IdfPath,
        ToolKind::IdfPyPath,
        ToolKind::PythonPath,
        ToolKind::PythonExecutablePath,
        ToolKind::ToolchainPath,
        ToolKind::CMakePath,
        ToolKind::NinjaPath,
        ToolKind::GitPath,
        ToolKind::XtensaGdbPath,
        ToolKind::XtensaToolchainPath,
        ToolKind::EspClangPath,
        ToolKind::OpenOcdBin,
        ToolKind::CCacheBinPath,
        ToolKind::DfuUtilBinPath,
        ToolKind::OpenOcdScriptsPath,
    ];

    /// Field name used in the cache and override files
    pub fn field_name(self) -> &'static str {
        match self {
            Self::IdfPath => "idfPath",
            Self::IdfPyPath => "idfPyPath",
            Self::PythonPath => "pythonPath",
            Self::PythonExecutablePath => "pythonExecutablePath",
            Self::ToolchainPath => "toolchainPath",
            Self::CMakePath => "cMakePath",
            Self::NinjaPath => "ninjaPath",
            Self::GitPath => "gitPath",
            Self::XtensaGdbPath => "xtensaGdbPath",
            Self::XtensaToolchainPath => "xtensaToolchainPath",
            Self::EspClangPath => "espClangPath",
            Self::OpenOcdBin => "openOcdBin",
            Self::CCacheBinPath => "cCacheBinPath",
            Self::DfuUtilBinPath => "dfuUtilBinPath",
            Self::OpenOcdScriptsPath => "openOcdScriptsPath",
        }
    }

    /// Whether the build cannot proceed without this tool
    pub fn is_mandatory(self) -> bool {
        matches!(
            self,
            Self::IdfPath
                | Self::IdfPyPath
                | Self::PythonPath
                | Self::PythonExecutablePath
                | Self::ToolchainPath
                | Self::CMakePath
                | Self::NinjaPath
        )
    }

    /// Human readable label
    pub fn label(self) -> &'static str {
        match self {
            Self::IdfPath => "IDF Path",
            Self::IdfPyPath => "idf.py Path",
            Self::PythonPath => "Python Path",
            Self::PythonExecutablePath => "PythonExe Path",
            Self::ToolchainPath => "Toolchain Path",
            Self::CMakePath => "CMake Path",
            Self::NinjaPath => "Ninja Path",
            Self::GitPath => "Git Path",
            Self::XtensaGdbPath => "Xtensa GDB Path",
            Self::XtensaToolchainPath => "Xtensa Toolchain Path",
            Self::EspClangPath => "ESP Clang Path",
            Self::OpenOcdBin => "OpenOCD Bin",
            Self::CCacheBinPath => "ccache Path",
            Self::DfuUtilBinPath => "dfu-util Path",
            Self::OpenOcdScriptsPath => "OpenOCD Scripts Path",
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_field_names_are_unique() {
        let names: HashSet<_> = ToolKind::ALL.iter().map(|k| k.field_name()).collect();
        assert_eq!(names.len(), ToolKind::ALL.len());
    }

    #[test]
    fn test_mandatory_set() {
        let mandatory: Vec<_> = ToolKind::ALL
            .iter()
            .filter(|k| k.is_mandatory())
            .map(|k| k.field_name())
            .collect();
        assert_eq!(
            mandatory,
            vec![
                "idfPath",
                "idfPyPath",
                "pythonPath",
                "pythonExecutablePath",
                "toolchainPath",
                "cMakePath",
                "ninjaPath"
            ]
        );
    }
}
