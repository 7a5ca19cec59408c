//! Host platform descriptor
//!
//! Collects every OS-specific naming convention the toolchain resolver needs
//! into one value: executable suffix, IDF export script, the Espressif tools
//! directory and the common IDF installation roots. Resolution code consumes
//! a `Platform` instead of branching on the OS name itself.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    /// Microsoft Windows
    Windows,
    /// Apple macOS
    MacOs,
    /// Linux and other Unix-like systems
    Linux,
}

impl OsFamily {
    /// Family of the running host
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Linux
        }
    }

    /// Check if this is Windows
    pub fn is_windows(self) -> bool {
        self == Self::Windows
    }
}

impl std::fmt::Display for OsFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Windows => write!(f, "windows"),
            Self::MacOs => write!(f, "macos"),
            Self::Linux => write!(f, "linux"),
        }
    }
}

/// A place where an ESP-IDF checkout may live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdfRootCandidate {
    /// A single fixed directory
    Fixed(PathBuf),
    /// Every immediate subdirectory of `parent` whose name starts with `prefix`
    Children {
        /// Directory to enumerate.
        parent: PathBuf,
        /// Required name prefix, e.g. `esp-idf`.
        prefix: String,
    },
}

/// Naming conventions and install roots for one host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// Operating system family
    pub family: OsFamily,
    /// User home directory
    pub home: PathBuf,
    /// Espressif tools directory (`C:\Espressif\tools` or `~/.espressif/tools`)
    pub tools_root: PathBuf,
    /// Common IDF installation roots, tried in order
    pub idf_candidates: Vec<IdfRootCandidate>,
}

impl Platform {
    /// Descriptor for the running host
    pub fn current() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::for_family(OsFamily::current(), home)
    }

    /// Descriptor with the default layout of `family` under `home`
    pub fn for_family(family: OsFamily, home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        match family {
            OsFamily::Windows => {
                let espressif = PathBuf::from("C:\\Espressif");
                Self {
                    family,
                    tools_root: espressif.join("tools"),
                    idf_candidates: vec![IdfRootCandidate::Children {
                        parent: espressif.join("frameworks"),
                        prefix: "esp-idf".to_string(),
                    }],
                    home,
                }
            }
            OsFamily::MacOs | OsFamily::Linux => Self {
                family,
                tools_root: home.join(".espressif").join("tools"),
                idf_candidates: vec![
                    IdfRootCandidate::Fixed(home.join("esp").join("esp-idf")),
                    IdfRootCandidate::Fixed(home.join("esp-idf")),
                    IdfRootCandidate::Fixed(PathBuf::from("/opt/espressif/esp-idf")),
                ],
                home,
            },
        }
    }

    /// Replace the Espressif tools directory
    pub fn with_tools_root(mut self, tools_root: impl Into<PathBuf>) -> Self {
        self.tools_root = tools_root.into();
        self
    }

    /// Replace the common IDF installation roots
    pub fn with_idf_candidates(mut self, candidates: Vec<IdfRootCandidate>) -> Self {
        self.idf_candidates = candidates;
        self
    }

    /// Check if this is a Windows host
    pub fn is_windows(&self) -> bool {
        self.family.is_windows()
    }

    /// Suffix appended to executable file names
    pub fn exe_suffix(&self) -> &'static str {
        if self.is_windows() {
            ".exe"
        } else {
            ""
        }
    }

    /// Executable file name for `stem` on this host
    pub fn exe_name(&self, stem: &str) -> String {
        format!("{stem}{}", self.exe_suffix())
    }

    /// IDF environment export script expected in an IDF root
    pub fn export_script(&self) -> &'static str {
        if self.is_windows() {
            "export.bat"
        } else {
            "export.sh"
        }
    }

    /// Interpreter file names recognised during the Python search
    pub fn python_names(&self) -> &'static [&'static str] {
        if self.is_windows() {
            &["python.exe"]
        } else {
            &["python3", "python"]
        }
    }

    /// Subdirectory of the Espressif tools root
    pub fn tool_dir(&self, name: &str) -> PathBuf {
        self.tools_root.join(name)
    }

    /// Working directory for cache and override files under `base`
    pub fn workdir(base: &Path) -> PathBuf {
        base.join(crate::WORKDIR_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_layout() {
        let platform = Platform::for_family(OsFamily::Windows, "C:\\Users\\dev");
        assert_eq!(platform.exe_name("ninja"), "ninja.exe");
        assert_eq!(platform.export_script(), "export.bat");
        assert_eq!(platform.python_names(), &["python.exe"]);
        assert_eq!(platform.tools_root, PathBuf::from("C:\\Espressif").join("tools"));
        assert!(matches!(
            platform.idf_candidates.as_slice(),
            [IdfRootCandidate::Children { prefix, .. }] if prefix == "esp-idf"
        ));
    }

    #[test]
    fn test_unix_layout() {
        let platform = Platform::for_family(OsFamily::Linux, "/home/dev");
        assert_eq!(platform.exe_name("ninja"), "ninja");
        assert_eq!(platform.export_script(), "export.sh");
        assert_eq!(
            platform.tool_dir("cmake"),
            PathBuf::from("/home/dev/.espressif/tools/cmake")
        );
        assert_eq!(platform.idf_candidates.len(), 3);
        assert_eq!(
            platform.idf_candidates[0],
            IdfRootCandidate::Fixed(PathBuf::from("/home/dev/esp/esp-idf"))
        );
    }

    #[test]
    fn test_overrides() {
        let platform = Platform::for_family(OsFamily::MacOs, "/Users/dev")
            .with_tools_root("/tmp/tools")
            .with_idf_candidates(Vec::new());
        assert_eq!(platform.tool_dir("ccache"), PathBuf::from("/tmp/tools/ccache"));
        assert!(platform.idf_candidates.is_empty());
    }
}
