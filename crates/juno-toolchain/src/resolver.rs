//! Layered path resolution.
//!
//! Each [`ToolKind`] maps to an ordered list of strategies. The resolver
//! runs them in order and the first one that yields a validated path wins:
//!
//! 1. A well-known environment variable whose value passes a shape check
//! 2. Common installation roots (fixed, or enumerated version directories)
//! 3. A recursive search below the Espressif tools directory
//! 4. Otherwise the tool is absent

use juno_core::env::{IDF_PATH, IDF_PYTHON_ENV_PATH, IDF_TOOLS_PATH};
use juno_core::{Environment, IdfRootCandidate, Platform};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::kinds::ToolKind;
use crate::search::{self, SearchOrder};
use crate::validate;

/// Which layer produced a resolved value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// Environment variable
    Environment,
    /// Common installation root
    CommonRoot,
    /// Recursive search
    Search,
    /// Derived from another resolved tool
    Derived,
}

/// One resolved (or absent) tool location
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolPath {
    /// Which tool this is
    pub kind: ToolKind,
    /// Absolute path, if found
    pub value: Option<PathBuf>,
    /// Whether the value passed the kind's shape validator
    pub validated: bool,
    /// Layer that produced the value
    pub source: Option<ResolutionSource>,
}

impl ToolPath {
    /// An absent tool
    pub fn absent(kind: ToolKind) -> Self {
        Self {
            kind,
            value: None,
            validated: false,
            source: None,
        }
    }

    /// Check if a value was found
    pub fn is_found(&self) -> bool {
        self.value.is_some()
    }
}

/// Output of a full detection pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionReport {
    /// One entry per tool kind, in [`ToolKind::ALL`] order
    pub tools: Vec<ToolPath>,
}

impl DetectionReport {
    /// Entry for `kind`
    pub fn get(&self, kind: ToolKind) -> Option<&ToolPath> {
        self.tools.iter().find(|t| t.kind == kind)
    }

    /// Resolved value for `kind`
    pub fn value(&self, kind: ToolKind) -> Option<&Path> {
        self.get(kind).and_then(|t| t.value.as_deref())
    }

    /// Mandatory kinds that were not found
    pub fn missing_mandatory(&self) -> Vec<ToolKind> {
        self.tools
            .iter()
            .filter(|t| t.kind.is_mandatory() && !t.is_found())
            .map(|t| t.kind)
            .collect()
    }
}

impl std::fmt::Display for DetectionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for tool in &self.tools {
            let value = tool
                .value
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "null".to_string());
            writeln!(f, "{:<22} -> {}", tool.kind.label(), value)?;
        }
        Ok(())
    }
}

/// What a strategy returns once a candidate matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    /// The matched file itself
    File,
    /// The directory containing the matched file
    Parent,
    /// The candidate root that was being checked
    Root,
}

/// One way of locating a tool
#[derive(Debug, Clone, Copy)]
enum Strategy {
    /// `IDF_PATH` accepted when it has the IDF shape
    IdfEnv,
    /// Platform's common IDF installation roots
    IdfRoots,
    /// A file relative to the resolved IDF root
    IdfRelative { relative: &'static str, output: Output },
    /// `IDF_PYTHON_ENV_PATH` accepted when it contains an interpreter
    PythonEnv { output: Output },
    /// Climb to the `Espressif` ancestor of the IDF or tools path and search beneath it
    EspressifPython { output: Output },
    /// Version directories under `<tools>/<tool_dir>`, each checked for an executable
    Versioned {
        tool_dir: &'static str,
        unix: &'static str,
        windows: &'static str,
        output: Output,
    },
    /// Recursive search for an executable under `<tools>/<tool_dir>`
    Search {
        tool_dir: Option<&'static str>,
        file: &'static str,
        append_exe_suffix: bool,
        order: SearchOrder,
        output: Output,
    },
}

impl Strategy {
    fn source(self) -> ResolutionSource {
        match self {
            Strategy::IdfEnv | Strategy::PythonEnv { .. } => ResolutionSource::Environment,
            Strategy::IdfRoots | Strategy::Versioned { .. } => ResolutionSource::CommonRoot,
            Strategy::IdfRelative { .. } => ResolutionSource::Derived,
            Strategy::EspressifPython { .. } | Strategy::Search { .. } => ResolutionSource::Search,
        }
    }
}

const fn search(
    tool_dir: Option<&'static str>,
    file: &'static str,
    append_exe_suffix: bool,
    order: SearchOrder,
) -> Strategy {
    Strategy::Search {
        tool_dir,
        file,
        append_exe_suffix,
        order,
        output: Output::Parent,
    }
}

/// Strategy table, first success wins
fn strategies(kind: ToolKind) -> Vec<Strategy> {
    use SearchOrder::{FirstEncountered, ReverseSiblings};

    match kind {
        ToolKind::IdfPath => vec![Strategy::IdfEnv, Strategy::IdfRoots],
        ToolKind::IdfPyPath => vec![Strategy::IdfRelative {
            relative: "tools/idf.py",
            output: Output::Parent,
        }],
        ToolKind::PythonPath => vec![
            Strategy::PythonEnv {
                output: Output::Parent,
            },
            Strategy::EspressifPython {
                output: Output::Parent,
            },
        ],
        ToolKind::PythonExecutablePath => vec![
            Strategy::PythonEnv {
                output: Output::File,
            },
            Strategy::EspressifPython {
                output: Output::File,
            },
        ],
        ToolKind::ToolchainPath | ToolKind::XtensaToolchainPath => vec![search(
            Some("xtensa-esp-elf"),
            "xtensa-esp-elf-gcc",
            true,
            ReverseSiblings,
        )],
        ToolKind::CMakePath => vec![Strategy::Versioned {
            tool_dir: "cmake",
            unix: "bin/cmake",
            windows: "cmake.exe",
            output: Output::Root,
        }],
        ToolKind::NinjaPath => vec![Strategy::Versioned {
            tool_dir: "ninja",
            unix: "bin/ninja",
            windows: "ninja.exe",
            output: Output::Root,
        }],
        ToolKind::GitPath => vec![Strategy::Versioned {
            tool_dir: "idf-git",
            unix: "bin/git",
            windows: "cmd/git.exe",
            output: Output::File,
        }],
        ToolKind::XtensaGdbPath => vec![search(
            Some("xtensa-esp-elf-gdb"),
            "xtensa-esp32-elf-gdb",
            true,
            FirstEncountered,
        )],
        ToolKind::EspClangPath => vec![search(Some("esp-clang"), "clang", true, FirstEncountered)],
        ToolKind::OpenOcdBin => vec![search(None, "openocd", true, FirstEncountered)],
        ToolKind::CCacheBinPath => vec![search(Some("ccache"), "ccache", true, ReverseSiblings)],
        ToolKind::DfuUtilBinPath => vec![search(Some("dfu-util"), "dfu-util", true, ReverseSiblings)],
        ToolKind::OpenOcdScriptsPath => vec![search(
            Some("openocd-esp32"),
            "memory.tcl",
            false,
            ReverseSiblings,
        )],
    }
}

fn shape(path: PathBuf, output: Output, root: &Path) -> Option<PathBuf> {
    match output {
        Output::File => Some(path),
        Output::Parent => path.parent().map(Path::to_path_buf),
        Output::Root => Some(root.to_path_buf()),
    }
}

/// Stateless resolver over a platform descriptor and an environment snapshot
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'a> {
    platform: &'a Platform,
    env: &'a Environment,
}

impl<'a> PathResolver<'a> {
    /// Create a resolver
    pub fn new(platform: &'a Platform, env: &'a Environment) -> Self {
        Self { platform, env }
    }

    /// Platform this resolver targets
    pub fn platform(&self) -> &Platform {
        self.platform
    }

    /// Resolve one tool, recording which layer produced the value
    pub fn resolve(&self, kind: ToolKind) -> ToolPath {
        for strategy in strategies(kind) {
            if let Some(value) = self.run(strategy) {
                tracing::debug!(tool = %kind, path = %value.display(), source = ?strategy.source(), "Resolved tool path");
                return ToolPath {
                    kind,
                    value: Some(value),
                    validated: true,
                    source: Some(strategy.source()),
                };
            }
        }
        tracing::debug!(tool = %kind, "Tool not found");
        ToolPath::absent(kind)
    }

    /// Resolved value for `kind`, or `None`
    pub fn resolve_value(&self, kind: ToolKind) -> Option<PathBuf> {
        self.resolve(kind).value
    }

    /// Resolve every tool kind
    pub fn detect_all(&self) -> DetectionReport {
        DetectionReport {
            tools: ToolKind::ALL.iter().map(|k| self.resolve(*k)).collect(),
        }
    }

    /// Directory containing the Python interpreter below the `Espressif` ancestor of `start`
    pub fn python_dir_from(&self, start: &Path) -> Option<PathBuf> {
        self.espressif_python(start)
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
    }

    /// Python interpreter below the `Espressif` ancestor of `start`
    pub fn python_executable_from(&self, start: &Path) -> Option<PathBuf> {
        self.espressif_python(start)
    }

    fn espressif_python(&self, start: &Path) -> Option<PathBuf> {
        let root = search::climb_to_espressif(start)?;
        search::find_named_file(&root, self.platform.python_names())
    }

    fn run(&self, strategy: Strategy) -> Option<PathBuf> {
        match strategy {
            Strategy::IdfEnv => self
                .env
                .var(IDF_PATH)
                .map(PathBuf::from)
                .filter(|p| validate::is_valid_idf_root(p, self.platform)),
            Strategy::IdfRoots => self.idf_from_common_roots(),
            Strategy::IdfRelative { relative, output } => {
                let idf = self.resolve_value(ToolKind::IdfPath)?;
                let file = idf.join(relative);
                file.exists().then(|| shape(file, output, &idf)).flatten()
            }
            Strategy::PythonEnv { output } => {
                let env_root = PathBuf::from(self.env.var(IDF_PYTHON_ENV_PATH)?);
                let exe = validate::python_in_env(&env_root, self.platform)?;
                shape(exe, output, &env_root)
            }
            Strategy::EspressifPython { output } => {
                let start = self
                    .env
                    .var(IDF_PATH)
                    .or_else(|| self.env.var(IDF_TOOLS_PATH))
                    .map(PathBuf::from)?;
                match output {
                    Output::Parent => self.python_dir_from(&start),
                    _ => self.python_executable_from(&start),
                }
            }
            Strategy::Versioned {
                tool_dir,
                unix,
                windows,
                output,
            } => {
                let relative = if self.platform.is_windows() { windows } else { unix };
                search::subdirectories(&self.platform.tool_dir(tool_dir))
                    .into_iter()
                    .find_map(|version| {
                        let candidate = version.join(relative);
                        validate::is_executable(&candidate)
                            .then(|| shape(candidate, output, &version))
                            .flatten()
                    })
            }
            Strategy::Search {
                tool_dir,
                file,
                append_exe_suffix,
                order,
                output,
            } => {
                let root = match tool_dir {
                    Some(dir) => self.platform.tool_dir(dir),
                    None => self.platform.tools_root.clone(),
                };
                let name = if append_exe_suffix {
                    self.platform.exe_name(file)
                } else {
                    file.to_string()
                };
                let found = search::find_executable(&root, &name, order)?;
                shape(found, output, &root)
            }
        }
    }

    fn idf_from_common_roots(&self) -> Option<PathBuf> {
        self.platform
            .idf_candidates
            .iter()
            .flat_map(|candidate| match candidate {
                IdfRootCandidate::Fixed(path) => vec![path.clone()],
                IdfRootCandidate::Children { parent, prefix } => search::subdirectories(parent)
                    .into_iter()
                    .filter(|dir| {
                        dir.file_name()
                            .is_some_and(|n| n.to_string_lossy().starts_with(prefix.as_str()))
                    })
                    .collect(),
            })
            .find(|path| validate::is_valid_idf_root(path, self.platform))
    }
}
