//! ESP-IDF project skeleton

use std::fs;
use std::path::{Path, PathBuf};

use super::PipelineError;

/// Directory name of the generated project inside the working directory
pub const PROJECT_NAME: &str = "ESP32Project";

/// Relative path and contents of every generated file
const FILES: [(&str, &str); 10] = [
    ("CMakeLists.txt", include_str!("templates/CMakeLists.txt")),
    ("README.md", include_str!("templates/README.md")),
    (".clangd", include_str!("templates/clangd")),
    (".clang-format", include_str!("templates/clang-format")),
    (".gitignore", include_str!("templates/gitignore")),
    ("main/CMakeLists.txt", include_str!("templates/main_CMakeLists.txt")),
    ("main/Kconfig.projbuild", include_str!("templates/Kconfig.projbuild")),
    ("main/juno_serial.h", include_str!("templates/juno_serial.h")),
    ("main/juno_serial.c", include_str!("templates/juno_serial.c")),
    ("main/main.c", include_str!("templates/main.c")),
];

/// Writes a firmware project and returns its root
pub trait ProjectScaffolder {
    /// Create the project under `workdir`
    fn scaffold(&self, workdir: &Path) -> Result<PathBuf, PipelineError>;
}

/// Writes the fixed ESP-IDF skeleton with the Juno serial helper
#[derive(Debug, Clone, Copy, Default)]
pub struct Esp32Scaffolder;

impl ProjectScaffolder for Esp32Scaffolder {
    fn scaffold(&self, workdir: &Path) -> Result<PathBuf, PipelineError> {
        let root = workdir.join(PROJECT_NAME);
        fs::create_dir_all(root.join("main"))?;
        for (relative, contents) in FILES {
            let path = root.join(relative);
            fs::write(&path, contents)?;
            tracing::debug!("Created {}", path.display());
        }
        tracing::info!("Project ready at {}", root.display());
        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_scaffold_writes_every_file() {
        let temp = tempdir().unwrap();
        let root = Esp32Scaffolder.scaffold(temp.path()).unwrap();

        assert_eq!(root, temp.path().join(PROJECT_NAME));
        for (relative, _) in FILES {
            assert!(root.join(relative).is_file(), "{relative}");
        }
        let serial = fs::read_to_string(root.join("main/juno_serial.c")).unwrap();
        assert!(serial.contains("\"thunder\""));
        assert!(serial.contains("\"juno_read\""));
    }

    #[test]
    fn test_scaffold_is_repeatable() {
        let temp = tempdir().unwrap();
        Esp32Scaffolder.scaffold(temp.path()).unwrap();
        let root = Esp32Scaffolder.scaffold(temp.path()).unwrap();
        assert!(root.join("main/main.c").is_file());
    }
}
