//! Shape validators for candidate paths.

use juno_core::Platform;
use std::path::Path;

/// Check that `path` is an existing file with an executable bit set
///
/// On Windows every existing file counts as executable.
pub fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        true
    }
}

/// Check that `path` looks like an ESP-IDF checkout
///
/// The directory must contain `tools/`, `components/` and the export script
/// for the host (`export.bat` on Windows, `export.sh` elsewhere).
pub fn is_valid_idf_root(path: &Path, platform: &Platform) -> bool {
    path.is_dir()
        && path.join("tools").exists()
        && path.join("components").exists()
        && path.join(platform.export_script()).exists()
}

/// Interpreter inside a Python virtual environment, if present
///
/// Looks in `bin/` on Unix and `Scripts/` on Windows.
pub fn python_in_env(env_root: &Path, platform: &Platform) -> Option<std::path::PathBuf> {
    let bin = if platform.is_windows() {
        env_root.join("Scripts")
    } else {
        env_root.join("bin")
    };
    platform
        .python_names()
        .iter()
        .map(|name| bin.join(name))
        .find(|candidate| candidate.is_file())
}
