//! Build-and-flash script generation

use std::fs;
use std::path::{Path, PathBuf};

use juno_core::Platform;
use juno_settings::{ConfigField, ToolchainConfiguration};
use juno_toolchain::ToolKind;

use super::PipelineError;

/// Base name of the generated script
pub const SCRIPT_STEM: &str = "esp32_build_flash";

/// Tool directories prepended to `PATH`, in order
const PATH_TOOLS: [ToolKind; 11] = [
    ToolKind::XtensaGdbPath,
    ToolKind::XtensaToolchainPath,
    ToolKind::EspClangPath,
    ToolKind::CMakePath,
    ToolKind::OpenOcdBin,
    ToolKind::NinjaPath,
    ToolKind::IdfPyPath,
    ToolKind::CCacheBinPath,
    ToolKind::DfuUtilBinPath,
    ToolKind::PythonPath,
    ToolKind::OpenOcdScriptsPath,
];

/// What the script does after setting up the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptAction {
    /// `idf.py build` then `idf.py -p <port> flash`
    BuildAndFlash,
    /// `idf.py -p <port> flash` only
    FlashOnly,
}

/// Writes the script that builds and flashes a project
pub trait ScriptEmitter {
    /// Write the script into `project_dir` and return its path
    fn emit(
        &self,
        config: &ToolchainConfiguration,
        project_dir: &Path,
        port: &str,
        action: ScriptAction,
    ) -> Result<PathBuf, PipelineError>;
}

/// Emits `esp32_build_flash.sh` or `esp32_build_flash.bat` for the platform
#[derive(Debug, Clone)]
pub struct IdfScriptEmitter<'a> {
    platform: &'a Platform,
}

impl<'a> IdfScriptEmitter<'a> {
    /// Create an emitter for `platform`
    pub fn new(platform: &'a Platform) -> Self {
        Self { platform }
    }

    /// Script file name for the platform
    pub fn script_name(&self) -> String {
        if self.platform.is_windows() {
            format!("{SCRIPT_STEM}.bat")
        } else {
            format!("{SCRIPT_STEM}.sh")
        }
    }

    /// `PATH` prefix built from every configured tool directory
    pub fn tool_path(&self, config: &ToolchainConfiguration) -> String {
        let separator = if self.platform.is_windows() { ";" } else { ":" };
        PATH_TOOLS
            .iter()
            .filter_map(|kind| config.tool(*kind))
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Render the script text
    pub fn render(
        &self,
        config: &ToolchainConfiguration,
        project_dir: &Path,
        port: &str,
        action: ScriptAction,
    ) -> Result<String, PipelineError> {
        let vars = ScriptVars {
            idf: required(config, ToolKind::IdfPath)?,
            python: required(config, ToolKind::PythonExecutablePath)?,
            openocd_scripts: config.tool(ToolKind::OpenOcdScriptsPath).unwrap_or(""),
            git: config.tool(ToolKind::GitPath).unwrap_or(""),
            path: self.tool_path(config),
            project: project_dir.display().to_string(),
            port,
            build: action == ScriptAction::BuildAndFlash,
        };
        Ok(if self.platform.is_windows() {
            vars.batch()
        } else {
            vars.bash()
        })
    }
}

impl ScriptEmitter for IdfScriptEmitter<'_> {
    fn emit(
        &self,
        config: &ToolchainConfiguration,
        project_dir: &Path,
        port: &str,
        action: ScriptAction,
    ) -> Result<PathBuf, PipelineError> {
        let text = self.render(config, project_dir, port, action)?;
        let script = project_dir.join(self.script_name());
        fs::create_dir_all(project_dir)?;
        fs::write(&script, text)?;

        #[cfg(unix)]
        if !self.platform.is_windows() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&script, fs::Permissions::from_mode(0o755))?;
        }

        tracing::info!("Script written to {}", script.display());
        Ok(script)
    }
}

fn required(config: &ToolchainConfiguration, kind: ToolKind) -> Result<&str, PipelineError> {
    config
        .tool(kind)
        .ok_or(PipelineError::MissingValue(ConfigField::Tool(kind).name()))
}

struct ScriptVars<'a> {
    idf: &'a str,
    python: &'a str,
    openocd_scripts: &'a str,
    git: &'a str,
    path: String,
    project: String,
    port: &'a str,
    build: bool,
}

impl ScriptVars<'_> {
    fn bash(&self) -> String {
        let mut out = format!(
            "#!/bin/bash\n\
             \n\
             # === ESP-IDF environment ===\n\
             export IDF_PATH=\"{idf}\"\n\
             export OPENOCD_SCRIPTS=\"{scripts}\"\n\
             export PYTHON_EXE_PATH=\"{python}\"\n\
             export GIT_PATH=\"{git}\"\n\
             export PATH=\"{path}:$IDF_PATH/tools:$PATH\"\n\
             \n\
             cd \"{project}\" || {{\n    echo \"Failed to change to project directory\"\n    exit 1\n}}\n\
             \n\
             if [ -f \"$IDF_PATH/export.sh\" ]; then\n    source \"$IDF_PATH/export.sh\"\n\
             else\n    echo \"export.sh not found in IDF_PATH\"\n    exit 1\nfi\n",
            idf = self.idf,
            scripts = self.openocd_scripts,
            python = self.python,
            git = self.git,
            path = self.path,
            project = self.project,
        );
        if self.build {
            out.push_str(
                "\necho \"Building project...\"\n\
                 \"$PYTHON_EXE_PATH\" \"$IDF_PATH/tools/idf.py\" build || {\n    echo \"Build failed\"\n    exit 1\n}\n",
            );
        }
        out.push_str(&format!(
            "\necho \"Flashing project to {port}...\"\n\
             \"$PYTHON_EXE_PATH\" \"$IDF_PATH/tools/idf.py\" -p \"{port}\" flash || {{\n    echo \"Flash failed\"\n    exit 1\n}}\n\
             \necho \"Operation completed.\"\n",
            port = self.port,
        ));
        out
    }

    fn batch(&self) -> String {
        let mut out = format!(
            "@echo off\r\n\
             REM === ESP-IDF environment ===\r\n\
             set \"IDF_PATH={idf}\"\r\n\
             set \"PATH={path};%PATH%\"\r\n\
             set \"OPENOCD_SCRIPTS={scripts}\"\r\n\
             set \"PYTHON_EXE_PATH={python}\"\r\n\
             set \"GIT_PATH={git}\"\r\n\
             \r\n\
             cd /d \"{project}\"\r\n",
            idf = self.idf,
            path = self.path,
            scripts = self.openocd_scripts,
            python = self.python,
            git = self.git,
            project = self.project,
        );
        if self.build {
            out.push_str(
                "\r\necho Building project...\r\n\
                 call \"%PYTHON_EXE_PATH%\" \"%IDF_PATH%\\tools\\idf.py\" build\r\n\
                 if errorlevel 1 (\r\n    echo Build failed!\r\n    exit /b 1\r\n)\r\n",
            );
        }
        out.push_str(&format!(
            "\r\necho Flashing project...\r\n\
             call \"%PYTHON_EXE_PATH%\" \"%IDF_PATH%\\tools\\idf.py\" -p {port} flash\r\n\
             if errorlevel 1 (\r\n    echo Flash failed!\r\n    exit /b 1\r\n)\r\n\
             echo Operation completed.\r\n",
            port = self.port,
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use juno_core::OsFamily;
    use tempfile::tempdir;

    fn config() -> ToolchainConfiguration {
        let mut config = ToolchainConfiguration::new();
        config.idf_path = Some("/esp/esp-idf".to_string());
        config.idf_py_path = Some("/esp/esp-idf/tools".to_string());
        config.python_executable_path = Some("/py/bin/python3".to_string());
        config.python_path = Some("/py/bin".to_string());
        config.ninja_path = Some("/tools/ninja/1.11".to_string());
        config.git_path = Some(String::new());
        config
    }

    #[test]
    fn test_bash_script() {
        let platform = Platform::for_family(OsFamily::Linux, "/home/dev");
        let emitter = IdfScriptEmitter::new(&platform);
        let text = emitter
            .render(&config(), Path::new("/work/.juno/ESP32Project"), "/dev/ttyUSB0", ScriptAction::BuildAndFlash)
            .unwrap();

        assert!(text.starts_with("#!/bin/bash\n"));
        assert!(text.contains("export IDF_PATH=\"/esp/esp-idf\""));
        assert!(text.contains("export PATH=\"/tools/ninja/1.11:/esp/esp-idf/tools:/py/bin:$IDF_PATH/tools:$PATH\""));
        assert!(text.contains("idf.py\" build"));
        assert!(text.contains("-p \"/dev/ttyUSB0\" flash"));
        assert_eq!(emitter.script_name(), "esp32_build_flash.sh");
    }

    #[test]
    fn test_flash_only_skips_build() {
        let platform = Platform::for_family(OsFamily::Windows, "C:\\Users\\dev");
        let emitter = IdfScriptEmitter::new(&platform);
        let text = emitter
            .render(&config(), Path::new("C:\\work"), "COM3", ScriptAction::FlashOnly)
            .unwrap();

        assert!(text.starts_with("@echo off\r\n"));
        assert!(!text.contains(" build"));
        assert!(text.contains("-p COM3 flash"));
        assert!(text.contains("set \"PATH=/tools/ninja/1.11;/esp/esp-idf/tools;/py/bin;%PATH%\""));
        assert_eq!(emitter.script_name(), "esp32_build_flash.bat");
    }

    #[test]
    fn test_missing_idf_is_an_error() {
        let platform = Platform::for_family(OsFamily::Linux, "/home/dev");
        let mut config = config();
        config.idf_path = None;
        let err = IdfScriptEmitter::new(&platform)
            .render(&config, Path::new("/p"), "COM1", ScriptAction::FlashOnly)
            .unwrap_err();
        assert!(matches!(err, PipelineError::MissingValue("idfPath")));
    }

    #[cfg(unix)]
    #[test]
    fn test_emit_writes_executable_script() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().unwrap();
        let platform = Platform::for_family(OsFamily::Linux, temp.path());
        let script = IdfScriptEmitter::new(&platform)
            .emit(&config(), temp.path(), "/dev/ttyUSB0", ScriptAction::BuildAndFlash)
            .unwrap();

        assert_eq!(script, temp.path().join("esp32_build_flash.sh"));
        let mode = fs::metadata(&script).unwrap().permissions().mode();
        assert_ne!(mode & 0o111, 0);
    }
}
