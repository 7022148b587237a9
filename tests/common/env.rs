//! Test environment builder for isolated pressforge runs.
//!
//! Provides `TestEnv` - a temp directory holding a `pressforge.toml` and a
//! plugins tree, plus helpers to run the CLI against it.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

use super::fixtures::{ADMIN_PHP, APP_JS, DEMO_CONFIG, PLUGIN_PHP, STYLE_CSS};

/// Result of running a pressforge CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// Parse stdout as NDJSON
    pub fn json_lines(&self) -> Vec<serde_json::Value> {
        self.stdout
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).unwrap_or_else(|e| panic!("bad NDJSON line {l:?}: {e}")))
            .collect()
    }
}

/// Isolated workspace: `root/pressforge.toml` and `root/plugins/<folder>/...`
pub struct TestEnv {
    pub root: TempDir,
    bin: PathBuf,
}

impl TestEnv {
    pub fn builder() -> TestEnvBuilder {
        TestEnvBuilder::default()
    }

    /// Path relative to the workspace root
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    /// Path inside the demo plugin
    pub fn plugin_path(&self, relative: &str) -> PathBuf {
        self.root.path().join("plugins/demo-plugin").join(relative)
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative))
            .unwrap_or_else(|e| panic!("cannot read {relative}: {e}"))
    }

    /// Run pressforge from the workspace root
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_from(self.root.path(), args)
    }

    pub fn run_from(&self, cwd: &Path, args: &[&str]) -> TestResult {
        let output = Command::new(&self.bin)
            .current_dir(cwd)
            .args(args)
            .env("NO_COLOR", "1")
            .env_remove("PRESSFORGE_PROXY")
            .env_remove("PRESSFORGE_PLUGINS_ROOT")
            .env_remove("PRESSFORGE_DIST_DIR")
            .env_remove("PRESSFORGE_ARCHIVE_DIR")
            .output()
            .expect("Failed to execute pressforge");
        to_result(output)
    }
}

fn to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

/// Builds a `TestEnv`; `build()` writes the demo config plus chosen files.
#[derive(Default)]
pub struct TestEnvBuilder {
    config: Option<String>,
    with_demo_plugin: bool,
    files: Vec<(String, String)>,
}

impl TestEnvBuilder {
    /// Replace the demo `pressforge.toml`
    pub fn with_config(mut self, config: &str) -> Self {
        self.config = Some(config.to_string());
        self
    }

    /// PHP, JS and CSS sources for the `demo` project
    pub fn with_demo_plugin(mut self) -> Self {
        self.with_demo_plugin = true;
        self
    }

    /// Extra file relative to the workspace root
    pub fn with_file(mut self, relative: &str, content: &str) -> Self {
        self.files.push((relative.to_string(), content.to_string()));
        self
    }

    pub fn build(self) -> TestEnv {
        let env = TestEnv {
            root: tempfile::tempdir().unwrap(),
            bin: PathBuf::from(env!("CARGO_BIN_EXE_pressforge")),
        };

        env.write(
            "pressforge.toml",
            self.config.as_deref().unwrap_or(DEMO_CONFIG),
        );

        if self.with_demo_plugin {
            env.write("plugins/demo-plugin/demo-plugin.php", PLUGIN_PHP);
            env.write("plugins/demo-plugin/admin/settings.php", ADMIN_PHP);
            env.write("plugins/demo-plugin/assets/js/app.js", APP_JS);
            env.write("plugins/demo-plugin/assets/css/style.css", STYLE_CSS);
            env.write("plugins/demo-plugin/node_modules/pkg/index.js", "module.exports = 1;");
            env.write("plugins/demo-plugin/package.json", "{}");
        }

        for (path, content) in &self.files {
            env.write(path, content);
        }

        env
    }
}
