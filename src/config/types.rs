//! Configuration type definitions

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ForgeResult;

use super::defaults;
use super::loader::{self, ConfigWarning};
use super::location::{deserialize_locations, Location};

/// One managed plugin project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDescriptor {
    /// Human readable name, used as the `.pot` project id
    pub name: String,

    /// Directory name under the plugins root; also the archive name
    pub folder: String,

    /// Unique id used as the task name suffix
    pub shortname: String,

    #[serde(
        default,
        alias = "cssfolder",
        deserialize_with = "deserialize_locations",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub css: Vec<Location>,

    #[serde(
        default,
        alias = "jsfolder",
        deserialize_with = "deserialize_locations",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub js: Vec<Location>,

    #[serde(default = "default_lang", alias = "langfolder")]
    pub lang: Location,

    /// Text domain passed to the gettext calls
    pub domain: String,
}

impl ProjectDescriptor {
    pub fn has_js(&self) -> bool {
        !self.js.is_empty()
    }

    pub fn has_css(&self) -> bool {
        !self.css.is_empty()
    }

    /// File name of the translation template (`<domain>.pot`)
    pub fn pot_file_name(&self) -> String {
        format!("{}.pot", self.domain)
    }
}

fn default_lang() -> Location {
    Location::new("/lang/")
}

/// Filesystem destinations, relative to the config file's directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_plugins_root")]
    pub plugins_root: PathBuf,

    #[serde(default = "default_dist_dir")]
    pub dist_dir: PathBuf,

    #[serde(default = "default_archive_dir")]
    pub archive_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            plugins_root: default_plugins_root(),
            dist_dir: default_dist_dir(),
            archive_dir: default_archive_dir(),
        }
    }
}

fn default_plugins_root() -> PathBuf {
    PathBuf::from("..")
}

fn default_dist_dir() -> PathBuf {
    PathBuf::from("../dist")
}

fn default_archive_dir() -> PathBuf {
    PathBuf::from("../archive")
}

/// Packaging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageConfig {
    /// Gitignore-style patterns, relative to the project folder
    #[serde(default = "defaults::package_exclude")]
    pub exclude: Vec<String>,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            exclude: defaults::package_exclude(),
        }
    }
}

/// `.pot` header metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    #[serde(default)]
    pub bug_report: Option<String>,

    #[serde(default = "default_last_translator")]
    pub last_translator: String,

    #[serde(default = "default_team")]
    pub team: String,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            bug_report: None,
            last_translator: default_last_translator(),
            team: default_team(),
        }
    }
}

fn default_last_translator() -> String {
    "FULL NAME <EMAIL@ADDRESS>".to_string()
}

fn default_team() -> String {
    "LANGUAGE <LL@li.org>".to_string()
}

/// CSS output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CssConfig {
    /// Break minified output after a `}` once a line reaches this length.
    /// Zero disables wrapping.
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
}

impl Default for CssConfig {
    fn default() -> Self {
        Self {
            max_line_len: default_max_line_len(),
        }
    }
}

fn default_max_line_len() -> usize {
    80
}

/// Live-reload dev server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Upstream development site
    #[serde(default = "default_proxy")]
    pub proxy: String,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Open a browser once the server listens
    #[serde(default = "default_true")]
    pub open: bool,

    /// Inject stylesheet changes instead of reloading the page
    #[serde(default = "default_true")]
    pub inject_changes: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            proxy: default_proxy(),
            host: default_host(),
            port: default_port(),
            open: true,
            inject_changes: true,
        }
    }
}

fn default_proxy() -> String {
    "http://localhost/abril/".to_string()
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Watch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    crate::watcher::DEFAULT_DEBOUNCE_MS
}

fn default_true() -> bool {
    true
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// `[[project]]` tables
    #[serde(default, rename = "project")]
    pub projects: Vec<ProjectDescriptor>,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub package: PackageConfig,

    #[serde(default)]
    pub translate: TranslateConfig,

    #[serde(default)]
    pub css: CssConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    /// Directory relative paths resolve against (the config file's parent)
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Default for Config {
    /// The built-in project table, used when no config file exists.
    fn default() -> Self {
        Self {
            projects: defaults::projects(),
            paths: PathsConfig::default(),
            package: PackageConfig::default(),
            translate: TranslateConfig::default(),
            css: CssConfig::default(),
            server: ServerConfig::default(),
            watch: WatchConfig::default(),
            base_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> ForgeResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> ForgeResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Load from an explicit path, `pressforge.toml` in `cwd`, or the
    /// built-in table.
    pub fn load_or_default(
        explicit: Option<&Path>,
        cwd: &Path,
    ) -> ForgeResult<(Self, Vec<ConfigWarning>)> {
        loader::load_or_default(explicit, cwd)
    }

    pub fn plugins_root(&self) -> PathBuf {
        self.base_dir.join(&self.paths.plugins_root)
    }

    /// Absolute-ish directory of one project
    pub fn project_dir(&self, project: &ProjectDescriptor) -> PathBuf {
        self.plugins_root().join(&project.folder)
    }

    pub fn dist_dir(&self) -> PathBuf {
        self.base_dir.join(&self.paths.dist_dir)
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.base_dir.join(&self.paths.archive_dir)
    }
}
