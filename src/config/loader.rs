//! Configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ForgeError, ForgeResult};

use super::types::Config;

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "pressforge.toml";

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> ForgeResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let mut config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| ForgeError::InvalidConfig {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    config.base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                key: key.clone(),
                file: path.to_path_buf(),
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Load from an explicit path, the project config, or the built-in table.
///
/// An explicit path that does not exist is an error; a missing
/// `pressforge.toml` in `cwd` is not.
pub fn load_or_default(
    explicit: Option<&Path>,
    cwd: &Path,
) -> ForgeResult<(Config, Vec<ConfigWarning>)> {
    if let Some(path) = explicit {
        let (config, warnings) = load_with_warnings(path)?;
        return Ok((with_env_overrides(config), warnings));
    }

    let project_config = cwd.join(CONFIG_FILE_NAME);
    if project_config.exists() {
        let (config, warnings) = load_with_warnings(&project_config)?;
        return Ok((with_env_overrides(config), warnings));
    }

    let config = Config {
        base_dir: cwd.to_path_buf(),
        ..Config::default()
    };
    Ok((with_env_overrides(config), Vec::new()))
}

/// Apply environment variable overrides (PRESSFORGE_* prefix)
pub fn with_env_overrides(mut config: Config) -> Config {
    if let Ok(proxy) = std::env::var("PRESSFORGE_PROXY") {
        if !proxy.trim().is_empty() {
            config.server.proxy = proxy;
        }
    }

    if let Ok(dir) = std::env::var("PRESSFORGE_PLUGINS_ROOT") {
        config.paths.plugins_root = PathBuf::from(dir);
    }

    if let Ok(dir) = std::env::var("PRESSFORGE_DIST_DIR") {
        config.paths.dist_dir = PathBuf::from(dir);
    }

    if let Ok(dir) = std::env::var("PRESSFORGE_ARCHIVE_DIR") {
        config.paths.archive_dir = PathBuf::from(dir);
    }

    if let Ok(val) = std::env::var("PRESSFORGE_NO_OPEN") {
        if val.to_lowercase() != "false" && val != "0" {
            config.server.open = false;
        }
    }

    config
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    for (i, line) in content.lines().enumerate() {
        if line.contains(needle) {
            return Some(i + 1);
        }
    }
    None
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "project",
        "name",
        "folder",
        "shortname",
        "css",
        "js",
        "lang",
        "domain",
        "paths",
        "plugins_root",
        "dist_dir",
        "archive_dir",
        "package",
        "exclude",
        "translate",
        "bug_report",
        "last_translator",
        "team",
        "max_line_len",
        "server",
        "proxy",
        "host",
        "port",
        "open",
        "inject_changes",
        "watch",
        "debounce_ms",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] =
                std::cmp::min(std::cmp::min(prev[j + 1] + 1, curr[j] + 1), prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggest_key_finds_close_match() {
        assert_eq!(suggest_key("shortnme"), Some("shortname".to_string()));
        assert_eq!(suggest_key("proxi"), Some("proxy".to_string()));
        assert_eq!(suggest_key("completely_unrelated"), None);
    }

    #[test]
    fn find_line_number_is_one_based() {
        let content = "[server]\nprox = \"x\"\n";
        assert_eq!(find_line_number(content, "prox"), Some(2));
        assert_eq!(find_line_number(content, "missing"), None);
    }
}
