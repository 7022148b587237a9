//! Tests for the config module

use super::*;
use proptest::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn project<'a>(config: &'a Config, shortname: &str) -> Option<&'a ProjectDescriptor> {
    config.projects.iter().find(|p| p.shortname == shortname)
}

#[test]
fn test_config_default_has_builtin_projects() {
    let config = Config::default();

    assert_eq!(config.projects.len(), 6);
    assert_eq!(config.paths.plugins_root, PathBuf::from(".."));
    assert_eq!(config.paths.dist_dir, PathBuf::from("../dist"));
    assert_eq!(config.paths.archive_dir, PathBuf::from("../archive"));
    assert_eq!(config.css.max_line_len, 80);
    assert_eq!(config.server.proxy, "http://localhost/abril/");
    assert!(config.server.open);
}

#[test]
fn test_builtin_testimonials_has_no_assets() {
    let config = Config::default();
    let ttshowcase = project(&config, "ttshowcase").unwrap();

    assert!(!ttshowcase.has_css());
    assert!(!ttshowcase.has_js());
    assert_eq!(ttshowcase.pot_file_name(), "ttshowcase.pot");
}

#[test]
fn test_builtin_quiz_has_two_locations() {
    let config = Config::default();
    let quiz = project(&config, "quiz").unwrap();

    assert_eq!(
        quiz.js,
        vec![Location::new("assets/js"), Location::new("admin/js")]
    );
    assert_eq!(quiz.domain, "advq");
}

#[test]
fn test_config_parse_toml() {
    let toml = r#"
[paths]
plugins_root = "plugins"
dist_dir = "out/dist"
archive_dir = "out/archive"

[[project]]
name = "Team Showcase"
folder = "team-showcase"
shortname = "tshowcase"
css = "/css/"
js = ["/js/", "/admin/js/"]
lang = "/languages/"
domain = "tshowcase"

[server]
proxy = "http://wp.test/"
port = 4000
open = false
"#;

    let config: Config = toml::from_str(toml).unwrap();

    assert_eq!(config.projects.len(), 1);
    let project = &config.projects[0];
    assert_eq!(project.css, vec![Location::new("css")]);
    assert_eq!(project.js.len(), 2);
    assert_eq!(project.lang.as_str(), "languages");
    assert_eq!(config.server.port, 4000);
    assert!(!config.server.open);
    assert!(config.server.inject_changes);
    assert_eq!(config.paths.dist_dir, PathBuf::from("out/dist"));
}

#[test]
fn test_legacy_folder_aliases_accepted() {
    let toml = r#"
[[project]]
name = "Interactive World Maps"
folder = "interactive-world-maps"
shortname = "iwm"
cssfolder = "/includes/"
jsfolder = "/includes/"
langfolder = "/lang/"
domain = "iwm"
"#;

    let config: Config = toml::from_str(toml).unwrap();
    let project = &config.projects[0];

    assert_eq!(project.css, vec![Location::new("includes")]);
    assert_eq!(project.js, vec![Location::new("includes")]);
}

#[test]
fn test_missing_locations_mean_no_capability() {
    let toml = r#"
[[project]]
name = "Testimonials Showcase"
folder = "testimonials-showcase"
shortname = "ttshowcase"
domain = "ttshowcase"
"#;

    let config: Config = toml::from_str(toml).unwrap();
    let project = &config.projects[0];

    assert!(project.css.is_empty());
    assert!(project.js.is_empty());
    assert_eq!(project.lang.as_str(), "lang");
}

#[test]
fn test_load_with_warnings_reports_unknown_keys() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pressforge.toml");
    fs::write(
        &path,
        r#"
[server]
proxi = "http://wp.test/"
"#,
    )
    .unwrap();

    let (_config, warnings) = Config::load_with_warnings(&path).unwrap();

    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].key, "proxi");
    assert_eq!(warnings[0].line, Some(3));
    assert_eq!(warnings[0].suggestion.as_deref(), Some("proxy"));
}

#[test]
fn test_load_sets_base_dir_to_config_parent() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pressforge.toml");
    fs::write(&path, "[paths]\nplugins_root = \"plugins\"\n").unwrap();

    let config = Config::load(&path).unwrap();

    assert_eq!(config.base_dir, dir.path());
    assert_eq!(config.plugins_root(), dir.path().join("plugins"));
    assert!(config.projects.is_empty());
}

#[test]
fn test_invalid_toml_is_config_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pressforge.toml");
    fs::write(&path, "[[project]]\nname = 3\n").unwrap();

    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, crate::error::ForgeError::InvalidConfig { .. }));
}

#[test]
fn test_load_or_default_falls_back_to_builtin() {
    let dir = tempdir().unwrap();

    let (config, warnings) = Config::load_or_default(None, dir.path()).unwrap();

    assert!(warnings.is_empty());
    assert_eq!(config.projects.len(), 6);
    assert_eq!(config.base_dir, dir.path());
}

#[test]
fn test_load_or_default_missing_explicit_path_errors() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    assert!(Config::load_or_default(Some(&missing), dir.path()).is_err());
}

#[test]
fn test_project_dir_resolution() {
    let config = Config {
        base_dir: PathBuf::from("/work/build"),
        ..Config::default()
    };
    let quiz = project(&config, "quiz").unwrap();

    assert_eq!(
        config.project_dir(quiz),
        Path::new("/work/build/../advisor-quiz")
    );
    assert_eq!(config.dist_dir(), Path::new("/work/build/../dist"));
}

proptest! {
    #[test]
    fn single_location_equals_one_element_list(segment in "[a-z]{1,8}(/[a-z]{1,8}){0,2}") {
        let single = format!(
            "[[project]]\nname = \"P\"\nfolder = \"p\"\nshortname = \"p\"\ndomain = \"p\"\ncss = \"/{}/\"\n",
            segment
        );
        let list = format!(
            "[[project]]\nname = \"P\"\nfolder = \"p\"\nshortname = \"p\"\ndomain = \"p\"\ncss = [\"/{}/\"]\n",
            segment
        );

        let a: Config = toml::from_str(&single).unwrap();
        let b: Config = toml::from_str(&list).unwrap();

        prop_assert_eq!(&a.projects, &b.projects);
        prop_assert_eq!(a.projects[0].css[0].as_str(), segment.as_str());
    }
}
