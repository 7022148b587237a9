//! Tests for the task registry and planner

use super::*;
use crate::config::{Config, Location, ProjectDescriptor};
use proptest::prelude::*;

fn descriptor(short: &str, css: bool, js: bool) -> ProjectDescriptor {
    ProjectDescriptor {
        name: format!("Project {}", short),
        folder: format!("{}-plugin", short),
        shortname: short.to_string(),
        css: if css { vec![Location::new("/css/")] } else { vec![] },
        js: if js { vec![Location::new("/js/")] } else { vec![] },
        lang: Location::new("/lang/"),
        domain: short.to_string(),
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_builtin_registry_names() {
    let config = Config::default();
    let registry = TaskRegistry::build(&config.projects).unwrap();

    for name in [
        "translate-tshowcase",
        "minjs-tshowcase",
        "mincss-tshowcase",
        "zip-tshowcase",
        "watch-tshowcase",
        "translate-ttshowcase",
        "zip-ttshowcase",
        "watch-ttshowcase",
        "minjs-quiz",
        "mincss-quiz",
    ] {
        assert!(registry.get(name).is_some(), "missing {}", name);
    }

    assert!(registry.get("minjs-ttshowcase").is_none());
    assert!(registry.get("mincss-ttshowcase").is_none());
    assert!(!registry.contains("zip-nothing"));
}

#[test]
fn test_operation_count() {
    let projects = vec![descriptor("a", true, true), descriptor("b", false, false)];
    let registry = TaskRegistry::build(&projects).unwrap();

    // a: translate, minjs, mincss, zip, watch; b: translate, zip, watch
    assert_eq!(registry.operations().count(), 8);
}

#[test]
fn test_zip_dependencies_follow_capabilities() {
    let projects = vec![
        descriptor("full", true, true),
        descriptor("cssonly", true, false),
        descriptor("bare", false, false),
    ];
    let registry = TaskRegistry::build(&projects).unwrap();

    assert_eq!(
        registry.dependencies("zip-full"),
        names(&["translate-full", "minjs-full", "mincss-full"]).as_slice()
    );
    assert_eq!(
        registry.dependencies("zip-cssonly"),
        names(&["translate-cssonly", "mincss-cssonly"]).as_slice()
    );
    assert_eq!(
        registry.dependencies("zip-bare"),
        names(&["translate-bare"]).as_slice()
    );
    assert!(registry.dependencies("translate-full").is_empty());
}

#[test]
fn test_zip_registered_after_its_dependencies() {
    let config = Config::default();
    let registry = TaskRegistry::build(&config.projects).unwrap();

    for op in registry.operations() {
        let pos = registry.position(&op.name).unwrap();
        for dep in registry.dependencies(&op.name) {
            assert!(registry.position(dep).unwrap() < pos);
        }
    }
}

#[test]
fn test_duplicate_shortname_rejected() {
    let projects = vec![descriptor("same", true, true), descriptor("same", false, false)];

    let err = TaskRegistry::build(&projects).unwrap_err();
    assert!(matches!(err, ForgeError::DuplicateShortname { ref shortname, .. } if shortname == "same"));
}

#[test]
fn test_aggregates_cover_every_project() {
    let projects = vec![descriptor("a", true, false), descriptor("b", false, true)];
    let registry = TaskRegistry::build(&projects).unwrap();

    assert_eq!(
        registry.aggregate("translate-all").unwrap(),
        names(&["translate-a", "translate-b"]).as_slice()
    );
    assert_eq!(
        registry.aggregate("mincss-all").unwrap(),
        names(&["mincss-a"]).as_slice()
    );
    assert_eq!(
        registry.aggregate("minjs-all").unwrap(),
        names(&["minjs-b"]).as_slice()
    );
    assert_eq!(
        registry.aggregate(DEFAULT_TASK).unwrap(),
        names(&["watch-all"]).as_slice()
    );
    assert!(registry.contains("zip-all"));
}

#[test]
fn test_expand_unknown_task() {
    let registry = TaskRegistry::build(&[descriptor("a", true, true)]).unwrap();

    let err = registry.expand(&names(&["minjs-b"])).unwrap_err();
    assert!(matches!(err, ForgeError::UnknownTask { ref name } if name == "minjs-b"));
}

#[test]
fn test_expand_dedupes() {
    let registry = TaskRegistry::build(&[descriptor("a", true, true)]).unwrap();

    let expanded = registry
        .expand(&names(&["minjs-a", "minjs-all", "minjs-a"]))
        .unwrap();
    assert_eq!(expanded, names(&["minjs-a"]));
}

#[test]
fn test_plan_zip_runs_after_dependencies() {
    let registry = TaskRegistry::build(&[descriptor("a", true, true)]).unwrap();

    let plan = registry.plan(&names(&["zip-a"])).unwrap();

    assert_eq!(plan.batches.len(), 2);
    assert_eq!(
        plan.batches[0],
        names(&["translate-a", "minjs-a", "mincss-a"])
    );
    assert_eq!(plan.batches[1], names(&["zip-a"]));
    assert!(plan.watches.is_empty());
    assert!(!plan.serve);
}

#[test]
fn test_plan_shared_dependencies_run_once() {
    let registry = TaskRegistry::build(&[descriptor("a", true, false)]).unwrap();

    let plan = registry
        .plan(&names(&["translate-a", "zip-a", "mincss-all"]))
        .unwrap();

    let all: Vec<_> = plan.operations().cloned().collect();
    assert_eq!(all, names(&["translate-a", "mincss-a", "zip-a"]));
}

#[test]
fn test_plan_zip_all_is_two_batches() {
    let projects = vec![descriptor("a", true, true), descriptor("b", false, false)];
    let registry = TaskRegistry::build(&projects).unwrap();

    let plan = registry.plan(&names(&["zip-all"])).unwrap();

    assert_eq!(plan.batches.len(), 2);
    assert_eq!(plan.batches[1], names(&["zip-a", "zip-b"]));
}

#[test]
fn test_plan_default_only_watches_and_serves() {
    let config = Config::default();
    let registry = TaskRegistry::build(&config.projects).unwrap();

    let plan = registry.plan(&names(&[DEFAULT_TASK])).unwrap();

    assert!(plan.batches.is_empty());
    assert_eq!(plan.watches.len(), config.projects.len());
    assert!(plan.watches.iter().all(|w| w.starts_with("watch-")));
    assert!(plan.serve);
}

#[test]
fn test_plan_watch_all_without_server() {
    let registry = TaskRegistry::build(&[descriptor("a", true, true)]).unwrap();

    let plan = registry.plan(&names(&["watch-all"])).unwrap();

    assert_eq!(plan.watches, names(&["watch-a"]));
    assert!(!plan.serve);
}

proptest! {
    #[test]
    fn plan_respects_dependencies(flags in proptest::collection::vec((any::<bool>(), any::<bool>()), 1..6)) {
        let projects: Vec<_> = flags
            .iter()
            .enumerate()
            .map(|(i, (css, js))| descriptor(&format!("p{}", i), *css, *js))
            .collect();
        let registry = TaskRegistry::build(&projects).unwrap();
        let plan = registry.plan(&names(&["zip-all", "translate-all"])).unwrap();

        let mut batch_of = std::collections::HashMap::new();
        for (i, batch) in plan.batches.iter().enumerate() {
            for name in batch {
                prop_assert!(batch_of.insert(name.clone(), i).is_none());
            }
        }
        for (name, batch) in &batch_of {
            for dep in registry.dependencies(name) {
                prop_assert!(batch_of[dep] < *batch);
            }
        }
    }
}
