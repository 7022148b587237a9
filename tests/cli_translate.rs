mod common;

use common::TestEnv;

#[test]
fn test_translate_writes_pot_in_lang_folder() {
    let env = TestEnv::builder().with_demo_plugin().build();

    let result = env.run(&["translate-demo"]);

    assert!(result.success, "translate failed:\n{}", result.combined_output());
    let pot = env.read("plugins/demo-plugin/lang/demo.pot");

    assert!(pot.contains("\"Project-Id-Version: Demo Plugin\\n\""));
    assert!(pot.contains("\"X-Domain: demo\\n\""));
    assert!(pot.contains("#. translators: shown in the admin menu"));
    assert!(pot.contains("msgid \"One map\"\nmsgid_plural \"%d maps\"\nmsgstr[0] \"\"\nmsgstr[1] \"\""));
    assert!(pot.contains("msgctxt \"verb\"\nmsgid \"Post\""));
    assert!(!pot.contains("Ignored elsewhere"));
}

#[test]
fn test_translate_merges_duplicate_strings_across_files() {
    let env = TestEnv::builder().with_demo_plugin().build();

    assert!(env.run(&["translate-demo"]).success);
    let pot = env.read("plugins/demo-plugin/lang/demo.pot");

    assert_eq!(pot.matches("msgid \"Demo Settings\"").count(), 1);
    let refs = pot
        .lines()
        .filter(|l| l.starts_with("#:"))
        .collect::<Vec<_>>()
        .join(" ");
    assert!(refs.contains("admin/settings.php:2"), "refs: {refs}");
    assert!(refs.contains("demo-plugin.php:8"), "refs: {refs}");
}

#[test]
fn test_translate_ignores_node_modules() {
    let env = TestEnv::builder()
        .with_demo_plugin()
        .with_file(
            "plugins/demo-plugin/node_modules/pkg/fixture.php",
            "<?php __( 'From a dependency', 'demo' );",
        )
        .build();

    assert!(env.run(&["translate-demo"]).success);
    let pot = env.read("plugins/demo-plugin/lang/demo.pot");
    assert!(!pot.contains("From a dependency"));
}

#[test]
fn test_translate_missing_project_is_empty_success() {
    let env = TestEnv::builder().build();

    let result = env.run(&["translate-all"]);

    assert!(result.success, "{}", result.combined_output());
    assert!(!env.plugin_path("lang/demo.pot").exists());
}
