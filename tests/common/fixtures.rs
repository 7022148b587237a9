//! Test fixtures - reusable content constants for tests.

/// Plugin bootstrap with translatable strings in the `demo` domain
pub const PLUGIN_PHP: &str = r#"<?php
/*
 * Plugin Name: Demo Plugin
 */

function demo_title() {
    /* translators: shown in the admin menu */
    return __( 'Demo Settings', 'demo' );
}

echo _n( 'One map', '%d maps', 2, 'demo' );
echo _x( 'Post', 'verb', 'demo' );
echo __( 'Ignored elsewhere', 'other-domain' );
"#;

/// Second PHP file repeating a string from `PLUGIN_PHP`
pub const ADMIN_PHP: &str = r#"<?php
esc_html_e( 'Demo Settings', 'demo' );
"#;

pub const APP_JS: &str = r#"// demo script
function greet(name) {
    var message = "Hello, " + name;
    return message;
}
greet("world");
"#;

pub const STYLE_CSS: &str = r#"/* demo styles */
body {
    color: red;
    margin: 0;
}

.demo-map   .region {
    fill: #ccc;
}
"#;

/// Script leaning on automatic semicolon insertion and unary operators
pub const WIDGET_JS: &str = r#"(function ($) {
    var count = 0
    var step = +$('#demo-step').val()
    function bump(a, b) {
        return a + +b
    }
    function drop(a, b) {
        return a - -b
    }
    function answer() {
        return
        42
    }
    window.demoWidget = { bump: bump, drop: drop, answer: answer, count: count, step: step }
})(jQuery)
"#;

/// Stylesheet with braces and escaped quotes inside strings
pub const BADGE_CSS: &str = r#".demo-badge::before {
    content: "}";
}
.demo-badge .label {
    content: '{ it\'s open';
    color: #333333;
}
.demo-badge .count { font-weight: bold; }
"#;

/// Config for one project `demo` living in `plugins/demo-plugin`
pub const DEMO_CONFIG: &str = r#"[paths]
plugins_root = "plugins"
dist_dir = "dist"
archive_dir = "archive"

[server]
open = false

[[project]]
name = "Demo Plugin"
folder = "demo-plugin"
shortname = "demo"
css = "/assets/css/"
js = ["/assets/js/"]
domain = "demo"
"#;
