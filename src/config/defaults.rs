//! Built-in project table and default exclusions

use super::location::Location;
use super::types::ProjectDescriptor;

fn project(
    name: &str,
    folder: &str,
    shortname: &str,
    css: &[&str],
    js: &[&str],
    domain: &str,
) -> ProjectDescriptor {
    ProjectDescriptor {
        name: name.to_string(),
        folder: folder.to_string(),
        shortname: shortname.to_string(),
        css: css.iter().copied().map(Location::new).collect(),
        js: js.iter().copied().map(Location::new).collect(),
        lang: Location::new("/lang/"),
        domain: domain.to_string(),
    }
}

/// Projects managed when no `pressforge.toml` is present.
pub(crate) fn projects() -> Vec<ProjectDescriptor> {
    vec![
        project("Team Showcase", "team-showcase", "tshowcase", &["/css/"], &["/js/"], "tshowcase"),
        project("Logos Showcase", "logos-showcase", "lshowcase", &["/css/"], &["/js/"], "lshowcase"),
        project(
            "Testimonials Showcase",
            "testimonials-showcase",
            "ttshowcase",
            &[],
            &[],
            "ttshowcase",
        ),
        project(
            "Interactive World Maps",
            "interactive-world-maps",
            "iwm",
            &["/includes/"],
            &["/includes/"],
            "iwm",
        ),
        project(
            "Visited Countries Generator",
            "visited-countries-generator",
            "vcshowcase",
            &["/assets/css/"],
            &["/assets/js/"],
            "vcshowcase",
        ),
        project(
            "Advisor Quiz",
            "advisor-quiz",
            "quiz",
            &["/assets/css/", "/admin/css/"],
            &["/assets/js/", "/admin/js/"],
            "advq",
        ),
    ]
}

/// Files never shipped in a plugin archive.
pub(crate) fn package_exclude() -> Vec<String> {
    [
        "node_modules/",
        "assets/sass/",
        "gulpfile.js",
        "pressforge.toml",
        "package.json",
        "package-lock.json",
        "dist/",
    ]
    .iter()
    .map(|s| format!("/{}", s))
    .collect()
}
