//! JS and CSS minification
//!
//! Each matched `<stem>.<ext>` becomes `<stem>.min.<ext>` plus a
//! `<stem>.min.<ext>.map` source map, both beside the source.

use std::path::{Path, PathBuf};

use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions};
use oxc::minifier::{Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use ::sourcemap::SourceMap;

use crate::config::{Location, ProjectDescriptor};
use crate::error::{ForgeError, ForgeResult};
use crate::fs::atomic_write;
use crate::reload::ReloadSignal;

use super::sourcemap;
use super::sources::match_assets;
use super::TaskContext;

/// Asset flavour handled by the minify pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Js,
    Css,
}

impl AssetKind {
    pub fn extension(self) -> &'static str {
        match self {
            AssetKind::Js => "js",
            AssetKind::Css => "css",
        }
    }

    fn map_comment(self, map_name: &str) -> String {
        match self {
            AssetKind::Js => format!("\n//# sourceMappingURL={}\n", map_name),
            AssetKind::Css => format!("\n/*# sourceMappingURL={} */\n", map_name),
        }
    }
}

/// Run `minjs-<short>` for one project.
pub fn minify_js(ctx: &TaskContext<'_>, project: &ProjectDescriptor) -> ForgeResult<Vec<PathBuf>> {
    minify_locations(ctx, project, &project.js, AssetKind::Js)
}

/// Run `mincss-<short>` for one project.
///
/// Each written stylesheet is announced to the reload sink.
pub fn minify_css(
    ctx: &TaskContext<'_>,
    project: &ProjectDescriptor,
) -> ForgeResult<Vec<PathBuf>> {
    minify_locations(ctx, project, &project.css, AssetKind::Css)
}

fn minify_locations(
    ctx: &TaskContext<'_>,
    project: &ProjectDescriptor,
    locations: &[Location],
    kind: AssetKind,
) -> ForgeResult<Vec<PathBuf>> {
    let project_dir = ctx.config.project_dir(project);
    let mut written = Vec::new();

    for location in locations {
        let dir = location.resolve(&project_dir);
        for source in match_assets(&dir, kind.extension())? {
            let (min_path, map_path) = minify_file(ctx, &source, kind)?;
            if kind == AssetKind::Css {
                if let Some(name) = min_path.file_name().and_then(|n| n.to_str()) {
                    ctx.reload.send(ReloadSignal::InjectCss {
                        file: name.to_string(),
                    });
                }
            }
            written.push(min_path);
            written.push(map_path);
        }
    }

    Ok(written)
}

/// Minified text and the map back to its source
pub struct Minified {
    pub code: String,
    pub map: SourceMap,
}

/// Minify one file and write its output and map. Returns both paths.
pub fn minify_file(
    ctx: &TaskContext<'_>,
    source: &Path,
    kind: AssetKind,
) -> ForgeResult<(PathBuf, PathBuf)> {
    let bytes = std::fs::read(source)?;
    let text = String::from_utf8(bytes).map_err(|_| ForgeError::Transform {
        file: source.to_path_buf(),
        message: "not valid UTF-8".to_string(),
    })?;

    let (min_path, map_path) = output_paths(source, kind);
    let min_name = file_name(&min_path);
    let map_name = file_name(&map_path);
    let source_name = file_name(source);

    let transform_error = |message| ForgeError::Transform {
        file: source.to_path_buf(),
        message,
    };

    let minified = match kind {
        AssetKind::Js => minify_js_source(&text, &source_name),
        AssetKind::Css => minify_css_source(&text, &source_name, ctx.config.css.max_line_len),
    }
    .map_err(transform_error)?;

    let map = sourcemap::retarget(minified.map, &min_name, &source_name);
    let map_json = sourcemap::to_json(&map).map_err(transform_error)?;

    let mut output = minified.code;
    output.push_str(&kind.map_comment(&map_name));

    atomic_write(&min_path, output.as_bytes())?;
    atomic_write(&map_path, map_json.as_bytes())?;

    Ok((min_path, map_path))
}

/// `dir/a.js` to (`dir/a.min.js`, `dir/a.min.js.map`)
pub fn output_paths(source: &Path, kind: AssetKind) -> (PathBuf, PathBuf) {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let min_name = format!("{}.min.{}", stem, kind.extension());
    let map_name = format!("{}.map", min_name);
    (source.with_file_name(min_name), source.with_file_name(map_name))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Parse, compress and mangle a script, then print it with its map.
///
/// Files with `import`/`export` parse as modules, everything else as a
/// classic script whose top-level names stay global.
pub fn minify_js_source(source: &str, source_name: &str) -> Result<Minified, String> {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source, SourceType::unambiguous()).parse();
    if parsed.panicked || parsed.diagnostics.has_errors() {
        let message = parsed
            .diagnostics
            .errors()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(if message.is_empty() {
            "cannot parse script".to_string()
        } else {
            message
        });
    }

    let mut program = parsed.program;
    let minified = Minifier::new(MinifierOptions::default()).minify(&allocator, &mut program);

    let printed = Codegen::new()
        .with_options(CodegenOptions {
            source_map_path: Some(PathBuf::from(source_name)),
            ..CodegenOptions::minify()
        })
        .with_scoping(minified.scoping)
        .build(&program);

    let map = printed
        .map
        .ok_or_else(|| "code generator produced no source map".to_string())?;

    Ok(Minified {
        code: printed.code.trim_end().to_string(),
        map: sourcemap::parse(&map.to_json_string())?,
    })
}

/// Minify a stylesheet, then wrap it at `max_line_len`.
pub fn minify_css_source(
    source: &str,
    source_name: &str,
    max_line_len: usize,
) -> Result<Minified, String> {
    let minified = minifier::css::minify(source).map_err(|e| e.to_string())?;
    let code = wrap_css(minified.to_string().trim(), max_line_len);
    let map = sourcemap::anchored(source_name, source_name, source, &code);
    Ok(Minified { code, map })
}

/// Break after a `}` once the current line is longer than `max_line_len`.
///
/// Braces inside quoted strings never break. Zero disables wrapping.
pub fn wrap_css(css: &str, max_line_len: usize) -> String {
    if max_line_len == 0 {
        return css.to_string();
    }

    let mut out = String::with_capacity(css.len() + css.len() / max_line_len.max(1));
    let mut line_len = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut chars = css.chars().peekable();

    while let Some(c) = chars.next() {
        out.push(c);
        if c == '\n' {
            line_len = 0;
            continue;
        }
        line_len += 1;

        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == open {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => quote = Some(c),
            '}' if line_len > max_line_len && chars.peek().is_some() => {
                out.push('\n');
                line_len = 0;
            }
            _ => {}
        }
    }
    out
}
