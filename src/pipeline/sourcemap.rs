//! Source map v3 output for minified assets
//!
//! Maps are written beside the minified file with `sourceRoot: "."` and no
//! `sourcesContent`. Scripts carry the map their code generator produced;
//! stylesheets anchor identifier-like tokens of the minified output to their
//! first occurrence in the source at or after the previous anchor.

use sourcemap::{SourceMap, SourceMapBuilder};

/// Shortest token worth anchoring
const MIN_TOKEN_LEN: usize = 2;

/// Load a map emitted by a code generator.
pub fn parse(json: &str) -> Result<SourceMap, String> {
    SourceMap::from_slice(json.as_bytes()).map_err(|e| format!("invalid source map: {}", e))
}

/// Point `map` at `file`, naming `source_name` as its only source.
pub fn retarget(mut map: SourceMap, file: &str, source_name: &str) -> SourceMap {
    map.set_file(Some(file));
    map.set_source_root(Some("."));
    for idx in 0..map.get_source_count() {
        map.set_source(idx, source_name);
        map.set_source_contents(idx, None);
    }
    map
}

/// Map `generated` (named `file`) back to `source` (named `source_name`).
pub fn anchored(file: &str, source_name: &str, source: &str, generated: &str) -> SourceMap {
    let mut builder = SourceMapBuilder::new(Some(file));
    builder.set_source_root(Some("."));
    let src_id = builder.add_source(source_name);

    let index = LineIndex::new(source);
    let mut cursor = 0usize;

    for (gen_line, line) in generated.split('\n').enumerate() {
        for (gen_col, token) in tokens(line) {
            if token.chars().count() < MIN_TOKEN_LEN {
                continue;
            }
            if let Some(found) = source[cursor..].find(token) {
                let offset = cursor + found;
                let (src_line, src_col) = index.position(source, offset);
                builder.add_raw(
                    gen_line as u32,
                    gen_col,
                    src_line,
                    src_col,
                    Some(src_id),
                    None,
                    false,
                );
                cursor = offset + token.len();
            }
        }
    }

    builder.into_sourcemap()
}

pub fn to_json(map: &SourceMap) -> Result<String, String> {
    let mut out = Vec::new();
    map.to_writer(&mut out)
        .map_err(|e| format!("cannot encode source map: {}", e))?;
    String::from_utf8(out).map_err(|e| e.to_string())
}

/// Line start offsets of a text
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let mut starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                starts.push(i + 1);
            }
        }
        Self { starts }
    }

    /// 0-based line and char column of a byte offset
    fn position(&self, text: &str, offset: usize) -> (u32, u32) {
        let line = match self.starts.binary_search(&offset) {
            Ok(l) => l,
            Err(l) => l - 1,
        };
        let col = text[self.starts[line]..offset].chars().count();
        (line as u32, col as u32)
    }
}

fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '-'
}

/// Identifier-like runs of `line` with their char column
fn tokens(line: &str) -> Vec<(u32, &str)> {
    let mut found = Vec::new();
    let mut start: Option<(u32, usize)> = None;

    for (col, (i, c)) in line.char_indices().enumerate() {
        match (is_token_char(c), start) {
            (true, None) => start = Some((col as u32, i)),
            (false, Some((start_col, start_byte))) => {
                found.push((start_col, &line[start_byte..i]));
                start = None;
            }
            _ => {}
        }
    }
    if let Some((start_col, start_byte)) = start {
        found.push((start_col, &line[start_byte..]));
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors_follow_source_order() {
        let source = ".card {\n  color: red;\n}\n.card .title {\n  margin: 0;\n}\n";
        let generated = ".card{color:red}.card .title{margin:0}";

        let map = anchored("a.min.css", "a.css", source, generated);

        // `margin` sits on source line 4, column 2
        let col = generated.find("margin").unwrap() as u32;
        let token = map.lookup_token(0, col).expect("margin anchored");
        assert_eq!((token.get_src_line(), token.get_src_col()), (4, 2));
        let positions: Vec<_> = map
            .tokens()
            .map(|t| (t.get_src_line(), t.get_src_col()))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn anchors_survive_wrapped_lines() {
        let source = "a { color: red }\nb { color: blue }\n";
        let generated = "a{color:red}\nb{color:blue}";

        let map = anchored("a.min.css", "a.css", source, generated);

        let token = map.lookup_token(1, 2).expect("second line anchored");
        assert_eq!((token.get_src_line(), token.get_src_col()), (1, 4));
    }

    #[test]
    fn tokens_split_on_punctuation() {
        let found: Vec<_> = tokens("a{b-c:d}").into_iter().map(|t| t.1).collect();
        assert_eq!(found, vec!["a", "b-c", "d"]);
    }

    #[test]
    fn json_shape() {
        let map = anchored("a.min.css", "a.css", ".ab { x: 1 }", ".ab{x:1}");
        let json = to_json(&map).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["version"], 3);
        assert_eq!(value["file"], "a.min.css");
        assert_eq!(value["sourceRoot"], ".");
        assert_eq!(value["sources"], serde_json::json!(["a.css"]));
        assert!(value.get("sourcesContent").is_none());
        assert!(!value["mappings"].as_str().unwrap().is_empty());
    }

    #[test]
    fn retarget_replaces_names_and_drops_contents() {
        let generated = r#"{"version":3,"sources":["/tmp/x/app.js"],"sourcesContent":["var a;"],"names":[],"mappings":"AAAA"}"#;

        let map = retarget(parse(generated).unwrap(), "app.min.js", "app.js");
        let value: serde_json::Value = serde_json::from_str(&to_json(&map).unwrap()).unwrap();

        assert_eq!(value["file"], "app.min.js");
        assert_eq!(value["sourceRoot"], ".");
        assert_eq!(value["sources"], serde_json::json!(["app.js"]));
        assert!(value.get("sourcesContent").is_none());
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse("not a map").is_err());
    }
}
