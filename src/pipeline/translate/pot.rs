//! `.pot` catalog assembly and rendering

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};

use crate::config::{ProjectDescriptor, TranslateConfig};

use super::scanner::{keywords_list, Extracted};

/// One catalog entry, merged across every occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PotEntry {
    pub context: Option<String>,
    pub msgid: String,
    pub plural: Option<String>,
    /// `file:line` references in discovery order
    pub references: Vec<String>,
    pub comments: Vec<String>,
}

/// Entries keyed by (context, msgid), ordered by first appearance
#[derive(Debug, Default)]
pub struct Catalog {
    entries: Vec<PotEntry>,
    index: HashMap<(Option<String>, String), usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one occurrence found in `file` (path relative to the project).
    pub fn add(&mut self, file: &str, found: Extracted) {
        let reference = format!("{}:{}", file, found.line);
        let key = (found.context.clone(), found.msgid.clone());

        if let Some(&idx) = self.index.get(&key) {
            let entry = &mut self.entries[idx];
            if !entry.references.contains(&reference) {
                entry.references.push(reference);
            }
            if entry.plural.is_none() {
                entry.plural = found.plural;
            }
            if let Some(comment) = found.comment {
                if !entry.comments.contains(&comment) {
                    entry.comments.push(comment);
                }
            }
            return;
        }

        self.index.insert(key, self.entries.len());
        self.entries.push(PotEntry {
            context: found.context,
            msgid: found.msgid,
            plural: found.plural,
            references: vec![reference],
            comments: found.comment.into_iter().collect(),
        });
    }

    pub fn entries(&self) -> &[PotEntry] {
        &self.entries
    }
}

/// Render a complete `.pot` file: header followed by entries.
pub fn render(
    project: &ProjectDescriptor,
    meta: &TranslateConfig,
    created: DateTime<Utc>,
    catalog: &Catalog,
) -> String {
    let mut out = render_header(project, meta, created);
    out.push_str(&render_entries(catalog));
    out
}

fn render_header(
    project: &ProjectDescriptor,
    meta: &TranslateConfig,
    created: DateTime<Utc>,
) -> String {
    let bugs = meta.bug_report.as_deref().unwrap_or("");
    let headers: [(&str, String); 17] = [
        ("Project-Id-Version", project.name.clone()),
        ("Report-Msgid-Bugs-To", bugs.to_string()),
        (
            "POT-Creation-Date",
            created.format("%Y-%m-%d %H:%M%z").to_string(),
        ),
        ("MIME-Version", "1.0".to_string()),
        ("Content-Type", "text/plain; charset=UTF-8".to_string()),
        ("Content-Transfer-Encoding", "8bit".to_string()),
        ("PO-Revision-Date", "YEAR-MO-DA HO:MI+ZONE".to_string()),
        ("Last-Translator", meta.last_translator.clone()),
        ("Language-Team", meta.team.clone()),
        ("Plural-Forms", "nplurals=2; plural=(n != 1);".to_string()),
        ("X-Poedit-Basepath", "..".to_string()),
        ("X-Poedit-KeywordsList", keywords_list()),
        ("X-Poedit-SearchPath-0", ".".to_string()),
        ("X-Poedit-SearchPathExcluded-0", "*.js".to_string()),
        ("X-Poedit-SourceCharset", "UTF-8".to_string()),
        ("X-Textdomain-Support", "yes".to_string()),
        ("X-Domain", project.domain.clone()),
    ];

    let mut out = format!(
        "# Copyright (C) {year} {name}\n# This file is distributed under the same license as the {name} package.\nmsgid \"\"\nmsgstr \"\"\n",
        year = created.year(),
        name = project.name,
    );
    for (key, value) in headers {
        out.push_str(&format!("\"{}: {}\\n\"\n", key, escape(&value)));
    }
    out
}

/// Entries only, without the header (stable across runs).
pub fn render_entries(catalog: &Catalog) -> String {
    let mut out = String::new();
    for entry in catalog.entries() {
        out.push('\n');
        for comment in &entry.comments {
            out.push_str(&format!("#. {}\n", comment));
        }
        out.push_str(&format!("#: {}\n", entry.references.join(" ")));
        if let Some(context) = &entry.context {
            out.push_str(&format!("msgctxt \"{}\"\n", escape(context)));
        }
        out.push_str(&format!("msgid \"{}\"\n", escape(&entry.msgid)));
        match &entry.plural {
            Some(plural) => {
                out.push_str(&format!("msgid_plural \"{}\"\n", escape(plural)));
                out.push_str("msgstr[0] \"\"\nmsgstr[1] \"\"\n");
            }
            None => out.push_str("msgstr \"\"\n"),
        }
    }
    out
}

/// PO string escaping
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}
