//! Gettext call extraction from PHP sources
//!
//! A small lexer splits PHP into tokens (inline HTML outside `<?php ?>` is
//! skipped) and the extractor looks for WordPress i18n calls whose
//! arguments are string literals.

/// Argument layout of one i18n function
#[derive(Debug, Clone, Copy)]
struct Keyword {
    name: &'static str,
    single: usize,
    plural: Option<usize>,
    context: Option<usize>,
    domain: usize,
}

const fn kw(
    name: &'static str,
    plural: Option<usize>,
    context: Option<usize>,
    domain: usize,
) -> Keyword {
    Keyword {
        name,
        single: 0,
        plural,
        context,
        domain,
    }
}

const KEYWORDS: &[Keyword] = &[
    kw("__", None, None, 1),
    kw("_e", None, None, 1),
    kw("esc_html__", None, None, 1),
    kw("esc_html_e", None, None, 1),
    kw("esc_attr__", None, None, 1),
    kw("esc_attr_e", None, None, 1),
    kw("_x", None, Some(1), 2),
    kw("_ex", None, Some(1), 2),
    kw("esc_html_x", None, Some(1), 2),
    kw("esc_attr_x", None, Some(1), 2),
    kw("_n", Some(1), None, 3),
    kw("_n_noop", Some(1), None, 2),
    kw("_nx", Some(1), Some(3), 4),
    kw("_nx_noop", Some(1), Some(2), 3),
];

/// Keyword list for the `X-Poedit-KeywordsList` header
pub fn keywords_list() -> String {
    [
        "__:1,2d",
        "_e:1,2d",
        "_x:1,2c,3d",
        "_ex:1,2c,3d",
        "_n:1,2,4d",
        "_nx:4c,1,2,5d",
        "_n_noop:1,2,3d",
        "_nx_noop:3c,1,2,4d",
        "esc_attr__:1,2d",
        "esc_html__:1,2d",
        "esc_attr_e:1,2d",
        "esc_html_e:1,2d",
        "esc_attr_x:1,2c,3d",
        "esc_html_x:1,2c,3d",
    ]
    .join(";")
}

/// One translatable string found in a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub context: Option<String>,
    pub msgid: String,
    pub plural: Option<String>,
    /// 1-based line of the function name
    pub line: usize,
    /// `translators:` comment attached to the call
    pub comment: Option<String>,
}

/// Extract every call for `domain` from one PHP file.
pub fn extract(source: &str, domain: &str) -> Vec<Extracted> {
    let lexed = Lexer::new(source).run();
    let tokens = &lexed.tokens;
    let mut found = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        let Tok::Ident(name) = &token.kind else {
            continue;
        };
        let Some(keyword) = KEYWORDS.iter().find(|k| k.name == name.as_str()) else {
            continue;
        };
        if !matches!(tokens.get(i + 1).map(|t| &t.kind), Some(Tok::Punct('('))) {
            continue;
        }
        if let Some(prev) = i.checked_sub(1).map(|p| &tokens[p].kind) {
            match prev {
                Tok::Member => continue,
                Tok::Ident(word) if is_declaration(word) => continue,
                _ => {}
            }
        }

        let args = split_args(&tokens[i + 2..]);
        if let Some(mut entry) = build_entry(keyword, &args, domain, token.line) {
            entry.comment = translator_note_for(&lexed, i);
            found.push(entry);
        }
    }

    found
}

fn is_declaration(word: &str) -> bool {
    matches!(
        word.to_ascii_lowercase().as_str(),
        "function" | "new" | "fn" | "const"
    )
}

fn build_entry(
    keyword: &Keyword,
    args: &[&[Token]],
    domain: &str,
    line: usize,
) -> Option<Extracted> {
    let call_domain = literal(args.get(keyword.domain)?)?;
    if call_domain != domain {
        return None;
    }

    let msgid = literal(args.get(keyword.single)?)?;
    if msgid.is_empty() {
        return None;
    }
    let plural = match keyword.plural {
        Some(idx) => Some(literal(args.get(idx)?)?),
        None => None,
    };
    let context = match keyword.context {
        Some(idx) => Some(literal(args.get(idx)?)?),
        None => None,
    };

    Some(Extracted {
        context,
        msgid,
        plural,
        line,
        comment: None,
    })
}

/// Note from the last comment before the call at `index`.
///
/// The comment must end on the call's line or the line above, and no
/// statement may end between the comment and the call.
fn translator_note_for(lexed: &Lexed, index: usize) -> Option<String> {
    let line = lexed.tokens[index].line;
    let comment = lexed
        .comments
        .iter()
        .rev()
        .find(|c| c.next_token <= index)?;

    if comment.end_line != line && comment.end_line + 1 != line {
        return None;
    }
    let between = &lexed.tokens[comment.next_token..index];
    if between.iter().any(|t| t.kind == Tok::Punct(';')) {
        return None;
    }
    translator_note(&comment.text)
}

/// `translators:` comments keep their full text
fn translator_note(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.to_ascii_lowercase().starts_with("translators:") {
        Some(trimmed.to_string())
    } else {
        None
    }
}

/// Split the tokens after `(` into top-level arguments, up to the closing `)`.
fn split_args(tokens: &[Token]) -> Vec<&[Token]> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            Tok::Punct('(') | Tok::Punct('[') | Tok::Punct('{') => depth += 1,
            Tok::Punct(')') | Tok::Punct(']') | Tok::Punct('}') => {
                if depth == 0 {
                    if i > start || !args.is_empty() {
                        args.push(&tokens[start..i]);
                    }
                    return args;
                }
                depth -= 1;
            }
            Tok::Punct(',') if depth == 0 => {
                args.push(&tokens[start..i]);
                start = i + 1;
            }
            Tok::Punct(';') => return Vec::new(),
            _ => {}
        }
    }

    // unterminated call
    Vec::new()
}

/// Value of a literal argument: strings optionally joined with `.`
fn literal(arg: &[Token]) -> Option<String> {
    let mut value = String::new();
    let mut expect_string = true;

    for token in arg {
        match (&token.kind, expect_string) {
            (Tok::Str(s), true) => {
                value.push_str(s);
                expect_string = false;
            }
            (Tok::Punct('.'), false) => expect_string = true,
            _ => return None,
        }
    }

    if expect_string {
        None
    } else {
        Some(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Ident(String),
    /// Fully literal string
    Str(String),
    /// Interpolated string, heredoc, variable or number
    Value,
    /// `->`, `?->` or `::`
    Member,
    Punct(char),
}

#[derive(Debug, Clone)]
struct Token {
    kind: Tok,
    line: usize,
}

#[derive(Debug, Clone)]
struct Comment {
    text: String,
    end_line: usize,
    /// Index of the first token after the comment
    next_token: usize,
}

struct Lexed {
    tokens: Vec<Token>,
    comments: Vec<Comment>,
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    tokens: Vec<Token>,
    comments: Vec<Comment>,
}

fn push_char(bytes: &mut Vec<u8>, c: char) {
    let mut buf = [0u8; 4];
    bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '\\'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '\\'
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            tokens: Vec::new(),
            comments: Vec::new(),
        }
    }

    fn run(mut self) -> Lexed {
        while self.pos < self.chars.len() {
            self.skip_html();
            self.lex_php();
        }
        Lexed {
            tokens: self.tokens,
            comments: self.comments,
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn starts_with(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, c)| self.peek(i) == Some(c))
    }

    fn starts_with_ignore_case(&self, text: &str) -> bool {
        text.chars().enumerate().all(|(i, c)| {
            self.peek(i)
                .map(|p| p.eq_ignore_ascii_case(&c))
                .unwrap_or(false)
        })
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek(0)?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn push(&mut self, kind: Tok, line: usize) {
        self.tokens.push(Token { kind, line });
    }

    /// Advance past inline HTML up to and including the next open tag.
    fn skip_html(&mut self) {
        while self.pos < self.chars.len() {
            if self.starts_with_ignore_case("<?php") {
                self.pos += 5;
                return;
            }
            if self.starts_with("<?=") {
                self.pos += 3;
                return;
            }
            if self.starts_with("<?") {
                self.pos += 2;
                return;
            }
            self.bump();
        }
    }

    /// Lex PHP code until `?>` or end of input.
    fn lex_php(&mut self) {
        while let Some(c) = self.peek(0) {
            let line = self.line;

            if c.is_whitespace() {
                self.bump();
            } else if self.starts_with("?>") {
                self.pos += 2;
                self.push(Tok::Punct(';'), line);
                return;
            } else if self.starts_with("//") || (c == '#' && self.peek(1) != Some('[')) {
                self.line_comment();
            } else if self.starts_with("/*") {
                self.block_comment();
            } else if c == '\'' {
                let value = self.single_quoted();
                self.push(Tok::Str(value), line);
            } else if c == '"' {
                let kind = match self.double_quoted() {
                    Some(value) => Tok::Str(value),
                    None => Tok::Value,
                };
                self.push(kind, line);
            } else if self.starts_with("<<<") {
                self.heredoc();
                self.push(Tok::Value, line);
            } else if c == '$' {
                self.bump();
                while self.peek(0).map(is_ident_char).unwrap_or(false) {
                    self.bump();
                }
                self.push(Tok::Value, line);
            } else if self.starts_with("->") || self.starts_with("::") {
                self.pos += 2;
                self.push(Tok::Member, line);
            } else if self.starts_with("?->") {
                self.pos += 3;
                self.push(Tok::Member, line);
            } else if c.is_ascii_digit() {
                while self
                    .peek(0)
                    .map(|d| d.is_ascii_alphanumeric() || d == '.' || d == '_')
                    .unwrap_or(false)
                {
                    self.bump();
                }
                self.push(Tok::Value, line);
            } else if is_ident_start(c) {
                let mut ident = String::new();
                while let Some(d) = self.peek(0).filter(|d| is_ident_char(*d)) {
                    ident.push(d);
                    self.bump();
                }
                let name = ident.rsplit('\\').next().unwrap_or("").to_string();
                self.push(Tok::Ident(name), line);
            } else {
                self.bump();
                self.push(Tok::Punct(c), line);
            }
        }
    }

    fn line_comment(&mut self) {
        // skip `//` or `#`
        if self.peek(0) == Some('#') {
            self.pos += 1;
        } else {
            self.pos += 2;
        }
        let mut text = String::new();
        while let Some(c) = self.peek(0) {
            if c == '\n' || self.starts_with("?>") {
                break;
            }
            text.push(c);
            self.pos += 1;
        }
        self.push_comment(text);
    }

    fn push_comment(&mut self, text: String) {
        self.comments.push(Comment {
            text,
            end_line: self.line,
            next_token: self.tokens.len(),
        });
    }

    fn block_comment(&mut self) {
        self.pos += 2;
        let mut raw = String::new();
        while self.pos < self.chars.len() && !self.starts_with("*/") {
            if let Some(c) = self.bump() {
                raw.push(c);
            }
        }
        self.pos = (self.pos + 2).min(self.chars.len());

        let text = raw
            .lines()
            .map(|l| l.trim().trim_start_matches('*').trim())
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        self.push_comment(text);
    }

    fn single_quoted(&mut self) -> String {
        self.bump();
        let mut value = String::new();
        while let Some(c) = self.bump() {
            match c {
                '\'' => break,
                '\\' if matches!(self.peek(0), Some('\'') | Some('\\')) => {
                    if let Some(next) = self.bump() {
                        value.push(next);
                    }
                }
                other => value.push(other),
            }
        }
        value
    }

    /// `None` when the string interpolates variables.
    ///
    /// Escapes decode to bytes the way PHP does, so `"\xC3\xA9"` is `é`.
    fn double_quoted(&mut self) -> Option<String> {
        self.bump();
        let mut value = Vec::new();
        let mut dynamic = false;
        while let Some(c) = self.bump() {
            match c {
                '"' => break,
                '\\' => match self.peek(0) {
                    Some(d @ '0'..='7') => {
                        let mut code = d.to_digit(8).unwrap_or(0);
                        self.bump();
                        for _ in 0..2 {
                            match self.peek(0).and_then(|d| d.to_digit(8)) {
                                Some(digit) => {
                                    code = code * 8 + digit;
                                    self.bump();
                                }
                                None => break,
                            }
                        }
                        // `\400` and above wrap like PHP
                        value.push((code & 0xff) as u8);
                    }
                    Some('x') if self.peek(1).is_some_and(|h| h.is_ascii_hexdigit()) => {
                        self.bump();
                        let mut code = 0u32;
                        for _ in 0..2 {
                            match self.peek(0).and_then(|h| h.to_digit(16)) {
                                Some(digit) => {
                                    code = code * 16 + digit;
                                    self.bump();
                                }
                                None => break,
                            }
                        }
                        value.push(code as u8);
                    }
                    Some('u') if self.peek(1) == Some('{') => match self.unicode_escape() {
                        Some(ch) => push_char(&mut value, ch),
                        None => {
                            self.bump();
                            value.extend_from_slice(b"\\u");
                        }
                    },
                    Some(next) => {
                        self.bump();
                        match next {
                            'n' => value.push(b'\n'),
                            't' => value.push(b'\t'),
                            'r' => value.push(b'\r'),
                            'v' => value.push(0x0b),
                            'f' => value.push(0x0c),
                            'e' => value.push(0x1b),
                            '$' | '"' | '\\' => push_char(&mut value, next),
                            other => {
                                value.push(b'\\');
                                push_char(&mut value, other);
                            }
                        }
                    }
                    None => break,
                },
                '$' if self
                    .peek(0)
                    .map(|n| n == '{' || n == '_' || n.is_alphabetic())
                    .unwrap_or(false) =>
                {
                    dynamic = true;
                    push_char(&mut value, c);
                }
                '{' if self.peek(0) == Some('$') => {
                    dynamic = true;
                    push_char(&mut value, c);
                }
                other => push_char(&mut value, other),
            }
        }
        if dynamic {
            None
        } else {
            Some(String::from_utf8_lossy(&value).into_owned())
        }
    }

    /// `u{1F600}` after a backslash. Leaves the input alone when malformed.
    fn unicode_escape(&mut self) -> Option<char> {
        let mut offset = 2;
        let mut digits = String::new();
        while let Some(h) = self.peek(offset).filter(|h| h.is_ascii_hexdigit()) {
            digits.push(h);
            offset += 1;
        }
        if digits.is_empty() || self.peek(offset) != Some('}') {
            return None;
        }
        let ch = u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32)?;
        self.pos += offset + 1;
        Some(ch)
    }

    /// Skip a heredoc or nowdoc body including its closing marker.
    fn heredoc(&mut self) {
        self.pos += 3;
        while matches!(self.peek(0), Some(' ') | Some('\t')) {
            self.pos += 1;
        }
        let mut marker = String::new();
        while let Some(c) = self.peek(0) {
            if c == '\'' || c == '"' {
                self.pos += 1;
                continue;
            }
            if !is_ident_char(c) {
                break;
            }
            marker.push(c);
            self.pos += 1;
        }
        if marker.is_empty() {
            return;
        }

        // Closing marker: first line whose trimmed start is the marker
        while self.pos < self.chars.len() {
            if self.bump() != Some('\n') {
                continue;
            }
            while matches!(self.peek(0), Some(' ') | Some('\t')) {
                self.pos += 1;
            }
            if self.starts_with(&marker)
                && !self
                    .peek(marker.chars().count())
                    .map(is_ident_char)
                    .unwrap_or(false)
            {
                self.pos += marker.chars().count();
                return;
            }
        }
    }
}
