//! Parsers for `settings.gradle(.kts)`, `gradle.properties` and
//! `gradle-wrapper.properties`.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Remove `//` and `/* */` comments, leaving string literals untouched.
///
/// Newlines inside comments are kept so line numbers stay stable.
pub fn strip_comments(text: &str) -> String {
    #[derive(PartialEq)]
    enum State {
        Code,
        Quoted(char),
        LineComment,
        BlockComment,
    }

    let mut out = String::with_capacity(text.len());
    let mut state = State::Code;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    state = State::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = State::BlockComment;
                }
                '"' | '\'' => {
                    out.push(c);
                    state = State::Quoted(c);
                }
                _ => out.push(c),
            },
            State::Quoted(quote) => {
                out.push(c);
                if c == '\\' {
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                } else if c == quote || c == '\n' {
                    state = State::Code;
                }
            }
            State::LineComment => {
                if c == '\n' {
                    out.push('\n');
                    state = State::Code;
                }
            }
            State::BlockComment => {
                if c == '\n' {
                    out.push('\n');
                } else if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = State::Code;
                }
            }
        }
    }
    out
}

/// Single- or double-quoted string literals in `text`.
pub(crate) fn quoted_strings(text: &str) -> Vec<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r#""([^"]*)"|'([^']*)'"#).expect("valid regex"));

    re.captures_iter(text)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Contents of the parenthesized group opening at `open`, honoring nesting
/// and quotes. Returns the inner text and the index after `)`.
fn balanced_group(text: &str, open: usize) -> Option<(&str, usize)> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'(') {
        return None;
    }

    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = open;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some((&text[open + 1..i], i + 1));
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }
    None
}

/// Arguments of a parenthesis-less Groovy call: the rest of the line, plus
/// following lines while the current one ends with a comma.
fn groovy_arguments(text: &str, start: usize) -> &str {
    let mut end = start;
    loop {
        let line_end = text[end..].find('\n').map_or(text.len(), |off| end + off);
        if text[end..line_end].trim_end().ends_with(',') && line_end < text.len() {
            end = line_end + 1;
            continue;
        }
        return &text[start..line_end];
    }
}

/// Arguments of every call to `name` in `text`, in either syntax.
fn call_arguments<'a>(text: &'a str, re: &Regex) -> Vec<&'a str> {
    let bytes = text.as_bytes();
    let mut args = Vec::new();
    for m in re.find_iter(text) {
        let mut i = m.end();
        while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
            i += 1;
        }
        if i >= bytes.len() {
            continue;
        }
        if bytes[i] == b'(' {
            if let Some((inner, _)) = balanced_group(text, i) {
                args.push(inner);
            }
        } else {
            args.push(groovy_arguments(text, i));
        }
    }
    args
}

fn normalize_module_path(path: &str) -> String {
    let path = path.trim();
    if path.starts_with(':') {
        path.to_string()
    } else {
        format!(":{}", path)
    }
}

/// Contents of a settings script.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SettingsFileInfo {
    pub root_project_name: Option<String>,
    /// Included modules as Gradle paths (`:app`), in declaration order
    pub includes: Vec<String>,
    pub include_builds: Vec<String>,
}

impl SettingsFileInfo {
    pub fn parse(text: &str) -> Self {
        static NAME_RE: OnceLock<Regex> = OnceLock::new();
        static INCLUDE_RE: OnceLock<Regex> = OnceLock::new();
        static INCLUDE_BUILD_RE: OnceLock<Regex> = OnceLock::new();

        let name_re = NAME_RE.get_or_init(|| {
            Regex::new(r#"rootProject\.name\s*=\s*["']([^"']+)["']"#).expect("valid regex")
        });
        let include_re = INCLUDE_RE.get_or_init(|| Regex::new(r"\binclude\b").expect("valid regex"));
        let include_build_re =
            INCLUDE_BUILD_RE.get_or_init(|| Regex::new(r"\bincludeBuild\b").expect("valid regex"));

        let text = strip_comments(text);

        let root_project_name = name_re
            .captures(&text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());

        let mut includes: Vec<String> = Vec::new();
        for args in call_arguments(&text, include_re) {
            for module in quoted_strings(args) {
                let module = normalize_module_path(&module);
                if !includes.contains(&module) {
                    includes.push(module);
                }
            }
        }

        let include_builds = call_arguments(&text, include_build_re)
            .into_iter()
            .flat_map(quoted_strings)
            .collect();

        Self {
            root_project_name,
            includes,
            include_builds,
        }
    }

    /// Directory of an included module relative to the root (`:a:b` -> `a/b`).
    pub fn module_dir(module: &str) -> String {
        module.trim_start_matches(':').replace(':', "/")
    }
}

/// Key/value entries of a Java properties file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PropertiesFileInfo {
    pub entries: BTreeMap<String, String>,
}

impl PropertiesFileInfo {
    pub fn parse(text: &str) -> Self {
        let mut entries = BTreeMap::new();
        let mut logical = String::new();

        for raw in text.lines() {
            let line = if logical.is_empty() { raw.trim() } else { raw.trim_start() };
            if logical.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!')) {
                continue;
            }

            if ends_with_continuation(line) {
                logical.push_str(&line[..line.len() - 1]);
                continue;
            }
            logical.push_str(line);

            let (key, value) = split_property(&logical);
            if !key.is_empty() {
                entries.insert(key, value);
            }
            logical.clear();
        }

        if !logical.is_empty() {
            let (key, value) = split_property(&logical);
            if !key.is_empty() {
                entries.insert(key, value);
            }
        }

        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An odd number of trailing backslashes continues the line.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

/// Split at the first unescaped `=`, `:` or whitespace.
fn split_property(line: &str) -> (String, String) {
    let mut key = String::new();
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    key.push(unescape(next));
                }
            }
            '=' | ':' => break,
            c if c.is_whitespace() => {
                while let Some(next) = chars.peek() {
                    if next.is_whitespace() {
                        chars.next();
                    } else {
                        break;
                    }
                }
                if matches!(chars.peek(), Some('=') | Some(':')) {
                    chars.next();
                }
                break;
            }
            _ => key.push(c),
        }
    }

    let rest: String = chars.collect();
    let mut value = String::new();
    let mut rest = rest.trim_start().chars();
    while let Some(c) = rest.next() {
        if c == '\\' {
            if let Some(next) = rest.next() {
                value.push(unescape(next));
            }
        } else {
            value.push(c);
        }
    }
    (key, value)
}

fn unescape(c: char) -> char {
    match c {
        't' => '\t',
        'n' => '\n',
        'r' => '\r',
        'f' => '\u{c}',
        other => other,
    }
}

/// Wrapper configuration from `gradle-wrapper.properties`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WrapperInfo {
    pub distribution_url: Option<String>,
    pub gradle_version: Option<String>,
    /// `bin` or `all`
    pub distribution_type: Option<String>,
}

impl WrapperInfo {
    pub fn parse(text: &str) -> Self {
        static DIST_RE: OnceLock<Regex> = OnceLock::new();
        let re = DIST_RE.get_or_init(|| {
            Regex::new(r"gradle-([^/]+?)-(bin|all)\.zip$").expect("valid regex")
        });

        let properties = PropertiesFileInfo::parse(text);
        let distribution_url = properties.get("distributionUrl").map(str::to_string);
        let captures = distribution_url.as_deref().and_then(|url| re.captures(url));

        Self {
            gradle_version: captures
                .as_ref()
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string()),
            distribution_type: captures
                .as_ref()
                .and_then(|c| c.get(2))
                .map(|m| m.as_str().to_string()),
            distribution_url,
        }
    }
}
