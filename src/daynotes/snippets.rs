//! Lightweight formatting for code pasted into notes.
//!
//! This is not a pretty-printer. It breaks lines at statement and brace
//! boundaries and re-indents by bracket depth, which is enough to make a
//! one-line paste readable. JSON is the exception: it is parsed and
//! re-serialized.

use crate::error::{NotesError, Result};
use std::fmt;
use std::str::FromStr;

const INDENT: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    JavaScript,
    TypeScript,
    Jsx,
    Tsx,
    Html,
    Css,
    Scss,
    Json,
    Markdown,
}

/// `(value, label)` for every language the formatter accepts.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("javascript", "JavaScript"),
    ("typescript", "TypeScript"),
    ("jsx", "JSX"),
    ("tsx", "TSX"),
    ("html", "HTML"),
    ("css", "CSS"),
    ("scss", "SCSS"),
    ("json", "JSON"),
    ("markdown", "Markdown"),
];

/// Short or alternate names mapped to their canonical value.
const ALIASES: &[(&str, &str)] = &[
    ("js", "javascript"),
    ("mjs", "javascript"),
    ("cjs", "javascript"),
    ("ts", "typescript"),
    ("htm", "html"),
    ("xhtml", "html"),
    ("md", "markdown"),
];

impl Language {
    pub fn value(self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Jsx => "jsx",
            Language::Tsx => "tsx",
            Language::Html => "html",
            Language::Css => "css",
            Language::Scss => "scss",
            Language::Json => "json",
            Language::Markdown => "markdown",
        }
    }

    pub fn label(self) -> &'static str {
        SUPPORTED_LANGUAGES
            .iter()
            .find(|(value, _)| *value == self.value())
            .map(|(_, label)| *label)
            .unwrap_or("")
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

impl FromStr for Language {
    type Err = NotesError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_language(s).as_str() {
            "javascript" => Ok(Language::JavaScript),
            "typescript" => Ok(Language::TypeScript),
            "jsx" => Ok(Language::Jsx),
            "tsx" => Ok(Language::Tsx),
            "html" => Ok(Language::Html),
            "css" => Ok(Language::Css),
            "scss" => Ok(Language::Scss),
            "json" => Ok(Language::Json),
            "markdown" => Ok(Language::Markdown),
            _ => Err(NotesError::UnknownLanguage(s.to_string())),
        }
    }
}

/// Lowercases and resolves aliases. Unknown names pass through lowercased.
pub fn normalize_language(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(lower)
}

pub fn format_code(code: &str, language: Language) -> String {
    let trimmed = code.trim();
    match language {
        Language::JavaScript
        | Language::TypeScript
        | Language::Jsx
        | Language::Tsx
        | Language::Css
        | Language::Scss => reindent(&break_statements(trimmed)),
        Language::Json => format_json(trimmed),
        Language::Html => reindent(&split_tags(trimmed)),
        Language::Markdown => reindent(trimmed),
    }
}

/// Best guess at what a snippet is. Falls back to JavaScript.
pub fn detect_language(code: &str) -> Language {
    let trimmed = code.trim();

    if trimmed.starts_with('<') && trimmed.contains('>') {
        return Language::Html;
    }

    // Checked before CSS: a JSON object also has braces and colons.
    let bracketed = (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'));
    if bracketed && serde_json::from_str::<serde_json::Value>(trimmed).is_ok() {
        return Language::Json;
    }

    if trimmed.contains('{') && trimmed.contains('}') && trimmed.contains(':') {
        return Language::Css;
    }

    if ["interface ", "type ", ": string", ": number", "import type"]
        .iter()
        .any(|marker| trimmed.contains(marker))
    {
        return Language::TypeScript;
    }

    if trimmed.contains("jsx") || (trimmed.contains('<') && trimmed.contains("/>")) {
        return Language::Jsx;
    }

    Language::JavaScript
}

fn break_statements(code: &str) -> String {
    let mut out = String::with_capacity(code.len() * 2);
    for c in code.chars() {
        match c {
            ';' => out.push_str(";\n"),
            ',' => out.push_str(",\n"),
            '{' => out.push_str(" {\n"),
            '}' => out.push_str("\n}\n"),
            other => out.push(other),
        }
    }
    out
}

fn format_json(code: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(code) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| code.to_string()),
        Err(e) => {
            tracing::debug!("Leaving invalid JSON as-is: {}", e);
            code.to_string()
        }
    }
}

fn split_tags(code: &str) -> String {
    code.replace("><", ">\n<")
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
}

fn reindent(code: &str) -> String {
    let mut depth: usize = 0;
    let lines: Vec<String> = code
        .split('\n')
        .map(|line| {
            let line = line.trim();
            if line.is_empty() {
                return String::new();
            }
            if line.starts_with('}') || line.starts_with(']') || line.starts_with("</") {
                depth = depth.saturating_sub(1);
            }
            let indented = format!("{}{}", INDENT.repeat(depth), line);
            if opens_block(line) {
                depth += 1;
            }
            indented
        })
        .collect();
    lines.join("\n").trim_end().to_string()
}

fn opens_block(line: &str) -> bool {
    if line.ends_with('{') || line.ends_with('[') {
        return true;
    }
    // An opening tag, unless it closes itself or on the same line.
    line.starts_with('<')
        && !line.starts_with("</")
        && !line.starts_with("<!")
        && !line.ends_with("/>")
        && !line.contains("</")
}
