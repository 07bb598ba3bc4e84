//! CSS subset for the in-memory DOM.
//!
//! Supported: `tag`, `*`, `#id`, `.class`, `[attr]`, `[attr="v"]` with the
//! `=`, `*=`, `^=`, `$=` and `~=` operators, and comma-separated groups.
//! The mock DOM is flat, so combinators and pseudo-classes are rejected.

use super::element::MockElement;
use regex::Regex;
use std::sync::OnceLock;

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:\*|[A-Za-z][A-Za-z0-9-]*)").expect("tag pattern compiles"))
}

fn part_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"^(?:#(?P<id>[\w-]+)|\.(?P<class>[\w-]+)|\[\s*(?P<attr>[\w-]+)\s*(?:(?P<op>[*^$~]?=)\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<bare>[\w-]+))\s*)?\])"#,
        )
        .expect("compound pattern compiles")
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals,
    Contains,
    Prefix,
    Suffix,
    Word,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrTest {
    name: String,
    op: AttrOp,
    value: String,
}

impl AttrTest {
    fn matches(&self, element: &MockElement) -> bool {
        let Some(actual) = element.attribute(&self.name) else {
            return false;
        };
        match self.op {
            AttrOp::Exists => true,
            AttrOp::Equals => actual == self.value,
            AttrOp::Contains => !self.value.is_empty() && actual.contains(&self.value),
            AttrOp::Prefix => !self.value.is_empty() && actual.starts_with(&self.value),
            AttrOp::Suffix => !self.value.is_empty() && actual.ends_with(&self.value),
            AttrOp::Word => actual.split_whitespace().any(|w| w == self.value),
        }
    }
}

/// One compound selector: a tag plus id/class/attribute tests
#[derive(Debug, Clone, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    tests: Vec<AttrTest>,
}

impl Compound {
    fn matches(&self, element: &MockElement) -> bool {
        if let Some(tag) = &self.tag {
            if !tag.eq_ignore_ascii_case(element.tag()) {
                return false;
            }
        }
        self.tests.iter().all(|t| t.matches(element))
    }
}

/// Parsed selector group
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CssSelector {
    alternatives: Vec<Compound>,
}

impl CssSelector {
    /// Parse a selector group, returning a human-readable error
    pub(crate) fn parse(input: &str) -> Result<Self, String> {
        let mut alternatives = Vec::new();
        for part in split_group(input)? {
            alternatives.push(parse_compound(part.trim())?);
        }
        Ok(Self { alternatives })
    }

    pub(crate) fn matches(&self, element: &MockElement) -> bool {
        self.alternatives.iter().any(|c| c.matches(element))
    }
}

/// Split on top-level commas, ignoring commas inside quotes or brackets
fn split_group(input: &str) -> Result<Vec<&str>, String> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;
    let mut depth = 0usize;

    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if quote.is_some() {
        return Err("unterminated string".to_string());
    }
    parts.push(&input[start..]);

    if parts.iter().any(|p| p.trim().is_empty()) {
        return Err("empty selector".to_string());
    }
    Ok(parts)
}

fn parse_compound(input: &str) -> Result<Compound, String> {
    let mut rest = input;
    let tag = match tag_re().find(rest) {
        Some(m) => {
            rest = &rest[m.end()..];
            (m.as_str() != "*").then(|| m.as_str().to_ascii_lowercase())
        }
        None => None,
    };

    let mut tests = Vec::new();
    while !rest.is_empty() {
        let Some(caps) = part_re().captures(rest) else {
            return Err(unsupported(rest));
        };
        let test = if let Some(id) = caps.name("id") {
            AttrTest {
                name: "id".to_string(),
                op: AttrOp::Equals,
                value: id.as_str().to_string(),
            }
        } else if let Some(class) = caps.name("class") {
            AttrTest {
                name: "class".to_string(),
                op: AttrOp::Word,
                value: class.as_str().to_string(),
            }
        } else {
            let name = caps.name("attr").map_or("", |m| m.as_str()).to_ascii_lowercase();
            let op = match caps.name("op").map(|m| m.as_str()) {
                None => AttrOp::Exists,
                Some("=") => AttrOp::Equals,
                Some("*=") => AttrOp::Contains,
                Some("^=") => AttrOp::Prefix,
                Some("$=") => AttrOp::Suffix,
                Some(_) => AttrOp::Word,
            };
            let value = ["dq", "sq", "bare"]
                .iter()
                .find_map(|g| caps.name(g))
                .map_or_else(String::new, |m| m.as_str().to_string());
            AttrTest { name, op, value }
        };
        tests.push(test);
        let consumed = caps.get(0).map_or(rest.len(), |m| m.end());
        rest = &rest[consumed..];
    }

    if tag.is_none() && tests.is_empty() && !input.starts_with('*') {
        return Err("empty selector".to_string());
    }
    Ok(Compound { tag, tests })
}

fn unsupported(rest: &str) -> String {
    match rest.chars().next() {
        Some(c) if c.is_whitespace() || matches!(c, '>' | '+' | '~') => {
            format!("combinators are not supported here: '{rest}'")
        }
        Some(':') => format!("pseudo-classes are not supported here: '{rest}'"),
        _ => format!("unexpected token at '{rest}'"),
    }
}
