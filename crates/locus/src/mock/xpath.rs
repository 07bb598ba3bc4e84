//! XPath subset for the in-memory DOM.
//!
//! Paths are sequences of `//tag` steps. Only the last step may carry
//! predicates; earlier steps are checked against the element's declared
//! ancestors. Predicates:
//!
//! - `contains(normalize-space(.), LIT)` (also `.` or `text()` as the subject)
//! - `normalize-space(.) = LIT` and `text() = LIT`
//! - `@attr` and `@attr = LIT`
//!
//! `LIT` is a quoted string or a `concat(...)` of quoted strings.

use super::element::MockElement;
use crate::factory::normalize_space;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    TextContains(String),
    TextEquals(String),
    HasAttr(String),
    AttrEquals(String, String),
}

impl Predicate {
    fn matches(&self, element: &MockElement) -> bool {
        match self {
            Self::TextContains(needle) => element.normalized_text().contains(needle.as_str()),
            Self::TextEquals(expected) => element.normalized_text() == *expected,
            Self::HasAttr(name) => element.attribute(name).is_some(),
            Self::AttrEquals(name, value) => element.attribute(name) == Some(value.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    tag: Option<String>,
    predicates: Vec<Predicate>,
}

impl Step {
    fn tag_matches(&self, tag: &str) -> bool {
        self.tag.as_deref().map_or(true, |t| t.eq_ignore_ascii_case(tag))
    }
}

/// Parsed path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct XPathExpr {
    ancestors: Vec<Step>,
    target: Step,
}

impl XPathExpr {
    pub(crate) fn parse(input: &str) -> Result<Self, String> {
        let mut cursor = Cursor::new(input.trim());
        let mut steps = Vec::new();

        while !cursor.at_end() {
            if !cursor.eat("//") {
                return Err(format!("expected '//' at '{}'", cursor.rest()));
            }
            let tag = if cursor.eat("*") {
                None
            } else {
                Some(cursor.ident()?.to_ascii_lowercase())
            };
            let mut predicates = Vec::new();
            while cursor.peek() == Some('[') {
                predicates.push(cursor.predicate()?);
            }
            steps.push(Step { tag, predicates });
        }

        let Some(target) = steps.pop() else {
            return Err("empty path".to_string());
        };
        if steps.iter().any(|s| !s.predicates.is_empty()) {
            return Err("predicates are only supported on the last step".to_string());
        }
        Ok(Self {
            ancestors: steps,
            target,
        })
    }

    pub(crate) fn matches(&self, element: &MockElement) -> bool {
        self.target.tag_matches(element.tag())
            && self.target.predicates.iter().all(|p| p.matches(element))
            && self
                .ancestors
                .iter()
                .all(|step| element.ancestors().iter().any(|a| step.tag_matches(a)))
    }
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    const fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<(), String> {
        self.skip_ws();
        if self.eat(token) {
            Ok(())
        } else {
            Err(format!("expected '{token}' at '{}'", self.rest()))
        }
    }

    fn ident(&mut self) -> Result<&'a str, String> {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(rest.len());
        if len == 0 || !rest.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(format!("expected a name at '{rest}'"));
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    fn literal(&mut self) -> Result<String, String> {
        self.skip_ws();
        if self.eat("concat(") {
            let mut joined = String::new();
            loop {
                joined.push_str(&self.literal()?);
                self.skip_ws();
                if self.eat(",") {
                    continue;
                }
                self.expect(")")?;
                return Ok(joined);
            }
        }
        let Some(quote) = self.peek().filter(|c| *c == '\'' || *c == '"') else {
            return Err(format!("expected a string literal at '{}'", self.rest()));
        };
        self.pos += 1;
        let rest = self.rest();
        let Some(end) = rest.find(quote) else {
            return Err("unterminated string literal".to_string());
        };
        self.pos += end + 1;
        Ok(rest[..end].to_string())
    }

    /// `.`, `normalize-space(.)`, `normalize-space()` or `text()`
    fn text_subject(&mut self) -> Result<(), String> {
        self.skip_ws();
        if self.eat("normalize-space(") {
            self.skip_ws();
            let _ = self.eat(".");
            return self.expect(")");
        }
        if self.eat("text()") || self.eat(".") {
            return Ok(());
        }
        Err(format!("unsupported expression at '{}'", self.rest()))
    }

    fn predicate(&mut self) -> Result<Predicate, String> {
        self.expect("[")?;
        self.skip_ws();

        let predicate = if self.eat("contains(") {
            self.text_subject()?;
            self.expect(",")?;
            let needle = self.literal()?;
            self.expect(")")?;
            Predicate::TextContains(normalize_space(&needle))
        } else if self.eat("@") {
            let name = self.ident()?.to_ascii_lowercase();
            self.skip_ws();
            if self.eat("=") {
                Predicate::AttrEquals(name, self.literal()?)
            } else {
                Predicate::HasAttr(name)
            }
        } else {
            self.text_subject()?;
            self.expect("=")?;
            Predicate::TextEquals(normalize_space(&self.literal()?))
        };

        self.expect("]")?;
        Ok(predicate)
    }
}
