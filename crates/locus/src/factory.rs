//! Selector factories: selectors whose parameters are known only at call time.
//!
//! A factory is a pure function from an optional [`Params`] map to one
//! [`Selector`]. Absent parameters read as the empty string, so a factory
//! never produces a malformed selector just because a caller forgot a key.

use crate::selector::Selector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A parameter value: string or number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Numeric value
    Num(f64),
    /// String value
    Str(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Num(n) if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            Self::Num(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Num(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Num(value as f64)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Num(f64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Num(f64::from(value))
    }
}

/// Call-time parameters for a factory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params {
    values: BTreeMap<String, ParamValue>,
}

impl Params {
    /// Create an empty parameter map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        let _ = self.values.insert(name.into(), value.into());
        self
    }

    /// Get a raw parameter
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// Get a parameter as text; absent parameters read as ""
    #[must_use]
    pub fn text(&self, name: &str) -> String {
        self.values
            .get(name)
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// Number of parameters
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no parameters are set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

type BuildFn = dyn Fn(&Params) -> Selector + Send + Sync;

/// A pure function from parameters to a selector
#[derive(Clone)]
pub struct SelectorFactory {
    name: String,
    build: Arc<BuildFn>,
}

impl SelectorFactory {
    /// Wrap a builder function under a descriptive name
    pub fn new<F>(name: impl Into<String>, build: F) -> Self
    where
        F: Fn(&Params) -> Selector + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            build: Arc::new(build),
        }
    }

    /// Name given at construction
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build a selector; `None` behaves like an empty parameter map
    #[must_use]
    pub fn build(&self, params: Option<&Params>) -> Selector {
        match params {
            Some(params) => (self.build)(params),
            None => (self.build)(&Params::default()),
        }
    }

    /// Structural path narrowed to elements whose normalized text contains
    /// the `param` value: `{base}[contains(normalize-space(.), <literal>)]`
    #[must_use]
    pub fn xpath_containing_text(base_path: impl Into<String>, param: impl Into<String>) -> Self {
        let base_path = base_path.into();
        let param = param.into();
        Self::new(format!("{base_path} containing {{{param}}}"), move |params| {
            let text = normalize_space(&params.text(&param));
            Selector::XPath(format!(
                "{base_path}[contains(normalize-space(.), {})]",
                xpath_literal(&text)
            ))
        })
    }

    /// Visible text exactly equal to the `param` value
    #[must_use]
    pub fn text_equals(param: impl Into<String>) -> Self {
        let param = param.into();
        Self::new(format!("text equals {{{param}}}"), move |params| {
            Selector::exact_text(params.text(&param))
        })
    }
}

impl fmt::Debug for SelectorFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectorFactory")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Collapse runs of whitespace and trim, matching XPath `normalize-space`
#[must_use]
pub fn normalize_space(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Quote a string as an XPath 1.0 literal.
///
/// XPath has no escape sequences, so text containing both quote kinds is
/// spliced together with `concat()`.
#[must_use]
pub fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        return format!("'{text}'");
    }
    if !text.contains('"') {
        return format!("\"{text}\"");
    }
    let mut parts = Vec::new();
    for (i, chunk) in text.split('\'').enumerate() {
        if i > 0 {
            parts.push("\"'\"".to_string());
        }
        if !chunk.is_empty() {
            parts.push(format!("'{chunk}'"));
        }
    }
    format!("concat({})", parts.join(", "))
}
