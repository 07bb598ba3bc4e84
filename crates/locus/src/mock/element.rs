//! Scripted elements and per-strategy matching.

use super::css::CssSelector;
use super::xpath::XPathExpr;
use super::MockDom;
use crate::driver::Query;
use crate::factory::normalize_space;
use crate::result::{LocusError, LocusResult};
use crate::role::AriaRole;
use crate::selector::RoleOptions;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

type ClickFn = dyn Fn(&mut MockDom) + Send + Sync;

/// One element of the in-memory DOM
#[derive(Clone)]
pub struct MockElement {
    tag: String,
    attributes: BTreeMap<String, String>,
    text: Option<String>,
    label: Option<String>,
    value: Option<String>,
    visible: bool,
    ancestors: Vec<String>,
    on_click: Option<Arc<ClickFn>>,
}

impl MockElement {
    /// Create an element with the given tag name
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            text: None,
            label: None,
            value: None,
            visible: true,
            ancestors: Vec::new(),
            on_click: None,
        }
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self
            .attributes
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Set the text content
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Associate a `<label>` with this control
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the initial value of a form control
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Render the element invisible
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Declare an ancestor tag, for structural XPath steps
    #[must_use]
    pub fn within(mut self, tag: impl Into<String>) -> Self {
        self.ancestors.push(tag.into().to_ascii_lowercase());
        self
    }

    /// Run a script against the DOM when the element is clicked
    #[must_use]
    pub fn on_click<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut MockDom) + Send + Sync + 'static,
    {
        self.on_click = Some(Arc::new(handler));
        self
    }

    /// Tag name (lowercase)
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Attribute value
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Raw text content
    #[must_use]
    pub fn text_content(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Current value of a form control
    #[must_use]
    pub fn current_value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Whether the element renders
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Make the element visible or invisible
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Replace the text content
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    pub(crate) fn ancestors(&self) -> &[String] {
        &self.ancestors
    }

    pub(crate) fn normalized_text(&self) -> String {
        normalize_space(self.text.as_deref().unwrap_or(""))
    }

    pub(crate) fn click_handler(&self) -> Option<Arc<ClickFn>> {
        self.on_click.clone()
    }

    pub(crate) fn set_value(&mut self, value: &str) {
        self.value = Some(value.to_string());
    }

    pub(crate) fn is_fillable(&self) -> bool {
        match self.tag.as_str() {
            "textarea" => true,
            "input" => !matches!(
                self.attribute("type").map(str::to_ascii_lowercase).as_deref(),
                Some("button" | "submit" | "reset" | "checkbox" | "radio" | "image" | "file" | "hidden")
            ),
            _ => self.attribute("contenteditable").is_some_and(|v| v != "false"),
        }
    }

    pub(crate) fn is_disabled(&self) -> bool {
        self.attribute("disabled").is_some() || self.attribute("aria-disabled") == Some("true")
    }

    /// Explicit `role` attribute first, then the tag's implicit role
    pub(crate) fn role(&self) -> Option<AriaRole> {
        if let Some(explicit) = self.attribute("role") {
            return explicit.split_whitespace().find_map(|r| r.parse().ok());
        }
        AriaRole::implicit_for(&self.tag, self.attribute("type"), self.attribute("href").is_some())
    }

    pub(crate) fn accessible_name(&self) -> String {
        let input_button = self.tag == "input"
            && matches!(self.attribute("type"), Some("button" | "submit" | "reset"));
        let candidates = [
            self.attribute("aria-label"),
            self.label.as_deref(),
            if input_button { self.value.as_deref().or_else(|| self.attribute("value")) } else { None },
            self.text.as_deref(),
            self.attribute("alt"),
            self.attribute("title"),
            self.attribute("placeholder"),
        ];
        candidates
            .into_iter()
            .flatten()
            .map(normalize_space)
            .find(|name| !name.is_empty())
            .unwrap_or_default()
    }

    fn flag(&self, aria: &str, native: &str) -> bool {
        self.attribute(aria) == Some("true") || self.attribute(native).is_some()
    }

    fn level(&self) -> Option<u32> {
        self.attribute("aria-level")
            .and_then(|l| l.trim().parse().ok())
            .or_else(|| AriaRole::implicit_level(&self.tag))
    }
}

impl fmt::Debug for MockElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockElement")
            .field("tag", &self.tag)
            .field("attributes", &self.attributes)
            .field("text", &self.text)
            .field("label", &self.label)
            .field("value", &self.value)
            .field("visible", &self.visible)
            .field("on_click", &self.on_click.is_some())
            .finish()
    }
}

/// Playwright-style loose match: whitespace-normalized, case-insensitive substring
fn loose_contains(haystack: &str, needle: &str) -> bool {
    normalize_space(haystack)
        .to_lowercase()
        .contains(&normalize_space(needle).to_lowercase())
}

/// A query compiled against the mock DOM
#[derive(Debug, Clone)]
pub(crate) enum Matcher {
    Css(CssSelector),
    XPath(XPathExpr),
    Role(AriaRole, RoleOptions),
    Label(String),
    Placeholder(String),
    Text { text: String, exact: bool },
    TestId(String),
}

impl Matcher {
    /// Compile a query; malformed CSS or XPath fails here, before any probing
    pub(crate) fn compile(query: &Query) -> LocusResult<Self> {
        let invalid = |message: String| LocusError::InvalidSelector {
            selector: query.to_string(),
            message,
        };
        Ok(match query {
            Query::Css { selector } => Self::Css(CssSelector::parse(selector).map_err(invalid)?),
            Query::XPath { path } => Self::XPath(XPathExpr::parse(path).map_err(invalid)?),
            Query::Role { role, options } => Self::Role(*role, options.clone()),
            Query::Label { text } => Self::Label(text.clone()),
            Query::Placeholder { text } => Self::Placeholder(text.clone()),
            Query::Text { text, exact } => Self::Text {
                text: text.clone(),
                exact: *exact,
            },
            Query::TestId { id } => Self::TestId(id.clone()),
        })
    }

    pub(crate) fn matches(&self, el: &MockElement) -> bool {
        match self {
            Self::Css(css) => css.matches(el),
            Self::XPath(xpath) => xpath.matches(el),
            Self::Role(role, options) => el.visible && role_matches(el, *role, options),
            Self::Label(text) => el
                .label
                .as_deref()
                .or_else(|| el.attribute("aria-label"))
                .is_some_and(|label| loose_contains(label, text)),
            Self::Placeholder(text) => el
                .attribute("placeholder")
                .is_some_and(|p| loose_contains(p, text)),
            Self::Text { text, exact } => match el.text.as_deref() {
                Some(content) if *exact => normalize_space(content) == normalize_space(text),
                Some(content) => loose_contains(content, text),
                None => false,
            },
            Self::TestId(id) => el.attribute("data-testid") == Some(id.as_str()),
        }
    }
}

fn role_matches(el: &MockElement, role: AriaRole, options: &RoleOptions) -> bool {
    if el.role() != Some(role) {
        return false;
    }
    if let Some(name) = &options.name {
        let accessible = el.accessible_name();
        let ok = if options.exact {
            accessible == normalize_space(name)
        } else {
            loose_contains(&accessible, name)
        };
        if !ok {
            return false;
        }
    }
    let states = [
        (options.checked, el.flag("aria-checked", "checked")),
        (options.selected, el.flag("aria-selected", "selected")),
        (options.pressed, el.attribute("aria-pressed") == Some("true")),
        (options.expanded, el.attribute("aria-expanded") == Some("true")),
    ];
    if states
        .iter()
        .any(|(wanted, actual)| wanted.is_some_and(|w| w != *actual))
    {
        return false;
    }
    options.level.map_or(true, |level| el.level() == Some(level))
}
