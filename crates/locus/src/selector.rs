//! Selector model: how to find an element.
//!
//! A [`Selector`] describes exactly one matching strategy. A [`SelectorList`]
//! orders several of them by preference, and a [`Target`] is whatever a page
//! object hands to the resolver: a selector, a list, or a factory.
//!
//! # Design Philosophy
//!
//! - **Closed set**: every strategy is an enum variant, so adding one forces
//!   the resolver's `match` to be extended
//! - **Values, not handles**: selectors never touch the page; they are built
//!   once and shared freely
//! - **Accessible first**: lists let page objects prefer role/label queries and
//!   fall back to structural ones

use crate::driver::{Handle, PageContext};
use crate::factory::SelectorFactory;
use crate::result::{LocusError, LocusResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Name and state qualifiers for a role query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleOptions {
    /// Accessible name to match
    pub name: Option<String>,
    /// Match the name exactly (case-sensitive, whole string)
    pub exact: bool,
    /// `aria-checked` / checkbox state
    pub checked: Option<bool>,
    /// `aria-selected` state
    pub selected: Option<bool>,
    /// `aria-pressed` state
    pub pressed: Option<bool>,
    /// `aria-expanded` state
    pub expanded: Option<bool>,
    /// Heading / tree nesting level
    pub level: Option<u32>,
}

impl RoleOptions {
    /// Options that only filter by accessible name
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Require an exact name match
    #[must_use]
    pub const fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    /// Filter by checked state
    #[must_use]
    pub const fn checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }

    /// Filter by selected state
    #[must_use]
    pub const fn selected(mut self, selected: bool) -> Self {
        self.selected = Some(selected);
        self
    }

    /// Filter by pressed state
    #[must_use]
    pub const fn pressed(mut self, pressed: bool) -> Self {
        self.pressed = Some(pressed);
        self
    }

    /// Filter by expanded state
    #[must_use]
    pub const fn expanded(mut self, expanded: bool) -> Self {
        self.expanded = Some(expanded);
        self
    }

    /// Filter by nesting level
    #[must_use]
    pub const fn level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }
}

type ResolveFn = dyn Fn(&dyn PageContext) -> LocusResult<Handle> + Send + Sync;

/// Escape hatch: an opaque function from page context to handle
#[derive(Clone)]
pub struct CustomResolver {
    name: String,
    resolve: Arc<ResolveFn>,
}

impl CustomResolver {
    /// Wrap a resolver function under a descriptive name
    pub fn new<F>(name: impl Into<String>, resolve: F) -> Self
    where
        F: Fn(&dyn PageContext) -> LocusResult<Handle> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            resolve: Arc::new(resolve),
        }
    }

    /// Name given at construction
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the resolver against a page
    pub fn resolve(&self, ctx: &dyn PageContext) -> LocusResult<Handle> {
        (self.resolve)(ctx)
    }
}

impl fmt::Debug for CustomResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomResolver")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl PartialEq for CustomResolver {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.resolve, &other.resolve)
    }
}

/// One strategy for locating an element
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// CSS / attribute query (e.g. `input[name="username"]`)
    Css(String),
    /// XPath query
    XPath(String),
    /// Accessible role with qualifiers
    Role {
        /// Role name, validated at resolution time
        role: String,
        /// Name and state qualifiers
        options: RoleOptions,
    },
    /// Control associated with a label
    Label(String),
    /// Input by placeholder hint
    Placeholder(String),
    /// Element by rendered text
    Text {
        /// Text to match
        text: String,
        /// Whole-string, case-sensitive match
        exact: bool,
    },
    /// Element carrying `data-testid`
    TestId(String),
    /// Custom resolver function
    Custom(CustomResolver),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(path: impl Into<String>) -> Self {
        Self::XPath(path.into())
    }

    /// Create a role selector without qualifiers
    #[must_use]
    pub fn role(role: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            options: RoleOptions::default(),
        }
    }

    /// Create a role selector filtered by accessible name
    #[must_use]
    pub fn role_with_name(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            options: RoleOptions::named(name),
        }
    }

    /// Create a role selector with explicit options
    #[must_use]
    pub fn role_with(role: impl Into<String>, options: RoleOptions) -> Self {
        Self::Role {
            role: role.into(),
            options,
        }
    }

    /// Create a label selector
    #[must_use]
    pub fn label(text: impl Into<String>) -> Self {
        Self::Label(text.into())
    }

    /// Create a placeholder selector
    #[must_use]
    pub fn placeholder(text: impl Into<String>) -> Self {
        Self::Placeholder(text.into())
    }

    /// Create a substring, case-insensitive text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            exact: false,
        }
    }

    /// Create an exact text selector
    #[must_use]
    pub fn exact_text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            exact: true,
        }
    }

    /// Create a test ID selector
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Create a custom selector
    pub fn custom<F>(name: impl Into<String>, resolve: F) -> Self
    where
        F: Fn(&dyn PageContext) -> LocusResult<Handle> + Send + Sync + 'static,
    {
        Self::Custom(CustomResolver::new(name, resolve))
    }

    /// Start a fallback list with this selector as the preferred strategy
    #[must_use]
    pub fn or(self, fallback: Self) -> SelectorList {
        SelectorList::new(self).or(fallback)
    }

    /// Short strategy name, used in logs
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Css(_) => "css",
            Self::XPath(_) => "xpath",
            Self::Role { .. } => "role",
            Self::Label(_) => "label",
            Self::Placeholder(_) => "placeholder",
            Self::Text { .. } => "text",
            Self::TestId(_) => "testid",
            Self::Custom(_) => "custom",
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={s}"),
            Self::XPath(s) => write!(f, "xpath={s}"),
            Self::Role { role, options } => match &options.name {
                Some(name) => write!(f, "role={role}[name={name:?}]"),
                None => write!(f, "role={role}"),
            },
            Self::Label(t) => write!(f, "label={t:?}"),
            Self::Placeholder(t) => write!(f, "placeholder={t:?}"),
            Self::Text { text, exact: true } => write!(f, "text={text:?}s"),
            Self::Text { text, exact: false } => write!(f, "text={text:?}i"),
            Self::TestId(id) => write!(f, "testid={id:?}"),
            Self::Custom(c) => write!(f, "custom={}", c.name()),
        }
    }
}

/// Ordered, non-empty fallback sequence; index 0 is the preferred strategy
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    selectors: Vec<Selector>,
}

impl SelectorList {
    /// Start a list with its preferred strategy
    #[must_use]
    pub fn new(first: Selector) -> Self {
        Self {
            selectors: vec![first],
        }
    }

    /// Append a lower-priority fallback
    #[must_use]
    pub fn or(mut self, fallback: Selector) -> Self {
        self.selectors.push(fallback);
        self
    }

    /// The preferred strategy
    #[must_use]
    pub fn first(&self) -> &Selector {
        &self.selectors[0]
    }

    /// Strategies in priority order
    #[must_use]
    pub fn as_slice(&self) -> &[Selector] {
        &self.selectors
    }

    /// Iterate in priority order
    pub fn iter(&self) -> std::slice::Iter<'_, Selector> {
        self.selectors.iter()
    }

    /// Number of strategies (always at least one)
    #[must_use]
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    /// Always false; present for API symmetry with `len`
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl TryFrom<Vec<Selector>> for SelectorList {
    type Error = LocusError;

    fn try_from(selectors: Vec<Selector>) -> Result<Self, Self::Error> {
        if selectors.is_empty() {
            return Err(LocusError::EmptySelectorList);
        }
        Ok(Self { selectors })
    }
}

impl From<Selector> for SelectorList {
    fn from(selector: Selector) -> Self {
        Self::new(selector)
    }
}

impl<'a> IntoIterator for &'a SelectorList {
    type Item = &'a Selector;
    type IntoIter = std::slice::Iter<'a, Selector>;

    fn into_iter(self) -> Self::IntoIter {
        self.selectors.iter()
    }
}

/// Anything a page object can hand to the resolver
#[derive(Debug, Clone)]
pub enum Target {
    /// One strategy, resolved without probing
    Selector(Selector),
    /// Ordered fallback strategies
    List(SelectorList),
    /// Selector built from call-time parameters
    Factory(SelectorFactory),
}

impl From<Selector> for Target {
    fn from(selector: Selector) -> Self {
        Self::Selector(selector)
    }
}

impl From<SelectorList> for Target {
    fn from(list: SelectorList) -> Self {
        Self::List(list)
    }
}

impl From<SelectorFactory> for Target {
    fn from(factory: SelectorFactory) -> Self {
        Self::Factory(factory)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Selector(s) => write!(f, "{s}"),
            Self::List(list) => {
                let parts: Vec<String> = list.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(" | "))
            }
            Self::Factory(factory) => write!(f, "factory={}", factory.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod selector_tests {
        use super::*;

        #[test]
        fn test_constructors() {
            assert_eq!(Selector::css("button"), Selector::Css("button".to_string()));
            assert_eq!(
                Selector::xpath("//tr"),
                Selector::XPath("//tr".to_string())
            );
            assert!(matches!(
                Selector::text("Hi"),
                Selector::Text { exact: false, .. }
            ));
            assert!(matches!(
                Selector::exact_text("Hi"),
                Selector::Text { exact: true, .. }
            ));
        }

        #[test]
        fn test_role_with_name() {
            let selector = Selector::role_with_name("button", "Sign in");
            match selector {
                Selector::Role { role, options } => {
                    assert_eq!(role, "button");
                    assert_eq!(options.name.as_deref(), Some("Sign in"));
                    assert!(!options.exact);
                }
                other => panic!("unexpected selector {other:?}"),
            }
        }

        #[test]
        fn test_role_options_builder() {
            let options = RoleOptions::named("Remember me")
                .exact(true)
                .checked(true)
                .level(2)
                .expanded(false)
                .pressed(true)
                .selected(false);
            assert!(options.exact);
            assert_eq!(options.checked, Some(true));
            assert_eq!(options.level, Some(2));
            assert_eq!(options.expanded, Some(false));
            assert_eq!(options.pressed, Some(true));
            assert_eq!(options.selected, Some(false));
        }

        #[test]
        fn test_kind_and_display() {
            assert_eq!(Selector::label("Username").kind(), "label");
            assert_eq!(Selector::label("Username").to_string(), "label=\"Username\"");
            assert_eq!(Selector::test_id("hdr").to_string(), "testid=\"hdr\"");
            assert_eq!(
                Selector::role_with_name("link", "Home").to_string(),
                "role=link[name=\"Home\"]"
            );
        }

        #[test]
        fn test_custom_equality_is_identity() {
            let custom = Selector::custom("first-button", |ctx| ctx.locator("button"));
            let clone = custom.clone();
            assert_eq!(custom, clone);

            let other = Selector::custom("first-button", |ctx| ctx.locator("button"));
            assert_ne!(custom, other);
            assert_eq!(custom.to_string(), "custom=first-button");
        }
    }

    mod selector_list_tests {
        use super::*;

        #[test]
        fn test_or_preserves_order() {
            let list = Selector::label("Username")
                .or(Selector::placeholder("Username"))
                .or(Selector::css("input[name=\"username\"]"));
            assert_eq!(list.len(), 3);
            assert_eq!(list.first(), &Selector::label("Username"));
            assert_eq!(list.as_slice()[2], Selector::css("input[name=\"username\"]"));
            assert!(!list.is_empty());
        }

        #[test]
        fn test_try_from_empty_rejected() {
            let err = SelectorList::try_from(Vec::new()).unwrap_err();
            assert!(matches!(err, LocusError::EmptySelectorList));
        }

        #[test]
        fn test_try_from_vec() {
            let list =
                SelectorList::try_from(vec![Selector::css("a"), Selector::css("b")]).unwrap();
            let kinds: Vec<String> = list.iter().map(ToString::to_string).collect();
            assert_eq!(kinds, vec!["css=a", "css=b"]);
        }
    }

    mod target_tests {
        use super::*;

        #[test]
        fn test_from_impls() {
            assert!(matches!(
                Target::from(Selector::css("a")),
                Target::Selector(_)
            ));
            assert!(matches!(
                Target::from(Selector::css("a").or(Selector::css("b"))),
                Target::List(_)
            ));
            assert!(matches!(
                Target::from(SelectorFactory::text_equals("name")),
                Target::Factory(_)
            ));
        }

        #[test]
        fn test_list_display() {
            let target = Target::from(Selector::label("Password").or(Selector::css("#pw")));
            assert_eq!(target.to_string(), "[label=\"Password\" | css=#pw]");
        }
    }
}
