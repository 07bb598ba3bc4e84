//! Page Object Model support.
//!
//! A page object owns one [`SelectorMap`] (logical element name to
//! [`Target`]) and one [`BasePage`] wrapping the context it was constructed
//! with. Page-specific methods look up a target by name and hand it to a
//! `BasePage` action, which resolves it and performs exactly one engine call.
//!
//! ```rust,ignore
//! impl LoginPage {
//!     pub async fn login(&self, username: &str, password: &str) -> LocusResult<()> {
//!         self.base.fill(self.target(USERNAME)?, username, None).await?;
//!         self.base.fill(self.target(PASSWORD)?, password, None).await?;
//!         self.base.click(self.target(SUBMIT)?, None).await
//!     }
//! }
//! ```

use crate::config::url_path;
use crate::driver::{Handle, PageContext};
use crate::factory::Params;
use crate::resolve::resolve_target;
use crate::result::{LocusError, LocusResult};
use crate::selector::Target;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Shared actions every page object delegates to.
///
/// Holds the context injected at construction; it is never replaced.
#[derive(Debug, Clone)]
pub struct BasePage {
    ctx: Arc<dyn PageContext>,
}

impl BasePage {
    /// Wrap a page context
    #[must_use]
    pub fn new(ctx: Arc<dyn PageContext>) -> Self {
        Self { ctx }
    }

    /// The injected context
    #[must_use]
    pub fn context(&self) -> &Arc<dyn PageContext> {
        &self.ctx
    }

    /// Resolve a target to a handle without acting on it
    ///
    /// # Errors
    ///
    /// Returns error if the target cannot be resolved (see
    /// [`resolve_target`]).
    pub async fn handle(&self, target: &Target, params: Option<&Params>) -> LocusResult<Handle> {
        resolve_target(self.ctx.as_ref(), target, params).await
    }

    /// Resolve and click
    ///
    /// # Errors
    ///
    /// Returns the engine's error unchanged when the click fails.
    pub async fn click(&self, target: &Target, params: Option<&Params>) -> LocusResult<()> {
        let handle = self.handle(target, params).await?;
        tracing::trace!(%target, handle = %handle.describe(), "click");
        handle.click().await
    }

    /// Resolve and replace the element's value
    ///
    /// # Errors
    ///
    /// Returns the engine's error unchanged when the fill fails.
    pub async fn fill(&self, target: &Target, value: &str, params: Option<&Params>) -> LocusResult<()> {
        let handle = self.handle(target, params).await?;
        tracing::trace!(%target, handle = %handle.describe(), "fill");
        handle.fill(value).await
    }

    /// Resolve and read trimmed text; `None` when absent or blank
    ///
    /// # Errors
    ///
    /// Returns the engine's error when the element cannot be read.
    pub async fn get_text(&self, target: &Target, params: Option<&Params>) -> LocusResult<Option<String>> {
        let handle = self.handle(target, params).await?;
        let text = handle.text_content().await?;
        Ok(text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()))
    }

    /// Resolve and report whether the element is present and visible
    ///
    /// # Errors
    ///
    /// Propagates engine errors raised while checking.
    pub async fn is_visible(&self, target: &Target, params: Option<&Params>) -> LocusResult<bool> {
        let handle = self.handle(target, params).await?;
        handle.is_visible().await
    }

    /// Navigate to a URL or a path relative to the base URL
    ///
    /// # Errors
    ///
    /// Returns error if navigation fails.
    pub async fn goto(&self, url: &str) -> LocusResult<()> {
        tracing::trace!(url, "goto");
        self.ctx.goto(url).await
    }

    /// Current page URL
    ///
    /// # Errors
    ///
    /// Returns error if the engine cannot report its URL.
    pub async fn current_url(&self) -> LocusResult<String> {
        self.ctx.current_url().await
    }
}

/// Named selectors of one page object, fixed at construction
#[derive(Debug, Clone, Default)]
pub struct SelectorMap {
    page: String,
    targets: BTreeMap<String, Target>,
}

impl SelectorMap {
    /// Start an empty map for a page
    #[must_use]
    pub fn new(page: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            targets: BTreeMap::new(),
        }
    }

    /// Declare a named target
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, target: impl Into<Target>) -> Self {
        let _ = self.targets.insert(name.into(), target.into());
        self
    }

    /// Look up a target by name
    ///
    /// # Errors
    ///
    /// Returns [`LocusError::UnknownSelector`] for undeclared names.
    pub fn get(&self, name: &str) -> LocusResult<&Target> {
        self.targets.get(name).ok_or_else(|| LocusError::UnknownSelector {
            page: self.page.clone(),
            name: name.to_string(),
        })
    }

    /// Whether a name is declared
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.targets.contains_key(name)
    }

    /// Declared names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.targets.keys().map(String::as_str).collect()
    }

    /// Number of declared names
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether nothing is declared
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Page this map belongs to
    #[must_use]
    pub fn page(&self) -> &str {
        &self.page
    }
}

/// A page or component of the application under test.
///
/// # Example
///
/// ```ignore
/// let ctx: Arc<dyn PageContext> = Arc::new(MockPage::new(&LocusConfig::default()));
/// let login = LoginPage::from_context(ctx);
/// login.open().await?;
/// assert!(login.is_current().await?);
/// ```
#[async_trait]
pub trait PageObject: Send + Sync {
    /// Build the page object around an injected context
    fn from_context(ctx: Arc<dyn PageContext>) -> Self
    where
        Self: Sized;

    /// Shared actions
    fn base(&self) -> &BasePage;

    /// Named selectors
    fn selectors(&self) -> &SelectorMap;

    /// URL pattern of this page (e.g. `/login`, `/users/:id`)
    fn url_pattern(&self) -> &str;

    /// Page name for logs and errors
    fn page_name(&self) -> &str {
        self.selectors().page()
    }

    /// Look up a named target
    ///
    /// # Errors
    ///
    /// Returns [`LocusError::UnknownSelector`] for undeclared names.
    fn target(&self, name: &str) -> LocusResult<&Target> {
        self.selectors().get(name)
    }

    /// Whether the browser is currently on this page
    ///
    /// # Errors
    ///
    /// Returns error if the engine cannot report its URL.
    async fn is_current(&self) -> LocusResult<bool> {
        let url = self.base().current_url().await?;
        Ok(UrlMatcher::new(self.url_pattern()).matches(&url))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Any,
    Param(String),
}

/// URL path pattern: literal segments, `*` and `:name` placeholders.
/// Each placeholder consumes exactly one path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMatcher {
    pattern: String,
    segments: Vec<Segment>,
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

impl UrlMatcher {
    /// Compile a pattern
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = split_path(pattern)
            .map(|s| match s {
                "*" => Segment::Any,
                _ => s
                    .strip_prefix(':')
                    .map_or_else(|| Segment::Literal(s.to_string()), |n| Segment::Param(n.to_string())),
            })
            .collect();
        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// Whether a path (or full URL) matches
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let path = url_path(path);
        let parts: Vec<&str> = split_path(&path).collect();
        parts.len() == self.segments.len()
            && self.segments.iter().zip(&parts).all(|(seg, part)| match seg {
                Segment::Literal(lit) => lit == part,
                Segment::Any | Segment::Param(_) => true,
            })
    }

    /// Values of `:name` placeholders; empty when the path does not match
    #[must_use]
    pub fn extract_params(&self, path: &str) -> HashMap<String, String> {
        if !self.matches(path) {
            return HashMap::new();
        }
        let path = url_path(path);
        self.segments
            .iter()
            .zip(split_path(&path))
            .filter_map(|(seg, part)| match seg {
                Segment::Param(name) => Some((name.clone(), part.to_string())),
                _ => None,
            })
            .collect()
    }

    /// The pattern as written
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}
