//! In-memory engine for testing page objects without a browser.
//!
//! [`MockPage`] implements [`PageContext`] over a flat, scripted DOM. Each
//! element is declared up front with [`MockElement`]; routes swap the whole
//! element set on navigation, and click handlers mutate the DOM the way a
//! real app would (submit a form, show an error, redirect).
//!
//! ## Example
//!
//! ```rust
//! use locus::mock::{MockElement, MockPage};
//!
//! let page = MockPage::with_elements(vec![
//!     MockElement::new("button").text("Sign in"),
//! ]);
//! assert_eq!(page.probe_count(), 0);
//! ```
//!
//! Handles behave like Playwright locators: they re-run their query on every
//! call, and actions on an un-narrowed handle that matches more than one
//! element fail with a strict-mode error.

mod css;
mod element;
mod xpath;

pub use element::MockElement;

use crate::config::{join_url, url_path, LocusConfig};
use crate::driver::{ElementHandle, Handle, PageContext, Query};
use crate::result::{LocusError, LocusResult};
use async_trait::async_trait;
use css::CssSelector;
use element::Matcher;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Mutable state behind a [`MockPage`]
#[derive(Debug, Default)]
pub struct MockDom {
    base_url: String,
    url: String,
    elements: Vec<MockElement>,
    routes: HashMap<String, Vec<MockElement>>,
    probes: usize,
    history: Vec<String>,
}

impl MockDom {
    /// Current URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Navigate: resolve against the base URL and load the route's elements.
    /// Unknown routes load an empty page.
    pub fn navigate(&mut self, url: &str) {
        self.url = join_url(&self.base_url, url);
        self.elements = self
            .routes
            .get(&url_path(&self.url))
            .cloned()
            .unwrap_or_default();
        self.history.push(format!("goto:{}", self.url));
    }

    /// Elements of the current page
    #[must_use]
    pub fn elements(&self) -> &[MockElement] {
        &self.elements
    }

    /// Mutable access to the current page's elements
    pub fn elements_mut(&mut self) -> &mut Vec<MockElement> {
        &mut self.elements
    }

    /// Append an element to the current page
    pub fn push(&mut self, element: MockElement) {
        self.elements.push(element);
    }

    /// First element matching a CSS selector
    #[must_use]
    pub fn find(&self, css: &str) -> Option<&MockElement> {
        let css = CssSelector::parse(css).ok()?;
        self.elements.iter().find(|e| css.matches(e))
    }

    /// First element matching a CSS selector, mutably
    pub fn find_mut(&mut self, css: &str) -> Option<&mut MockElement> {
        let css = CssSelector::parse(css).ok()?;
        self.elements.iter_mut().find(|e| css.matches(e))
    }

    /// Current value of the first element matching a CSS selector
    #[must_use]
    pub fn value_of(&self, css: &str) -> Option<String> {
        self.find(css)
            .and_then(MockElement::current_value)
            .map(ToString::to_string)
    }
}

/// Page context over an in-memory DOM. Clones share state.
#[derive(Debug, Clone)]
pub struct MockPage {
    dom: Arc<Mutex<MockDom>>,
}

impl MockPage {
    /// Create a blank page using the config's base URL
    #[must_use]
    pub fn new(config: &LocusConfig) -> Self {
        Self {
            dom: Arc::new(Mutex::new(MockDom {
                base_url: config.base_url.clone(),
                url: "about:blank".to_string(),
                ..MockDom::default()
            })),
        }
    }

    /// Create a page already showing the given elements
    #[must_use]
    pub fn with_elements(elements: Vec<MockElement>) -> Self {
        let page = Self::new(&LocusConfig::default());
        page.with_dom(|dom| {
            dom.url = join_url(&dom.base_url, "/");
            dom.elements = elements;
        });
        page
    }

    /// Register the elements served at a path
    #[must_use]
    pub fn route(self, path: &str, elements: Vec<MockElement>) -> Self {
        self.with_dom(|dom| {
            let _ = dom.routes.insert(url_path(path), elements);
        });
        self
    }

    /// Run a closure against the DOM
    pub fn with_dom<R>(&self, f: impl FnOnce(&mut MockDom) -> R) -> R {
        f(&mut *self.lock())
    }

    /// Number of `count()` calls made through handles of this page
    #[must_use]
    pub fn probe_count(&self) -> usize {
        self.lock().probes
    }

    /// Recorded navigations and actions
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    /// Check whether an action with this prefix was recorded
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.lock().history.iter().any(|h| h.starts_with(prefix))
    }

    /// Current value of the first element matching a CSS selector
    #[must_use]
    pub fn value_of(&self, css: &str) -> Option<String> {
        self.lock().value_of(css)
    }

    fn lock(&self) -> MutexGuard<'_, MockDom> {
        self.dom.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PageContext for MockPage {
    async fn goto(&self, url: &str) -> LocusResult<()> {
        self.with_dom(|dom| dom.navigate(url));
        Ok(())
    }

    async fn current_url(&self) -> LocusResult<String> {
        Ok(self.lock().url.clone())
    }

    fn query(&self, query: Query) -> LocusResult<Handle> {
        let matcher = Matcher::compile(&query)?;
        Ok(Arc::new(MockHandle {
            dom: Arc::clone(&self.dom),
            query,
            matcher: Arc::new(matcher),
            nth: None,
        }))
    }

    async fn close(&self) -> LocusResult<()> {
        self.with_dom(|dom| dom.history.push("close".to_string()));
        Ok(())
    }
}

/// Lazy handle into a [`MockPage`]
#[derive(Debug, Clone)]
pub struct MockHandle {
    dom: Arc<Mutex<MockDom>>,
    query: Query,
    matcher: Arc<Matcher>,
    nth: Option<usize>,
}

impl MockHandle {
    fn lock(&self) -> MutexGuard<'_, MockDom> {
        self.dom.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn matching(&self, dom: &MockDom) -> Vec<usize> {
        let all = dom
            .elements
            .iter()
            .enumerate()
            .filter(|(_, e)| self.matcher.matches(e))
            .map(|(i, _)| i);
        match self.nth {
            Some(n) => all.skip(n).take(1).collect(),
            None => all.collect(),
        }
    }

    /// The single element an action applies to; `None` when nothing matches
    fn target(&self, dom: &MockDom) -> LocusResult<Option<usize>> {
        let matches = self.matching(dom);
        if matches.len() > 1 {
            return Err(LocusError::engine(format!(
                "strict mode violation: {} resolved to {} elements",
                self.describe(),
                matches.len()
            )));
        }
        Ok(matches.first().copied())
    }

    fn require(&self, dom: &MockDom) -> LocusResult<usize> {
        self.target(dom)?.ok_or_else(|| LocusError::ElementNotFound {
            selector: self.describe(),
        })
    }
}

#[async_trait]
impl ElementHandle for MockHandle {
    fn describe(&self) -> String {
        match self.nth {
            Some(n) => format!("{} >> nth={n}", self.query),
            None => self.query.to_string(),
        }
    }

    async fn count(&self) -> LocusResult<usize> {
        let mut dom = self.lock();
        dom.probes += 1;
        Ok(self.matching(&dom).len())
    }

    fn first(&self) -> Handle {
        Arc::new(Self {
            nth: Some(0),
            ..self.clone()
        })
    }

    async fn is_visible(&self) -> LocusResult<bool> {
        let dom = self.lock();
        Ok(self
            .target(&dom)?
            .is_some_and(|i| dom.elements[i].is_visible()))
    }

    async fn text_content(&self) -> LocusResult<Option<String>> {
        let dom = self.lock();
        let index = self.require(&dom)?;
        Ok(dom.elements[index].text_content().map(ToString::to_string))
    }

    async fn click(&self) -> LocusResult<()> {
        let mut dom = self.lock();
        let index = self.require(&dom)?;
        let element = &dom.elements[index];
        if !element.is_visible() {
            return Err(LocusError::NotActionable {
                selector: self.describe(),
                message: "element is not visible".to_string(),
            });
        }
        if element.is_disabled() {
            return Err(LocusError::NotActionable {
                selector: self.describe(),
                message: "element is disabled".to_string(),
            });
        }
        let handler = element.click_handler();
        dom.history.push(format!("click:{}", self.describe()));
        if let Some(handler) = handler {
            handler(&mut *dom);
        }
        Ok(())
    }

    async fn fill(&self, value: &str) -> LocusResult<()> {
        let mut dom = self.lock();
        let index = self.require(&dom)?;
        if !dom.elements[index].is_fillable() {
            return Err(LocusError::NotActionable {
                selector: self.describe(),
                message: "element is not an <input>, <textarea> or [contenteditable] element"
                    .to_string(),
            });
        }
        if dom.elements[index].is_disabled() {
            return Err(LocusError::NotActionable {
                selector: self.describe(),
                message: "element is disabled".to_string(),
            });
        }
        dom.elements[index].set_value(value);
        dom.history.push(format!("fill:{}", self.describe()));
        Ok(())
    }
}
