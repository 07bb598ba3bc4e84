//! Chrome DevTools Protocol engine (`browser` feature).
//!
//! Each [`Query`] becomes a JavaScript expression yielding an array of
//! elements. Handles keep only that expression and re-evaluate it on every
//! call, so they stay lazy like the in-memory engine's handles. Actions poll
//! until the element is present, visible and enabled, up to
//! `action_timeout_ms`.

use crate::config::LocusConfig;
use crate::driver::{ElementHandle, Handle, PageContext, Query};
use crate::fixture::ContextFactory;
use crate::result::{LocusError, LocusResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Helpers shared by every generated script
const PRELUDE: &str = r#"
const __norm = (s) => (s || '').replace(/\s+/g, ' ').trim();
const __loose = (hay, needle) => __norm(hay).toLowerCase().includes(__norm(needle).toLowerCase());
const __all = () => Array.from(document.querySelectorAll('body *'));
const __visible = (el) => {
  const r = el.getBoundingClientRect();
  const s = getComputedStyle(el);
  return r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none';
};
const __implicit = {
  article: 'article', aside: 'complementary', button: 'button', summary: 'button',
  dialog: 'dialog', footer: 'contentinfo', form: 'form', h1: 'heading', h2: 'heading',
  h3: 'heading', h4: 'heading', h5: 'heading', h6: 'heading', header: 'banner',
  hr: 'separator', img: 'img', li: 'listitem', main: 'main', nav: 'navigation',
  ol: 'list', ul: 'list', option: 'option', p: 'paragraph', progress: 'progressbar',
  select: 'combobox', table: 'table', tbody: 'rowgroup', thead: 'rowgroup',
  tfoot: 'rowgroup', td: 'cell', textarea: 'textbox', th: 'columnheader', tr: 'row',
};
const __inputRoles = {
  button: 'button', submit: 'button', reset: 'button', image: 'button',
  checkbox: 'checkbox', radio: 'radio', range: 'slider', number: 'spinbutton',
  search: 'searchbox', hidden: null,
};
const __role = (el) => {
  const explicit = el.getAttribute('role');
  if (explicit) return explicit.trim().split(/\s+/)[0].toLowerCase();
  const tag = el.tagName.toLowerCase();
  if (tag === 'a' || tag === 'area') return el.hasAttribute('href') ? 'link' : null;
  if (tag === 'input') {
    const type = (el.getAttribute('type') || 'text').toLowerCase();
    return type in __inputRoles ? __inputRoles[type] : 'textbox';
  }
  return __implicit[tag] || null;
};
const __labels = (el) => {
  const out = [];
  if (el.getAttribute('aria-label')) out.push(el.getAttribute('aria-label'));
  const by = el.getAttribute('aria-labelledby');
  if (by) by.split(/\s+/).forEach((id) => {
    const l = document.getElementById(id);
    if (l) out.push(l.textContent);
  });
  if (el.labels) Array.from(el.labels).forEach((l) => out.push(l.textContent));
  return out;
};
const __name = (el) => {
  const type = (el.getAttribute('type') || '').toLowerCase();
  const inputButton = el.tagName === 'INPUT' && ['button', 'submit', 'reset'].includes(type);
  const candidates = [
    ...__labels(el),
    inputButton ? el.value : null,
    el.textContent,
    el.getAttribute('alt'),
    el.getAttribute('title'),
    el.getAttribute('placeholder'),
  ];
  return candidates.map(__norm).find((n) => n) || '';
};
const __flag = (el, aria, native) => el.getAttribute(aria) === 'true' || el.hasAttribute(native);
const __level = (el) => {
  const l = parseInt(el.getAttribute('aria-level') || '', 10);
  if (!Number.isNaN(l)) return l;
  const m = /^h([1-6])$/i.exec(el.tagName);
  return m ? parseInt(m[1], 10) : null;
};
const __textMatch = (el, text, exact) => exact
  ? __norm(el.textContent) === __norm(text)
  : __loose(el.textContent, text);
"#;

/// Role query filter; takes the role name and the serialized `RoleOptions`
const ROLE_FILTER: &str = r#"
const __byRole = (role, o) => __all().filter((el) => {
  if (__role(el) !== role || !__visible(el)) return false;
  if (o.name !== null && o.name !== undefined) {
    const name = __name(el);
    if (o.exact ? name !== __norm(o.name) : !__loose(name, o.name)) return false;
  }
  const states = [
    [o.checked, __flag(el, 'aria-checked', 'checked')],
    [o.selected, __flag(el, 'aria-selected', 'selected')],
    [o.pressed, el.getAttribute('aria-pressed') === 'true'],
    [o.expanded, el.getAttribute('aria-expanded') === 'true'],
  ];
  if (states.some(([want, have]) => want !== null && want !== undefined && want !== have)) return false;
  return o.level === null || o.level === undefined || __level(el) === o.level;
});
"#;

fn js_string(value: &str) -> LocusResult<String> {
    Ok(serde_json::to_string(value)?)
}

/// JavaScript expression evaluating to the matching elements, in document order
fn elements_expr(query: &Query) -> LocusResult<String> {
    Ok(match query {
        Query::Css { selector } => {
            format!("Array.from(document.querySelectorAll({}))", js_string(selector)?)
        }
        Query::XPath { path } => format!(
            "(() => {{ const r = document.evaluate({}, document, null, \
             XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); \
             return Array.from({{ length: r.snapshotLength }}, (_, i) => r.snapshotItem(i)); }})()",
            js_string(path)?
        ),
        Query::Role { role, options } => format!(
            "__byRole({}, {})",
            js_string(role.as_str())?,
            serde_json::to_string(options)?
        ),
        Query::Label { text } => format!(
            "__all().filter((el) => __labels(el).some((l) => __loose(l, {})))",
            js_string(text)?
        ),
        Query::Placeholder { text } => format!(
            "__all().filter((el) => el.hasAttribute('placeholder') && __loose(el.getAttribute('placeholder'), {}))",
            js_string(text)?
        ),
        // Innermost match only, the way Playwright's text engine picks elements
        Query::Text { text, exact } => format!(
            "__all().filter((el) => __textMatch(el, {t}, {exact}) && \
             !Array.from(el.children).some((c) => __textMatch(c, {t}, {exact})))",
            t = js_string(text)?
        ),
        Query::TestId { id } => format!(
            "__all().filter((el) => el.getAttribute('data-testid') === {})",
            js_string(id)?
        ),
    })
}

/// Wrap an element expression and an action body into one evaluable script
fn script(elements: &str, nth: Option<usize>, body: &str) -> String {
    let narrow = nth.map_or_else(String::new, |n| format!(".slice({n}, {})", n + 1));
    format!("(() => {{ {PRELUDE} {ROLE_FILTER} const els = ({elements}){narrow}; {body} }})()")
}

const COUNT_BODY: &str = "return els.length;";

const SINGLE: &str = "if (els.length > 1) return { status: 'strict', count: els.length }; \
     const el = els[0]; \
     if (!el) return { status: 'missing' };";

#[derive(Debug, Deserialize)]
struct Outcome {
    status: String,
    #[serde(default)]
    count: Option<usize>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    visible: Option<bool>,
}

/// Launched Chromium instance; each context is a fresh page
#[derive(Debug)]
pub struct CdpBrowser {
    config: Arc<LocusConfig>,
    inner: Arc<Mutex<Browser>>,
    handler: tokio::task::JoinHandle<()>,
}

impl CdpBrowser {
    /// Launch Chromium
    ///
    /// # Errors
    ///
    /// Returns error if the browser cannot be configured or started.
    pub async fn launch(config: LocusConfig) -> LocusResult<Self> {
        let mut builder = BrowserConfig::builder();
        if !config.headless {
            builder = builder.with_head();
        }
        let cdp_config = builder
            .build()
            .map_err(|message| LocusError::BrowserLaunchError { message })?;

        let (browser, mut handler) = Browser::launch(cdp_config).await.map_err(|e| {
            LocusError::BrowserLaunchError {
                message: e.to_string(),
            }
        })?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        tracing::debug!(headless = config.headless, "browser launched");
        Ok(Self {
            config: Arc::new(config),
            inner: Arc::new(Mutex::new(browser)),
            handler,
        })
    }

    /// Open a blank page
    ///
    /// # Errors
    ///
    /// Returns error if the page cannot be created.
    pub async fn new_page(&self) -> LocusResult<CdpPage> {
        let browser = self.inner.lock().await;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| LocusError::engine(e.to_string()))?;
        Ok(CdpPage {
            page: Arc::new(Mutex::new(page)),
            config: Arc::clone(&self.config),
        })
    }

    /// Shut the browser down
    ///
    /// # Errors
    ///
    /// Returns error if the browser does not close cleanly.
    pub async fn close(self) -> LocusResult<()> {
        let mut browser = self.inner.lock().await;
        let _ = browser
            .close()
            .await
            .map_err(|e| LocusError::engine(e.to_string()))?;
        self.handler.abort();
        Ok(())
    }
}

#[async_trait]
impl ContextFactory for CdpBrowser {
    async fn new_context(&self) -> LocusResult<Arc<dyn PageContext>> {
        Ok(Arc::new(self.new_page().await?))
    }
}

/// One browser tab
#[derive(Debug, Clone)]
pub struct CdpPage {
    page: Arc<Mutex<Page>>,
    config: Arc<LocusConfig>,
}

#[async_trait]
impl PageContext for CdpPage {
    async fn goto(&self, url: &str) -> LocusResult<()> {
        let url = self.config.resolve_url(url);
        let page = self.page.lock().await;
        let _ = page
            .goto(url.as_str())
            .await
            .map_err(|e| LocusError::NavigationError {
                url: url.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn current_url(&self) -> LocusResult<String> {
        let page = self.page.lock().await;
        let url = page.url().await.map_err(|e| LocusError::engine(e.to_string()))?;
        Ok(url.unwrap_or_else(|| "about:blank".to_string()))
    }

    fn query(&self, query: Query) -> LocusResult<Handle> {
        let elements = elements_expr(&query)?;
        Ok(Arc::new(CdpHandle {
            page: Arc::clone(&self.page),
            config: Arc::clone(&self.config),
            query,
            elements: Arc::new(elements),
            nth: None,
        }))
    }

    async fn close(&self) -> LocusResult<()> {
        let page = self.page.lock().await.clone();
        page.close().await.map_err(|e| LocusError::engine(e.to_string()))
    }
}

/// Lazy handle into a [`CdpPage`]
#[derive(Debug, Clone)]
pub struct CdpHandle {
    page: Arc<Mutex<Page>>,
    config: Arc<LocusConfig>,
    query: Query,
    elements: Arc<String>,
    nth: Option<usize>,
}

impl CdpHandle {
    async fn eval<T: DeserializeOwned>(&self, body: &str) -> LocusResult<T> {
        let script = script(&self.elements, self.nth, body);
        let page = self.page.lock().await;
        let result = page
            .evaluate(script.as_str())
            .await
            .map_err(|e| LocusError::engine(format!("{}: {e}", self.describe())))?;
        Ok(result.into_value()?)
    }

    /// Run an action script until it stops reporting a transient state
    async fn act(&self, body: &str) -> LocusResult<Outcome> {
        let timeout = Duration::from_millis(self.config.action_timeout_ms);
        let poll = Duration::from_millis(self.config.poll_interval_ms);
        let deadline = Instant::now() + timeout;
        let body = format!("{SINGLE} {body}");

        loop {
            let outcome: Outcome = self.eval(&body).await?;
            match outcome.status.as_str() {
                "strict" => {
                    return Err(LocusError::engine(format!(
                        "strict mode violation: {} resolved to {} elements",
                        self.describe(),
                        outcome.count.unwrap_or_default()
                    )))
                }
                "not_fillable" => {
                    return Err(LocusError::NotActionable {
                        selector: self.describe(),
                        message: "element is not an <input>, <textarea> or [contenteditable] element"
                            .to_string(),
                    })
                }
                "missing" | "hidden" | "disabled" if Instant::now() < deadline => {
                    tokio::time::sleep(poll).await;
                }
                "missing" | "hidden" | "disabled" => {
                    return Err(LocusError::Timeout {
                        ms: self.config.action_timeout_ms,
                        what: format!("{} ({})", self.describe(), outcome.status),
                    })
                }
                _ => return Ok(outcome),
            }
        }
    }
}

#[async_trait]
impl ElementHandle for CdpHandle {
    fn describe(&self) -> String {
        match self.nth {
            Some(n) => format!("{} >> nth={n}", self.query),
            None => self.query.to_string(),
        }
    }

    async fn count(&self) -> LocusResult<usize> {
        self.eval(COUNT_BODY).await
    }

    fn first(&self) -> Handle {
        Arc::new(Self {
            nth: Some(0),
            ..self.clone()
        })
    }

    async fn is_visible(&self) -> LocusResult<bool> {
        let body = format!("{SINGLE} return {{ status: 'ok', visible: __visible(el) }};");
        let outcome: Outcome = self.eval(&body).await?;
        match outcome.status.as_str() {
            "missing" => Ok(false),
            "strict" => Err(LocusError::engine(format!(
                "strict mode violation: {} resolved to {} elements",
                self.describe(),
                outcome.count.unwrap_or_default()
            ))),
            _ => Ok(outcome.visible.unwrap_or(false)),
        }
    }

    async fn text_content(&self) -> LocusResult<Option<String>> {
        let outcome = self
            .act("return { status: 'ok', text: el.textContent };")
            .await?;
        Ok(outcome.text)
    }

    async fn click(&self) -> LocusResult<()> {
        let _ = self
            .act(
                "if (!__visible(el)) return { status: 'hidden' }; \
                 if (el.disabled || el.getAttribute('aria-disabled') === 'true') return { status: 'disabled' }; \
                 el.scrollIntoView({ block: 'center' }); \
                 el.click(); \
                 return { status: 'ok' };",
            )
            .await?;
        Ok(())
    }

    async fn fill(&self, value: &str) -> LocusResult<()> {
        let body = format!(
            "if (!__visible(el)) return {{ status: 'hidden' }}; \
             if (el.disabled) return {{ status: 'disabled' }}; \
             const v = {}; \
             if (el.isContentEditable) {{ el.focus(); el.textContent = v; }} \
             else if (el instanceof HTMLInputElement || el instanceof HTMLTextAreaElement) {{ \
               const proto = el instanceof HTMLTextAreaElement ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype; \
               el.focus(); \
               Object.getOwnPropertyDescriptor(proto, 'value').set.call(el, v); \
             }} else return {{ status: 'not_fillable' }}; \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
             return {{ status: 'ok' }};",
            js_string(value)?
        );
        let _ = self.act(&body).await?;
        Ok(())
    }
}
