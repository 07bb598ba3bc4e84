//! Locus: selector fallback resolution and page objects for browser-driven
//! UI tests.
//!
//! Page objects describe elements as [`Selector`]s, ordered
//! [`SelectorList`]s (accessible strategies first, structural ones as
//! fallbacks) or [`SelectorFactory`]s built from call-time parameters. The
//! resolver turns those into engine handles by probing each strategy in
//! order and acting on the first one that matches.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  pages::LoginPage / pages::HomePage                           │
//! │        │  named SelectorMap, one BasePage                     │
//! │        ▼                                                      │
//! │  BasePage: click / fill / get_text / is_visible / handle      │
//! │        │  Target = Selector | SelectorList | SelectorFactory  │
//! │        ▼                                                      │
//! │  resolve: resolve_one ─► probe (count) ─► first match         │
//! │        │                                                      │
//! │        ▼                                                      │
//! │  PageContext / ElementHandle  (mock::MockPage, CdpPage)       │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use locus::{Selector, Target};
//!
//! let username = Selector::label("Username").or(Selector::css("input[name=\"username\"]"));
//! assert_eq!(username.len(), 2);
//!
//! let target = Target::from(username);
//! assert_eq!(target.to_string(), r#"[label="Username" | css=input[name="username"]]"#);
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

#[cfg(feature = "browser")]
#[allow(clippy::missing_errors_doc)]
mod browser;
mod config;
mod driver;
mod factory;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod fixture;
#[cfg(not(target_arch = "wasm32"))]
pub mod logging;
/// In-memory engine for testing page objects without a browser
pub mod mock;
mod page_object;
/// Concrete page objects
pub mod pages;
mod resolve;
mod result;
mod role;
mod selector;

#[cfg(feature = "browser")]
pub use browser::{CdpBrowser, CdpHandle, CdpPage};
pub use config::{
    join_url, url_path, LocusConfig, DEFAULT_ACTION_TIMEOUT_MS, DEFAULT_BASE_URL,
    DEFAULT_POLL_INTERVAL_MS, ENV_ACTION_TIMEOUT_MS, ENV_BASE_URL, ENV_HEADLESS,
};
pub use driver::{ElementHandle, Handle, PageContext, Query};
pub use factory::{normalize_space, xpath_literal, ParamValue, Params, SelectorFactory};
pub use fixture::{ContextFactory, FixtureState, PageFixture};
pub use page_object::{BasePage, PageObject, SelectorMap, UrlMatcher};
pub use resolve::{
    probe, resolve_one, resolve_target, resolve_traced, resolve_with_fallback, Attempt, Miss,
    Probe, Resolution,
};
pub use result::{LocusError, LocusResult};
pub use role::AriaRole;
pub use selector::{CustomResolver, RoleOptions, Selector, SelectorList, Target};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::mock::{MockElement, MockPage};
    pub use super::pages::{HomePage, LoginPage};
    pub use super::{
        resolve_one, resolve_target, resolve_with_fallback, AriaRole, BasePage, ContextFactory,
        ElementHandle, Handle, LocusConfig, LocusError, LocusResult, PageContext, PageFixture,
        PageObject, Params, RoleOptions, Selector, SelectorFactory, SelectorList, SelectorMap,
        Target,
    };
}
