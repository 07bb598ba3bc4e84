//! Automation engine seam.
//!
//! Locus never queries a DOM itself. Everything it needs from a browser goes
//! through two traits:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  PageContext (one per test)                                  │
//! │    goto / current_url / query(Query) -> Handle               │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ElementHandle (lazy, re-evaluated on every call)            │
//! │    count / first / is_visible / text_content / click / fill  │
//! └──────────────────────────────────────────────────────────────┘
//!        ▲                              ▲
//!   mock::MockPage                browser::CdpPage
//!   (in-memory DOM)               (chromiumoxide, `browser` feature)
//! ```
//!
//! Handles are lazy: building one never touches the page, so constructing a
//! handle for a strategy that matches nothing is cheap and always succeeds
//! unless the query itself is malformed.

use crate::result::LocusResult;
use crate::role::AriaRole;
use crate::selector::RoleOptions;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Shared, type-erased element handle
pub type Handle = Arc<dyn ElementHandle>;

/// Engine-level query, one per matching strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Query {
    /// CSS / attribute query
    Css {
        /// Selector text
        selector: String,
    },
    /// XPath query
    XPath {
        /// Path expression
        path: String,
    },
    /// Accessibility-tree role query
    Role {
        /// Parsed role
        role: AriaRole,
        /// Name and state qualifiers
        options: RoleOptions,
    },
    /// Control associated with a label
    Label {
        /// Label text
        text: String,
    },
    /// Input by placeholder hint
    Placeholder {
        /// Placeholder text
        text: String,
    },
    /// Element by rendered text
    Text {
        /// Text to match
        text: String,
        /// Whole-string, case-sensitive match
        exact: bool,
    },
    /// Element carrying `data-testid`
    TestId {
        /// Test id
        id: String,
    },
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css { selector } => write!(f, "css={selector}"),
            Self::XPath { path } => write!(f, "xpath={path}"),
            Self::Role { role, options } => {
                write!(f, "role={role}")?;
                if let Some(name) = &options.name {
                    write!(f, "[name={name:?}]")?;
                }
                Ok(())
            }
            Self::Label { text } => write!(f, "label={text:?}"),
            Self::Placeholder { text } => write!(f, "placeholder={text:?}"),
            Self::Text { text, exact } => {
                if *exact {
                    write!(f, "text={text:?}s")
                } else {
                    write!(f, "text={text:?}i")
                }
            }
            Self::TestId { id } => write!(f, "testid={id:?}"),
        }
    }
}

/// A page / browsing context owned by one test.
///
/// Engines implement [`query`](PageContext::query); the per-strategy
/// primitives are provided on top of it so resolution code reads the way a
/// Playwright test does.
#[async_trait]
pub trait PageContext: Send + Sync + fmt::Debug {
    /// Navigate to a URL or to a path relative to the configured base URL
    async fn goto(&self, url: &str) -> LocusResult<()>;

    /// Current page URL
    async fn current_url(&self) -> LocusResult<String>;

    /// Build a lazy handle for a query
    ///
    /// # Errors
    ///
    /// Returns error only when the query cannot be constructed at all.
    fn query(&self, query: Query) -> LocusResult<Handle>;

    /// Release engine resources held by this context
    async fn close(&self) -> LocusResult<()> {
        Ok(())
    }

    /// CSS / attribute query
    fn locator(&self, selector: &str) -> LocusResult<Handle> {
        self.query(Query::Css {
            selector: selector.to_string(),
        })
    }

    /// XPath query
    fn locator_xpath(&self, path: &str) -> LocusResult<Handle> {
        self.query(Query::XPath {
            path: path.to_string(),
        })
    }

    /// Role query with name/state qualifiers
    fn get_by_role(&self, role: AriaRole, options: &RoleOptions) -> LocusResult<Handle> {
        self.query(Query::Role {
            role,
            options: options.clone(),
        })
    }

    /// Labelled-control query
    fn get_by_label(&self, text: &str) -> LocusResult<Handle> {
        self.query(Query::Label {
            text: text.to_string(),
        })
    }

    /// Placeholder query
    fn get_by_placeholder(&self, text: &str) -> LocusResult<Handle> {
        self.query(Query::Placeholder {
            text: text.to_string(),
        })
    }

    /// Visible-text query
    fn get_by_text(&self, text: &str, exact: bool) -> LocusResult<Handle> {
        self.query(Query::Text {
            text: text.to_string(),
            exact,
        })
    }

    /// Test-id query
    fn get_by_test_id(&self, id: &str) -> LocusResult<Handle> {
        self.query(Query::TestId { id: id.to_string() })
    }
}

/// A resolved, queryable reference to zero or more elements
#[async_trait]
pub trait ElementHandle: Send + Sync + fmt::Debug {
    /// Human-readable description used in engine errors
    fn describe(&self) -> String;

    /// Number of elements currently matching
    async fn count(&self) -> LocusResult<usize>;

    /// Narrow to the first matching element
    fn first(&self) -> Handle;

    /// Whether the element is present and visible right now
    async fn is_visible(&self) -> LocusResult<bool>;

    /// Raw text content, `None` when the element has none
    async fn text_content(&self) -> LocusResult<Option<String>>;

    /// Click the element
    async fn click(&self) -> LocusResult<()>;

    /// Replace the element's value
    async fn fill(&self, value: &str) -> LocusResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_display() {
        let q = Query::Css {
            selector: "button.primary".to_string(),
        };
        assert_eq!(q.to_string(), "css=button.primary");

        let q = Query::Role {
            role: AriaRole::Button,
            options: RoleOptions::named("Sign in"),
        };
        assert_eq!(q.to_string(), "role=button[name=\"Sign in\"]");

        let q = Query::Text {
            text: "Welcome".to_string(),
            exact: true,
        };
        assert_eq!(q.to_string(), "text=\"Welcome\"s");
    }

    #[test]
    fn test_query_serializes_with_strategy_tag() {
        let q = Query::TestId {
            id: "login-error".to_string(),
        };
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["strategy"], "test_id");
        assert_eq!(json["id"], "login-error");
    }
}
