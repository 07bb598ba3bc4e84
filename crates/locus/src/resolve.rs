//! Resolution engine: selectors in, handles out.
//!
//! ```text
//!   SelectorList [S0, S1, S2]
//!        │
//!        ▼
//!   resolve_one(S0) ──► probe: count() ──► 0 matches ──┐
//!   resolve_one(S1) ──► probe: count() ──► 2 matches ──┼──► S1.first()
//!   (S2 never built)                                   │
//!                                                      │
//!   all missed ───────────────────────────────────────►└──► S0 (unprobed)
//! ```
//!
//! Resolution itself never reports "nothing matched". On a total miss it
//! hands back the preferred strategy's handle and lets the action that uses
//! it fail with the engine's own not-found error.

use crate::driver::{Handle, PageContext};
use crate::factory::Params;
use crate::result::{LocusError, LocusResult};
use crate::role::AriaRole;
use crate::selector::{Selector, SelectorList, Target};

/// Map one selector to its engine query. No probing, no fallback.
///
/// # Errors
///
/// Returns error if the query cannot be constructed (unknown role, or a
/// query string the engine rejects outright).
pub fn resolve_one(ctx: &dyn PageContext, selector: &Selector) -> LocusResult<Handle> {
    match selector {
        Selector::Css(css) => ctx.locator(css),
        Selector::XPath(path) => ctx.locator_xpath(path),
        Selector::Role { role, options } => {
            let role: AriaRole = role.parse()?;
            ctx.get_by_role(role, options)
        }
        Selector::Label(text) => ctx.get_by_label(text),
        Selector::Placeholder(text) => ctx.get_by_placeholder(text),
        Selector::Text { text, exact } => ctx.get_by_text(text, *exact),
        Selector::TestId(id) => ctx.get_by_test_id(id),
        Selector::Custom(custom) => custom.resolve(ctx),
    }
}

/// Why a candidate did not match
#[derive(Debug)]
pub enum Miss {
    /// The query ran and matched nothing
    NoMatches,
    /// The handle could not be built
    Construction(LocusError),
    /// The handle was built but counting failed
    Probe(LocusError),
}

/// Outcome of probing one candidate
#[derive(Debug)]
pub enum Probe {
    /// At least one element matched; `handle` is already narrowed to the first
    Matched {
        /// Handle for the first match
        handle: Handle,
        /// Matches at probe time
        count: usize,
    },
    /// Nothing usable
    Missed(Miss),
}

impl Probe {
    /// Whether the probe found an element
    #[must_use]
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }
}

/// Build a candidate's handle and count its matches
pub async fn probe(ctx: &dyn PageContext, selector: &Selector) -> Probe {
    let handle = match resolve_one(ctx, selector) {
        Ok(handle) => handle,
        Err(e) => return Probe::Missed(Miss::Construction(e)),
    };
    match handle.count().await {
        Ok(0) => Probe::Missed(Miss::NoMatches),
        Ok(count) => Probe::Matched {
            handle: handle.first(),
            count,
        },
        Err(e) => Probe::Missed(Miss::Probe(e)),
    }
}

/// Record of one candidate attempt
#[derive(Debug)]
pub struct Attempt {
    /// Position in the list
    pub index: usize,
    /// Selector description
    pub selector: String,
    /// Match count when matched, `None` otherwise
    pub count: Option<usize>,
    /// Error text when the candidate failed to build or probe
    pub error: Option<String>,
}

/// Result of fallback resolution with its attempt log
#[derive(Debug)]
pub struct Resolution {
    /// Handle to act on
    pub handle: Handle,
    /// Index of the strategy that matched; `None` on a total miss
    pub matched: Option<usize>,
    /// One entry per probed candidate, in order
    pub attempts: Vec<Attempt>,
}

impl Resolution {
    /// Whether any strategy matched
    #[must_use]
    pub const fn is_match(&self) -> bool {
        self.matched.is_some()
    }
}

/// Probe candidates in order and report which one won.
///
/// # Errors
///
/// Returns error only when nothing matched and the preferred strategy
/// cannot be constructed either.
pub async fn resolve_traced(ctx: &dyn PageContext, list: &SelectorList) -> LocusResult<Resolution> {
    let mut attempts = Vec::with_capacity(list.len());

    for (index, selector) in list.iter().enumerate() {
        match probe(ctx, selector).await {
            Probe::Matched { handle, count } => {
                tracing::debug!(index, %selector, count, "selector strategy matched");
                attempts.push(Attempt {
                    index,
                    selector: selector.to_string(),
                    count: Some(count),
                    error: None,
                });
                return Ok(Resolution {
                    handle,
                    matched: Some(index),
                    attempts,
                });
            }
            Probe::Missed(miss) => {
                let error = match miss {
                    Miss::NoMatches => None,
                    Miss::Construction(e) | Miss::Probe(e) => Some(e.to_string()),
                };
                tracing::debug!(index, %selector, error = ?error, "selector strategy missed");
                attempts.push(Attempt {
                    index,
                    selector: selector.to_string(),
                    count: None,
                    error,
                });
            }
        }
    }

    tracing::warn!(
        strategies = list.len(),
        preferred = %list.first(),
        "no selector strategy matched, using preferred strategy"
    );
    let handle = resolve_one(ctx, list.first())?;
    Ok(Resolution {
        handle,
        matched: None,
        attempts,
    })
}

/// Resolve an ordered list to a single handle via fallback probing.
///
/// # Errors
///
/// See [`resolve_traced`].
pub async fn resolve_with_fallback(ctx: &dyn PageContext, list: &SelectorList) -> LocusResult<Handle> {
    resolve_traced(ctx, list).await.map(|r| r.handle)
}

/// Resolve whatever a page object handed over.
///
/// # Errors
///
/// Propagates construction errors for single selectors and factories;
/// lists follow [`resolve_with_fallback`].
pub async fn resolve_target(
    ctx: &dyn PageContext,
    target: &Target,
    params: Option<&Params>,
) -> LocusResult<Handle> {
    match target {
        Target::Selector(selector) => resolve_one(ctx, selector),
        Target::List(list) => resolve_with_fallback(ctx, list).await,
        Target::Factory(factory) => {
            let selector = factory.build(params);
            tracing::trace!(factory = factory.name(), %selector, "factory built selector");
            resolve_one(ctx, &selector)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::SelectorFactory;
    use crate::mock::{MockElement, MockPage};
    use crate::selector::RoleOptions;

    fn login_form() -> MockPage {
        MockPage::with_elements(vec![
            MockElement::new("input")
                .attr("name", "username")
                .attr("type", "text"),
            MockElement::new("input")
                .attr("name", "password")
                .attr("type", "password"),
            MockElement::new("button")
                .attr("type", "submit")
                .text("Sign in"),
        ])
    }

    mod resolve_one_tests {
        use super::*;

        #[tokio::test]
        async fn test_each_variant_maps_to_its_query() {
            let page = MockPage::with_elements(vec![
                MockElement::new("input")
                    .attr("id", "user")
                    .attr("placeholder", "Your email")
                    .label("Email"),
                MockElement::new("h1").text("Welcome, Ana"),
                MockElement::new("div").attr("data-testid", "banner"),
            ]);

            let cases = vec![
                (Selector::css("#user"), "css=#user"),
                (Selector::xpath("//h1"), "xpath=//h1"),
                (Selector::role("heading"), "role=heading"),
                (Selector::label("Email"), "label=\"Email\""),
                (Selector::placeholder("Your email"), "placeholder=\"Your email\""),
                (Selector::text("Welcome"), "text=\"Welcome\"i"),
                (Selector::test_id("banner"), "testid=\"banner\""),
            ];
            for (selector, description) in cases {
                let handle = resolve_one(&page, &selector).unwrap();
                assert_eq!(handle.describe(), description);
                assert_eq!(handle.count().await.unwrap(), 1, "{description}");
            }
        }

        #[test]
        fn test_unknown_role_fails_immediately() {
            let page = login_form();
            let err = resolve_one(&page, &Selector::role("buton")).unwrap_err();
            assert!(matches!(err, LocusError::UnsupportedRole { .. }));
            assert_eq!(page.probe_count(), 0);
        }

        #[tokio::test]
        async fn test_custom_resolver_receives_context() {
            let page = login_form();
            let selector = Selector::custom("last input", |ctx| {
                ctx.locator("input[name=\"password\"]")
            });
            let handle = resolve_one(&page, &selector).unwrap();
            assert_eq!(handle.count().await.unwrap(), 1);
        }
    }

    mod fallback_tests {
        use super::*;

        #[tokio::test]
        async fn test_second_strategy_wins() {
            let page = login_form();
            let list = Selector::label("Username").or(Selector::css("input[name=\"username\"]"));

            let resolution = resolve_traced(&page, &list).await.unwrap();
            assert_eq!(resolution.matched, Some(1));
            assert_eq!(resolution.attempts.len(), 2);
            assert_eq!(resolution.attempts[0].count, None);
            assert_eq!(resolution.attempts[1].count, Some(1));
            assert_eq!(page.probe_count(), 2);
        }

        #[tokio::test]
        async fn test_short_circuit_after_match() {
            let page = login_form();
            let list = Selector::css("button")
                .or(Selector::role("button"))
                .or(Selector::text("Sign in"));

            let resolution = resolve_traced(&page, &list).await.unwrap();
            assert_eq!(resolution.matched, Some(0));
            assert_eq!(resolution.attempts.len(), 1);
            assert_eq!(page.probe_count(), 1);
        }

        #[tokio::test]
        async fn test_total_miss_returns_preferred_handle() {
            let page = login_form();
            let list = Selector::label("Nope").or(Selector::css("#missing"));

            let resolution = resolve_traced(&page, &list).await.unwrap();
            assert!(!resolution.is_match());
            assert_eq!(resolution.handle.describe(), "label=\"Nope\"");

            let err = resolution.handle.click().await.unwrap_err();
            assert!(err.is_not_found());
        }

        #[tokio::test]
        async fn test_broken_candidates_are_skipped() {
            let page = login_form();
            let list = Selector::role("buton")
                .or(Selector::css("input[name="))
                .or(Selector::role_with("button", RoleOptions::named("Sign in")));

            let resolution = resolve_traced(&page, &list).await.unwrap();
            assert_eq!(resolution.matched, Some(2));
            assert!(resolution.attempts[0].error.is_some());
            assert!(resolution.attempts[1].error.is_some());
        }

        #[tokio::test]
        async fn test_total_miss_with_unbuildable_preferred_fails_loudly() {
            let page = login_form();
            let list = Selector::role("buton").or(Selector::css("#missing"));
            let err = resolve_with_fallback(&page, &list).await.unwrap_err();
            assert!(matches!(err, LocusError::UnsupportedRole { .. }));
        }

        #[tokio::test]
        async fn test_multiple_matches_narrow_to_first() {
            let page = login_form();
            let list = SelectorList::new(Selector::css("input"));
            let handle = resolve_with_fallback(&page, &list).await.unwrap();
            assert_eq!(handle.count().await.unwrap(), 1);
            handle.fill("first").await.unwrap();
            assert_eq!(page.value_of("input[name=\"username\"]").as_deref(), Some("first"));
        }

        #[tokio::test]
        async fn test_idempotent_on_unchanged_page() {
            let page = login_form();
            let list = Selector::label("Username").or(Selector::css("input[name=\"username\"]"));
            let a = resolve_with_fallback(&page, &list).await.unwrap();
            let b = resolve_with_fallback(&page, &list).await.unwrap();
            assert_eq!(a.describe(), b.describe());
            assert_eq!(a.count().await.unwrap(), b.count().await.unwrap());
        }
    }

    mod target_tests {
        use super::*;

        #[tokio::test]
        async fn test_single_selector_is_not_probed() {
            let page = login_form();
            let handle = resolve_target(&page, &Target::from(Selector::css("#missing")), None)
                .await
                .unwrap();
            assert_eq!(page.probe_count(), 0);
            assert_eq!(handle.count().await.unwrap(), 0);
        }

        #[tokio::test]
        async fn test_factory_uses_params() {
            let page = login_form();
            let target = Target::from(SelectorFactory::text_equals("label"));
            let handle = resolve_target(&page, &target, Some(&Params::new().with("label", "Sign in")))
                .await
                .unwrap();
            assert_eq!(handle.count().await.unwrap(), 1);
        }
    }
}
