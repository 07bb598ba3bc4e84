//! Scripted login app shared by the integration tests.

#![allow(dead_code)]

use locus::mock::{MockElement, MockPage};
use locus::{LocusConfig, LocusResult, PageContext, PageFixture};
use std::sync::Arc;

pub const USER: &str = "alice";
pub const PASSWORD: &str = "correct horse";

/// `/login` renders a form without `<label>`s, so label strategies miss and
/// the structural fallbacks have to carry the flow
pub fn login_form() -> Vec<MockElement> {
    vec![
        MockElement::new("h1").text("Sign in to Locus"),
        MockElement::new("input").attr("name", "username").attr("type", "text"),
        MockElement::new("input")
            .attr("name", "password")
            .attr("type", "password"),
        MockElement::new("button")
            .attr("type", "submit")
            .text("Sign in")
            .on_click(|dom| {
                let ok = dom.value_of("input[name=\"username\"]").as_deref() == Some(USER)
                    && dom.value_of("input[name=\"password\"]").as_deref() == Some(PASSWORD);
                if ok {
                    dom.navigate("/home");
                } else if let Some(banner) = dom.find_mut("[data-testid=\"login-error\"]") {
                    banner.set_visible(true);
                }
            }),
        MockElement::new("div")
            .attr("data-testid", "login-error")
            .attr("role", "alert")
            .text("\n  Invalid username or password\n")
            .hidden(),
    ]
}

pub fn home() -> Vec<MockElement> {
    vec![
        MockElement::new("h1").text("  Welcome, alice  "),
        MockElement::new("a")
            .attr("href", "/login")
            .text("Log out")
            .on_click(|dom| dom.navigate("/login")),
        MockElement::new("tr").text("alice admin").within("table"),
        MockElement::new("tr").text("bob viewer").within("table"),
    ]
}

pub fn app(config: &LocusConfig) -> MockPage {
    MockPage::new(config)
        .route("/login", login_form())
        .route("/home", home())
}

pub fn fixture() -> PageFixture<impl Fn() -> LocusResult<Arc<dyn PageContext>> + Send + Sync> {
    PageFixture::new(|| -> LocusResult<Arc<dyn PageContext>> {
        Ok(Arc::new(app(&LocusConfig::default())))
    })
}
