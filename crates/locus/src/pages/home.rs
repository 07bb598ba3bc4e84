//! Home page shown after a successful login.

use crate::driver::{Handle, PageContext};
use crate::factory::{Params, SelectorFactory};
use crate::page_object::{BasePage, PageObject, SelectorMap};
use crate::result::LocusResult;
use crate::selector::{RoleOptions, Selector};
use std::sync::Arc;

/// Page heading
pub const HEADER: &str = "header";
/// Log-out control
pub const LOGOUT: &str = "logout";
/// Users-table row, parameterized by `text`
pub const USER_ROW: &str = "user_row";

/// The `/home` page
#[derive(Debug, Clone)]
pub struct HomePage {
    base: BasePage,
    selectors: SelectorMap,
}

impl HomePage {
    /// Navigate to the home page
    ///
    /// # Errors
    ///
    /// Returns error if navigation fails.
    pub async fn open(&self) -> LocusResult<()> {
        self.base.goto(self.url_pattern()).await
    }

    /// Heading text, trimmed
    ///
    /// # Errors
    ///
    /// Returns error if the heading cannot be read.
    pub async fn header_text(&self) -> LocusResult<Option<String>> {
        self.base.get_text(self.target(HEADER)?, None).await
    }

    /// Click the log-out control
    ///
    /// # Errors
    ///
    /// Returns the engine's error when the click fails.
    pub async fn logout(&self) -> LocusResult<()> {
        self.base.click(self.target(LOGOUT)?, None).await
    }

    /// Handle for the users-table row containing `text`
    ///
    /// # Errors
    ///
    /// Returns error if the row query cannot be constructed.
    pub async fn user_row(&self, text: &str) -> LocusResult<Handle> {
        let params = Params::new().with("text", text);
        self.base.handle(self.target(USER_ROW)?, Some(&params)).await
    }

    /// Whether any users-table row contains `text`
    ///
    /// # Errors
    ///
    /// Propagates engine errors raised while counting.
    pub async fn has_user(&self, text: &str) -> LocusResult<bool> {
        Ok(self.user_row(text).await?.count().await? > 0)
    }
}

impl PageObject for HomePage {
    fn from_context(ctx: Arc<dyn PageContext>) -> Self {
        let selectors = SelectorMap::new("HomePage")
            .with(
                HEADER,
                Selector::role_with("heading", RoleOptions::default().level(1))
                    .or(Selector::css("h1")),
            )
            .with(
                LOGOUT,
                Selector::role_with_name("button", "Log out")
                    .or(Selector::role_with_name("link", "Log out"))
                    .or(Selector::test_id("logout")),
            )
            .with(
                USER_ROW,
                SelectorFactory::xpath_containing_text("//table//tr", "text"),
            );
        Self {
            base: BasePage::new(ctx),
            selectors,
        }
    }

    fn base(&self) -> &BasePage {
        &self.base
    }

    fn selectors(&self) -> &SelectorMap {
        &self.selectors
    }

    fn url_pattern(&self) -> &str {
        "/home"
    }
}
