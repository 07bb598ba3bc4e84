//! Login page.

use crate::driver::PageContext;
use crate::page_object::{BasePage, PageObject, SelectorMap};
use crate::result::LocusResult;
use crate::selector::Selector;
use std::sync::Arc;

/// Username field
pub const USERNAME: &str = "username";
/// Password field
pub const PASSWORD: &str = "password";
/// Submit button
pub const SUBMIT: &str = "submit";
/// Error banner shown after a failed login
pub const ERROR: &str = "error";

/// The `/login` page
#[derive(Debug, Clone)]
pub struct LoginPage {
    base: BasePage,
    selectors: SelectorMap,
}

impl LoginPage {
    /// Navigate to the login page
    ///
    /// # Errors
    ///
    /// Returns error if navigation fails.
    pub async fn open(&self) -> LocusResult<()> {
        self.base.goto(self.url_pattern()).await
    }

    /// Fill both credentials and submit
    ///
    /// # Errors
    ///
    /// Returns the engine's error for the first action that fails.
    pub async fn login(&self, username: &str, password: &str) -> LocusResult<()> {
        tracing::debug!(username, "logging in");
        self.base.fill(self.target(USERNAME)?, username, None).await?;
        self.base.fill(self.target(PASSWORD)?, password, None).await?;
        self.base.click(self.target(SUBMIT)?, None).await
    }

    /// Whether the error banner is showing
    ///
    /// # Errors
    ///
    /// Propagates engine errors raised while checking.
    pub async fn error_visible(&self) -> LocusResult<bool> {
        self.base.is_visible(self.target(ERROR)?, None).await
    }

    /// Error banner text, trimmed
    ///
    /// # Errors
    ///
    /// Returns error if the banner cannot be read.
    pub async fn error_text(&self) -> LocusResult<Option<String>> {
        self.base.get_text(self.target(ERROR)?, None).await
    }
}

impl PageObject for LoginPage {
    fn from_context(ctx: Arc<dyn PageContext>) -> Self {
        let selectors = SelectorMap::new("LoginPage")
            .with(
                USERNAME,
                Selector::label("Username").or(Selector::css("input[name=\"username\"]")),
            )
            .with(
                PASSWORD,
                Selector::label("Password").or(Selector::css("input[name=\"password\"]")),
            )
            .with(
                SUBMIT,
                Selector::role_with_name("button", "Sign in")
                    .or(Selector::css("button[type=\"submit\"]")),
            )
            .with(
                ERROR,
                Selector::test_id("login-error")
                    .or(Selector::role("alert"))
                    .or(Selector::css(".error")),
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
        "/login"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockElement, MockPage};
    use crate::pages::test_app;
    use crate::result::LocusError;

    fn login_page(page: &MockPage) -> LoginPage {
        LoginPage::from_context(Arc::new(page.clone()))
    }

    #[tokio::test]
    async fn test_open_lands_on_login() {
        let app = test_app();
        let login = login_page(&app);
        login.open().await.unwrap();
        assert!(login.is_current().await.unwrap());
        assert!(!login.error_visible().await.unwrap());
    }

    #[tokio::test]
    async fn test_login_fills_by_label_when_present() {
        let app = MockPage::with_elements(vec![
            MockElement::new("input").label("Username"),
            MockElement::new("input").attr("type", "password").label("Password"),
            MockElement::new("button").text("Sign in"),
        ]);
        let login = login_page(&app);
        login.login("ana", "pw").await.unwrap();
        assert_eq!(app.value_of("input").as_deref(), Some("ana"));
        assert_eq!(app.value_of("input[type=password]").as_deref(), Some("pw"));
        assert!(app.was_called("click:role=button[name=\"Sign in\"]"));
    }

    #[tokio::test]
    async fn test_missing_form_fails_with_engine_error() {
        let app = MockPage::with_elements(vec![]);
        let login = login_page(&app);
        let err = login.login("ana", "pw").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_unknown_name() {
        let login = login_page(&MockPage::with_elements(vec![]));
        let err = login.target("remember-me").unwrap_err();
        assert!(matches!(err, LocusError::UnknownSelector { .. }));
        assert_eq!(login.page_name(), "LoginPage");
    }
}
