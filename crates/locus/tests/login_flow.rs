//! End-to-end login flow through the page objects and the in-memory engine.

mod common;

use locus::mock::MockPage;
use locus::prelude::*;
use std::sync::Arc;

fn pages(app: &MockPage) -> (LoginPage, HomePage) {
    let ctx: Arc<dyn PageContext> = Arc::new(app.clone());
    (
        LoginPage::from_context(Arc::clone(&ctx)),
        HomePage::from_context(ctx),
    )
}

#[tokio::test]
async fn test_username_filled_through_css_fallback() {
    let app = common::app(&LocusConfig::default());
    let (login, _) = pages(&app);
    login.open().await.unwrap();

    let username = Selector::label("Username").or(Selector::css("input[name=\"username\"]"));
    let ctx: Arc<dyn PageContext> = Arc::new(app.clone());
    let resolution = locus::resolve_traced(ctx.as_ref(), &username).await.unwrap();
    assert_eq!(resolution.matched, Some(1));
    assert_eq!(resolution.attempts.len(), 2);
    assert_eq!(resolution.attempts[0].count, None);

    let target = Target::from(username);
    login.base().fill(&target, "demo@example.com", None).await.unwrap();
    assert_eq!(
        app.value_of("input[name=\"username\"]").as_deref(),
        Some("demo@example.com")
    );
}

#[tokio::test]
async fn test_valid_login_reaches_home() {
    let app = common::app(&LocusConfig::default());
    let (login, home) = pages(&app);

    login.open().await.unwrap();
    assert!(login.is_current().await.unwrap());
    login.login(common::USER, common::PASSWORD).await.unwrap();

    assert!(home.is_current().await.unwrap());
    let header = home.header_text().await.unwrap().unwrap();
    assert!(header.contains("Welcome"));
    assert_eq!(header, "Welcome, alice");
    assert!(home.has_user("bob").await.unwrap());
    assert!(!home.has_user("mallory").await.unwrap());
}

#[tokio::test]
async fn test_invalid_password_shows_error() {
    let app = common::app(&LocusConfig::default());
    let (login, _) = pages(&app);

    login.open().await.unwrap();
    assert!(!login.error_visible().await.unwrap());

    login.login(common::USER, "wrong").await.unwrap();

    assert!(login.is_current().await.unwrap());
    assert!(login.error_visible().await.unwrap());
    assert_eq!(
        login.error_text().await.unwrap().as_deref(),
        Some("Invalid username or password")
    );
}

#[tokio::test]
async fn test_logout_link_found_by_role_fallback() {
    let app = common::app(&LocusConfig::default());
    let (login, home) = pages(&app);

    login.open().await.unwrap();
    login.login(common::USER, common::PASSWORD).await.unwrap();
    home.logout().await.unwrap();

    assert!(login.is_current().await.unwrap());
    assert!(app.was_called("click:role=link[name=\"Log out\"]"));
}

#[tokio::test]
async fn test_redirect_query_does_not_count_as_home() {
    let app = common::app(&LocusConfig::default())
        .route("/", vec![MockElement::new("h1").text("Landing")]);
    let (login, home) = pages(&app);

    app.goto("http://localhost:3000?next=/home").await.unwrap();

    assert!(!home.is_current().await.unwrap());
    assert!(!login.is_current().await.unwrap());
    assert_eq!(home.header_text().await.unwrap().as_deref(), Some("Landing"));
}

#[tokio::test]
async fn test_base_url_from_config() {
    let config = LocusConfig::from_lookup(|key| {
        (key == locus::ENV_BASE_URL).then(|| "https://staging.example.com".to_string())
    })
    .unwrap();
    let app = common::app(&config);
    let (login, _) = pages(&app);

    login.open().await.unwrap();
    assert_eq!(
        app.current_url().await.unwrap(),
        "https://staging.example.com/login"
    );
}

#[tokio::test]
async fn test_fixture_injects_fresh_context() {
    let mut fixture = common::fixture();
    fixture.setup().await.unwrap();

    let login: LoginPage = fixture.page().unwrap();
    login.open().await.unwrap();
    login.login(common::USER, common::PASSWORD).await.unwrap();
    let home: HomePage = fixture.page().unwrap();
    assert!(home.is_current().await.unwrap());
    fixture.teardown().await.unwrap();

    // Next test starts from a blank context
    fixture.setup().await.unwrap();
    let home: HomePage = fixture.page().unwrap();
    assert!(!home.is_current().await.unwrap());
    fixture.teardown().await.unwrap();
}

#[tokio::test]
async fn test_total_miss_surfaces_engine_error() {
    let app = MockPage::with_elements(vec![]);
    let (login, _) = pages(&app);
    let err = login.login("a", "b").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("label=\"Username\""));
}
