//! Concrete page objects for the login flow.

pub mod home;
pub mod login;

pub use home::HomePage;
pub use login::LoginPage;

/// Scripted two-page app: `alice` / `secret` signs in, anything else shows
/// the error banner
#[cfg(test)]
pub(crate) fn test_app() -> crate::mock::MockPage {
    use crate::config::LocusConfig;
    use crate::mock::{MockElement, MockPage};

    let login = vec![
        MockElement::new("input").attr("name", "username"),
        MockElement::new("input")
            .attr("name", "password")
            .attr("type", "password"),
        MockElement::new("button")
            .attr("type", "submit")
            .text("Sign in")
            .on_click(|dom| {
                let user = dom.value_of("input[name=\"username\"]");
                let pass = dom.value_of("input[name=\"password\"]");
                if user.as_deref() == Some("alice") && pass.as_deref() == Some("secret") {
                    dom.navigate("/home");
                } else if let Some(error) = dom.find_mut("[data-testid=\"login-error\"]") {
                    error.set_visible(true);
                }
            }),
        MockElement::new("div")
            .attr("data-testid", "login-error")
            .attr("role", "alert")
            .text(" Invalid username or password ")
            .hidden(),
    ];
    let home = vec![
        MockElement::new("h1").text("Welcome, alice"),
        MockElement::new("button")
            .text("Log out")
            .on_click(|dom| dom.navigate("/login")),
        MockElement::new("tr").text("alice admin").within("table"),
        MockElement::new("tr").text("bob viewer").within("table"),
        MockElement::new("tr").text("O'Brien editor").within("table"),
    ];
    MockPage::new(&LocusConfig::default())
        .route("/login", login)
        .route("/home", home)
}
