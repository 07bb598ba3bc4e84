//! Per-test page fixtures.
//!
//! A [`PageFixture`] creates one fresh context per test through a
//! [`ContextFactory`], hands out page objects built around it, and closes it
//! on teardown. Page objects never share a context across tests.

use crate::driver::PageContext;
use crate::page_object::PageObject;
use crate::result::{LocusError, LocusResult};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

/// Source of fresh page contexts
#[async_trait]
pub trait ContextFactory: Send + Sync {
    /// Create a new, isolated context
    ///
    /// # Errors
    ///
    /// Returns error if the engine cannot provide a context.
    async fn new_context(&self) -> LocusResult<Arc<dyn PageContext>>;
}

#[async_trait]
impl<F> ContextFactory for F
where
    F: Fn() -> LocusResult<Arc<dyn PageContext>> + Send + Sync,
{
    async fn new_context(&self) -> LocusResult<Arc<dyn PageContext>> {
        self()
    }
}

/// Lifecycle of a fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureState {
    /// Created, not set up yet
    Pending,
    /// Context available
    Ready,
    /// Context closed
    TornDown,
    /// Setup failed
    Failed,
}

/// Fresh context per test, injected into page objects
pub struct PageFixture<F> {
    factory: F,
    ctx: Option<Arc<dyn PageContext>>,
    state: FixtureState,
}

impl<F> std::fmt::Debug for PageFixture<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageFixture")
            .field("state", &self.state)
            .field("has_context", &self.ctx.is_some())
            .finish_non_exhaustive()
    }
}

impl<F: ContextFactory> PageFixture<F> {
    /// Wrap a context factory
    pub const fn new(factory: F) -> Self {
        Self {
            factory,
            ctx: None,
            state: FixtureState::Pending,
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> FixtureState {
        self.state
    }

    /// Create the context for this test.
    ///
    /// # Errors
    ///
    /// Returns [`LocusError::FixtureError`] if already set up or if the
    /// factory fails.
    pub async fn setup(&mut self) -> LocusResult<()> {
        if self.state == FixtureState::Ready {
            return Err(LocusError::FixtureError {
                message: "fixture is already set up".to_string(),
            });
        }
        match self.factory.new_context().await {
            Ok(ctx) => {
                self.ctx = Some(ctx);
                self.state = FixtureState::Ready;
                tracing::debug!("page fixture ready");
                Ok(())
            }
            Err(e) => {
                self.state = FixtureState::Failed;
                Err(LocusError::FixtureError {
                    message: format!("context creation failed: {e}"),
                })
            }
        }
    }

    /// The context of the running test
    ///
    /// # Errors
    ///
    /// Returns [`LocusError::FixtureError`] outside setup/teardown.
    pub fn context(&self) -> LocusResult<Arc<dyn PageContext>> {
        self.ctx.clone().ok_or_else(|| LocusError::FixtureError {
            message: format!("no context available (fixture is {:?})", self.state),
        })
    }

    /// Build a page object around this test's context
    ///
    /// # Errors
    ///
    /// Returns [`LocusError::FixtureError`] when not set up.
    pub fn page<P: PageObject>(&self) -> LocusResult<P> {
        Ok(P::from_context(self.context()?))
    }

    /// Close the context. Calling it twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns error if the engine fails to close the context.
    pub async fn teardown(&mut self) -> LocusResult<()> {
        let Some(ctx) = self.ctx.take() else {
            return Ok(());
        };
        self.state = FixtureState::TornDown;
        tracing::debug!("page fixture torn down");
        ctx.close().await
    }

    /// Set up, run a test body, and always tear down.
    ///
    /// The test body's error wins over a teardown error.
    ///
    /// # Errors
    ///
    /// Returns the first of: setup error, test error, teardown error.
    pub async fn run<T, G, Fut>(&mut self, test: G) -> LocusResult<T>
    where
        G: FnOnce(Arc<dyn PageContext>) -> Fut,
        Fut: Future<Output = LocusResult<T>>,
    {
        self.setup().await?;
        let ctx = self.context()?;
        let result = test(ctx).await;
        let closed = self.teardown().await;
        let value = result?;
        closed?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockPage;
    use crate::pages::{test_app, LoginPage};
    use std::sync::Mutex;

    fn factory_for(page: &MockPage) -> impl Fn() -> LocusResult<Arc<dyn PageContext>> + Send + Sync {
        let page = page.clone();
        move || -> LocusResult<Arc<dyn PageContext>> { Ok(Arc::new(page.clone())) }
    }

    #[tokio::test]
    async fn test_lifecycle() {
        let app = test_app();
        let mut fixture = PageFixture::new(factory_for(&app));
        assert_eq!(fixture.state(), FixtureState::Pending);
        assert!(fixture.page::<LoginPage>().is_err());

        fixture.setup().await.unwrap();
        assert_eq!(fixture.state(), FixtureState::Ready);
        let login: LoginPage = fixture.page().unwrap();
        login.open().await.unwrap();

        fixture.teardown().await.unwrap();
        assert_eq!(fixture.state(), FixtureState::TornDown);
        assert!(app.was_called("close"));
        fixture.teardown().await.unwrap();
    }

    #[tokio::test]
    async fn test_double_setup_rejected() {
        let mut fixture = PageFixture::new(factory_for(&test_app()));
        fixture.setup().await.unwrap();
        let err = fixture.setup().await.unwrap_err();
        assert!(matches!(err, LocusError::FixtureError { .. }));
    }

    #[tokio::test]
    async fn test_failed_factory() {
        let mut fixture =
            PageFixture::new(|| -> LocusResult<Arc<dyn PageContext>> { Err(LocusError::engine("no browser")) });
        let err = fixture.setup().await.unwrap_err();
        assert!(err.to_string().contains("no browser"));
        assert_eq!(fixture.state(), FixtureState::Failed);
    }

    #[tokio::test]
    async fn test_fresh_context_per_run() {
        let created = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&created);
        let mut fixture = PageFixture::new(move || -> LocusResult<Arc<dyn PageContext>> {
            *counter.lock().unwrap() += 1;
            Ok(Arc::new(test_app()))
        });

        for _ in 0..2 {
            fixture
                .run(|ctx| async move {
                    let login = LoginPage::from_context(ctx);
                    login.open().await?;
                    login.is_current().await
                })
                .await
                .unwrap();
        }
        assert_eq!(*created.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_run_tears_down_on_failure() {
        let app = test_app();
        let mut fixture = PageFixture::new(factory_for(&app));
        let result: LocusResult<()> = fixture
            .run(|_| async { Err(LocusError::engine("boom")) })
            .await;
        assert!(result.is_err());
        assert_eq!(fixture.state(), FixtureState::TornDown);
        assert!(app.was_called("close"));
    }
}
