//! Module-scoped fixtures: browser lifecycle and the login/logout flows.
//!
//! One browser per test module. A fixture's teardown must run on every exit
//! path, including failing tests, so scopes keep an explicit count of what
//! is set up and tear it down in reverse. Async teardown cannot run inside
//! `Drop`; a scope dropped while still armed logs a warning instead (the
//! chromium backend additionally kills its child process on drop, so a
//! leaked session never outlives the test run).

use crate::config::Credentials;
use crate::driver::Driver;
use crate::locator::Locator;
use crate::result::{VitrinaError, VitrinaResult};
use crate::session::{Session, SessionConfig};
use crate::wait::WaitOptions;
use async_trait::async_trait;
use std::sync::Arc;

/// A test fixture with scoped setup and teardown
#[async_trait]
pub trait Fixture: Send + Sync {
    /// Set up the fixture before the tests run
    async fn setup(&mut self) -> VitrinaResult<()>;

    /// Tear down the fixture after the last test
    async fn teardown(&mut self) -> VitrinaResult<()>;

    /// Fixture name for logging
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Runs fixture setups in registration order and teardowns in reverse.
///
/// A setup failure rolls back the fixtures already set up before returning
/// the error. A teardown failure is logged, the remaining teardowns still
/// run, and the first error is returned.
#[derive(Default)]
pub struct FixtureScope {
    fixtures: Vec<Box<dyn Fixture>>,
    active: usize,
}

impl std::fmt::Debug for FixtureScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixtureScope")
            .field("fixture_count", &self.fixtures.len())
            .field("active", &self.active)
            .finish()
    }
}

impl FixtureScope {
    /// Create an empty scope
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fixture; setup order is registration order
    pub fn register(&mut self, fixture: impl Fixture + 'static) {
        self.fixtures.push(Box::new(fixture));
    }

    /// Number of registered fixtures
    #[must_use]
    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    /// Whether no fixtures are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }

    /// Set up all fixtures that are not up yet
    pub async fn setup_all(&mut self) -> VitrinaResult<()> {
        while self.active < self.fixtures.len() {
            let index = self.active;
            if let Err(error) = self.fixtures[index].setup().await {
                let name = self.fixtures[index].name().to_string();
                if let Err(rollback) = self.teardown_all().await {
                    tracing::error!(%rollback, "rollback after failed setup also failed");
                }
                return Err(VitrinaError::Fixture {
                    message: format!("fixture '{name}' setup failed: {error}"),
                });
            }
            self.active += 1;
        }
        Ok(())
    }

    /// Tear down all set-up fixtures in reverse order
    pub async fn teardown_all(&mut self) -> VitrinaResult<()> {
        let mut first_error = None;
        while self.active > 0 {
            self.active -= 1;
            let index = self.active;
            if let Err(error) = self.fixtures[index].teardown().await {
                let name = self.fixtures[index].name().to_string();
                tracing::error!(fixture = %name, %error, "fixture teardown failed");
                if first_error.is_none() {
                    first_error = Some(VitrinaError::Fixture {
                        message: format!("fixture '{name}' teardown failed: {error}"),
                    });
                }
            }
        }
        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Tear everything down and consume the scope
    pub async fn close(mut self) -> VitrinaResult<()> {
        self.teardown_all().await
    }
}

impl Drop for FixtureScope {
    fn drop(&mut self) {
        if self.active > 0 {
            tracing::warn!(
                active = self.active,
                "fixture scope dropped with fixtures still set up; call close() instead"
            );
        }
    }
}

/// Owns the test module's browser session.
///
/// Built either over a prepared driver (the scripted one in unit tests) or,
/// with the `browser` feature, over a chromium launch configuration. Setup
/// creates the session and opens the storefront's base URL; teardown closes
/// the browser.
pub struct BrowserFixture {
    session_config: SessionConfig,
    driver: Option<Arc<dyn Driver>>,
    #[cfg(feature = "browser")]
    browser_config: Option<crate::browser::BrowserConfig>,
    session: Option<Session>,
}

impl std::fmt::Debug for BrowserFixture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserFixture")
            .field("base_url", &self.session_config.base_url)
            .field("active", &self.session.is_some())
            .finish_non_exhaustive()
    }
}

impl BrowserFixture {
    /// Build over an already-constructed driver
    #[must_use]
    pub fn with_driver(driver: Arc<dyn Driver>, session_config: SessionConfig) -> Self {
        Self {
            session_config,
            driver: Some(driver),
            #[cfg(feature = "browser")]
            browser_config: None,
            session: None,
        }
    }

    /// Build over a chromium launch configuration
    #[cfg(feature = "browser")]
    #[must_use]
    pub fn chromium(
        browser_config: crate::browser::BrowserConfig,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            session_config,
            driver: None,
            browser_config: Some(browser_config),
            session: None,
        }
    }

    /// The live session; an error before setup or after teardown
    pub fn session(&self) -> VitrinaResult<&Session> {
        self.session.as_ref().ok_or_else(|| VitrinaError::Fixture {
            message: "browser fixture is not set up".to_string(),
        })
    }

    async fn acquire_driver(&mut self) -> VitrinaResult<Arc<dyn Driver>> {
        if let Some(driver) = &self.driver {
            return Ok(Arc::clone(driver));
        }
        #[cfg(feature = "browser")]
        if let Some(config) = self.browser_config.clone() {
            let driver: Arc<dyn Driver> =
                Arc::new(crate::browser::ChromiumDriver::launch(config).await?);
            self.driver = Some(Arc::clone(&driver));
            return Ok(driver);
        }
        Err(VitrinaError::Fixture {
            message: "no driver prepared for the browser fixture".to_string(),
        })
    }
}

#[async_trait]
impl Fixture for BrowserFixture {
    async fn setup(&mut self) -> VitrinaResult<()> {
        let driver = self.acquire_driver().await?;
        let session = Session::new(driver, self.session_config.clone());
        session.open().await?;
        self.session = Some(session);
        Ok(())
    }

    async fn teardown(&mut self) -> VitrinaResult<()> {
        if let Some(session) = self.session.take() {
            session.close().await?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "browser"
    }
}

impl Drop for BrowserFixture {
    fn drop(&mut self) {
        if self.session.is_some() {
            tracing::warn!("browser fixture dropped without teardown");
        }
    }
}

/// Log into the storefront through the header link and the account form,
/// then wait until the account page title confirms the authenticated state.
pub async fn login(session: &Session, credentials: &Credentials) -> VitrinaResult<()> {
    let form_wait = WaitOptions::new()
        .with_timeout(20_000)
        .with_poll_interval(session.config().poll_interval.as_millis() as u64);
    let title_wait = WaitOptions::new()
        .with_timeout(10_000)
        .with_poll_interval(session.config().poll_interval.as_millis() as u64);

    let enter = session
        .find_when_present(&Locator::link_text("Войти"), &form_wait)
        .await?;
    session.driver().click(&enter).await?;

    let username = session
        .find_when_present(&Locator::id("username"), &form_wait)
        .await?;
    session
        .driver()
        .type_text(&username, credentials.username())
        .await?;

    let password = session
        .find_when_present(&Locator::id("password"), &form_wait)
        .await?;
    session
        .driver()
        .type_text(&password, credentials.password())
        .await?;

    let submit = session
        .find_when_present(&Locator::name("login"), &form_wait)
        .await?;
    session.driver().click(&submit).await?;

    session
        .wait_for_title_contains("Мой аккаунт", &title_wait)
        .await
}

/// Log out through the header link, scrolling back to the top first so the
/// link is in view.
pub async fn logout(session: &Session) -> VitrinaResult<()> {
    session.execute_script("window.scrollTo(0, 0);").await?;

    let wait = WaitOptions::new()
        .with_timeout(10_000)
        .with_poll_interval(session.config().poll_interval.as_millis() as u64);
    let exit = session
        .find_when_present(&Locator::link_text("Выйти"), &wait)
        .await?;
    session.wait_for_clickable(&exit, &wait).await?;
    session.driver().click(&exit).await
}
