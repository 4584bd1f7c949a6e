//! Browser session: a single driver instance plus its timeouts.
//!
//! One session per test module. Page objects hold a shared reference and go
//! through the bounded wait primitives here; there is no parallelism within
//! a module, the only "concurrency" is the poll loop inside each wait.

use crate::driver::{Driver, ElementHandle};
use crate::locator::Locator;
use crate::report::{Step, StepRecorder};
use crate::result::{VitrinaError, VitrinaResult};
use crate::wait::WaitOptions;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Configuration for a browser session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Base URL of the storefront under test
    pub base_url: String,
    /// Implicit wait bound applied to element lookups
    pub implicit_wait: Duration,
    /// Bound on page navigation
    pub page_load_timeout: Duration,
    /// Bound on script execution
    pub script_timeout: Duration,
    /// Poll cadence inside waits
    pub poll_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://intershop5.skillbox.ru".to_string(),
            implicit_wait: Duration::from_secs(10),
            page_load_timeout: Duration::from_secs(30),
            script_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(50),
        }
    }
}

impl SessionConfig {
    /// Create a config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset with stretched timeouts for slow pages (ordering flows)
    #[must_use]
    pub fn long_timeouts() -> Self {
        Self {
            implicit_wait: Duration::from_secs(20),
            page_load_timeout: Duration::from_secs(40),
            script_timeout: Duration::from_secs(20),
            ..Self::default()
        }
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the implicit wait bound
    #[must_use]
    pub const fn with_implicit_wait(mut self, implicit_wait: Duration) -> Self {
        self.implicit_wait = implicit_wait;
        self
    }

    /// Set the page load bound
    #[must_use]
    pub const fn with_page_load_timeout(mut self, timeout: Duration) -> Self {
        self.page_load_timeout = timeout;
        self
    }

    /// Set the script execution bound
    #[must_use]
    pub const fn with_script_timeout(mut self, timeout: Duration) -> Self {
        self.script_timeout = timeout;
        self
    }

    /// Set the poll cadence
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// A single browser instance shared by the page objects of one test module
pub struct Session {
    driver: Arc<dyn Driver>,
    config: SessionConfig,
    steps: StepRecorder,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.config.base_url)
            .field("implicit_wait", &self.config.implicit_wait)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session over a driver
    #[must_use]
    pub fn new(driver: Arc<dyn Driver>, config: SessionConfig) -> Self {
        Self {
            driver,
            config,
            steps: StepRecorder::default(),
        }
    }

    /// The underlying driver
    #[must_use]
    pub fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    /// Session configuration
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Step recorder shared with the page objects
    #[must_use]
    pub const fn steps(&self) -> &StepRecorder {
        &self.steps
    }

    /// Start a named report step
    pub fn step(&self, name: impl Into<String>) -> Step {
        self.steps.start(name)
    }

    /// Wait options derived from the implicit wait
    #[must_use]
    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(self.config.implicit_wait.as_millis() as u64)
            .with_poll_interval(self.config.poll_interval.as_millis() as u64)
    }

    /// Navigate to the configured base URL
    pub async fn open(&self) -> VitrinaResult<()> {
        let url = self.config.base_url.clone();
        self.goto(&url).await
    }

    /// Navigate to a URL, bounded by the page load timeout
    pub async fn goto(&self, url: &str) -> VitrinaResult<()> {
        tracing::info!(url, "navigating");
        tokio::time::timeout(self.config.page_load_timeout, self.driver.navigate(url))
            .await
            .map_err(|_| VitrinaError::Timeout {
                ms: self.config.page_load_timeout.as_millis() as u64,
                waiting_for: format!("navigation to {url}"),
            })?
    }

    /// Execute a script in the page, bounded by the script timeout
    pub async fn execute_script(&self, script: &str) -> VitrinaResult<serde_json::Value> {
        tokio::time::timeout(self.config.script_timeout, self.driver.execute_js(script))
            .await
            .map_err(|_| VitrinaError::Timeout {
                ms: self.config.script_timeout.as_millis() as u64,
                waiting_for: "script execution".to_string(),
            })?
    }

    /// Poll until the locator matches exactly one element.
    ///
    /// More than one concurrent match is an [`VitrinaError::AmbiguousSelector`]
    /// error; no match within the bound is a timeout.
    pub async fn find_when_present(
        &self,
        locator: &Locator,
        options: &WaitOptions,
    ) -> VitrinaResult<ElementHandle> {
        let deadline = Instant::now() + options.timeout();
        loop {
            let mut matches = self.driver.find_elements(locator).await?;
            match matches.len() {
                0 => {}
                1 => return Ok(matches.remove(0)),
                count => {
                    return Err(VitrinaError::AmbiguousSelector {
                        selector: locator.to_string(),
                        count,
                    })
                }
            }
            if Instant::now() >= deadline {
                return Err(VitrinaError::Timeout {
                    ms: options.timeout_ms,
                    waiting_for: locator.to_string(),
                });
            }
            tokio::time::sleep(options.poll_interval()).await;
        }
    }

    /// Poll until the locator matches at least one element; returns all
    /// current matches in DOM order
    pub async fn find_all_when_present(
        &self,
        locator: &Locator,
        options: &WaitOptions,
    ) -> VitrinaResult<Vec<ElementHandle>> {
        let deadline = Instant::now() + options.timeout();
        loop {
            let matches = self.driver.find_elements(locator).await?;
            if !matches.is_empty() {
                return Ok(matches);
            }
            if Instant::now() >= deadline {
                return Err(VitrinaError::Timeout {
                    ms: options.timeout_ms,
                    waiting_for: locator.to_string(),
                });
            }
            tokio::time::sleep(options.poll_interval()).await;
        }
    }

    /// Poll until the element is clickable
    pub async fn wait_for_clickable(
        &self,
        element: &ElementHandle,
        options: &WaitOptions,
    ) -> VitrinaResult<()> {
        let deadline = Instant::now() + options.timeout();
        loop {
            if self.driver.is_clickable(element).await? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(VitrinaError::Timeout {
                    ms: options.timeout_ms,
                    waiting_for: format!("element {element} to become clickable"),
                });
            }
            tokio::time::sleep(options.poll_interval()).await;
        }
    }

    /// Poll until the page title contains the fragment
    pub async fn wait_for_title_contains(
        &self,
        fragment: &str,
        options: &WaitOptions,
    ) -> VitrinaResult<()> {
        let deadline = Instant::now() + options.timeout();
        loop {
            if self.driver.title().await?.contains(fragment) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(VitrinaError::Timeout {
                    ms: options.timeout_ms,
                    waiting_for: format!("title to contain '{fragment}'"),
                });
            }
            tokio::time::sleep(options.poll_interval()).await;
        }
    }

    /// Close the underlying browser
    pub async fn close(&self) -> VitrinaResult<()> {
        tracing::info!("closing session");
        self.driver.close().await
    }
}
