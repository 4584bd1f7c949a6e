//! Real browser backend.
//!
//! With the `browser` feature enabled this module drives a Chromium instance
//! over CDP via chromiumoxide and exposes it through the [`crate::Driver`]
//! trait. Elements are tracked in a page-side registry
//! (`window.__vitrina.els`) so handles stay valid across calls without
//! holding CDP object ids. Without the feature, only the launch
//! configuration is compiled; the suite then runs on the scripted driver.

#[cfg(feature = "browser")]
use crate::result::VitrinaResult;

/// Browser launch configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to the chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Create a config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set the chromium binary path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable the sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Launch a chromium-backed driver with this configuration
    #[cfg(feature = "browser")]
    pub async fn launch(self) -> VitrinaResult<cdp::ChromiumDriver> {
        cdp::ChromiumDriver::launch(self).await
    }
}

#[cfg(feature = "browser")]
pub use cdp::ChromiumDriver;

#[cfg(feature = "browser")]
mod cdp {
    use super::BrowserConfig;
    use crate::driver::{Driver, ElementHandle};
    use crate::locator::Locator;
    use crate::result::{VitrinaError, VitrinaResult};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use serde::de::DeserializeOwned;
    use serde::Deserialize;
    use tokio::sync::Mutex;

    /// Expression (re)creating the page-side element registry
    const REGISTRY: &str = "(window.__vitrina = window.__vitrina || { seq: 0, els: {} })";

    fn element_expr(element: &ElementHandle) -> String {
        format!("window.__vitrina.els[{:?}]", element.id)
    }

    /// Attribute probe distinguishing a stale handle from a missing attribute
    #[derive(Debug, Deserialize)]
    struct AttributeProbe {
        stale: bool,
        value: Option<String>,
    }

    /// Chromium instance exposed through the driver capability
    pub struct ChromiumDriver {
        browser: Mutex<CdpBrowser>,
        page: CdpPage,
        #[allow(dead_code)]
        handler: tokio::task::JoinHandle<()>,
    }

    impl std::fmt::Debug for ChromiumDriver {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("ChromiumDriver").finish_non_exhaustive()
        }
    }

    impl ChromiumDriver {
        /// Launch a chromium instance and open a blank page
        pub async fn launch(config: BrowserConfig) -> VitrinaResult<Self> {
            let mut builder = CdpConfig::builder()
                .window_size(config.viewport_width, config.viewport_height);

            if !config.headless {
                builder = builder.with_head();
            }
            if !config.sandbox {
                builder = builder.no_sandbox();
            }
            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder
                .build()
                .map_err(|message| VitrinaError::BrowserLaunch { message })?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(|e| {
                VitrinaError::BrowserLaunch {
                    message: e.to_string(),
                }
            })?;

            let handle = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            let page = browser.new_page("about:blank").await.map_err(|e| {
                VitrinaError::Session {
                    message: e.to_string(),
                }
            })?;

            Ok(Self {
                browser: Mutex::new(browser),
                page,
                handler: handle,
            })
        }

        async fn eval<T: DeserializeOwned>(&self, script: String) -> VitrinaResult<T> {
            self.page
                .evaluate(script)
                .await
                .map_err(|e| VitrinaError::Script {
                    message: e.to_string(),
                })?
                .into_value()
                .map_err(|e| VitrinaError::Script {
                    message: e.to_string(),
                })
        }

        /// Run a script against a registered element; `body` sees `el` and
        /// must return a JSON-serializable value, or `null` for a stale
        /// handle.
        async fn eval_on<T: DeserializeOwned>(
            &self,
            element: &ElementHandle,
            body: &str,
        ) -> VitrinaResult<T> {
            let script = format!(
                "(() => {{ const el = {root}; {body} }})()",
                root = element_expr(element)
            );
            self.eval(script).await
        }
    }

    #[async_trait]
    impl Driver for ChromiumDriver {
        async fn navigate(&self, url: &str) -> VitrinaResult<()> {
            self.page
                .goto(url)
                .await
                .map_err(|e| VitrinaError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn title(&self) -> VitrinaResult<String> {
            self.eval("document.title".to_string()).await
        }

        async fn current_url(&self) -> VitrinaResult<String> {
            self.eval("window.location.href".to_string()).await
        }

        async fn execute_js(&self, script: &str) -> VitrinaResult<serde_json::Value> {
            let result =
                self.page
                    .evaluate(script.to_string())
                    .await
                    .map_err(|e| VitrinaError::Script {
                        message: e.to_string(),
                    })?;
            Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
        }

        async fn find_elements(&self, locator: &Locator) -> VitrinaResult<Vec<ElementHandle>> {
            let script = format!(
                "(() => {{ const reg = {REGISTRY}; const found = {array}; \
                 return found.map((el) => {{ const id = \"e\" + (reg.seq += 1); \
                 reg.els[id] = el; return id; }}); }})()",
                array = locator.to_js_array()
            );
            let ids: Vec<String> = self.eval(script).await?;
            Ok(ids.into_iter().map(ElementHandle::anonymous).collect())
        }

        async fn find_in(
            &self,
            parent: &ElementHandle,
            locator: &Locator,
        ) -> VitrinaResult<Option<ElementHandle>> {
            let script = format!(
                "(() => {{ const reg = {REGISTRY}; const root = {root}; \
                 if (!root) {{ return null; }} const found = {array}; \
                 if (found.length === 0) {{ return null; }} \
                 const id = \"e\" + (reg.seq += 1); reg.els[id] = found[0]; return id; }})()",
                root = element_expr(parent),
                array = locator.to_js_array_from("root")
            );
            let id: Option<String> = self.eval(script).await?;
            Ok(id.map(ElementHandle::anonymous))
        }

        async fn text(&self, element: &ElementHandle) -> VitrinaResult<String> {
            let text: Option<String> = self
                .eval_on(element, "return el ? el.textContent.trim() : null;")
                .await?;
            text.ok_or_else(|| VitrinaError::StaleElement {
                id: element.id.clone(),
            })
        }

        async fn attribute(
            &self,
            element: &ElementHandle,
            name: &str,
        ) -> VitrinaResult<Option<String>> {
            let body = format!(
                "if (!el) {{ return {{ stale: true, value: null }}; }} \
                 return {{ stale: false, value: el.getAttribute({name:?}) }};"
            );
            let probe: AttributeProbe = self.eval_on(element, &body).await?;
            if probe.stale {
                return Err(VitrinaError::StaleElement {
                    id: element.id.clone(),
                });
            }
            Ok(probe.value)
        }

        async fn click(&self, element: &ElementHandle) -> VitrinaResult<()> {
            let clicked: bool = self
                .eval_on(element, "if (!el) { return false; } el.click(); return true;")
                .await?;
            if clicked {
                Ok(())
            } else {
                Err(VitrinaError::StaleElement {
                    id: element.id.clone(),
                })
            }
        }

        async fn is_clickable(&self, element: &ElementHandle) -> VitrinaResult<bool> {
            self.eval_on(
                element,
                "return el ? !el.disabled && el.getClientRects().length > 0 : false;",
            )
            .await
        }

        async fn scroll_into_view(&self, element: &ElementHandle) -> VitrinaResult<()> {
            let scrolled: bool = self
                .eval_on(
                    element,
                    "if (!el) { return false; } \
                     el.scrollIntoView({ block: \"center\", inline: \"nearest\" }); return true;",
                )
                .await?;
            if scrolled {
                Ok(())
            } else {
                Err(VitrinaError::StaleElement {
                    id: element.id.clone(),
                })
            }
        }

        async fn type_text(&self, element: &ElementHandle, text: &str) -> VitrinaResult<()> {
            let body = format!(
                "if (!el) {{ return false; }} el.focus(); el.value = {text:?}; \
                 el.dispatchEvent(new Event(\"input\", {{ bubbles: true }})); \
                 el.dispatchEvent(new Event(\"change\", {{ bubbles: true }})); return true;"
            );
            let typed: bool = self.eval_on(element, &body).await?;
            if typed {
                Ok(())
            } else {
                Err(VitrinaError::Input {
                    message: format!("cannot type into stale element '{}'", element.id),
                })
            }
        }

        async fn close(&self) -> VitrinaResult<()> {
            self.browser
                .lock()
                .await
                .close()
                .await
                .map_err(|e| VitrinaError::Session {
                    message: e.to_string(),
                })?;
            Ok(())
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = BrowserConfig::default();
        assert!(config.headless);
        assert!(config.sandbox);
        assert_eq!(config.viewport_width, 1920);
    }

    #[test]
    fn test_config_builder() {
        let config = BrowserConfig::new()
            .with_headless(false)
            .with_viewport(1366, 768)
            .with_chromium_path("/usr/bin/chromium")
            .with_no_sandbox();

        assert!(!config.headless);
        assert!(!config.sandbox);
        assert_eq!(config.viewport_height, 768);
        assert_eq!(config.chromium_path.as_deref(), Some("/usr/bin/chromium"));
    }
}
