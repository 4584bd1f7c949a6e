//! Common page capability: bounded-wait lookup, scoped lookup, scrolling,
//! and click-with-wait.
//!
//! Every page object implements [`BasePage`] by exposing its session; the
//! default methods hide the explicit-wait boilerplate so call sites read as
//! short verbs. Lookups are wait-guarded to stay robust against asynchronous
//! page rendering; the one place that wants a lenient outcome uses
//! [`BasePage::wait_for_elements_opt`], which turns a timeout into an
//! explicit absence instead of an error.

use crate::driver::ElementHandle;
use crate::locator::Locator;
use crate::result::{VitrinaError, VitrinaResult};
use crate::session::Session;
use crate::wait::WaitOptions;
use async_trait::async_trait;

/// Wait/lookup capability shared by all page objects
#[async_trait]
pub trait BasePage: Send + Sync {
    /// The session this page is bound to
    fn session(&self) -> &Session;

    /// Wait until exactly one element matches, bounded by the implicit wait
    async fn wait_for_element(&self, locator: &Locator) -> VitrinaResult<ElementHandle> {
        let options = self.session().wait_options();
        self.wait_for_element_with(locator, &options).await
    }

    /// Wait until exactly one element matches, with an explicit bound
    async fn wait_for_element_with(
        &self,
        locator: &Locator,
        options: &WaitOptions,
    ) -> VitrinaResult<ElementHandle> {
        self.session().find_when_present(locator, options).await
    }

    /// Wait until at least one element matches; returns all current matches
    /// in DOM order, bounded by the implicit wait
    async fn wait_for_elements(&self, locator: &Locator) -> VitrinaResult<Vec<ElementHandle>> {
        let options = self.session().wait_options();
        self.wait_for_elements_with(locator, &options).await
    }

    /// Wait until at least one element matches, with an explicit bound
    async fn wait_for_elements_with(
        &self,
        locator: &Locator,
        options: &WaitOptions,
    ) -> VitrinaResult<Vec<ElementHandle>> {
        self.session().find_all_when_present(locator, options).await
    }

    /// Found/absent variant of [`BasePage::wait_for_elements`]: a timeout
    /// yields `Ok(None)` instead of an error. Other driver failures still
    /// propagate.
    async fn wait_for_elements_opt(
        &self,
        locator: &Locator,
    ) -> VitrinaResult<Option<Vec<ElementHandle>>> {
        match self.wait_for_elements(locator).await {
            Ok(elements) => Ok(Some(elements)),
            Err(VitrinaError::Timeout { .. }) => Ok(None),
            Err(other) => Err(other),
        }
    }

    /// Lookup restricted to a parent element's subtree. No explicit wait;
    /// the caller is expected to have waited for the parent already.
    async fn element_within(
        &self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> VitrinaResult<ElementHandle> {
        self.session()
            .driver()
            .find_in(parent, locator)
            .await?
            .ok_or_else(|| VitrinaError::ElementNotFound {
                selector: locator.to_string(),
            })
    }

    /// Bring an element into the viewport. Best effort: a driver failure is
    /// logged and swallowed, never surfaced to the test.
    async fn scroll_to(&self, element: &ElementHandle) {
        if let Err(error) = self.session().driver().scroll_into_view(element).await {
            tracing::debug!(element = %element, %error, "scroll into view failed, continuing");
        }
    }

    /// Wait for the element to become clickable, then click it
    async fn click_by(&self, element: &ElementHandle) -> VitrinaResult<()> {
        let options = self.session().wait_options();
        self.session().wait_for_clickable(element, &options).await?;
        self.session().driver().click(element).await
    }
}

/// Uppercase the first character and lowercase the rest, Unicode-aware.
/// The storefront's captions are Cyrillic.
pub(crate) fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => {
            let mut out: String = first.to_uppercase().collect();
            out.push_str(&chars.as_str().to_lowercase());
            out
        }
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MockDriver;
    use crate::session::SessionConfig;
    use std::sync::Arc;
    use std::time::Duration;

    struct TestPage {
        session: Session,
    }

    impl BasePage for TestPage {
        fn session(&self) -> &Session {
            &self.session
        }
    }

    fn page_over(driver: Arc<MockDriver>) -> TestPage {
        let config = SessionConfig::new()
            .with_implicit_wait(Duration::from_millis(60))
            .with_poll_interval(Duration::from_millis(5));
        TestPage {
            session: Session::new(driver, config),
        }
    }

    mod capitalize_tests {
        use super::*;

        #[test]
        fn test_cyrillic() {
            assert_eq!(capitalize("хОЛОДИЛЬНИКИ"), "Холодильники");
        }

        #[test]
        fn test_ascii() {
            assert_eq!(capitalize("ferdinand"), "Ferdinand");
        }

        #[test]
        fn test_empty() {
            assert_eq!(capitalize(""), "");
        }
    }

    mod lookup_tests {
        use super::*;

        #[tokio::test]
        async fn test_wait_for_element() {
            let driver = Arc::new(MockDriver::new());
            let locator = Locator::id("promo");
            driver.stage_elements(&locator, vec![ElementHandle::new("promo", "aside")]);

            let page = page_over(driver);
            let found = page.wait_for_element(&locator).await.unwrap();
            assert_eq!(found.id, "promo");
        }

        #[tokio::test]
        async fn test_wait_for_elements_opt_absent() {
            let driver = Arc::new(MockDriver::new());
            let page = page_over(driver);

            let result = page
                .wait_for_elements_opt(&Locator::xpath("//aside//li"))
                .await
                .unwrap();
            assert!(result.is_none());
        }

        #[tokio::test]
        async fn test_wait_for_elements_opt_found() {
            let driver = Arc::new(MockDriver::new());
            let locator = Locator::xpath("//aside//li");
            driver.stage_elements(&locator, vec![ElementHandle::new("v1", "li")]);

            let page = page_over(driver);
            let result = page.wait_for_elements_opt(&locator).await.unwrap();
            assert_eq!(result.unwrap().len(), 1);
        }

        #[tokio::test]
        async fn test_element_within_missing_is_not_found() {
            let driver = Arc::new(MockDriver::new());
            let page = page_over(driver);

            let parent = ElementHandle::new("p1", "li");
            let result = page.element_within(&parent, &Locator::tag_name("a")).await;
            assert!(matches!(
                result,
                Err(VitrinaError::ElementNotFound { .. })
            ));
        }
    }

    mod interaction_tests {
        use super::*;

        #[tokio::test]
        async fn test_scroll_to_never_fails() {
            let driver = Arc::new(MockDriver::new());
            let element = ElementHandle::new("p1", "li");
            driver.fail_scroll_for(&element);

            let page = page_over(Arc::clone(&driver));
            // swallows the driver error
            page.scroll_to(&element).await;
            assert!(driver.was_called("scroll"));
        }

        #[tokio::test]
        async fn test_click_by_waits_for_clickable() {
            let driver = Arc::new(MockDriver::new());
            let element = ElementHandle::new("a1", "a");
            driver.mark_unclickable(&element);

            let page = page_over(Arc::clone(&driver));
            let result = page.click_by(&element).await;
            assert!(matches!(result, Err(VitrinaError::Timeout { .. })));
            assert!(!driver.was_called("click:a1"));
        }
    }
}
