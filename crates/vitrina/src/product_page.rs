//! Product detail page object.

use crate::base_page::BasePage;
use crate::locator::Locator;
use crate::result::{VitrinaError, VitrinaResult};
use crate::session::Session;

/// A product card page, constructed with the title captured on the page that
/// navigated here.
///
/// The storefront embeds the product name in the page title, so attaching
/// verifies the session really landed on the expected card. An empty
/// expected title attaches without verification; that is the contract of the
/// lenient recently-viewed flow, which builds its result even when the
/// section never appeared.
#[derive(Debug)]
pub struct ProductPage<'a> {
    session: &'a Session,
    expected_title: String,
}

impl<'a> ProductPage<'a> {
    /// Bind to the session, failing fast when the current page title does
    /// not contain the expected product title.
    pub async fn attach(session: &'a Session, expected_title: &str) -> VitrinaResult<Self> {
        let title = session.driver().title().await?;
        if !title.contains(expected_title) {
            let url = session.driver().current_url().await?;
            return Err(VitrinaError::PageMismatch {
                expected: expected_title.to_string(),
                url,
            });
        }
        Ok(Self {
            session,
            expected_title: expected_title.to_string(),
        })
    }

    /// The product title this page was constructed with
    #[must_use]
    pub fn expected_title(&self) -> &str {
        &self.expected_title
    }

    /// The product name shown in the card's heading
    pub async fn heading(&self) -> VitrinaResult<String> {
        let heading = self
            .wait_for_element(&Locator::css("h1.product_title"))
            .await?;
        self.session().driver().text(&heading).await
    }
}

impl BasePage for ProductPage<'_> {
    fn session(&self) -> &Session {
        self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{ElementHandle, MockDriver};
    use crate::session::SessionConfig;
    use std::sync::Arc;
    use std::time::Duration;

    fn session_over(driver: Arc<MockDriver>) -> Session {
        let config = SessionConfig::new()
            .with_implicit_wait(Duration::from_millis(60))
            .with_poll_interval(Duration::from_millis(5));
        Session::new(driver, config)
    }

    #[tokio::test]
    async fn test_attach_on_matching_card() {
        let driver = Arc::new(MockDriver::new());
        driver.set_page(
            "Чехол для телефона — Skillbox — Интернет магазин",
            "http://shop.test/product/phone-case/",
        );

        let session = session_over(driver);
        let page = ProductPage::attach(&session, "Чехол для телефона")
            .await
            .unwrap();
        assert_eq!(page.expected_title(), "Чехол для телефона");
    }

    #[tokio::test]
    async fn test_attach_on_wrong_page_carries_url() {
        let driver = Arc::new(MockDriver::new());
        driver.set_page("Корзина — Skillbox", "http://shop.test/cart/");

        let session = session_over(driver);
        let result = ProductPage::attach(&session, "Чехол для телефона").await;
        match result {
            Err(VitrinaError::PageMismatch { url, .. }) => {
                assert_eq!(url, "http://shop.test/cart/");
            }
            other => panic!("expected page mismatch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_expected_title_attaches_anywhere() {
        let driver = Arc::new(MockDriver::new());
        driver.set_page("Skillbox — Интернет магазин", "http://shop.test/");

        let session = session_over(driver);
        let page = ProductPage::attach(&session, "").await.unwrap();
        assert_eq!(page.expected_title(), "");
    }

    #[tokio::test]
    async fn test_heading_reads_card_header() {
        let driver = Arc::new(MockDriver::new());
        driver.set_page(
            "Чехол для телефона — Skillbox — Интернет магазин",
            "http://shop.test/product/phone-case/",
        );
        let heading = ElementHandle::new("h1", "h1");
        driver.stage_elements(&Locator::css("h1.product_title"), vec![heading.clone()]);
        driver.set_text(&heading, "Чехол для телефона");

        let session = session_over(driver);
        let page = ProductPage::attach(&session, "Чехол для телефона")
            .await
            .unwrap();
        assert_eq!(page.heading().await.unwrap(), "Чехол для телефона");
    }
}
