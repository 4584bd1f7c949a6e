//! Storefront home page object.
//!
//! Models the main page of the demo shop: four product listings (sales, new
//! arrivals, the promo poster, recently viewed) plus the catalog captions.
//! Every navigation action follows the same shape: wait for the section's
//! elements, index into them, scroll the chosen one into view, capture its
//! display title through a scoped sub-lookup, then click through and bind a
//! [`ProductPage`] to the landing page.

use crate::base_page::{capitalize, BasePage};
use crate::driver::ElementHandle;
use crate::locator::Locator;
use crate::product_page::ProductPage;
use crate::result::{VitrinaError, VitrinaResult};
use crate::session::Session;

/// Title identifying the storefront home page
pub const MAIN_PAGE_TITLE: &str = "Skillbox — Интернет магазин";

mod locators {
    use crate::locator::Locator;

    pub(super) fn catalogs() -> Locator {
        Locator::xpath("(//div[contains(@class,'caption wow')])")
    }

    pub(super) fn sales_products() -> Locator {
        Locator::css("aside#accesspress_store_product-2>ul>div>div>li")
    }

    pub(super) fn new_arrivals_products() -> Locator {
        Locator::css("aside#accesspress_store_product-3>ul>div>div>li")
    }

    pub(super) fn poster() -> Locator {
        Locator::id("accesspress_store_full_promo-2")
    }

    pub(super) fn viewed_products() -> Locator {
        Locator::xpath("//aside[@id='woocommerce_recently_viewed_products-2']//li")
    }

    // The poster buttons share one class; the position picks the visible one.
    pub(super) fn promo_button(position: usize) -> Locator {
        Locator::xpath(format!("(//span[@class='btn promo-link-btn'])[{position}]"))
    }
}

/// Result of a navigation action: the page object for the landing page plus
/// the display text captured before navigating away
#[derive(Debug)]
pub struct NavigationResult<'a> {
    /// Page object bound to the landing page
    pub page: ProductPage<'a>,
    /// Title captured on the page that navigated here
    pub title: String,
}

/// The storefront home page
#[derive(Debug)]
pub struct MainPage<'a> {
    session: &'a Session,
}

impl<'a> MainPage<'a> {
    /// Bind to the session, failing fast when it is not on the home page.
    pub async fn attach(session: &'a Session) -> VitrinaResult<Self> {
        let title = session.driver().title().await?;
        if title != MAIN_PAGE_TITLE {
            let url = session.driver().current_url().await?;
            return Err(VitrinaError::PageMismatch {
                expected: MAIN_PAGE_TITLE.to_string(),
                url,
            });
        }
        Ok(Self { session })
    }

    /// Pick one of the catalog captions and return it with its heading text.
    ///
    /// Three captions are visible on the page. Panics if `position` is out
    /// of range of the current matches.
    pub async fn catalog_and_title(
        &self,
        position: usize,
    ) -> VitrinaResult<(ElementHandle, String)> {
        let step = self.session.step("Get catalogs");
        let catalogs = self.wait_for_elements(&locators::catalogs()).await?;
        step.complete();

        let step = self.session.step("Choose a catalog");
        let catalog = catalogs[position].clone();
        step.complete();

        let step = self.session.step("Read the catalog heading");
        let heading = self
            .element_within(&catalog, &Locator::tag_name("h4"))
            .await?;
        let title = capitalize(&self.session.driver().text(&heading).await?);
        step.complete();

        Ok((catalog, title))
    }

    /// Open a product card from the sales section.
    ///
    /// Sixteen cards exist in the markup but only the visible ones can be
    /// clicked. Panics if `position` is out of range of the current matches.
    pub async fn go_to_product_from_sales_section(
        &self,
        position: usize,
    ) -> VitrinaResult<NavigationResult<'a>> {
        self.product_from_listing("sales section", &locators::sales_products(), position)
            .await
    }

    /// Open a product card from the new arrivals section.
    ///
    /// Panics if `position` is out of range of the current matches.
    pub async fn go_to_product_from_new_arrivals_section(
        &self,
        position: usize,
    ) -> VitrinaResult<NavigationResult<'a>> {
        self.product_from_listing(
            "new arrivals section",
            &locators::new_arrivals_products(),
            position,
        )
        .await
    }

    /// Open the product promoted on the poster.
    pub async fn go_to_product_from_poster_section(&self) -> VitrinaResult<NavigationResult<'a>> {
        let step = self.session.step("Get the poster and scroll to it");
        let poster = self.wait_for_element(&locators::poster()).await?;
        self.scroll_to(&poster).await;
        step.complete();

        let step = self.session.step("Read the promoted product title");
        let caption = self
            .element_within(&poster, &Locator::class_name("promo-desc-title"))
            .await?;
        let title = self.session.driver().text(&caption).await?;
        step.complete();

        let step = self.session.step("Click the promo button");
        let button = self.wait_for_element(&locators::promo_button(4)).await?;
        self.click_by(&button).await?;
        step.complete();

        let page = ProductPage::attach(self.session, &title).await?;
        Ok(NavigationResult { page, title })
    }

    /// Open a product card from the recently viewed section.
    ///
    /// The section only renders after something was browsed, so its absence
    /// is an expected outcome rather than a failure: when the lookup times
    /// out the condition is logged and the result carries an empty title.
    /// Panics if the section is present and `position` is out of range.
    pub async fn go_to_viewed_product(
        &self,
        position: usize,
    ) -> VitrinaResult<NavigationResult<'a>> {
        let mut title = String::new();

        let step = self.session.step("Get products from viewed section");
        let outcome = self
            .wait_for_elements_opt(&locators::viewed_products())
            .await?;
        step.complete();

        match outcome {
            Some(products) => {
                let step = self.session.step("Scroll the chosen product into view");
                let product = &products[position];
                self.scroll_to(product).await;
                step.complete();

                let step = self.session.step("Read the product title");
                let caption = self
                    .element_within(product, &Locator::tag_name("span"))
                    .await?;
                title = self.session.driver().text(&caption).await?;
                step.complete();

                let step = self.session.step("Follow the product link");
                let link = self
                    .element_within(product, &Locator::tag_name("a"))
                    .await?;
                self.click_by(&link).await?;
                step.complete();
            }
            None => {
                tracing::warn!("cannot find the viewed products block, returning an empty title");
            }
        }

        let page = ProductPage::attach(self.session, &title).await?;
        Ok(NavigationResult { page, title })
    }

    /// Shared body of the sales/new-arrivals navigations: the listings only
    /// differ in their section locator.
    async fn product_from_listing(
        &self,
        section_name: &str,
        section: &Locator,
        position: usize,
    ) -> VitrinaResult<NavigationResult<'a>> {
        let step = self.session.step(format!("Get products from {section_name}"));
        let products = self.wait_for_elements(section).await?;
        step.complete();

        let step = self.session.step("Scroll the chosen product into view");
        let product = &products[position];
        self.scroll_to(product).await;
        step.complete();

        let step = self.session.step("Read the product title");
        let anchor = self
            .element_within(product, &Locator::tag_name("a"))
            .await?;
        let title = self
            .session
            .driver()
            .attribute(&anchor, "title")
            .await?
            .unwrap_or_default();
        step.complete();

        let step = self.session.step("Open the product card");
        self.session.driver().click(product).await?;
        step.complete();

        let page = ProductPage::attach(self.session, &title).await?;
        Ok(NavigationResult { page, title })
    }
}

impl BasePage for MainPage<'_> {
    fn session(&self) -> &Session {
        self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MockDriver;
    use crate::session::SessionConfig;
    use std::sync::Arc;
    use std::time::Duration;

    const PRODUCT_TITLE: &str = "Чехол для телефона";
    const PRODUCT_PAGE_TITLE: &str = "Чехол для телефона — Skillbox — Интернет магазин";

    fn storefront() -> Arc<MockDriver> {
        let driver = Arc::new(MockDriver::new());
        driver.set_page(MAIN_PAGE_TITLE, "http://shop.test/");
        driver
    }

    fn session_over(driver: Arc<MockDriver>) -> Session {
        let config = SessionConfig::new()
            .with_implicit_wait(Duration::from_millis(60))
            .with_poll_interval(Duration::from_millis(5));
        Session::new(driver, config)
    }

    /// Stage a listing section with one product card whose anchor carries
    /// the display title, clicking through to the product page.
    fn stage_listing(driver: &MockDriver, section: &Locator) -> ElementHandle {
        let card = ElementHandle::new("card-1", "li");
        driver.stage_elements(section, vec![card.clone()]);

        let anchor = ElementHandle::new("card-1-link", "a");
        driver.stage_child(&card, &Locator::tag_name("a"), anchor.clone());
        driver.set_attribute(&anchor, "title", PRODUCT_TITLE);
        driver.transition_on_click(&card, PRODUCT_PAGE_TITLE, "http://shop.test/product/case/");
        card
    }

    mod attach_tests {
        use super::*;

        #[tokio::test]
        async fn test_attach_on_home_page() {
            let driver = storefront();
            let session = session_over(driver);
            assert!(MainPage::attach(&session).await.is_ok());
        }

        #[tokio::test]
        async fn test_attach_elsewhere_is_a_mismatch() {
            let driver = Arc::new(MockDriver::new());
            driver.set_page("Корзина — Skillbox", "http://shop.test/cart/");

            let session = session_over(driver);
            match MainPage::attach(&session).await {
                Err(VitrinaError::PageMismatch { url, expected }) => {
                    assert_eq!(url, "http://shop.test/cart/");
                    assert_eq!(expected, MAIN_PAGE_TITLE);
                }
                other => panic!("expected page mismatch, got {other:?}"),
            }
        }
    }

    mod catalog_tests {
        use super::*;

        #[tokio::test]
        async fn test_catalog_title_is_capitalized() {
            let driver = storefront();
            let catalog = ElementHandle::new("cat-1", "div");
            driver.stage_elements(&locators::catalogs(), vec![catalog.clone()]);
            let heading = ElementHandle::new("cat-1-h4", "h4");
            driver.stage_child(&catalog, &Locator::tag_name("h4"), heading.clone());
            driver.set_text(&heading, "ХОЛОДИЛЬНИКИ");

            let session = session_over(driver);
            let main = MainPage::attach(&session).await.unwrap();
            let (chosen, title) = main.catalog_and_title(0).await.unwrap();
            assert_eq!(chosen.id, "cat-1");
            assert_eq!(title, "Холодильники");
        }
    }

    mod listing_tests {
        use super::*;

        #[tokio::test]
        async fn test_sales_navigation_end_to_end() {
            let driver = storefront();
            stage_listing(&driver, &locators::sales_products());

            let session = session_over(Arc::clone(&driver));
            let main = MainPage::attach(&session).await.unwrap();
            let nav = main.go_to_product_from_sales_section(0).await.unwrap();

            assert_eq!(nav.title, PRODUCT_TITLE);
            assert!(!nav.title.is_empty());
            assert_eq!(nav.page.expected_title(), PRODUCT_TITLE);
            assert!(driver.was_called("click:card-1"));
            assert!(driver.was_called("scroll:card-1"));

            let steps = session.steps().step_names();
            assert!(steps.contains(&"Get products from sales section".to_string()));
            assert!(steps.contains(&"Open the product card".to_string()));
        }

        #[tokio::test]
        async fn test_new_arrivals_navigation() {
            let driver = storefront();
            stage_listing(&driver, &locators::new_arrivals_products());

            let session = session_over(driver);
            let main = MainPage::attach(&session).await.unwrap();
            let nav = main
                .go_to_product_from_new_arrivals_section(0)
                .await
                .unwrap();
            assert_eq!(nav.title, PRODUCT_TITLE);
        }

        #[tokio::test]
        #[should_panic(expected = "index out of bounds")]
        async fn test_out_of_range_position_panics() {
            let driver = storefront();
            stage_listing(&driver, &locators::sales_products());

            let session = session_over(driver);
            let main = MainPage::attach(&session).await.unwrap();
            let _ = main.go_to_product_from_sales_section(5).await;
        }

        #[tokio::test]
        async fn test_missing_anchor_marks_step_failed() {
            let driver = storefront();
            // card without a staged anchor child
            driver.stage_elements(
                &locators::sales_products(),
                vec![ElementHandle::new("card-1", "li")],
            );

            let session = session_over(driver);
            let main = MainPage::attach(&session).await.unwrap();
            let result = main.go_to_product_from_sales_section(0).await;
            assert!(matches!(result, Err(VitrinaError::ElementNotFound { .. })));

            let report = session.steps().report();
            assert_eq!(report.failed_count(), 1);
        }
    }

    mod poster_tests {
        use super::*;

        #[tokio::test]
        async fn test_poster_navigation() {
            let driver = storefront();
            let poster = ElementHandle::new("promo", "aside");
            driver.stage_elements(&locators::poster(), vec![poster.clone()]);

            let caption = ElementHandle::new("promo-title", "div");
            driver.stage_child(&poster, &Locator::class_name("promo-desc-title"), caption.clone());
            driver.set_text(&caption, PRODUCT_TITLE);

            let button = ElementHandle::new("promo-btn", "span");
            driver.stage_elements(&locators::promo_button(4), vec![button.clone()]);
            driver.transition_on_click(&button, PRODUCT_PAGE_TITLE, "http://shop.test/product/case/");

            let session = session_over(driver);
            let main = MainPage::attach(&session).await.unwrap();
            let nav = main.go_to_product_from_poster_section().await.unwrap();
            assert_eq!(nav.title, PRODUCT_TITLE);
            assert_eq!(nav.page.expected_title(), PRODUCT_TITLE);
        }
    }

    mod viewed_tests {
        use super::*;

        fn init_tracing() {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .with_test_writer()
                .try_init();
        }

        #[tokio::test]
        async fn test_absent_section_yields_empty_title() {
            init_tracing();
            let driver = storefront();
            let session = session_over(driver);
            let main = MainPage::attach(&session).await.unwrap();

            let nav = main.go_to_viewed_product(0).await.unwrap();
            assert_eq!(nav.title, "");
            assert_eq!(nav.page.expected_title(), "");
        }

        #[tokio::test]
        async fn test_present_section_navigates() {
            let driver = storefront();
            let card = ElementHandle::new("viewed-1", "li");
            driver.stage_elements(&locators::viewed_products(), vec![card.clone()]);

            let caption = ElementHandle::new("viewed-1-span", "span");
            driver.stage_child(&card, &Locator::tag_name("span"), caption.clone());
            driver.set_text(&caption, PRODUCT_TITLE);

            let link = ElementHandle::new("viewed-1-link", "a");
            driver.stage_child(&card, &Locator::tag_name("a"), link.clone());
            driver.transition_on_click(&link, PRODUCT_PAGE_TITLE, "http://shop.test/product/case/");

            let session = session_over(Arc::clone(&driver));
            let main = MainPage::attach(&session).await.unwrap();
            let nav = main.go_to_viewed_product(0).await.unwrap();

            assert_eq!(nav.title, PRODUCT_TITLE);
            assert!(driver.was_called("click:viewed-1-link"));
        }
    }
}
