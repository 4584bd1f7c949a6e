//! Vitrina: page-object UI test suite for the storefront demo shop.
//!
//! The suite clicks through an e-commerce storefront (catalog browsing,
//! product navigation, login/logout) and asserts expected page states.
//! Page objects never talk to a concrete automation library; everything
//! goes through the [`Driver`] capability, with a scripted in-memory
//! implementation as the default test backend and a chromium/CDP backend
//! behind the `browser` feature.
//!
//! ```text
//! ┌────────────┐    ┌──────────────┐    ┌───────────────────────┐
//! │ Test       │    │ Page objects │    │ Driver                │
//! │ (fixtures) │───►│ MainPage,    │───►│ MockDriver (default)  │
//! │            │    │ ProductPage  │    │ ChromiumDriver (CDP)  │
//! └────────────┘    └──────────────┘    └───────────────────────┘
//! ```
//!
//! A fixture opens one [`Session`] per test module; page objects bind to it
//! via `attach`, which fails fast when the session is not on the expected
//! page, so every page object a navigation returns is known to be valid at
//! the moment of return.

#![warn(missing_docs)]

mod base_page;
mod config;
mod driver;
mod fixture;
mod locator;
mod main_page;
mod product_page;
mod report;
mod result;
mod session;
mod wait;

/// Real browser backend (launch configuration; CDP driver behind the
/// `browser` feature)
pub mod browser;

pub use base_page::BasePage;
pub use config::{Config, Credentials, DEFAULT_ACCOUNT};
pub use driver::{Driver, ElementHandle, MockDriver};
pub use fixture::{login, logout, BrowserFixture, Fixture, FixtureScope};
pub use locator::{Locator, Strategy};
pub use main_page::{MainPage, NavigationResult, MAIN_PAGE_TITLE};
pub use product_page::ProductPage;
pub use report::{RunReport, Step, StepEntry, StepRecorder, StepStatus};
pub use result::{VitrinaError, VitrinaResult};
pub use session::{Session, SessionConfig};
pub use wait::{WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};

#[cfg(feature = "browser")]
pub use browser::ChromiumDriver;
