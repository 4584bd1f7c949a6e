//! Abstract browser-automation capability.
//!
//! Page objects never talk to a concrete automation library; they go through
//! the [`Driver`] trait, which carries exactly the operations the suite
//! needs: navigation, page identity, element lookup (flat and scoped),
//! element interaction, script execution, and teardown. Implementations:
//!
//! - [`MockDriver`]: a scripted in-memory page, the default test backend
//! - `ChromiumDriver` (feature `browser`): CDP via chromiumoxide

use crate::locator::Locator;
use crate::result::{VitrinaError, VitrinaResult};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Handle to an element located by a driver.
///
/// The id is backend-scoped and only meaningful to the driver that produced
/// it. The tag name is filled in when the backend reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    /// Backend-scoped element id
    pub id: String,
    /// Element tag name, when the backend reports it
    pub tag_name: Option<String>,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: Some(tag_name.into()),
        }
    }

    /// Create a handle whose backend does not report tag names
    #[must_use]
    pub fn anonymous(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: None,
        }
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag_name {
            Some(tag) => write!(f, "<{tag} #{}>", self.id),
            None => write!(f, "<#{}>", self.id),
        }
    }
}

/// Abstract driver trait for browser automation.
///
/// All receivers are `&self`; implementations use interior mutability so a
/// single session can be shared by successive page objects.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Navigate to a URL
    async fn navigate(&self, url: &str) -> VitrinaResult<()>;

    /// Current page title
    async fn title(&self) -> VitrinaResult<String>;

    /// Current page URL
    async fn current_url(&self) -> VitrinaResult<String>;

    /// Execute JavaScript in the page context
    async fn execute_js(&self, script: &str) -> VitrinaResult<serde_json::Value>;

    /// All elements currently matching the locator, in DOM order
    async fn find_elements(&self, locator: &Locator) -> VitrinaResult<Vec<ElementHandle>>;

    /// First element matching the locator inside the parent's subtree
    async fn find_in(
        &self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> VitrinaResult<Option<ElementHandle>>;

    /// Visible text of an element
    async fn text(&self, element: &ElementHandle) -> VitrinaResult<String>;

    /// Attribute value of an element
    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> VitrinaResult<Option<String>>;

    /// Click an element
    async fn click(&self, element: &ElementHandle) -> VitrinaResult<()>;

    /// Whether the element is currently clickable (visible and enabled)
    async fn is_clickable(&self, element: &ElementHandle) -> VitrinaResult<bool>;

    /// Bring an element into the viewport
    async fn scroll_into_view(&self, element: &ElementHandle) -> VitrinaResult<()>;

    /// Type text into an element
    async fn type_text(&self, element: &ElementHandle, text: &str) -> VitrinaResult<()>;

    /// Close the underlying browser/session
    async fn close(&self) -> VitrinaResult<()>;
}

/// Scripted in-memory driver for tests without a real browser.
///
/// Pages are staged up front: element lists per locator, scoped children per
/// (parent, locator), text and attribute tables, and click transitions that
/// swap the page title/URL the way a real navigation would. Every trait call
/// is appended to a history for verification.
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

#[derive(Debug, Default)]
struct MockState {
    title: String,
    url: String,
    elements: HashMap<Locator, Vec<ElementHandle>>,
    children: HashMap<(String, Locator), ElementHandle>,
    texts: HashMap<String, String>,
    attributes: HashMap<(String, String), String>,
    transitions: HashMap<String, (String, String)>,
    typed: HashMap<String, String>,
    unclickable: HashSet<String>,
    failing_scrolls: HashSet<String>,
    script_results: Vec<serde_json::Value>,
    calls: Vec<String>,
}

impl MockDriver {
    /// Create a new mock driver on a blank page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the current page title and URL
    pub fn set_page(&self, title: impl Into<String>, url: impl Into<String>) {
        let mut state = self.state();
        state.title = title.into();
        state.url = url.into();
    }

    /// Stage the elements a locator resolves to
    pub fn stage_elements(&self, locator: &Locator, elements: Vec<ElementHandle>) {
        self.state().elements.insert(locator.clone(), elements);
    }

    /// Stage a child element inside a parent's subtree
    pub fn stage_child(&self, parent: &ElementHandle, locator: &Locator, child: ElementHandle) {
        self.state()
            .children
            .insert((parent.id.clone(), locator.clone()), child);
    }

    /// Set the visible text of an element
    pub fn set_text(&self, element: &ElementHandle, text: impl Into<String>) {
        self.state().texts.insert(element.id.clone(), text.into());
    }

    /// Set an attribute of an element
    pub fn set_attribute(
        &self,
        element: &ElementHandle,
        name: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.state()
            .attributes
            .insert((element.id.clone(), name.into()), value.into());
    }

    /// Make clicking the element navigate to a new page title/URL
    pub fn transition_on_click(
        &self,
        element: &ElementHandle,
        title: impl Into<String>,
        url: impl Into<String>,
    ) {
        self.state()
            .transitions
            .insert(element.id.clone(), (title.into(), url.into()));
    }

    /// Mark an element as not clickable
    pub fn mark_unclickable(&self, element: &ElementHandle) {
        self.state().unclickable.insert(element.id.clone());
    }

    /// Make scrolling to the element fail
    pub fn fail_scroll_for(&self, element: &ElementHandle) {
        self.state().failing_scrolls.insert(element.id.clone());
    }

    /// Queue a result for the next script execution
    pub fn push_script_result(&self, value: serde_json::Value) {
        self.state().script_results.push(value);
    }

    /// Text typed into an element so far
    #[must_use]
    pub fn typed_into(&self, element: &ElementHandle) -> Option<String> {
        self.state().typed.get(&element.id).cloned()
    }

    /// Recorded call history
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    /// Check if an operation was recorded
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.state().calls.iter().any(|c| c.starts_with(prefix))
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn navigate(&self, url: &str) -> VitrinaResult<()> {
        let mut state = self.state();
        state.calls.push(format!("navigate:{url}"));
        state.url = url.to_string();
        Ok(())
    }

    async fn title(&self) -> VitrinaResult<String> {
        Ok(self.state().title.clone())
    }

    async fn current_url(&self) -> VitrinaResult<String> {
        Ok(self.state().url.clone())
    }

    async fn execute_js(&self, script: &str) -> VitrinaResult<serde_json::Value> {
        let mut state = self.state();
        state.calls.push(format!("execute_js:{script}"));
        if state.script_results.is_empty() {
            Ok(serde_json::Value::Null)
        } else {
            Ok(state.script_results.remove(0))
        }
    }

    async fn find_elements(&self, locator: &Locator) -> VitrinaResult<Vec<ElementHandle>> {
        let mut state = self.state();
        state.calls.push(format!("find_elements:{locator}"));
        Ok(state.elements.get(locator).cloned().unwrap_or_default())
    }

    async fn find_in(
        &self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> VitrinaResult<Option<ElementHandle>> {
        let state = self.state();
        Ok(state
            .children
            .get(&(parent.id.clone(), locator.clone()))
            .cloned())
    }

    async fn text(&self, element: &ElementHandle) -> VitrinaResult<String> {
        Ok(self
            .state()
            .texts
            .get(&element.id)
            .cloned()
            .unwrap_or_default())
    }

    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> VitrinaResult<Option<String>> {
        Ok(self
            .state()
            .attributes
            .get(&(element.id.clone(), name.to_string()))
            .cloned())
    }

    async fn click(&self, element: &ElementHandle) -> VitrinaResult<()> {
        let mut state = self.state();
        state.calls.push(format!("click:{}", element.id));
        if let Some((title, url)) = state.transitions.get(&element.id).cloned() {
            state.title = title;
            state.url = url;
        }
        Ok(())
    }

    async fn is_clickable(&self, element: &ElementHandle) -> VitrinaResult<bool> {
        Ok(!self.state().unclickable.contains(&element.id))
    }

    async fn scroll_into_view(&self, element: &ElementHandle) -> VitrinaResult<()> {
        let mut state = self.state();
        state.calls.push(format!("scroll:{}", element.id));
        if state.failing_scrolls.contains(&element.id) {
            return Err(VitrinaError::Session {
                message: format!("cannot scroll to element '{}'", element.id),
            });
        }
        Ok(())
    }

    async fn type_text(&self, element: &ElementHandle, text: &str) -> VitrinaResult<()> {
        let mut state = self.state();
        state.calls.push(format!("type:{}", element.id));
        state.typed.insert(element.id.clone(), text.to_string());
        Ok(())
    }

    async fn close(&self) -> VitrinaResult<()> {
        self.state().calls.push("close".to_string());
        Ok(())
    }
}
