//! Locator abstraction for element lookup.
//!
//! A locator is an immutable (strategy, selector) pair. Selectors are fixed
//! constants per page; the only runtime computation is string interpolation
//! for indexed variants such as the Nth promo button.

use std::fmt;

/// Lookup strategy for a locator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// CSS selector (e.g. `aside#promo>ul>li`)
    Css,
    /// XPath expression
    XPath,
    /// Element id attribute
    Id,
    /// Element name attribute
    Name,
    /// Tag name (e.g. `a`, `h4`)
    TagName,
    /// Single class name
    ClassName,
    /// Exact anchor text
    LinkText,
}

impl Strategy {
    /// Short name used in error messages
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::XPath => "xpath",
            Self::Id => "id",
            Self::Name => "name",
            Self::TagName => "tag",
            Self::ClassName => "class",
            Self::LinkText => "link text",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable (strategy, selector) pair identifying how to find an element
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    strategy: Strategy,
    selector: String,
}

impl Locator {
    /// Create a locator with an explicit strategy
    #[must_use]
    pub fn new(strategy: Strategy, selector: impl Into<String>) -> Self {
        Self {
            strategy,
            selector: selector.into(),
        }
    }

    /// Create a CSS locator
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::new(Strategy::Css, selector)
    }

    /// Create an XPath locator
    #[must_use]
    pub fn xpath(selector: impl Into<String>) -> Self {
        Self::new(Strategy::XPath, selector)
    }

    /// Create a locator by element id
    #[must_use]
    pub fn id(selector: impl Into<String>) -> Self {
        Self::new(Strategy::Id, selector)
    }

    /// Create a locator by name attribute
    #[must_use]
    pub fn name(selector: impl Into<String>) -> Self {
        Self::new(Strategy::Name, selector)
    }

    /// Create a locator by tag name
    #[must_use]
    pub fn tag_name(selector: impl Into<String>) -> Self {
        Self::new(Strategy::TagName, selector)
    }

    /// Create a locator by class name
    #[must_use]
    pub fn class_name(selector: impl Into<String>) -> Self {
        Self::new(Strategy::ClassName, selector)
    }

    /// Create a locator by exact anchor text
    #[must_use]
    pub fn link_text(selector: impl Into<String>) -> Self {
        Self::new(Strategy::LinkText, selector)
    }

    /// Get the strategy
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Get the selector string
    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// JavaScript expression evaluating to an array of all matches under
    /// `document`
    #[must_use]
    pub fn to_js_array(&self) -> String {
        self.to_js_array_from("document")
    }

    /// JavaScript expression evaluating to an array of all matches under the
    /// given root expression (an element or `document`)
    #[must_use]
    pub fn to_js_array_from(&self, root: &str) -> String {
        let sel = &self.selector;
        match self.strategy {
            Strategy::Css => format!("Array.from({root}.querySelectorAll({sel:?}))"),
            Strategy::XPath => format!(
                "(() => {{ const out = []; const it = document.evaluate({sel:?}, {root}, null, \
                 XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); \
                 for (let i = 0; i < it.snapshotLength; i += 1) {{ out.push(it.snapshotItem(i)); }} \
                 return out; }})()"
            ),
            Strategy::Id => format!("Array.from({root}.querySelectorAll('[id={sel:?}]'))"),
            Strategy::Name => format!("Array.from({root}.querySelectorAll('[name={sel:?}]'))"),
            Strategy::TagName => format!("Array.from({root}.getElementsByTagName({sel:?}))"),
            Strategy::ClassName => format!("Array.from({root}.getElementsByClassName({sel:?}))"),
            Strategy::LinkText => format!(
                "Array.from({root}.querySelectorAll(\"a\")).filter((a) => a.textContent.trim() === {sel:?})"
            ),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.strategy, self.selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod constructor_tests {
        use super::*;

        #[test]
        fn test_css_locator() {
            let locator = Locator::css("aside#promo>ul>li");
            assert_eq!(locator.strategy(), Strategy::Css);
            assert_eq!(locator.selector(), "aside#promo>ul>li");
        }

        #[test]
        fn test_link_text_locator() {
            let locator = Locator::link_text("Войти");
            assert_eq!(locator.strategy(), Strategy::LinkText);
            assert_eq!(locator.selector(), "Войти");
        }

        #[test]
        fn test_display() {
            let locator = Locator::id("username");
            assert_eq!(locator.to_string(), "id 'username'");
        }
    }

    mod js_translation_tests {
        use super::*;

        #[test]
        fn test_css_query() {
            let js = Locator::css("li.product").to_js_array();
            assert!(js.contains("document.querySelectorAll"));
            assert!(js.contains("li.product"));
        }

        #[test]
        fn test_xpath_query() {
            let js = Locator::xpath("//aside//li").to_js_array();
            assert!(js.contains("document.evaluate"));
            assert!(js.contains("ORDERED_NODE_SNAPSHOT_TYPE"));
        }

        #[test]
        fn test_scoped_query_uses_root() {
            let js = Locator::tag_name("a").to_js_array_from("reg.els[\"e1\"]");
            assert!(js.contains("reg.els[\"e1\"].getElementsByTagName"));
        }

        #[test]
        fn test_link_text_query_filters_anchors() {
            let js = Locator::link_text("Выйти").to_js_array();
            assert!(js.contains("querySelectorAll(\"a\")"));
            assert!(js.contains("textContent.trim()"));
        }
    }

    mod key_tests {
        use super::*;
        use std::collections::HashMap;

        #[test]
        fn test_locator_usable_as_map_key() {
            let mut staged: HashMap<Locator, usize> = HashMap::new();
            staged.insert(Locator::css("li"), 3);
            assert_eq!(staged.get(&Locator::css("li")), Some(&3));
            assert_eq!(staged.get(&Locator::tag_name("li")), None);
        }
    }
}
