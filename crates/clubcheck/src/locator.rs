//! Locator abstraction for element selection.
//!
//! A [`Locator`] is an immutable "how to find it" rule. It is built once per
//! page object and reused for every lookup; it never owns a DOM node.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategy + selector for finding page elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum Locator {
    /// Element `id` attribute (e.g. `username`)
    Id(String),
    /// CSS selector, possibly a selector list (e.g. `.modal, .confirm-dialog`)
    Css(String),
}

impl Locator {
    /// Create an id locator
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Create a CSS locator
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Raw selector value without the strategy
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Id(v) | Self::Css(v) => v,
        }
    }

    /// CSS form of this locator, usable with `querySelectorAll`.
    ///
    /// Ids go through an attribute selector so ids with characters that are
    /// not valid in `#ident` (digits first, dots, non-ASCII) still match.
    #[must_use]
    pub fn to_css(&self) -> String {
        match self {
            Self::Id(id) => {
                let escaped = id.replace('\\', "\\\\").replace('"', "\\\"");
                format!("[id=\"{escaped}\"]")
            }
            Self::Css(css) => css.clone(),
        }
    }

    /// JavaScript expression evaluating to the `NodeList` of all matches
    #[must_use]
    pub fn to_query_all(&self) -> String {
        let literal = serde_json::to_string(&self.to_css()).unwrap_or_else(|_| "\"\"".into());
        format!("document.querySelectorAll({literal})")
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "By.id({id})"),
            Self::Css(css) => write!(f, "By.css({css})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod locator_tests {
        use super::*;

        #[test]
        fn test_constructors() {
            assert_eq!(Locator::id("username"), Locator::Id("username".into()));
            assert_eq!(Locator::css(".modal"), Locator::Css(".modal".into()));
        }

        #[test]
        fn test_to_css_for_id() {
            assert_eq!(Locator::id("loginBtn").to_css(), "[id=\"loginBtn\"]");
        }

        #[test]
        fn test_to_css_passthrough() {
            let loc = Locator::css(".btn-save, button[type=\"submit\"]");
            assert_eq!(loc.to_css(), ".btn-save, button[type=\"submit\"]");
        }

        #[test]
        fn test_id_quotes_are_escaped() {
            assert_eq!(Locator::id("a\"b").to_css(), "[id=\"a\\\"b\"]");
        }

        #[test]
        fn test_query_all_is_a_js_string_literal() {
            let q = Locator::css("a[href*=\"đk.html\"]").to_query_all();
            assert_eq!(q, "document.querySelectorAll(\"a[href*=\\\"đk.html\\\"]\")");
        }

        #[test]
        fn test_display() {
            assert_eq!(Locator::id("message").to_string(), "By.id(message)");
            assert_eq!(Locator::css(".order-item").to_string(), "By.css(.order-item)");
        }

        #[test]
        fn test_serde_tagging() {
            let json = serde_json::to_string(&Locator::id("age")).unwrap();
            assert_eq!(json, r#"{"by":"id","value":"age"}"#);
            let back: Locator = serde_json::from_str(&json).unwrap();
            assert_eq!(back, Locator::id("age"));
        }
    }

    proptest! {
        #[test]
        fn prop_display_mentions_selector(s in "[a-zA-Z0-9_.#-]{1,24}") {
            prop_assert!(Locator::css(s.clone()).to_string().contains(&s));
            prop_assert!(Locator::id(s.clone()).to_string().contains(&s));
        }

        #[test]
        fn prop_value_is_selector(s in "\\PC{0,32}") {
            let loc = Locator::id(s.clone());
            prop_assert_eq!(loc.value(), s.as_str());
        }
    }
}
