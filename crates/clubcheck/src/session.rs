//! Session - abstract browser connection
//!
//! Everything above this trait talks to the browser only through it. Two
//! implementations exist:
//!
//! - `CdpSession` - real Chromium over the DevTools protocol (`browser` feature)
//! - [`MockSession`](crate::MockSession) - scripted DOM for unit and scenario tests
//!
//! Element access is by [`ElementHandle`], which is just "the Nth current match
//! of this locator". Implementations must re-resolve it on every call, so a
//! handle taken before a DOM change either hits the current node or fails
//! with [`ClubError::StaleElement`](crate::ClubError::StaleElement).

use crate::dialog::DialogHandle;
use crate::locator::Locator;
use crate::result::ClubResult;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::path::Path;

/// Ownership-free reference to the Nth node matching a locator
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle {
    locator: Locator,
    index: usize,
}

impl ElementHandle {
    /// Create a handle for match `index` of `locator`
    #[must_use]
    pub const fn new(locator: Locator, index: usize) -> Self {
        Self { locator, index }
    }

    /// Locator the handle resolves through
    #[must_use]
    pub const fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Position within the match list
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.locator, self.index)
    }
}

/// Capability surface of a live browser connection.
///
/// Calls are issued one at a time per session and complete in issue order.
/// Nothing here waits for page content; bounded waiting is the job of
/// [`SyncPolicy`](crate::SyncPolicy).
#[async_trait]
pub trait Session: Send + Sync + fmt::Debug {
    /// Navigate to URL
    async fn navigate(&self, url: &str) -> ClubResult<()>;

    /// Get current URL
    async fn current_url(&self) -> ClubResult<String>;

    /// Get document title
    async fn title(&self) -> ClubResult<String>;

    /// Reload page
    async fn refresh(&self) -> ClubResult<()>;

    /// Go back in history
    async fn go_back(&self) -> ClubResult<()>;

    /// All current matches of `locator`, in document order
    async fn find_elements(&self, locator: &Locator) -> ClubResult<Vec<ElementHandle>>;

    /// First current match, or `None` when nothing matches
    async fn try_find(&self, locator: &Locator) -> ClubResult<Option<ElementHandle>> {
        Ok(self.find_elements(locator).await?.into_iter().next())
    }

    /// Rendered text of the element
    async fn text(&self, element: &ElementHandle) -> ClubResult<String>;

    /// Attribute value, `None` when the attribute is absent
    async fn attribute(&self, element: &ElementHandle, name: &str) -> ClubResult<Option<String>>;

    /// Texts of the element's descendants matching `child`, in document order
    async fn child_texts(&self, element: &ElementHandle, child: &Locator)
        -> ClubResult<Vec<String>>;

    /// Whether the element is rendered
    async fn is_displayed(&self, element: &ElementHandle) -> ClubResult<bool>;

    /// Whether the element is enabled
    async fn is_enabled(&self, element: &ElementHandle) -> ClubResult<bool>;

    /// Tag the node the handle resolves to now and return the tag.
    ///
    /// The tag follows that node, not the locator position, so it can be
    /// watched with [`Session::node_displayed`] after the DOM changes.
    async fn node_id(&self, element: &ElementHandle) -> ClubResult<String>;

    /// Display state of a tagged node; `None` once it left the document
    async fn node_displayed(&self, node_id: &str) -> ClubResult<Option<bool>>;

    /// Click element
    async fn click(&self, element: &ElementHandle) -> ClubResult<()>;

    /// Type text into element
    async fn send_keys(&self, element: &ElementHandle, text: &str) -> ClubResult<()>;

    /// Clear an input or textarea
    async fn clear(&self, element: &ElementHandle) -> ClubResult<()>;

    /// Submit the form owning the element
    async fn submit(&self, element: &ElementHandle) -> ClubResult<()>;

    /// Run `source` as a function body; `args` are visible as `arguments[i]`
    async fn execute_script(&self, source: &str, args: &[Value]) -> ClubResult<Value>;

    /// Native dialog currently open, if any
    async fn dialog(&self) -> ClubResult<Option<DialogHandle>>;

    /// Accept the open native dialog
    async fn accept_dialog(&self) -> ClubResult<()>;

    /// Save a PNG of the viewport to `path`
    async fn screenshot(&self, path: &Path) -> ClubResult<()>;

    /// Close the browser
    async fn close(&self) -> ClubResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_handle_accessors() {
        let h = ElementHandle::new(Locator::css(".btn-edit-admin"), 2);
        assert_eq!(h.locator(), &Locator::css(".btn-edit-admin"));
        assert_eq!(h.index(), 2);
    }

    #[test]
    fn test_element_handle_display() {
        let h = ElementHandle::new(Locator::id("loginBtn"), 0);
        assert_eq!(h.to_string(), "By.id(loginBtn)[0]");
    }
}
