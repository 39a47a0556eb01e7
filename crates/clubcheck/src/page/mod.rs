//! Page Object Model
//!
//! Each storefront screen is a struct that embeds an [`Interactable`] and
//! exposes the screen's operations as named async methods. Conventions:
//!
//! - `open()` navigates and returns once navigation is issued
//! - reads wait briefly for their own precondition and degrade to an empty
//!   value (`""`, `0`, `false`) when it never holds
//! - `click_*` and `fill_*` wait for their target, act, and return without
//!   waiting for the effect
//! - indexed actions fail with [`ClubError::ActionUnavailable`] when the
//!   index is out of range
//! - destructive actions are two-phase, see [`confirm`]

pub mod admin_players;
pub mod cart;
pub mod confirm;
pub mod home;
pub mod login;
pub mod orders;
pub mod product_detail;
pub mod register;

use crate::auth::AuthStorage;
use crate::config::{PageKey, SuiteConfig};
use crate::locator::Locator;
use crate::result::{ClubError, ClubResult};
use crate::scripts;
use crate::session::{ElementHandle, Session};
use crate::wait::SyncPolicy;
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Short wait used by degrade-to-empty reads
pub const READ_TIMEOUT: Duration = Duration::from_millis(3_000);

/// Wait used for transient status banners
pub const MESSAGE_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Session, wait policy and configuration shared by every page
#[derive(Debug, Clone)]
pub struct Interactable {
    session: Arc<dyn Session>,
    wait: SyncPolicy,
    config: Arc<SuiteConfig>,
}

impl Interactable {
    /// Bind to a session with waits derived from `config`
    #[must_use]
    pub fn new(session: Arc<dyn Session>, config: Arc<SuiteConfig>) -> Self {
        let wait = SyncPolicy::new(Arc::clone(&session), config.wait_options());
        Self {
            session,
            wait,
            config,
        }
    }

    /// Underlying session
    #[must_use]
    pub fn session(&self) -> &Arc<dyn Session> {
        &self.session
    }

    /// Wait primitives
    #[must_use]
    pub const fn wait(&self) -> &SyncPolicy {
        &self.wait
    }

    /// Suite configuration
    #[must_use]
    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Login-state helper over the same session
    #[must_use]
    pub fn auth(&self) -> AuthStorage {
        AuthStorage::new(Arc::clone(&self.session))
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    /// Navigate to URL
    pub async fn navigate(&self, url: &str) -> ClubResult<()> {
        debug!(url, "navigate");
        self.session
            .navigate(url)
            .await
            .map_err(|e| match e {
                ClubError::Session { message } => ClubError::Navigation {
                    url: url.to_string(),
                    message,
                },
                other => other,
            })
    }

    /// Navigate to a configured screen
    pub async fn open_page(&self, page: PageKey) -> ClubResult<()> {
        self.navigate(&self.config.page_url(page)).await
    }

    /// Current URL
    pub async fn current_url(&self) -> ClubResult<String> {
        self.session.current_url().await
    }

    /// Document title
    pub async fn title(&self) -> ClubResult<String> {
        self.session.title().await
    }

    /// Reload
    pub async fn refresh(&self) -> ClubResult<()> {
        self.session.refresh().await
    }

    /// History back
    pub async fn go_back(&self) -> ClubResult<()> {
        self.session.go_back().await
    }

    /// Run a script in the page
    pub async fn execute_script(&self, source: &str, args: &[Value]) -> ClubResult<Value> {
        self.session.execute_script(source, args).await
    }

    /// Drop every `localStorage` entry
    pub async fn clear_local_storage(&self) -> ClubResult<()> {
        self.execute_script(scripts::LOCAL_STORAGE_CLEAR, &[]).await?;
        Ok(())
    }

    /// Drop every `sessionStorage` entry
    pub async fn clear_session_storage(&self) -> ClubResult<()> {
        self.execute_script(scripts::SESSION_STORAGE_CLEAR, &[]).await?;
        Ok(())
    }

    /// Scroll the first match into view
    pub async fn scroll_into_view(&self, locator: &Locator) -> ClubResult<()> {
        self.wait.scroll_into_view(locator).await
    }

    /// Save a PNG of the viewport, creating the parent directory
    pub async fn screenshot(&self, path: &Path) -> ClubResult<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }
        debug!(path = %path.display(), "screenshot");
        self.session.screenshot(path).await
    }

    // -------------------------------------------------------------------------
    // Instant checks (never fail)
    // -------------------------------------------------------------------------

    /// Whether anything matches right now
    pub async fn is_present(&self, locator: &Locator) -> bool {
        matches!(self.session.try_find(locator).await, Ok(Some(_)))
    }

    /// Whether the first match is displayed right now
    pub async fn is_visible(&self, locator: &Locator) -> bool {
        match self.session.try_find(locator).await {
            Ok(Some(handle)) => self.session.is_displayed(&handle).await.unwrap_or(false),
            _ => false,
        }
    }

    /// Text of the first match, empty when absent
    pub async fn text_or_empty(&self, locator: &Locator) -> String {
        match self.session.try_find(locator).await {
            Ok(Some(handle)) => self.session.text(&handle).await.unwrap_or_default(),
            _ => String::new(),
        }
    }

    /// Attribute of the first match, empty when absent
    pub async fn attribute_or_empty(&self, locator: &Locator, name: &str) -> String {
        match self.session.try_find(locator).await {
            Ok(Some(handle)) => self
                .session
                .attribute(&handle, name)
                .await
                .ok()
                .flatten()
                .unwrap_or_default(),
            _ => String::new(),
        }
    }

    /// Number of current matches, `0` on failure
    pub async fn count(&self, locator: &Locator) -> usize {
        self.session
            .find_elements(locator)
            .await
            .map_or(0, |found| found.len())
    }

    // -------------------------------------------------------------------------
    // Degrading reads
    // -------------------------------------------------------------------------

    /// Text of the first visible match, empty if none shows up within `timeout`
    pub async fn visible_text(&self, locator: &Locator, timeout: Duration) -> String {
        match self.wait.wait_visible(locator, Some(timeout)).await {
            Ok(handle) => self.session.text(&handle).await.unwrap_or_default(),
            Err(e) => {
                debug!(locator = %locator, error = %e, "read degraded to empty");
                String::new()
            }
        }
    }

    /// Match count once something is visible, `0` if nothing shows up
    pub async fn visible_count(&self, locator: &Locator, timeout: Duration) -> usize {
        if self.wait.wait_visible(locator, Some(timeout)).await.is_err() {
            return 0;
        }
        self.count(locator).await
    }

    // -------------------------------------------------------------------------
    // Actions
    // -------------------------------------------------------------------------

    /// Wait for visibility, clear, then type
    pub async fn type_into(&self, locator: &Locator, text: &str) -> ClubResult<()> {
        let handle = self.wait.wait_visible(locator, None).await?;
        self.session.clear(&handle).await?;
        self.session.send_keys(&handle, text).await
    }

    /// Clear and type into the first match if it exists; `false` when absent
    pub async fn type_if_present(&self, locator: &Locator, text: &str) -> ClubResult<bool> {
        let Some(handle) = self.session.try_find(locator).await? else {
            debug!(locator = %locator, "optional field not on page");
            return Ok(false);
        };
        self.session.clear(&handle).await?;
        self.session.send_keys(&handle, text).await?;
        Ok(true)
    }

    /// Wait for clickability, then click once
    pub async fn click(&self, locator: &Locator) -> ClubResult<()> {
        let handle = self.wait.wait_clickable(locator, None).await?;
        self.session.click(&handle).await
    }

    /// Click with bounded retries
    pub async fn safe_click(&self, locator: &Locator) -> ClubResult<()> {
        self.wait.safe_click(locator).await
    }

    /// Match `index` of `locator`, after waiting for any match to be visible.
    ///
    /// Fails with [`ClubError::ActionUnavailable`] when there are not enough
    /// matches, including when none ever shows up.
    pub async fn nth(&self, locator: &Locator, index: usize, action: &str) -> ClubResult<ElementHandle> {
        if let Err(e) = self.wait.wait_visible(locator, None).await {
            if !e.is_timeout() {
                return Err(e);
            }
        }
        let available = self.session.find_elements(locator).await?.len();
        if index >= available {
            return Err(ClubError::ActionUnavailable {
                action: action.to_string(),
                index,
                available,
            });
        }
        Ok(ElementHandle::new(locator.clone(), index))
    }

    /// Click match `index` of `locator`
    pub async fn click_nth(&self, locator: &Locator, index: usize, action: &str) -> ClubResult<()> {
        let handle = self.nth(locator, index, action).await?;
        self.session.click(&handle).await
    }
}

/// Status banner whose `class` carries `success` or `error`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBanner {
    locator: Locator,
}

impl StatusBanner {
    /// Banner found by `locator`
    #[must_use]
    pub const fn new(locator: Locator) -> Self {
        Self { locator }
    }

    /// Banner text, empty if it never shows
    pub async fn text(&self, ui: &Interactable) -> String {
        ui.visible_text(&self.locator, MESSAGE_TIMEOUT).await
    }

    /// Banner class list, empty if it never shows
    pub async fn class(&self, ui: &Interactable) -> String {
        if ui
            .wait()
            .wait_visible(&self.locator, Some(MESSAGE_TIMEOUT))
            .await
            .is_err()
        {
            return String::new();
        }
        ui.attribute_or_empty(&self.locator, "class").await
    }

    /// Whether the banner reports success
    pub async fn is_success(&self, ui: &Interactable) -> bool {
        self.class(ui).await.contains("success")
    }

    /// Whether the banner reports an error
    pub async fn is_error(&self, ui: &Interactable) -> bool {
        self.class(ui).await.contains("error")
    }
}

/// A storefront screen
#[async_trait]
pub trait PageObject: Send + Sync {
    /// Screen this object drives
    fn page_key(&self) -> PageKey;

    /// Shared capabilities
    fn ui(&self) -> &Interactable;

    /// Canonical URL
    fn url(&self) -> String {
        self.ui().config().page_url(self.page_key())
    }

    /// Get the page name for logging/debugging
    fn page_name(&self) -> &'static str {
        self.page_key().as_str()
    }

    /// Navigate to the canonical URL
    async fn open(&self) -> ClubResult<()> {
        self.ui().open_page(self.page_key()).await
    }

    /// Whether the browser is on this screen
    async fn is_current(&self) -> ClubResult<bool> {
        let url = self.ui().current_url().await?;
        Ok(url.contains(self.page_key().path()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
pub(crate) mod tests {
    use super::*;
    use crate::mock::{MockElement, MockSession};
    use crate::wait::DEFAULT_POLL_INTERVAL_MS;

    /// Interactable over a fresh mock with a 2s explicit wait
    pub(crate) fn fixture() -> (MockSession, Interactable) {
        let mock = MockSession::new();
        let config = SuiteConfig {
            explicit_wait_secs: 2,
            ..SuiteConfig::default()
        };
        let ui = Interactable::new(Arc::new(mock.clone()), Arc::new(config));
        (mock, ui)
    }

    mod instant_check_tests {
        use super::*;

        #[tokio::test]
        async fn test_checks_on_empty_page() {
            let (_, ui) = fixture();
            let loc = Locator::css(".nothing");
            assert!(!ui.is_present(&loc).await);
            assert!(!ui.is_visible(&loc).await);
            assert_eq!(ui.text_or_empty(&loc).await, "");
            assert_eq!(ui.attribute_or_empty(&loc, "class").await, "");
            assert_eq!(ui.count(&loc).await, 0);
        }

        #[tokio::test]
        async fn test_checks_on_hidden_element() {
            let (mock, ui) = fixture();
            mock.add_element(
                MockElement::new(Locator::id("message"))
                    .hidden()
                    .with_text("x")
                    .with_attribute("class", "error"),
            );
            let loc = Locator::id("message");
            assert!(ui.is_present(&loc).await);
            assert!(!ui.is_visible(&loc).await);
            assert_eq!(ui.text_or_empty(&loc).await, "x");
            assert_eq!(ui.attribute_or_empty(&loc, "class").await, "error");
        }
    }

    mod degrading_read_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_count_is_zero_when_never_matching() {
            let (_, ui) = fixture();
            let start = tokio::time::Instant::now();
            assert_eq!(ui.visible_count(&Locator::css(".order-item"), READ_TIMEOUT).await, 0);
            assert!(start.elapsed() >= READ_TIMEOUT);
            assert!(start.elapsed() <= READ_TIMEOUT + Duration::from_millis(DEFAULT_POLL_INTERVAL_MS));
        }

        #[tokio::test(start_paused = true)]
        async fn test_visible_text_degrades() {
            let (_, ui) = fixture();
            assert_eq!(ui.visible_text(&Locator::id("message"), MESSAGE_TIMEOUT).await, "");
        }

        #[tokio::test(start_paused = true)]
        async fn test_visible_count_counts_all_matches() {
            let (mock, ui) = fixture();
            for _ in 0..3 {
                mock.add_element(MockElement::new(Locator::css(".order-item")));
            }
            assert_eq!(ui.visible_count(&Locator::css(".order-item"), READ_TIMEOUT).await, 3);
        }
    }

    mod action_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_type_into_replaces_value() {
            let (mock, ui) = fixture();
            mock.add_element(MockElement::new(Locator::id("full_name")).with_value("old"));
            ui.type_into(&Locator::id("full_name"), "Nguyễn Văn A").await.unwrap();
            assert_eq!(mock.value_of(&Locator::id("full_name")), "Nguyễn Văn A");
        }

        #[tokio::test]
        async fn test_screenshot_creates_directory() {
            let (mock, ui) = fixture();
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("shots").join("login_valid.png");
            ui.screenshot(&path).await.unwrap();
            assert!(dir.path().join("shots").is_dir());
            assert!(mock.was_called(&format!("screenshot:{}", path.display())));
        }

        #[tokio::test(start_paused = true)]
        async fn test_type_if_present_skips_missing() {
            let (mock, ui) = fixture();
            assert!(!ui.type_if_present(&Locator::id("bio"), "x").await.unwrap());
            assert!(!mock.was_called("send_keys"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_click_nth_out_of_range() {
            let (mock, ui) = fixture();
            mock.add_element(MockElement::new(Locator::css(".btn-edit-admin")));
            let err = ui
                .click_nth(&Locator::css(".btn-edit-admin"), 2, "edit player")
                .await
                .unwrap_err();
            match err {
                ClubError::ActionUnavailable {
                    action,
                    index,
                    available,
                } => {
                    assert_eq!(action, "edit player");
                    assert_eq!(index, 2);
                    assert_eq!(available, 1);
                }
                other => panic!("unexpected {other:?}"),
            }
            assert!(!mock.was_called("click"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_click_nth_in_range() {
            let (mock, ui) = fixture();
            mock.add_element(MockElement::new(Locator::css(".btn-delete-admin")));
            mock.add_element(MockElement::new(Locator::css(".btn-delete-admin")));
            ui.click_nth(&Locator::css(".btn-delete-admin"), 1, "delete player")
                .await
                .unwrap();
            assert!(mock.was_called("click:By.css(.btn-delete-admin)[1]"));
        }

        #[tokio::test]
        async fn test_storage_clears() {
            let (mock, ui) = fixture();
            mock.set_local_storage_item("token", "t");
            ui.clear_local_storage().await.unwrap();
            ui.clear_session_storage().await.unwrap();
            assert_eq!(mock.local_storage_item("token"), None);
            assert!(mock.was_called("script:session_storage_clear"));
        }
    }

    mod page_object_tests {
        use super::*;

        struct Screen(Interactable);

        impl PageObject for Screen {
            fn page_key(&self) -> PageKey {
                PageKey::Players
            }

            fn ui(&self) -> &Interactable {
                &self.0
            }
        }

        #[tokio::test]
        async fn test_open_and_is_current() {
            let (mock, ui) = fixture();
            let page = Screen(ui);
            assert!(!page.is_current().await.unwrap());
            page.open().await.unwrap();
            assert!(page.is_current().await.unwrap());
            assert!(mock.url().ends_with("/tuyenthu/user.html"));
            assert_eq!(page.page_name(), "PLAYERS");
        }
    }
}
