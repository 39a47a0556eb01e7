//! Bounded waits over a live [`Session`].
//!
//! Every primitive here is a poll: check, sleep one interval, check again,
//! until the condition holds or the budget runs out. The last sleep is
//! clamped to what is left of the budget, so a condition that never holds
//! fails no earlier than the timeout and no later than one poll interval
//! after it.
//!
//! Stale handles and failed session commands seen during a poll are
//! transient: the poll keeps going. Any other error ends it at once.

use crate::dialog::DialogHandle;
use crate::locator::Locator;
use crate::result::{ClubError, ClubResult};
use crate::scripts;
use crate::session::{ElementHandle, Session};
use serde_json::json;
use std::future::Future;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Attempts made by [`SyncPolicy::safe_click`]
pub const SAFE_CLICK_RETRIES: u32 = 3;

/// Pause between failed `safe_click` attempts (500ms)
pub const SAFE_CLICK_BACKOFF_MS: u64 = 500;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// WAIT OUTCOME
// =============================================================================

/// How a poll ended
#[derive(Debug)]
pub enum WaitOutcome<T> {
    /// Condition held; carries what the check produced
    Found(T),
    /// Budget ran out with the condition simply false
    TimedOut,
    /// Budget ran out while the last check was failing transiently
    TransientError(ClubError),
}

impl<T> WaitOutcome<T> {
    /// Whether the condition held
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Collapse into a result; both non-found outcomes become
    /// [`ClubError::Timeout`].
    pub fn into_result(self, condition: &str, budget: Duration) -> ClubResult<T> {
        match self {
            Self::Found(value) => Ok(value),
            Self::TimedOut | Self::TransientError(_) => Err(ClubError::Timeout {
                condition: condition.to_string(),
                ms: duration_ms(budget),
            }),
        }
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

// =============================================================================
// SYNC POLICY
// =============================================================================

/// Bounded-wait primitives bound to one session
#[derive(Debug, Clone)]
pub struct SyncPolicy {
    session: Arc<dyn Session>,
    options: WaitOptions,
}

impl SyncPolicy {
    /// Create a policy over `session`
    #[must_use]
    pub fn new(session: Arc<dyn Session>, options: WaitOptions) -> Self {
        Self { session, options }
    }

    /// Default options used when a call passes no timeout
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Session the policy polls
    #[must_use]
    pub fn session(&self) -> &Arc<dyn Session> {
        &self.session
    }

    fn budget(&self, timeout: Option<Duration>) -> Duration {
        timeout.unwrap_or_else(|| self.options.timeout())
    }

    /// Run `check` until it yields `Some`, the budget runs out, or it fails
    /// with a non-transient error.
    pub async fn poll<T, F, Fut>(
        &self,
        condition: &str,
        budget: Duration,
        mut check: F,
    ) -> ClubResult<WaitOutcome<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ClubResult<Option<T>>>,
    {
        let start = Instant::now();
        let interval = self.options.poll_interval();

        loop {
            let last_transient = match check().await {
                Ok(Some(value)) => {
                    debug!(
                        condition,
                        elapsed_ms = duration_ms(start.elapsed()),
                        "wait satisfied"
                    );
                    return Ok(WaitOutcome::Found(value));
                }
                Ok(None) => None,
                Err(e) if e.is_transient() => Some(e),
                Err(e) => return Err(e),
            };

            let elapsed = start.elapsed();
            if elapsed >= budget {
                debug!(
                    condition,
                    elapsed_ms = duration_ms(elapsed),
                    "wait timed out"
                );
                return Ok(last_transient.map_or(WaitOutcome::TimedOut, WaitOutcome::TransientError));
            }
            sleep(interval.min(budget - elapsed)).await;
        }
    }

    /// Wait for an arbitrary condition; `check` returns `Some` once it holds
    pub async fn wait_condition<T, F, Fut>(
        &self,
        description: &str,
        timeout: Option<Duration>,
        check: F,
    ) -> ClubResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ClubResult<Option<T>>>,
    {
        let budget = self.budget(timeout);
        self.poll(description, budget, check)
            .await?
            .into_result(description, budget)
    }

    /// Wait until an element matching `locator` is in the document
    pub async fn wait_present(
        &self,
        locator: &Locator,
        timeout: Option<Duration>,
    ) -> ClubResult<ElementHandle> {
        let session = &self.session;
        self.wait_condition(&format!("present {locator}"), timeout, || async move {
            session.try_find(locator).await
        })
        .await
    }

    /// Wait until an element matching `locator` exists and is displayed
    pub async fn wait_visible(
        &self,
        locator: &Locator,
        timeout: Option<Duration>,
    ) -> ClubResult<ElementHandle> {
        let session = &self.session;
        self.wait_condition(&format!("visible {locator}"), timeout, || async move {
            first_displayed(session.as_ref(), locator).await
        })
        .await
    }

    /// Wait until an element is visible and enabled.
    ///
    /// Visibility and enablement share one budget.
    pub async fn wait_clickable(
        &self,
        locator: &Locator,
        timeout: Option<Duration>,
    ) -> ClubResult<ElementHandle> {
        let budget = self.budget(timeout);
        let condition = format!("clickable {locator}");
        let start = Instant::now();

        let handle = self
            .wait_visible(locator, Some(budget))
            .await
            .map_err(|e| retitle_timeout(e, &condition, budget))?;

        let remaining = budget.saturating_sub(start.elapsed());
        let session = &self.session;
        let handle = &handle;
        self.poll(&condition, remaining, || async move {
            Ok(session.is_enabled(handle).await?.then(|| handle.clone()))
        })
        .await?
        .into_result(&condition, budget)
    }

    /// Wait until the element matching `locator` is hidden or detached.
    ///
    /// Returns at once when nothing is displayed in the first place. Otherwise
    /// the first displayed node is pinned and only that node is watched, so a
    /// replacement rendered under the same locator does not hold the wait.
    pub async fn wait_invisible(
        &self,
        locator: &Locator,
        timeout: Option<Duration>,
    ) -> ClubResult<()> {
        let session = &self.session;
        let pinned = &OnceLock::<String>::new();
        self.wait_condition(&format!("invisible {locator}"), timeout, || async move {
            if let Some(node) = pinned.get() {
                let shown = session.node_displayed(node).await?;
                return Ok((shown != Some(true)).then_some(()));
            }
            match first_displayed(session.as_ref(), locator).await? {
                None => Ok(Some(())),
                Some(handle) => {
                    let node: String = session.node_id(&handle).await?;
                    let _ = pinned.set(node);
                    Ok(None)
                }
            }
        })
        .await
    }

    /// Wait until the element's text contains `text` (case-sensitive)
    pub async fn wait_text_contains(
        &self,
        locator: &Locator,
        text: &str,
        timeout: Option<Duration>,
    ) -> ClubResult<String> {
        let session = &self.session;
        self.wait_condition(
            &format!("text '{text}' in {locator}"),
            timeout,
            || async move {
                let Some(handle) = session.try_find(locator).await? else {
                    return Ok(None);
                };
                let current = session.text(&handle).await?;
                Ok(current.contains(text).then_some(current))
            },
        )
        .await
    }

    /// Wait until the current URL contains `fragment`; yields the URL
    pub async fn wait_url_contains(
        &self,
        fragment: &str,
        timeout: Option<Duration>,
    ) -> ClubResult<String> {
        let session = &self.session;
        self.wait_condition(&format!("url containing '{fragment}'"), timeout, || async move {
            let url = session.current_url().await?;
            Ok(url.contains(fragment).then_some(url))
        })
        .await
    }

    /// Wait until a native dialog is open
    pub async fn wait_alert(&self, timeout: Option<Duration>) -> ClubResult<DialogHandle> {
        let session = &self.session;
        self.wait_condition("native dialog", timeout, || async move { session.dialog().await })
            .await
    }

    /// Click with [`SAFE_CLICK_RETRIES`] attempts
    pub async fn safe_click(&self, locator: &Locator) -> ClubResult<()> {
        self.safe_click_with_retries(locator, SAFE_CLICK_RETRIES)
            .await
    }

    /// Wait for clickability and click, retrying up to `retries` attempts.
    ///
    /// Each failed attempt sleeps [`SAFE_CLICK_BACKOFF_MS`] before the next;
    /// the final attempt's error is returned unchanged.
    pub async fn safe_click_with_retries(&self, locator: &Locator, retries: u32) -> ClubResult<()> {
        let retries = retries.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.click_once(locator).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt >= retries => return Err(e),
                Err(e) => {
                    warn!(
                        locator = %locator,
                        attempt,
                        retries,
                        error = %e,
                        "click failed, retrying"
                    );
                    sleep(Duration::from_millis(SAFE_CLICK_BACKOFF_MS)).await;
                }
            }
        }
    }

    async fn click_once(&self, locator: &Locator) -> ClubResult<()> {
        let handle = self.wait_clickable(locator, None).await?;
        self.session.click(&handle).await
    }

    /// Scroll the first match of `locator` to the viewport center
    pub async fn scroll_into_view(&self, locator: &Locator) -> ClubResult<()> {
        self.session
            .execute_script(scripts::SCROLL_INTO_VIEW, &[json!(locator.to_css()), json!(0)])
            .await?;
        Ok(())
    }
}

/// First match of `locator` that is currently displayed
async fn first_displayed(
    session: &dyn Session,
    locator: &Locator,
) -> ClubResult<Option<ElementHandle>> {
    for handle in session.find_elements(locator).await? {
        if session.is_displayed(&handle).await? {
            return Ok(Some(handle));
        }
    }
    Ok(None)
}

fn retitle_timeout(err: ClubError, condition: &str, budget: Duration) -> ClubError {
    if err.is_timeout() {
        ClubError::Timeout {
            condition: condition.to_string(),
            ms: duration_ms(budget),
        }
    } else {
        err
    }
}
