//! Chromium session over the DevTools protocol.
//!
//! Elements are looked up fresh for every call (`querySelectorAll` on the
//! handle's locator, then the handle's index), so a handle never pins a node.
//!
//! Native dialogs block script evaluation in the page. The session therefore
//! tracks `Page.javascriptDialogOpening/Closed` from a background task and
//! answers [`Session::dialog`] from that state; element calls made while a
//! dialog is open fail fast with a transient session error instead of
//! hanging until the command timeout. A click that opens a dialog returns
//! as soon as the dialog shows, even if Chromium has not acknowledged the
//! click yet.
//!
//! [`Session::node_id`] tags the node with a `data-clubcheck-node`
//! attribute; [`Session::node_displayed`] looks the tag up again, so a node
//! re-rendered in its place is a different node.

#![allow(clippy::significant_drop_tightening, clippy::missing_errors_doc)]

use crate::config::{DriverConfig, SuiteConfig};
use crate::dialog::{DialogHandle, DialogKind};
use crate::locator::Locator;
use crate::result::{ClubError, ClubResult};
use crate::scenario::SessionFactory;
use crate::session::{ElementHandle, Session};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, DialogType, EventJavascriptDialogClosed,
    EventJavascriptDialogOpening, HandleJavaScriptDialogParams,
};
use chromiumoxide::element::Element;
use chromiumoxide::page::{Page as CdpPage, ScreenshotParams};
use futures::StreamExt;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

/// Attribute carrying the tag handed out by `node_id`
const NODE_ATTR: &str = "data-clubcheck-node";

/// How often a pending click checks for a dialog
const DIALOG_POLL: Duration = Duration::from_millis(25);

const IS_DISPLAYED: &str = "function() { \
    const s = window.getComputedStyle(this); \
    return !!(this.offsetWidth || this.offsetHeight || this.getClientRects().length) \
        && s.visibility !== 'hidden' && s.display !== 'none'; }";

const IS_ENABLED: &str = "function() { return !this.disabled; }";

const CLEAR: &str = "function() { \
    this.value = ''; \
    this.dispatchEvent(new Event('input', { bubbles: true })); \
    this.dispatchEvent(new Event('change', { bubbles: true })); }";

const SUBMIT: &str = "function() { \
    const form = this.form || this.closest('form'); \
    if (form) { if (form.requestSubmit) { form.requestSubmit(); } else { form.submit(); } } \
    else { this.dispatchEvent(new KeyboardEvent('keydown', { key: 'Enter', bubbles: true })); } }";

type DialogSlot = Arc<StdMutex<Option<DialogHandle>>>;

fn session_err(e: impl fmt::Display) -> ClubError {
    ClubError::session(e.to_string())
}

fn launch_err(e: impl fmt::Display) -> ClubError {
    ClubError::BrowserLaunch {
        message: e.to_string(),
    }
}

const fn dialog_kind(kind: &DialogType) -> DialogKind {
    match kind {
        DialogType::Alert => DialogKind::Alert,
        DialogType::Confirm => DialogKind::Confirm,
        DialogType::Prompt => DialogKind::Prompt,
        DialogType::Beforeunload => DialogKind::BeforeUnload,
    }
}

/// Drive `work` until it finishes or a dialog shows up in `slot`.
///
/// Chromium holds back the reply to an input command while a dialog the
/// command opened is showing, so an open dialog ends the wait with `Ok`.
async fn until_dialog_or<F>(work: F, slot: &StdMutex<Option<DialogHandle>>) -> ClubResult<()>
where
    F: Future<Output = ClubResult<()>>,
{
    let dialog_shown = async {
        loop {
            if slot.lock().map_or(false, |d| d.is_some()) {
                return;
            }
            tokio::time::sleep(DIALOG_POLL).await;
        }
    };
    tokio::select! {
        done = work => done,
        () = dialog_shown => {
            debug!("dialog opened during command");
            Ok(())
        }
    }
}

/// Switches passed through to the launcher, minus the headless and sandbox
/// ones it sets itself
fn launcher_args(config: &DriverConfig) -> Vec<String> {
    config
        .args()
        .into_iter()
        .filter(|a| !a.starts_with("--headless") && a != "--no-sandbox")
        .collect()
}

/// Chromium browser with one page
pub struct CdpSession {
    browser: Mutex<CdpBrowser>,
    page: CdpPage,
    dialog: DialogSlot,
    tasks: Vec<JoinHandle<()>>,
}

impl fmt::Debug for CdpSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CdpSession")
            .field("dialog", &self.dialog)
            .field("tasks", &self.tasks.len())
            .finish_non_exhaustive()
    }
}

impl CdpSession {
    /// Launch Chromium and open a blank page
    pub async fn launch(config: &DriverConfig) -> ClubResult<Self> {
        let mut builder = CdpConfig::builder()
            .window_size(config.window_width, config.window_height)
            .request_timeout(config.request_timeout);

        builder = if config.headless {
            builder.new_headless_mode()
        } else {
            builder.with_head()
        };
        if !config.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = config.chromium_path {
            builder = builder.chrome_executable(path);
        }
        let cdp_config = builder
            .args(launcher_args(config))
            .build()
            .map_err(launch_err)?;

        let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(launch_err)?;
        let mut tasks = vec![tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        })];

        let page = browser.new_page("about:blank").await.map_err(launch_err)?;
        let dialog: DialogSlot = Arc::new(StdMutex::new(None));

        let mut opened = page
            .event_listener::<EventJavascriptDialogOpening>()
            .await
            .map_err(launch_err)?;
        let slot = Arc::clone(&dialog);
        tasks.push(tokio::spawn(async move {
            while let Some(event) = opened.next().await {
                let handle = DialogHandle::new(dialog_kind(&event.r#type), event.message.clone());
                debug!(kind = %handle.kind(), message = handle.message(), "dialog opened");
                if let Ok(mut current) = slot.lock() {
                    *current = Some(handle);
                }
            }
        }));

        let mut closed = page
            .event_listener::<EventJavascriptDialogClosed>()
            .await
            .map_err(launch_err)?;
        let slot = Arc::clone(&dialog);
        tasks.push(tokio::spawn(async move {
            while closed.next().await.is_some() {
                if let Ok(mut current) = slot.lock() {
                    *current = None;
                }
            }
        }));

        info!(headless = config.headless, "chromium launched");
        Ok(Self {
            browser: Mutex::new(browser),
            page,
            dialog,
            tasks,
        })
    }

    fn open_dialog(&self) -> ClubResult<Option<DialogHandle>> {
        self.dialog
            .lock()
            .map(|d| d.clone())
            .map_err(|_| ClubError::session("dialog state poisoned"))
    }

    fn ensure_no_dialog(&self) -> ClubResult<()> {
        match self.open_dialog()? {
            Some(dialog) => Err(ClubError::session(format!(
                "unexpected alert open: {}",
                dialog.message()
            ))),
            None => Ok(()),
        }
    }

    async fn evaluate(&self, expression: String) -> ClubResult<Value> {
        self.ensure_no_dialog()?;
        let result = self.page.evaluate(expression).await.map_err(session_err)?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn resolve(&self, handle: &ElementHandle) -> ClubResult<Element> {
        self.ensure_no_dialog()?;
        let mut found = self
            .page
            .find_elements(handle.locator().to_css())
            .await
            .map_err(session_err)?;
        if handle.index() < found.len() {
            Ok(found.swap_remove(handle.index()))
        } else {
            Err(ClubError::StaleElement {
                locator: handle.locator().to_string(),
                index: handle.index(),
            })
        }
    }

    async fn call_on(&self, handle: &ElementHandle, function: &str) -> ClubResult<Value> {
        let element = self.resolve(handle).await?;
        let returned = element
            .call_js_fn(function, false)
            .await
            .map_err(session_err)?;
        Ok(returned.result.value.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl Session for CdpSession {
    async fn navigate(&self, url: &str) -> ClubResult<()> {
        self.ensure_no_dialog()?;
        self.page
            .goto(url)
            .await
            .map_err(|e| ClubError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn current_url(&self) -> ClubResult<String> {
        Ok(self.page.url().await.map_err(session_err)?.unwrap_or_default())
    }

    async fn title(&self) -> ClubResult<String> {
        self.ensure_no_dialog()?;
        Ok(self.page.get_title().await.map_err(session_err)?.unwrap_or_default())
    }

    async fn refresh(&self) -> ClubResult<()> {
        self.ensure_no_dialog()?;
        self.page.reload().await.map_err(session_err)?;
        Ok(())
    }

    async fn go_back(&self) -> ClubResult<()> {
        self.evaluate("history.back()".to_string()).await?;
        Ok(())
    }

    async fn find_elements(&self, locator: &Locator) -> ClubResult<Vec<ElementHandle>> {
        let count = self
            .evaluate(format!("{}.length", locator.to_query_all()))
            .await?
            .as_u64()
            .unwrap_or(0);
        Ok((0..count as usize)
            .map(|i| ElementHandle::new(locator.clone(), i))
            .collect())
    }

    async fn text(&self, element: &ElementHandle) -> ClubResult<String> {
        let el = self.resolve(element).await?;
        Ok(el.inner_text().await.map_err(session_err)?.unwrap_or_default())
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> ClubResult<Option<String>> {
        let el = self.resolve(element).await?;
        el.attribute(name).await.map_err(session_err)
    }

    async fn child_texts(
        &self,
        element: &ElementHandle,
        child: &Locator,
    ) -> ClubResult<Vec<String>> {
        let selector = serde_json::to_string(&child.to_css())?;
        let function = format!(
            "function() {{ return JSON.stringify(Array.from(this.querySelectorAll({selector})) \
             .map(e => e.innerText)); }}"
        );
        match self.call_on(element, &function).await? {
            Value::String(json) => Ok(serde_json::from_str(&json)?),
            _ => Ok(Vec::new()),
        }
    }

    async fn is_displayed(&self, element: &ElementHandle) -> ClubResult<bool> {
        Ok(self.call_on(element, IS_DISPLAYED).await?.as_bool().unwrap_or(false))
    }

    async fn is_enabled(&self, element: &ElementHandle) -> ClubResult<bool> {
        Ok(self.call_on(element, IS_ENABLED).await?.as_bool().unwrap_or(false))
    }

    async fn node_id(&self, element: &ElementHandle) -> ClubResult<String> {
        let tag = Uuid::new_v4().simple().to_string();
        let function = format!(
            "function() {{ if (!this.hasAttribute('{NODE_ATTR}')) {{ \
             this.setAttribute('{NODE_ATTR}', '{tag}'); }} \
             return this.getAttribute('{NODE_ATTR}'); }}"
        );
        match self.call_on(element, &function).await? {
            Value::String(node) => Ok(node),
            other => Err(ClubError::session(format!("could not tag {element}: {other}"))),
        }
    }

    async fn node_displayed(&self, node_id: &str) -> ClubResult<Option<bool>> {
        let selector = serde_json::to_string(&format!("[{NODE_ATTR}=\"{node_id}\"]"))?;
        let shown = self
            .evaluate(format!(
                "(function() {{ const el = document.querySelector({selector}); \
                 if (!el) {{ return null; }} return ({IS_DISPLAYED}).call(el); }})()"
            ))
            .await?;
        Ok(shown.as_bool())
    }

    async fn click(&self, element: &ElementHandle) -> ClubResult<()> {
        let el = self.resolve(element).await?;
        let clicked = async { el.click().await.map(|_| ()).map_err(session_err) };
        until_dialog_or(clicked, &self.dialog).await
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> ClubResult<()> {
        let el = self.resolve(element).await?;
        let kind = el.attribute("type").await.map_err(session_err)?;
        if kind.as_deref() == Some("file") {
            let params = SetFileInputFilesParams::builder()
                .files(vec![text.to_string()])
                .backend_node_id(el.backend_node_id)
                .build()
                .map_err(session_err)?;
            self.page.execute(params).await.map_err(session_err)?;
            return Ok(());
        }
        el.focus().await.map_err(session_err)?;
        el.type_str(text).await.map_err(session_err)?;
        Ok(())
    }

    async fn clear(&self, element: &ElementHandle) -> ClubResult<()> {
        self.call_on(element, CLEAR).await?;
        Ok(())
    }

    async fn submit(&self, element: &ElementHandle) -> ClubResult<()> {
        self.call_on(element, SUBMIT).await?;
        Ok(())
    }

    async fn execute_script(&self, source: &str, args: &[Value]) -> ClubResult<Value> {
        let args = serde_json::to_string(args)?;
        self.evaluate(format!("(function() {{ {source} }}).apply(null, {args})"))
            .await
    }

    async fn dialog(&self) -> ClubResult<Option<DialogHandle>> {
        self.open_dialog()
    }

    async fn accept_dialog(&self) -> ClubResult<()> {
        if self.open_dialog()?.is_none() {
            return Err(ClubError::session("no dialog open"));
        }
        self.page
            .execute(HandleJavaScriptDialogParams::new(true))
            .await
            .map_err(session_err)?;
        if let Ok(mut current) = self.dialog.lock() {
            *current = None;
        }
        Ok(())
    }

    async fn screenshot(&self, path: &Path) -> ClubResult<()> {
        self.ensure_no_dialog()?;
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        self.page
            .save_screenshot(params, path)
            .await
            .map_err(session_err)?;
        debug!(path = %path.display(), "screenshot saved");
        Ok(())
    }

    async fn close(&self) -> ClubResult<()> {
        let mut browser = self.browser.lock().await;
        let closed = browser.close().await.map_err(session_err);
        for task in &self.tasks {
            task.abort();
        }
        closed?;
        info!("chromium closed");
        Ok(())
    }
}

/// Launches a fresh Chromium per scenario group
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromiumFactory;

#[async_trait]
impl SessionFactory for ChromiumFactory {
    async fn create(&self, config: &SuiteConfig) -> ClubResult<Arc<dyn Session>> {
        let session = CdpSession::launch(&DriverConfig::from_suite(config)).await?;
        Ok(Arc::new(session))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_launcher_args_drop_builder_switches() {
        let config = DriverConfig::default().with_headless(true);
        let args = launcher_args(&config);

        assert!(args.contains(&"--disable-dev-shm-usage".to_string()));
        assert!(args.iter().any(|a| a.starts_with("--user-agent=")));
        assert!(!args.iter().any(|a| a.starts_with("--headless")));
        assert!(!args.contains(&"--no-sandbox".to_string()));
    }

    mod dialog_race_tests {
        use super::*;
        use futures::future::pending;
        use tokio::time::Instant;

        #[tokio::test(start_paused = true)]
        async fn test_open_dialog_ends_stuck_command() {
            let slot = StdMutex::new(Some(DialogHandle::confirm("Bạn có chắc muốn xóa?")));
            until_dialog_or(pending::<ClubResult<()>>(), &slot).await.unwrap();
        }

        #[tokio::test(start_paused = true)]
        async fn test_dialog_opening_later_ends_command() {
            let slot: DialogSlot = Arc::new(StdMutex::new(None));
            let opener = Arc::clone(&slot);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                *opener.lock().unwrap() = Some(DialogHandle::alert("Đã thêm vào giỏ hàng"));
            });
            let start = Instant::now();

            until_dialog_or(pending::<ClubResult<()>>(), &slot).await.unwrap();

            assert!(start.elapsed() >= Duration::from_millis(100));
            assert!(start.elapsed() <= Duration::from_millis(100) + DIALOG_POLL);
        }

        #[tokio::test(start_paused = true)]
        async fn test_command_result_without_dialog() {
            let slot = StdMutex::new(None);
            let err = until_dialog_or(async { Err(ClubError::session("node detached")) }, &slot)
                .await
                .unwrap_err();
            assert!(err.to_string().contains("node detached"));
            until_dialog_or(async { Ok(()) }, &slot).await.unwrap();
        }
    }

    #[test]
    fn test_dialog_kind_mapping() {
        assert_eq!(dialog_kind(&DialogType::Alert), DialogKind::Alert);
        assert_eq!(dialog_kind(&DialogType::Confirm), DialogKind::Confirm);
        assert_eq!(dialog_kind(&DialogType::Prompt), DialogKind::Prompt);
        assert_eq!(dialog_kind(&DialogType::Beforeunload), DialogKind::BeforeUnload);
    }
}
