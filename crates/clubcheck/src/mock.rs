//! Scripted in-memory [`Session`] for tests.
//!
//! `MockSession` holds a flat list of [`MockElement`]s and a little page
//! state (URL, title, storage, one native dialog). Behavior is scripted with
//! handlers:
//!
//! - page handlers render a document whenever a URL containing their
//!   fragment is loaded (navigate, refresh, history back, in-page redirect)
//! - click handlers mutate the [`MockDom`] when a locator is clicked
//! - a confirm dialog can carry an accept handler
//!
//! Timing is expressed in lookups, not wall time: an element can appear
//! after N lookups or detach after N lookups, a button can stay disabled
//! for N checks, a click can fail N times. Every call is recorded in a
//! history the tests inspect.
//!
//! While a native dialog is open every page and element command fails with
//! the same transient "unexpected alert open" error Chromium gives; only the
//! URL, the dialog itself and `close` stay reachable.

use crate::dialog::DialogHandle;
use crate::locator::Locator;
use crate::result::{ClubError, ClubResult};
use crate::scripts;
use crate::session::{ElementHandle, Session};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Runs when a locator is clicked; receives the clicked match index
pub type ClickHandler = Arc<dyn Fn(&mut MockDom, usize) + Send + Sync>;

/// Renders a freshly loaded document; receives the URL
pub type PageHandler = Arc<dyn Fn(&mut MockDom, &str) + Send + Sync>;

/// Runs when the open confirm dialog is accepted
pub type AcceptHandler = Arc<dyn Fn(&mut MockDom) + Send + Sync>;

// =============================================================================
// ELEMENT
// =============================================================================

/// One scripted DOM node
#[derive(Debug, Clone)]
pub struct MockElement {
    matches: Vec<Locator>,
    text: String,
    value: String,
    displayed: bool,
    disabled: bool,
    enabled_after: u32,
    attributes: BTreeMap<String, String>,
    children: Vec<(Locator, String)>,
    appear_after: u32,
    detach_after: Option<u32>,
    fail_clicks: u32,
    lookups: u32,
    enabled_checks: u32,
    attached: bool,
    node: u64,
}

impl MockElement {
    /// Visible, enabled element matched by `locator`
    #[must_use]
    pub fn new(locator: Locator) -> Self {
        Self {
            matches: vec![locator],
            text: String::new(),
            value: String::new(),
            displayed: true,
            disabled: false,
            enabled_after: 0,
            attributes: BTreeMap::new(),
            children: Vec::new(),
            appear_after: 0,
            detach_after: None,
            fail_clicks: 0,
            lookups: 0,
            enabled_checks: 0,
            attached: true,
            node: 0,
        }
    }

    /// Also match `locator`
    #[must_use]
    pub fn also_matches(mut self, locator: Locator) -> Self {
        self.matches.push(locator);
        self
    }

    /// Rendered text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Current input value
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Add a descendant text matched by `locator`
    #[must_use]
    pub fn with_child(mut self, locator: Locator, text: impl Into<String>) -> Self {
        self.children.push((locator, text.into()));
        self
    }

    /// In the document but not rendered
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Never enabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Report disabled for the first `checks` enablement checks
    #[must_use]
    pub const fn enabled_after(mut self, checks: u32) -> Self {
        self.enabled_after = checks;
        self
    }

    /// Missing from the first `lookups` lookups
    #[must_use]
    pub const fn appear_after(mut self, lookups: u32) -> Self {
        self.appear_after = lookups;
        self.attached = lookups == 0;
        self
    }

    /// Present for `lookups` lookups, gone afterwards
    #[must_use]
    pub const fn detach_after(mut self, lookups: u32) -> Self {
        self.detach_after = Some(lookups);
        self.attached = lookups > 0;
        self
    }

    /// Fail the first `n` clicks
    #[must_use]
    pub const fn fail_clicks(mut self, n: u32) -> Self {
        self.fail_clicks = n;
        self
    }

    /// Whether `locator` selects this element
    #[must_use]
    pub fn matches(&self, locator: &Locator) -> bool {
        self.matches.contains(locator)
    }

    /// Rendered text
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Current input value
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether rendered
    #[must_use]
    pub const fn is_displayed(&self) -> bool {
        self.displayed
    }

    /// Replace the rendered text
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Replace the input value
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Show or hide
    pub fn set_displayed(&mut self, displayed: bool) {
        self.displayed = displayed;
    }

    /// Set an attribute
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    fn observe(&mut self) -> bool {
        let hit = self.lookups >= self.appear_after
            && self.detach_after.map_or(true, |n| self.lookups < n);
        self.lookups += 1;
        self.attached = hit;
        hit
    }

    fn check_enabled(&mut self) -> bool {
        let enabled = !self.disabled && self.enabled_checks >= self.enabled_after;
        self.enabled_checks += 1;
        enabled
    }
}

// =============================================================================
// DOM
// =============================================================================

/// Mutable page state handed to handlers
#[derive(Default)]
pub struct MockDom {
    url: String,
    title: String,
    elements: Vec<MockElement>,
    local_storage: BTreeMap<String, String>,
    session_storage: BTreeMap<String, String>,
    dialog: Option<DialogHandle>,
    on_accept: Option<AcceptHandler>,
    pending_navigation: Option<String>,
    redirect: Option<(String, u32)>,
    next_node: u64,
}

impl fmt::Debug for MockDom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockDom")
            .field("url", &self.url)
            .field("elements", &self.elements.len())
            .field("local_storage", &self.local_storage)
            .field("dialog", &self.dialog)
            .finish_non_exhaustive()
    }
}

impl MockDom {
    /// Current URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Set the document title
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Load `url` once the current command finishes
    pub fn navigate(&mut self, url: impl Into<String>) {
        self.pending_navigation = Some(url.into());
    }

    /// Load `url` after `polls` more reads of the current URL
    pub fn redirect_after(&mut self, url: impl Into<String>, polls: u32) {
        self.redirect = Some((url.into(), polls));
    }

    /// Append an element
    pub fn add(&mut self, mut element: MockElement) {
        self.next_node += 1;
        element.node = self.next_node;
        self.elements.push(element);
    }

    /// Remove every element matching `locator`; returns how many
    pub fn remove(&mut self, locator: &Locator) -> usize {
        let before = self.elements.len();
        self.elements.retain(|e| !e.matches(locator));
        before - self.elements.len()
    }

    /// Remove match `index` of `locator`
    pub fn remove_nth(&mut self, locator: &Locator, index: usize) -> bool {
        let target = self
            .elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.matches(locator))
            .nth(index)
            .map(|(i, _)| i);
        target.map_or(false, |i| {
            self.elements.remove(i);
            true
        })
    }

    /// Number of elements matching `locator`
    #[must_use]
    pub fn count(&self, locator: &Locator) -> usize {
        self.elements.iter().filter(|e| e.matches(locator)).count()
    }

    /// First element matching `locator`
    pub fn element_mut(&mut self, locator: &Locator) -> Option<&mut MockElement> {
        self.elements.iter_mut().find(|e| e.matches(locator))
    }

    /// Match `index` of `locator`
    #[must_use]
    pub fn nth(&self, locator: &Locator, index: usize) -> Option<&MockElement> {
        self.elements.iter().filter(|e| e.matches(locator)).nth(index)
    }

    /// Value of the first match, empty when nothing matches
    #[must_use]
    pub fn value_of(&self, locator: &Locator) -> String {
        self.nth(locator, 0)
            .map(|e| e.value.clone())
            .unwrap_or_default()
    }

    /// Replace the text of the first match
    pub fn set_text(&mut self, locator: &Locator, text: impl Into<String>) {
        if let Some(el) = self.element_mut(locator) {
            el.set_text(text);
        }
    }

    /// Show or hide every match
    pub fn set_displayed(&mut self, locator: &Locator, displayed: bool) {
        for el in self.elements.iter_mut().filter(|e| e.matches(locator)) {
            el.displayed = displayed;
        }
    }

    /// `localStorage` entry
    #[must_use]
    pub fn local_item(&self, key: &str) -> Option<&str> {
        self.local_storage.get(key).map(String::as_str)
    }

    /// Set a `localStorage` entry
    pub fn set_local_item(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.local_storage.insert(key.into(), value.into());
    }

    /// Drop all `localStorage` entries
    pub fn clear_local_storage(&mut self) {
        self.local_storage.clear();
    }

    /// Open a native dialog
    pub fn open_dialog(&mut self, dialog: DialogHandle) {
        self.dialog = Some(dialog);
        self.on_accept = None;
    }

    /// Open a native confirm that runs `on_accept` when accepted
    pub fn open_confirm<F>(&mut self, message: impl Into<String>, on_accept: F)
    where
        F: Fn(&mut Self) + Send + Sync + 'static,
    {
        self.dialog = Some(DialogHandle::confirm(message));
        self.on_accept = Some(Arc::new(on_accept));
    }

    fn ensure_no_dialog(&self) -> ClubResult<()> {
        match &self.dialog {
            Some(dialog) => Err(ClubError::session(format!(
                "unexpected alert open: {}",
                dialog.message()
            ))),
            None => Ok(()),
        }
    }

    fn resolve(&self, handle: &ElementHandle) -> ClubResult<usize> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.attached && e.matches(handle.locator()))
            .nth(handle.index())
            .map(|(i, _)| i)
            .ok_or_else(|| ClubError::StaleElement {
                locator: handle.locator().to_string(),
                index: handle.index(),
            })
    }
}

// =============================================================================
// SESSION
// =============================================================================

#[derive(Default)]
struct MockState {
    dom: MockDom,
    click_handlers: Vec<(Locator, ClickHandler)>,
    page_handlers: Vec<(String, PageHandler)>,
    script_results: VecDeque<Value>,
    back_stack: Vec<String>,
    history: Vec<String>,
    failing_lookups: u32,
}

impl fmt::Debug for MockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockState")
            .field("dom", &self.dom)
            .field("click_handlers", &self.click_handlers.len())
            .field("page_handlers", &self.page_handlers.len())
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

impl MockState {
    fn render(&mut self, url: String) {
        let handlers: Vec<PageHandler> = self
            .page_handlers
            .iter()
            .filter(|(fragment, _)| url.contains(fragment.as_str()))
            .map(|(_, h)| Arc::clone(h))
            .collect();
        self.dom.elements.clear();
        self.dom.dialog = None;
        self.dom.on_accept = None;
        self.dom.redirect = None;
        self.dom.url.clone_from(&url);
        for handler in handlers {
            handler(&mut self.dom, &url);
        }
    }

    /// Apply navigations requested by handlers
    fn settle(&mut self) {
        while let Some(url) = self.dom.pending_navigation.take() {
            if !self.dom.url.is_empty() {
                self.back_stack.push(self.dom.url.clone());
            }
            self.render(url);
        }
    }
}

/// Scripted session; clones share state
#[derive(Debug, Clone, Default)]
pub struct MockSession {
    state: Arc<Mutex<MockState>>,
}

impl MockSession {
    /// Create an empty session at `about:blank`
    #[must_use]
    pub fn new() -> Self {
        let session = Self::default();
        session.set_url("about:blank");
        session
    }

    fn lock(&self) -> ClubResult<MutexGuard<'_, MockState>> {
        self.state
            .lock()
            .map_err(|_| ClubError::session("mock session state poisoned"))
    }

    /// Lock for a page or element command; refused while a dialog is open
    fn lock_page(&self) -> ClubResult<MutexGuard<'_, MockState>> {
        let state = self.lock()?;
        state.dom.ensure_no_dialog()?;
        Ok(state)
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> Option<R> {
        self.state.lock().ok().map(|mut state| f(&mut state))
    }

    /// Edit the DOM directly
    pub fn with_dom<R>(&self, f: impl FnOnce(&mut MockDom) -> R) -> Option<R> {
        self.with_state(|s| {
            let out = f(&mut s.dom);
            s.settle();
            out
        })
    }

    /// Add an element to the current document
    pub fn add_element(&self, element: MockElement) {
        self.with_dom(|dom| dom.add(element));
    }

    /// Set the URL without rendering
    pub fn set_url(&self, url: impl Into<String>) {
        let url = url.into();
        self.with_state(|s| s.dom.url = url);
    }

    /// Load `url` after `polls` more URL reads
    pub fn redirect_after(&self, url: impl Into<String>, polls: u32) {
        let url = url.into();
        self.with_state(|s| s.dom.redirect_after(url, polls));
    }

    /// Open a native dialog
    pub fn open_dialog(&self, dialog: DialogHandle) {
        self.with_state(|s| s.dom.open_dialog(dialog));
    }

    /// Run `handler` whenever `locator` is clicked
    pub fn on_click<F>(&self, locator: Locator, handler: F)
    where
        F: Fn(&mut MockDom, usize) + Send + Sync + 'static,
    {
        self.with_state(|s| s.click_handlers.push((locator, Arc::new(handler))));
    }

    /// Render documents whose URL contains `fragment` with `handler`
    pub fn on_page<F>(&self, fragment: impl Into<String>, handler: F)
    where
        F: Fn(&mut MockDom, &str) + Send + Sync + 'static,
    {
        let fragment = fragment.into();
        self.with_state(|s| s.page_handlers.push((fragment, Arc::new(handler))));
    }

    /// Fail the next `n` element lookups with a transient session error
    pub fn fail_next_lookups(&self, n: u32) {
        self.with_state(|s| s.failing_lookups = n);
    }

    /// Queue a result for the next unrecognized script
    pub fn push_script_result(&self, value: Value) {
        self.with_state(|s| s.script_results.push_back(value));
    }

    /// Current URL
    #[must_use]
    pub fn url(&self) -> String {
        self.with_state(|s| s.dom.url.clone()).unwrap_or_default()
    }

    /// `localStorage` entry
    #[must_use]
    pub fn local_storage_item(&self, key: &str) -> Option<String> {
        self.with_state(|s| s.dom.local_item(key).map(str::to_string))
            .flatten()
    }

    /// Set a `localStorage` entry
    pub fn set_local_storage_item(&self, key: impl Into<String>, value: impl Into<String>) {
        let (key, value) = (key.into(), value.into());
        self.with_state(|s| s.dom.set_local_item(key, value));
    }

    /// Number of elements matching `locator`
    #[must_use]
    pub fn element_count(&self, locator: &Locator) -> usize {
        self.with_state(|s| s.dom.count(locator)).unwrap_or(0)
    }

    /// Value of the first element matching `locator`
    #[must_use]
    pub fn value_of(&self, locator: &Locator) -> String {
        self.with_state(|s| s.dom.value_of(locator))
            .unwrap_or_default()
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.with_state(|s| s.history.clone()).unwrap_or_default()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.history().iter().any(|c| c.starts_with(method))
    }

    /// Number of recorded calls starting with `method`
    #[must_use]
    pub fn count_calls(&self, method: &str) -> usize {
        self.history()
            .iter()
            .filter(|c| c.starts_with(method))
            .count()
    }
}

fn arg_str(args: &[Value], i: usize) -> String {
    args.get(i)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

#[async_trait]
impl Session for MockSession {
    async fn navigate(&self, url: &str) -> ClubResult<()> {
        let mut state = self.lock_page()?;
        state.history.push(format!("navigate:{url}"));
        state.dom.navigate(url);
        state.settle();
        Ok(())
    }

    async fn current_url(&self) -> ClubResult<String> {
        let mut state = self.lock()?;
        if let Some((target, remaining)) = state.dom.redirect.as_mut() {
            if *remaining == 0 {
                let target = target.clone();
                state.dom.redirect = None;
                state.dom.navigate(target);
                state.settle();
            } else {
                *remaining -= 1;
            }
        }
        Ok(state.dom.url.clone())
    }

    async fn title(&self) -> ClubResult<String> {
        Ok(self.lock_page()?.dom.title.clone())
    }

    async fn refresh(&self) -> ClubResult<()> {
        let mut state = self.lock_page()?;
        state.history.push("refresh".to_string());
        let url = state.dom.url.clone();
        state.render(url);
        Ok(())
    }

    async fn go_back(&self) -> ClubResult<()> {
        let mut state = self.lock_page()?;
        state.history.push("go_back".to_string());
        if let Some(url) = state.back_stack.pop() {
            state.render(url);
        }
        Ok(())
    }

    async fn find_elements(&self, locator: &Locator) -> ClubResult<Vec<ElementHandle>> {
        let mut state = self.lock_page()?;
        if state.failing_lookups > 0 {
            state.failing_lookups -= 1;
            return Err(ClubError::session(format!("lookup failed: {locator}")));
        }
        let found = state
            .dom
            .elements
            .iter_mut()
            .filter(|e| e.matches(locator))
            .map(MockElement::observe)
            .filter(|hit| *hit)
            .count();
        Ok((0..found)
            .map(|i| ElementHandle::new(locator.clone(), i))
            .collect())
    }

    async fn text(&self, element: &ElementHandle) -> ClubResult<String> {
        let state = self.lock_page()?;
        let i = state.dom.resolve(element)?;
        Ok(state.dom.elements[i].text.clone())
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> ClubResult<Option<String>> {
        let state = self.lock_page()?;
        let el = &state.dom.elements[state.dom.resolve(element)?];
        Ok(el
            .attributes
            .get(name)
            .cloned()
            .or_else(|| (name == "value").then(|| el.value.clone())))
    }

    async fn child_texts(
        &self,
        element: &ElementHandle,
        child: &Locator,
    ) -> ClubResult<Vec<String>> {
        let state = self.lock_page()?;
        let el = &state.dom.elements[state.dom.resolve(element)?];
        Ok(el
            .children
            .iter()
            .filter(|(loc, _)| loc == child)
            .map(|(_, text)| text.clone())
            .collect())
    }

    async fn is_displayed(&self, element: &ElementHandle) -> ClubResult<bool> {
        let state = self.lock_page()?;
        let i = state.dom.resolve(element)?;
        Ok(state.dom.elements[i].displayed)
    }

    async fn is_enabled(&self, element: &ElementHandle) -> ClubResult<bool> {
        let mut state = self.lock_page()?;
        let i = state.dom.resolve(element)?;
        Ok(state.dom.elements[i].check_enabled())
    }

    async fn node_id(&self, element: &ElementHandle) -> ClubResult<String> {
        let state = self.lock_page()?;
        let i = state.dom.resolve(element)?;
        Ok(format!("mock-{}", state.dom.elements[i].node))
    }

    async fn node_displayed(&self, node_id: &str) -> ClubResult<Option<bool>> {
        let mut state = self.lock_page()?;
        let node = state
            .dom
            .elements
            .iter_mut()
            .find(|e| format!("mock-{}", e.node) == node_id);
        Ok(node.and_then(|el| el.observe().then_some(el.displayed)))
    }

    async fn click(&self, element: &ElementHandle) -> ClubResult<()> {
        let mut state = self.lock()?;
        state.history.push(format!("click:{element}"));
        state.dom.ensure_no_dialog()?;
        let i = state.dom.resolve(element)?;
        let el = &mut state.dom.elements[i];
        if !el.displayed {
            return Err(ClubError::session(format!("element not interactable: {element}")));
        }
        if el.fail_clicks > 0 {
            el.fail_clicks -= 1;
            return Err(ClubError::session(format!("click intercepted: {element}")));
        }
        let handlers: Vec<ClickHandler> = state
            .click_handlers
            .iter()
            .filter(|(loc, _)| loc == element.locator())
            .map(|(_, h)| Arc::clone(h))
            .collect();
        for handler in handlers {
            handler(&mut state.dom, element.index());
        }
        state.settle();
        Ok(())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> ClubResult<()> {
        let mut state = self.lock_page()?;
        state.history.push(format!("send_keys:{element}:{text}"));
        let i = state.dom.resolve(element)?;
        state.dom.elements[i].value.push_str(text);
        Ok(())
    }

    async fn clear(&self, element: &ElementHandle) -> ClubResult<()> {
        let mut state = self.lock_page()?;
        state.history.push(format!("clear:{element}"));
        let i = state.dom.resolve(element)?;
        state.dom.elements[i].value.clear();
        Ok(())
    }

    async fn submit(&self, element: &ElementHandle) -> ClubResult<()> {
        let mut state = self.lock_page()?;
        state.history.push(format!("submit:{element}"));
        state.dom.resolve(element)?;
        let handlers: Vec<ClickHandler> = state
            .click_handlers
            .iter()
            .filter(|(loc, _)| loc == element.locator())
            .map(|(_, h)| Arc::clone(h))
            .collect();
        for handler in handlers {
            handler(&mut state.dom, element.index());
        }
        state.settle();
        Ok(())
    }

    async fn execute_script(&self, source: &str, args: &[Value]) -> ClubResult<Value> {
        let mut state = self.lock_page()?;
        let result = match source {
            scripts::LOCAL_STORAGE_GET => {
                state.history.push("script:local_storage_get".to_string());
                state
                    .dom
                    .local_item(&arg_str(args, 0))
                    .map_or(Value::Null, |v| Value::String(v.to_string()))
            }
            scripts::LOCAL_STORAGE_SET => {
                state.history.push("script:local_storage_set".to_string());
                state.dom.set_local_item(arg_str(args, 0), arg_str(args, 1));
                Value::Null
            }
            scripts::LOCAL_STORAGE_REMOVE => {
                state.history.push("script:local_storage_remove".to_string());
                state.dom.local_storage.remove(&arg_str(args, 0));
                Value::Null
            }
            scripts::LOCAL_STORAGE_CLEAR => {
                state.history.push("script:local_storage_clear".to_string());
                state.dom.clear_local_storage();
                Value::Null
            }
            scripts::SESSION_STORAGE_CLEAR => {
                state.history.push("script:session_storage_clear".to_string());
                state.dom.session_storage.clear();
                Value::Null
            }
            scripts::SCROLL_INTO_VIEW => {
                state.history.push("script:scroll".to_string());
                Value::Bool(true)
            }
            other => {
                state.history.push(format!("script:{other}"));
                state.script_results.pop_front().unwrap_or(Value::Null)
            }
        };
        Ok(result)
    }

    async fn dialog(&self) -> ClubResult<Option<DialogHandle>> {
        let mut state = self.lock()?;
        state.history.push("dialog".to_string());
        Ok(state.dom.dialog.clone())
    }

    async fn accept_dialog(&self) -> ClubResult<()> {
        let mut state = self.lock()?;
        state.history.push("accept_dialog".to_string());
        if state.dom.dialog.take().is_none() {
            return Err(ClubError::session("no such alert"));
        }
        if let Some(handler) = state.dom.on_accept.take() {
            handler(&mut state.dom);
        }
        state.settle();
        Ok(())
    }

    async fn screenshot(&self, path: &Path) -> ClubResult<()> {
        let mut state = self.lock_page()?;
        state.history.push(format!("screenshot:{}", path.display()));
        Ok(())
    }

    async fn close(&self) -> ClubResult<()> {
        self.lock()?.history.push("close".to_string());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    mod element_tests {
        use super::*;

        #[tokio::test]
        async fn test_appear_after_misses_first_lookups() {
            let mock = MockSession::new();
            mock.add_element(MockElement::new(Locator::id("message")).appear_after(2));
            let loc = Locator::id("message");
            assert!(mock.find_elements(&loc).await.unwrap().is_empty());
            assert!(mock.find_elements(&loc).await.unwrap().is_empty());
            assert_eq!(mock.find_elements(&loc).await.unwrap().len(), 1);
        }

        #[tokio::test]
        async fn test_detach_after_makes_handle_stale() {
            let mock = MockSession::new();
            mock.add_element(MockElement::new(Locator::css(".row")).detach_after(1));
            let loc = Locator::css(".row");
            let handle = mock.try_find(&loc).await.unwrap().unwrap();
            assert!(mock.is_displayed(&handle).await.unwrap());
            assert!(mock.find_elements(&loc).await.unwrap().is_empty());
            let err = mock.is_displayed(&handle).await.unwrap_err();
            assert!(matches!(err, ClubError::StaleElement { .. }));
        }

        #[tokio::test]
        async fn test_enabled_after_checks() {
            let mock = MockSession::new();
            mock.add_element(MockElement::new(Locator::id("b")).enabled_after(1));
            let h = mock.try_find(&Locator::id("b")).await.unwrap().unwrap();
            assert!(!mock.is_enabled(&h).await.unwrap());
            assert!(mock.is_enabled(&h).await.unwrap());
        }

        #[tokio::test]
        async fn test_multi_locator_element() {
            let mock = MockSession::new();
            mock.add_element(
                MockElement::new(Locator::css(".cart-item"))
                    .also_matches(Locator::css("tbody tr"))
                    .with_child(Locator::css("td"), "Áo bơi"),
            );
            let h = mock.try_find(&Locator::css("tbody tr")).await.unwrap().unwrap();
            assert_eq!(
                mock.child_texts(&h, &Locator::css("td")).await.unwrap(),
                vec!["Áo bơi".to_string()]
            );
            assert_eq!(mock.element_count(&Locator::css(".cart-item")), 1);
        }
    }

    mod interaction_tests {
        use super::*;

        #[tokio::test]
        async fn test_send_keys_and_clear() {
            let mock = MockSession::new();
            mock.add_element(MockElement::new(Locator::id("username")).with_value("old"));
            let h = mock.try_find(&Locator::id("username")).await.unwrap().unwrap();
            mock.clear(&h).await.unwrap();
            mock.send_keys(&h, "testuser@example.com").await.unwrap();
            assert_eq!(mock.value_of(&Locator::id("username")), "testuser@example.com");
            assert_eq!(
                mock.attribute(&h, "value").await.unwrap().as_deref(),
                Some("testuser@example.com")
            );
            assert!(mock.was_called("send_keys:By.id(username)[0]"));
        }

        #[tokio::test]
        async fn test_click_handler_navigates_and_renders() {
            let mock = MockSession::new();
            mock.on_page("login.html", |dom, _| {
                dom.add(MockElement::new(Locator::id("loginBtn")));
            });
            mock.on_page("trangchu.html", |dom, _| {
                dom.add(MockElement::new(Locator::css(".logo")));
            });
            mock.on_click(Locator::id("loginBtn"), |dom, _| {
                dom.navigate("http://x/trangchu.html");
            });

            mock.navigate("http://x/login.html").await.unwrap();
            let btn = mock.try_find(&Locator::id("loginBtn")).await.unwrap().unwrap();
            mock.click(&btn).await.unwrap();

            assert_eq!(mock.current_url().await.unwrap(), "http://x/trangchu.html");
            assert_eq!(mock.element_count(&Locator::id("loginBtn")), 0);
            assert_eq!(mock.element_count(&Locator::css(".logo")), 1);

            mock.go_back().await.unwrap();
            assert_eq!(mock.url(), "http://x/login.html");
        }

        #[tokio::test]
        async fn test_click_fails_while_dialog_open() {
            let mock = MockSession::new();
            mock.add_element(MockElement::new(Locator::id("b")));
            let h = mock.try_find(&Locator::id("b")).await.unwrap().unwrap();
            mock.open_dialog(DialogHandle::alert("hi"));
            assert!(mock.click(&h).await.unwrap_err().is_transient());
            mock.accept_dialog().await.unwrap();
            mock.click(&h).await.unwrap();
        }

        #[tokio::test]
        async fn test_open_dialog_blocks_page_commands() {
            let mock = MockSession::new();
            mock.add_element(MockElement::new(Locator::id("b")).with_text("Xoá"));
            let h = mock.try_find(&Locator::id("b")).await.unwrap().unwrap();
            mock.open_dialog(DialogHandle::confirm("Bạn có chắc?"));

            let err = mock.find_elements(&Locator::id("b")).await.unwrap_err();
            assert!(err.is_transient());
            assert!(err.to_string().contains("Bạn có chắc?"));
            assert!(mock.text(&h).await.unwrap_err().is_transient());
            assert!(mock.is_displayed(&h).await.unwrap_err().is_transient());
            assert!(mock.send_keys(&h, "x").await.is_err());
            assert!(mock.title().await.is_err());
            assert!(mock.execute_script("return 1;", &[]).await.is_err());
            assert!(mock.navigate("http://x/other.html").await.is_err());

            assert_eq!(mock.current_url().await.unwrap(), "about:blank");
            assert!(mock.dialog().await.unwrap().is_some());
            mock.accept_dialog().await.unwrap();
            assert_eq!(mock.text(&h).await.unwrap(), "Xoá");
        }

        #[tokio::test]
        async fn test_confirm_runs_accept_handler() {
            let mock = MockSession::new();
            mock.add_element(MockElement::new(Locator::css(".row")));
            mock.add_element(MockElement::new(Locator::css(".row")));
            mock.with_dom(|dom| {
                dom.open_confirm("Xoá?", |dom| {
                    dom.remove_nth(&Locator::css(".row"), 0);
                });
            });
            assert!(mock.dialog().await.unwrap().is_some());
            mock.accept_dialog().await.unwrap();
            assert_eq!(mock.element_count(&Locator::css(".row")), 1);
            assert!(mock.dialog().await.unwrap().is_none());
            assert!(mock.accept_dialog().await.is_err());
        }
    }

    mod node_tests {
        use super::*;

        #[tokio::test]
        async fn test_node_follows_element_not_position() {
            let mock = MockSession::new();
            mock.add_element(MockElement::new(Locator::css(".row")).with_text("a"));
            mock.add_element(MockElement::new(Locator::css(".row")).with_text("b"));
            let second = ElementHandle::new(Locator::css(".row"), 1);
            let node = mock.node_id(&second).await.unwrap();

            mock.with_dom(|dom| dom.remove_nth(&Locator::css(".row"), 0));
            assert_eq!(mock.node_displayed(&node).await.unwrap(), Some(true));

            mock.with_dom(|dom| dom.remove(&Locator::css(".row")));
            mock.add_element(MockElement::new(Locator::css(".row")).with_text("b"));
            assert_eq!(mock.node_displayed(&node).await.unwrap(), None);
        }

        #[tokio::test]
        async fn test_fail_next_lookups() {
            let mock = MockSession::new();
            mock.add_element(MockElement::new(Locator::id("b")));
            mock.fail_next_lookups(2);
            assert!(mock.find_elements(&Locator::id("b")).await.unwrap_err().is_transient());
            assert!(mock.find_elements(&Locator::id("b")).await.is_err());
            assert_eq!(mock.find_elements(&Locator::id("b")).await.unwrap().len(), 1);
        }

        #[tokio::test]
        async fn test_screenshot_recorded() {
            let mock = MockSession::new();
            mock.screenshot(Path::new("shots/a.png")).await.unwrap();
            assert!(mock.was_called("screenshot:shots/a.png"));
        }
    }

    mod script_tests {
        use super::*;

        #[tokio::test]
        async fn test_local_storage_scripts() {
            let mock = MockSession::new();
            mock.execute_script(scripts::LOCAL_STORAGE_SET, &[json!("token"), json!("abc")])
                .await
                .unwrap();
            let v = mock
                .execute_script(scripts::LOCAL_STORAGE_GET, &[json!("token")])
                .await
                .unwrap();
            assert_eq!(v, json!("abc"));
            mock.execute_script(scripts::LOCAL_STORAGE_CLEAR, &[])
                .await
                .unwrap();
            assert_eq!(mock.local_storage_item("token"), None);
        }

        #[tokio::test]
        async fn test_unknown_script_uses_queue() {
            let mock = MockSession::new();
            mock.push_script_result(json!(42));
            assert_eq!(mock.execute_script("return 42;", &[]).await.unwrap(), json!(42));
            assert_eq!(mock.execute_script("return 42;", &[]).await.unwrap(), Value::Null);
        }

        #[tokio::test]
        async fn test_redirect_after_polls() {
            let mock = MockSession::new();
            mock.redirect_after("http://x/home", 1);
            assert_eq!(mock.current_url().await.unwrap(), "about:blank");
            assert_eq!(mock.current_url().await.unwrap(), "http://x/home");
        }
    }
}
