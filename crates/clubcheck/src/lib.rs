//! clubcheck: end-to-end UI checks for the HNT Swim Club storefront
//!
//! Scenarios drive the storefront through page objects. Every page object
//! talks to the browser through the [`Session`] trait and waits through a
//! [`SyncPolicy`], so no scenario ever sleeps for a fixed time.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    CLUBCHECK Architecture                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │   ┌──────────┐    ┌─────────────┐    ┌──────────────────┐    │
//! │   │ Scenario │───►│ Page object │───►│ SyncPolicy       │    │
//! │   │ groups   │    │ (Interact.) │    │ (bounded polls)  │    │
//! │   └──────────┘    └─────────────┘    └────────┬─────────┘    │
//! │        ▲                                      ▼              │
//! │   ┌──────────┐                      ┌──────────────────┐     │
//! │   │ Runner   │                      │ Session          │     │
//! │   │ + report │                      │ (CDP | mock)     │     │
//! │   └──────────┘                      └──────────────────┘     │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod auth;
mod dialog;
mod locator;
mod result;
mod session;

/// Chromium session over the DevTools protocol
#[cfg(feature = "browser")]
pub mod cdp;

/// Suite configuration, page routes and browser launch options
pub mod config;

/// Scriptable in-memory session for tests
#[allow(clippy::missing_panics_doc)]
pub mod mock;

/// Page objects for every storefront screen
pub mod page;

/// Scenario groups and the runner
pub mod scenario;

/// JavaScript snippets run through [`Session::execute_script`]
pub mod scripts;

/// Generated users, players and checkout data
pub mod testdata;

/// Bounded waiting
pub mod wait;

pub use auth::{AuthRecord, AuthStorage, EMAIL_KEY, ROLE_KEY, TOKEN_KEY, USER_ID_KEY};
#[cfg(feature = "browser")]
pub use cdp::{CdpSession, ChromiumFactory};
pub use config::{Credentials, DriverConfig, PageKey, SuiteConfig};
pub use dialog::{DialogHandle, DialogKind};
pub use locator::Locator;
pub use mock::{MockDom, MockElement, MockSession};
pub use page::confirm::{ConfirmOutcome, ConfirmSurface};
pub use page::{Interactable, PageObject, StatusBanner};
pub use result::{ClubError, ClubResult};
pub use scenario::runner::{RunReport, Runner, ScenarioOutcome, ScenarioResult};
pub use scenario::{
    all_groups, Scenario, ScenarioContext, ScenarioFn, ScenarioGroup, SessionFactory,
};
pub use session::{ElementHandle, Session};
pub use wait::{SyncPolicy, WaitOptions, WaitOutcome};
