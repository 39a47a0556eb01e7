//! Confirm-then-act.
//!
//! A destructive click is followed by one of two confirmation surfaces: an
//! in-page modal or a native dialog. [`ConfirmSurface::resolve`] tries the
//! modal first under a short timeout; only when the modal never shows does
//! it look for a native dialog, exactly once. If neither appears the flow
//! ends as [`ConfirmOutcome::Unresolved`] and the caller decides whether that
//! is an error.

use super::Interactable;
use crate::locator::Locator;
use crate::result::{ClubError, ClubResult};
use std::time::Duration;
use tracing::{debug, warn};

/// Default wait for the in-page modal
pub const MODAL_TIMEOUT: Duration = Duration::from_millis(2_000);

/// Default wait for the native dialog
pub const DIALOG_TIMEOUT: Duration = Duration::from_millis(2_000);

/// Which surface confirmed the action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// In-page modal accepted
    Modal,
    /// Native dialog accepted
    Alert,
    /// Nothing appeared
    Unresolved,
}

impl ConfirmOutcome {
    /// Whether something was accepted
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        !matches!(self, Self::Unresolved)
    }

    /// Turn [`Self::Unresolved`] into [`ClubError::ConfirmationUnresolved`]
    pub fn require(self, action: &str) -> ClubResult<Self> {
        if self.is_resolved() {
            Ok(self)
        } else {
            Err(ClubError::ConfirmationUnresolved {
                action: action.to_string(),
            })
        }
    }
}

/// Where to look for a confirmation
#[derive(Debug, Clone)]
pub struct ConfirmSurface {
    /// In-page modal container
    pub modal: Locator,
    /// Accept button inside the modal
    pub accept: Locator,
    /// Wait for the modal
    pub modal_timeout: Duration,
    /// Wait for the native dialog
    pub dialog_timeout: Duration,
}

impl ConfirmSurface {
    /// Surface with default timeouts
    #[must_use]
    pub const fn new(modal: Locator, accept: Locator) -> Self {
        Self {
            modal,
            accept,
            modal_timeout: MODAL_TIMEOUT,
            dialog_timeout: DIALOG_TIMEOUT,
        }
    }

    /// Set dialog wait
    #[must_use]
    pub const fn with_dialog_timeout(mut self, timeout: Duration) -> Self {
        self.dialog_timeout = timeout;
        self
    }

    /// Accept whichever confirmation appears
    pub async fn resolve(&self, ui: &Interactable, action: &str) -> ClubResult<ConfirmOutcome> {
        match ui.wait().wait_visible(&self.modal, Some(self.modal_timeout)).await {
            Ok(_) => {
                ui.safe_click(&self.accept).await?;
                debug!(action, "confirmed via modal");
                return Ok(ConfirmOutcome::Modal);
            }
            Err(e) if e.is_timeout() => {}
            Err(e) => return Err(e),
        }

        match ui.wait().wait_alert(Some(self.dialog_timeout)).await {
            Ok(dialog) => {
                ui.session().accept_dialog().await?;
                debug!(action, kind = %dialog.kind(), "confirmed via native dialog");
                Ok(ConfirmOutcome::Alert)
            }
            Err(e) if e.is_timeout() => {
                warn!(action, "no confirmation surface found");
                Ok(ConfirmOutcome::Unresolved)
            }
            Err(e) => Err(e),
        }
    }
}
