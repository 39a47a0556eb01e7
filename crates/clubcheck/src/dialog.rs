//! Native browser dialogs (alert, confirm, prompt, beforeunload).
//!
//! A [`DialogHandle`] is a snapshot of the dialog the browser is currently
//! showing. It carries no connection of its own: accepting goes through the
//! [`Session`](crate::Session) that reported it.

use serde::{Deserialize, Serialize};

/// Type of browser dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogKind {
    /// Alert dialog (OK button only)
    Alert,
    /// Confirm dialog (OK/Cancel buttons)
    Confirm,
    /// Prompt dialog (text input + OK/Cancel)
    Prompt,
    /// Before unload dialog (Leave/Stay buttons)
    BeforeUnload,
}

impl std::fmt::Display for DialogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alert => write!(f, "alert"),
            Self::Confirm => write!(f, "confirm"),
            Self::Prompt => write!(f, "prompt"),
            Self::BeforeUnload => write!(f, "beforeunload"),
        }
    }
}

/// Native dialog currently open in the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogHandle {
    kind: DialogKind,
    message: String,
}

impl DialogHandle {
    /// Create a new dialog handle
    #[must_use]
    pub fn new(kind: DialogKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Create an alert handle
    #[must_use]
    pub fn alert(message: impl Into<String>) -> Self {
        Self::new(DialogKind::Alert, message)
    }

    /// Create a confirm handle
    #[must_use]
    pub fn confirm(message: impl Into<String>) -> Self {
        Self::new(DialogKind::Confirm, message)
    }

    /// Dialog type
    #[must_use]
    pub const fn kind(&self) -> DialogKind {
        self.kind
    }

    /// Message shown in the dialog
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
