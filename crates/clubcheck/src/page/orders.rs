//! Purchased orders, inside the user profile.

use super::confirm::{ConfirmOutcome, ConfirmSurface};
use super::{Interactable, PageObject, MESSAGE_TIMEOUT, READ_TIMEOUT};
use crate::config::PageKey;
use crate::locator::Locator;
use crate::result::ClubResult;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Wait for the orders tab after opening the profile
const TAB_TIMEOUT: Duration = Duration::from_millis(3_000);

const SHIPPED_MARKERS: [&str; 3] = ["vận chuyển", "shipped", "delivered"];
const FINAL_MARKERS: [&str; 2] = ["hoàn thành", "completed"];

/// Whether an order status reads as shipped
#[must_use]
pub fn is_shipped_status(status: &str) -> bool {
    let status = status.to_lowercase();
    SHIPPED_MARKERS.iter().any(|m| status.contains(m))
}

/// Whether an order with this status may still be cancelled
#[must_use]
pub fn is_cancellable_status(status: &str) -> bool {
    let lower = status.to_lowercase();
    !is_shipped_status(status) && !FINAL_MARKERS.iter().any(|m| lower.contains(m))
}

/// Orders tab locators
#[derive(Debug, Clone)]
pub struct OrdersLocators {
    pub orders_tab: Locator,
    pub order_items: Locator,
    pub order_statuses: Locator,
    pub view_detail_buttons: Locator,
    pub edit_buttons: Locator,
    pub cancel_buttons: Locator,
    pub confirm_cancel_modal: Locator,
    pub confirm_cancel_button: Locator,
    pub cancelled_tab: Locator,
    pub edit_name: Locator,
    pub edit_address: Locator,
    pub save_edit_button: Locator,
    pub success_message: Locator,
    pub error_message: Locator,
}

impl Default for OrdersLocators {
    fn default() -> Self {
        Self {
            orders_tab: Locator::css(
                "a[href=\"#orders\"], .tab-orders, button[onclick*=\"orders\"]",
            ),
            order_items: Locator::css(".order-item, .order-card"),
            order_statuses: Locator::css(".order-status"),
            view_detail_buttons: Locator::css(".view-detail-btn, .btn-detail"),
            edit_buttons: Locator::css(".edit-btn, button[onclick*=\"edit\"]"),
            cancel_buttons: Locator::css(".cancel-btn, button[onclick*=\"cancel\"]"),
            confirm_cancel_modal: Locator::css(".modal, .confirm-dialog"),
            confirm_cancel_button: Locator::css(
                ".confirm-yes, .btn-confirm, button[onclick*=\"confirmCancel\"]",
            ),
            cancelled_tab: Locator::css("a[href=\"#cancelled\"], .tab-cancelled"),
            edit_name: Locator::css("input[name=\"recipient_name\"], #edit-name"),
            edit_address: Locator::css(
                "input[name=\"recipient_address\"], textarea[name=\"address\"], #edit-address",
            ),
            save_edit_button: Locator::css(".save-btn, button[onclick*=\"save\"]"),
            success_message: Locator::css(".success-msg, .alert-success, #message.success"),
            error_message: Locator::css(".error-msg, .alert-error, #message.error"),
        }
    }
}

/// Orders section of the user profile
#[derive(Debug, Clone)]
pub struct OrdersPage {
    ui: Interactable,
    locators: OrdersLocators,
    confirm: ConfirmSurface,
}

#[async_trait]
impl PageObject for OrdersPage {
    fn page_key(&self) -> PageKey {
        PageKey::UserProfile
    }

    fn ui(&self) -> &Interactable {
        &self.ui
    }

    /// Open the profile, then switch to the orders tab when the page has one
    async fn open(&self) -> ClubResult<()> {
        self.ui.open_page(PageKey::UserProfile).await?;
        match self
            .ui
            .wait()
            .wait_clickable(&self.locators.orders_tab, Some(TAB_TIMEOUT))
            .await
        {
            Ok(_) => self.ui.safe_click(&self.locators.orders_tab).await,
            Err(e) if e.is_timeout() => {
                debug!("no orders tab, assuming orders are shown");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

impl OrdersPage {
    #[must_use]
    pub fn new(ui: Interactable) -> Self {
        let locators = OrdersLocators::default();
        let confirm = ConfirmSurface::new(
            locators.confirm_cancel_modal.clone(),
            locators.confirm_cancel_button.clone(),
        )
        .with_dialog_timeout(MESSAGE_TIMEOUT);
        Self {
            ui,
            locators,
            confirm,
        }
    }

    #[must_use]
    pub const fn locators(&self) -> &OrdersLocators {
        &self.locators
    }

    pub async fn order_count(&self) -> usize {
        self.ui.visible_count(&self.locators.order_items, READ_TIMEOUT).await
    }

    /// Status text of order `index`, empty when there is no such order
    pub async fn order_status(&self, index: usize) -> String {
        let statuses = &self.locators.order_statuses;
        if self.ui.visible_count(statuses, READ_TIMEOUT).await <= index {
            return String::new();
        }
        let Ok(handle) = self.ui.nth(statuses, index, "read order status").await else {
            return String::new();
        };
        self.ui.session().text(&handle).await.unwrap_or_default()
    }

    pub async fn click_view_detail(&self, index: usize) -> ClubResult<()> {
        self.ui
            .click_nth(&self.locators.view_detail_buttons, index, "view order detail")
            .await
    }

    pub async fn click_edit_order(&self, index: usize) -> ClubResult<()> {
        self.ui
            .click_nth(&self.locators.edit_buttons, index, "edit order")
            .await
    }

    pub async fn click_cancel_order(&self, index: usize) -> ClubResult<()> {
        self.ui
            .click_nth(&self.locators.cancel_buttons, index, "cancel order")
            .await
    }

    /// Replace recipient name and/or address, then save
    pub async fn edit_recipient_info(
        &self,
        name: Option<&str>,
        address: Option<&str>,
    ) -> ClubResult<()> {
        if let Some(name) = name {
            self.ui.type_into(&self.locators.edit_name, name).await?;
        }
        if let Some(address) = address {
            self.ui.type_into(&self.locators.edit_address, address).await?;
        }
        self.ui.safe_click(&self.locators.save_edit_button).await
    }

    /// Accept the cancellation prompt. Strict: fails with
    /// `ConfirmationUnresolved` when neither modal nor dialog shows.
    pub async fn confirm_cancellation(&self) -> ClubResult<ConfirmOutcome> {
        self.confirm
            .resolve(&self.ui, "cancel order")
            .await?
            .require("cancel order")
    }

    pub async fn cancel_with_confirmation(&self, index: usize) -> ClubResult<ConfirmOutcome> {
        self.click_cancel_order(index).await?;
        self.confirm_cancellation().await
    }

    /// Switch to cancelled orders; `false` when the page has no such tab
    pub async fn click_cancelled_tab(&self) -> bool {
        match self.ui.safe_click(&self.locators.cancelled_tab).await {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "cancelled tab not available");
                false
            }
        }
    }

    pub async fn success_message(&self) -> String {
        self.ui
            .visible_text(&self.locators.success_message, MESSAGE_TIMEOUT)
            .await
    }

    pub async fn error_message(&self) -> String {
        self.ui
            .visible_text(&self.locators.error_message, MESSAGE_TIMEOUT)
            .await
    }

    /// Whether order `index` has an enabled edit button right now
    pub async fn can_edit_order(&self, index: usize) -> bool {
        let session = self.ui.session();
        let Ok(buttons) = session.find_elements(&self.locators.edit_buttons).await else {
            return false;
        };
        match buttons.get(index) {
            Some(handle) => session.is_enabled(handle).await.unwrap_or(false),
            None => false,
        }
    }
}
