//! Cart and checkout.

use super::{Interactable, PageObject, READ_TIMEOUT};
use crate::config::PageKey;
use crate::locator::Locator;
use crate::result::{ClubError, ClubResult};
use crate::testdata::CheckoutData;
use std::fmt;
use std::str::FromStr;

/// Payment options offered at checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Cash on delivery
    Cod,
    /// Bank transfer (shows a QR code)
    Banking,
    /// MoMo wallet (shows a QR code)
    Momo,
}

impl PaymentMethod {
    /// Radio `value` attribute
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cod => "cod",
            Self::Banking => "banking",
            Self::Momo => "momo",
        }
    }

    /// Whether choosing this method reveals the QR section
    #[must_use]
    pub const fn shows_qr(self) -> bool {
        !matches!(self, Self::Cod)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ClubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cod" => Ok(Self::Cod),
            "banking" => Ok(Self::Banking),
            "momo" => Ok(Self::Momo),
            _ => Err(ClubError::UnknownPaymentMethod {
                method: s.to_string(),
            }),
        }
    }
}

/// Cart and checkout locators
#[derive(Debug, Clone)]
pub struct CartLocators {
    pub cart_items: Locator,
    pub empty_cart_message: Locator,
    pub checkout_button: Locator,
    pub total_price: Locator,
    pub remove_buttons: Locator,
    pub full_name: Locator,
    pub phone: Locator,
    pub address: Locator,
    pub note: Locator,
    pub cod_radio: Locator,
    pub banking_radio: Locator,
    pub momo_radio: Locator,
    pub place_order_button: Locator,
    pub qr_section: Locator,
    pub qr_image: Locator,
}

impl Default for CartLocators {
    fn default() -> Self {
        Self {
            cart_items: Locator::css(".cart-item, tbody tr"),
            empty_cart_message: Locator::css(".empty-cart, .empty-msg"),
            checkout_button: Locator::css(
                ".btn-checkout, button[onclick*=\"checkout\"], a[href*=\"thanhtoan\"]",
            ),
            total_price: Locator::css(".total-price, #total-price"),
            remove_buttons: Locator::css(".btn-remove, .remove-item"),
            full_name: Locator::id("fullname"),
            phone: Locator::id("phone"),
            address: Locator::id("address"),
            note: Locator::id("note"),
            cod_radio: Locator::css("input[value=\"cod\"]"),
            banking_radio: Locator::css("input[value=\"banking\"]"),
            momo_radio: Locator::css("input[value=\"momo\"]"),
            place_order_button: Locator::css("button[type=\"submit\"], .btn-order"),
            qr_section: Locator::id("qr-section"),
            qr_image: Locator::css(".qr-image img, #qr-section img"),
        }
    }
}

impl CartLocators {
    /// Radio button for `method`
    #[must_use]
    pub const fn payment_radio(&self, method: PaymentMethod) -> &Locator {
        match method {
            PaymentMethod::Cod => &self.cod_radio,
            PaymentMethod::Banking => &self.banking_radio,
            PaymentMethod::Momo => &self.momo_radio,
        }
    }
}

/// Cart and checkout
#[derive(Debug, Clone)]
pub struct CartPage {
    ui: Interactable,
    locators: CartLocators,
}

impl PageObject for CartPage {
    fn page_key(&self) -> PageKey {
        PageKey::Cart
    }

    fn ui(&self) -> &Interactable {
        &self.ui
    }
}

impl CartPage {
    #[must_use]
    pub fn new(ui: Interactable) -> Self {
        Self {
            ui,
            locators: CartLocators::default(),
        }
    }

    #[must_use]
    pub const fn locators(&self) -> &CartLocators {
        &self.locators
    }

    pub async fn open_checkout(&self) -> ClubResult<()> {
        self.ui.open_page(PageKey::Checkout).await
    }

    pub async fn cart_item_count(&self) -> usize {
        self.ui.visible_count(&self.locators.cart_items, READ_TIMEOUT).await
    }

    /// Empty-cart banner present, or no items at all
    pub async fn is_cart_empty(&self) -> bool {
        if self.ui.is_present(&self.locators.empty_cart_message).await {
            return true;
        }
        self.cart_item_count().await == 0
    }

    pub async fn click_checkout(&self) -> ClubResult<()> {
        self.ui.safe_click(&self.locators.checkout_button).await
    }

    pub async fn total_price(&self) -> String {
        self.ui.visible_text(&self.locators.total_price, READ_TIMEOUT).await
    }

    pub async fn remove_item(&self, index: usize) -> ClubResult<()> {
        self.ui
            .click_nth(&self.locators.remove_buttons, index, "remove cart item")
            .await
    }

    /// Fill whichever checkout fields `data` sets
    pub async fn fill_checkout_form(&self, data: &CheckoutData) -> ClubResult<()> {
        let l = &self.locators;
        self.ui.wait().wait_visible(&l.full_name, None).await?;
        for (locator, value) in [
            (&l.full_name, &data.full_name),
            (&l.phone, &data.phone),
            (&l.address, &data.address),
            (&l.note, &data.note),
        ] {
            if let Some(value) = value {
                self.ui.type_into(locator, value).await?;
            }
        }
        Ok(())
    }

    /// Pick a payment method by its radio value (`cod`, `banking`, `momo`)
    pub async fn select_payment_method(&self, method: &str) -> ClubResult<PaymentMethod> {
        let method: PaymentMethod = method.parse()?;
        self.ui.click(self.locators.payment_radio(method)).await?;
        Ok(method)
    }

    pub async fn click_place_order(&self) -> ClubResult<()> {
        self.ui.safe_click(&self.locators.place_order_button).await
    }

    pub async fn is_qr_section_visible(&self) -> bool {
        self.ui.is_visible(&self.locators.qr_section).await
    }

    pub async fn is_qr_image_displayed(&self) -> bool {
        self.ui.is_visible(&self.locators.qr_image).await
    }

    /// Fill, choose payment, place the order
    pub async fn complete_checkout(&self, data: &CheckoutData, method: &str) -> ClubResult<()> {
        self.fill_checkout_form(data).await?;
        self.select_payment_method(method).await?;
        self.click_place_order().await
    }
}
