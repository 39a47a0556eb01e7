//! Storefront landing page.

use super::{Interactable, PageObject, READ_TIMEOUT};
use crate::config::PageKey;
use crate::locator::Locator;
use crate::result::ClubResult;
use tracing::debug;

/// Home page locators
#[derive(Debug, Clone)]
pub struct HomeLocators {
    pub logo: Locator,
    pub login_link: Locator,
    pub profile_link: Locator,
    pub cart_link: Locator,
    pub products_link: Locator,
    pub players_link: Locator,
    pub events_link: Locator,
    pub product_cards: Locator,
    pub add_to_cart_buttons: Locator,
    pub search_input: Locator,
}

impl Default for HomeLocators {
    fn default() -> Self {
        Self {
            logo: Locator::css(".logo"),
            login_link: Locator::css("a[href*=\"login.html\"]"),
            profile_link: Locator::css("a[href*=\"nguoidung.html\"]"),
            cart_link: Locator::css("a[href*=\"giohang\"], a[href*=\"ghtt.html\"]"),
            products_link: Locator::css("a[href*=\"danhmuc_sp.html\"]"),
            players_link: Locator::css("a[href*=\"tuyenthu\"]"),
            events_link: Locator::css("a[href*=\"sukien\"]"),
            product_cards: Locator::css(".product-card, .product-item"),
            add_to_cart_buttons: Locator::css(".add-btn, .btn-add-cart"),
            search_input: Locator::css("input[type=\"search\"], .search-input"),
        }
    }
}

/// Storefront landing page
#[derive(Debug, Clone)]
pub struct HomePage {
    ui: Interactable,
    locators: HomeLocators,
}

impl PageObject for HomePage {
    fn page_key(&self) -> PageKey {
        PageKey::Home
    }

    fn ui(&self) -> &Interactable {
        &self.ui
    }
}

impl HomePage {
    #[must_use]
    pub fn new(ui: Interactable) -> Self {
        Self {
            ui,
            locators: HomeLocators::default(),
        }
    }

    #[must_use]
    pub const fn locators(&self) -> &HomeLocators {
        &self.locators
    }

    /// The header shows a profile link only to signed-in users
    pub async fn is_logged_in(&self) -> bool {
        self.ui.is_present(&self.locators.profile_link).await
    }

    pub async fn click_login_link(&self) -> ClubResult<()> {
        self.ui.safe_click(&self.locators.login_link).await
    }

    pub async fn click_profile_link(&self) -> ClubResult<()> {
        self.ui.safe_click(&self.locators.profile_link).await
    }

    pub async fn click_cart_link(&self) -> ClubResult<()> {
        self.ui.safe_click(&self.locators.cart_link).await
    }

    pub async fn click_products_link(&self) -> ClubResult<()> {
        self.ui.safe_click(&self.locators.products_link).await
    }

    pub async fn click_players_link(&self) -> ClubResult<()> {
        self.ui.safe_click(&self.locators.players_link).await
    }

    pub async fn click_events_link(&self) -> ClubResult<()> {
        self.ui.safe_click(&self.locators.events_link).await
    }

    /// Number of product cards, `0` if none render
    pub async fn product_count(&self) -> usize {
        self.ui
            .visible_count(&self.locators.product_cards, READ_TIMEOUT)
            .await
    }

    pub async fn click_first_product(&self) -> ClubResult<()> {
        self.ui
            .click_nth(&self.locators.product_cards, 0, "open first product")
            .await
    }

    /// Add product `index` to the cart from its card
    pub async fn click_add_to_cart(&self, index: usize) -> ClubResult<()> {
        self.ui
            .click_nth(&self.locators.add_to_cart_buttons, index, "add to cart")
            .await
    }

    /// Type `keyword` into the search box and submit.
    ///
    /// Returns `false` without acting when the page has no search box.
    pub async fn search(&self, keyword: &str) -> ClubResult<bool> {
        let session = self.ui.session();
        let input = match self
            .ui
            .wait()
            .wait_visible(&self.locators.search_input, Some(READ_TIMEOUT))
            .await
        {
            Ok(handle) => handle,
            Err(e) if e.is_timeout() => {
                debug!(keyword, "search not available on this page");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };
        session.clear(&input).await?;
        session.send_keys(&input, keyword).await?;
        session.submit(&input).await?;
        Ok(true)
    }

    /// Drop the stored login and reload
    pub async fn logout(&self) -> ClubResult<()> {
        self.ui.clear_local_storage().await?;
        self.ui.refresh().await
    }
}
