//! Single product page.

use super::{Interactable, PageObject, READ_TIMEOUT};
use crate::config::PageKey;
use crate::locator::Locator;
use crate::result::ClubResult;
use tracing::{debug, warn};

/// Product detail locators
#[derive(Debug, Clone)]
pub struct ProductDetailLocators {
    pub name: Locator,
    pub price: Locator,
    pub image: Locator,
    pub buy_button: Locator,
    pub back_button: Locator,
    pub quantity: Locator,
    pub size: Locator,
}

impl Default for ProductDetailLocators {
    fn default() -> Self {
        Self {
            name: Locator::css(".product-name, h1, .detail-title"),
            price: Locator::css(".product-price, .price"),
            image: Locator::css(".product-image img, .detail-image img"),
            buy_button: Locator::css(".btn-buy, .add-to-cart, button[onclick*=\"addToCart\"]"),
            back_button: Locator::css(".btn-back, button[onclick*=\"back\"], a[href*=\"trangchu\"]"),
            quantity: Locator::css("input[type=\"number\"], .quantity-input"),
            size: Locator::css("select[name=\"size\"], .size-select"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProductDetailPage {
    ui: Interactable,
    locators: ProductDetailLocators,
}

impl PageObject for ProductDetailPage {
    fn page_key(&self) -> PageKey {
        PageKey::ProductDetail
    }

    fn ui(&self) -> &Interactable {
        &self.ui
    }
}

impl ProductDetailPage {
    #[must_use]
    pub fn new(ui: Interactable) -> Self {
        Self {
            ui,
            locators: ProductDetailLocators::default(),
        }
    }

    #[must_use]
    pub const fn locators(&self) -> &ProductDetailLocators {
        &self.locators
    }

    /// Open the page for one product
    pub async fn open_product(&self, product_id: &str) -> ClubResult<()> {
        let url = format!("{}?id={product_id}", self.url());
        self.ui.navigate(&url).await
    }

    pub async fn product_name(&self) -> String {
        self.ui.visible_text(&self.locators.name, READ_TIMEOUT).await
    }

    pub async fn product_price(&self) -> String {
        self.ui.visible_text(&self.locators.price, READ_TIMEOUT).await
    }

    pub async fn click_buy_button(&self) -> ClubResult<()> {
        self.ui.safe_click(&self.locators.buy_button).await
    }

    /// Use the page's back control, or browser history when it has none
    pub async fn click_back_button(&self) -> ClubResult<()> {
        if let Err(e) = self.ui.safe_click(&self.locators.back_button).await {
            warn!(error = %e, "back control unusable, using history back");
            self.ui.go_back().await?;
        }
        Ok(())
    }

    /// Returns `false` when the page has no quantity input
    pub async fn set_quantity(&self, quantity: u32) -> ClubResult<bool> {
        self.fill_optional(&self.locators.quantity, &quantity.to_string(), true)
            .await
    }

    /// Returns `false` when the page has no size selector
    pub async fn select_size(&self, size: &str) -> ClubResult<bool> {
        self.fill_optional(&self.locators.size, size, false).await
    }

    async fn fill_optional(&self, locator: &Locator, text: &str, clear: bool) -> ClubResult<bool> {
        let session = self.ui.session();
        let handle = match self.ui.wait().wait_visible(locator, Some(READ_TIMEOUT)).await {
            Ok(handle) => handle,
            Err(e) if e.is_timeout() => {
                debug!(locator = %locator, "control not available");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };
        if clear {
            session.clear(&handle).await?;
        }
        session.send_keys(&handle, text).await?;
        Ok(true)
    }

    pub async fn is_product_image_displayed(&self) -> bool {
        self.ui.is_visible(&self.locators.image).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::MockElement;
    use crate::page::tests::fixture;

    #[tokio::test]
    async fn test_open_product_appends_id() {
        let (mock, ui) = fixture();
        let page = ProductDetailPage::new(ui);
        page.open_product("42").await.unwrap();
        assert!(mock.url().ends_with("/sp_home/chitiet_sp.html?id=42"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reads() {
        let (mock, ui) = fixture();
        let l = ProductDetailLocators::default();
        mock.add_element(MockElement::new(l.name.clone()).with_text("Kính bơi Speedo"));
        mock.add_element(MockElement::new(l.price.clone()).with_text("350.000đ"));
        mock.add_element(MockElement::new(l.image.clone()));
        let page = ProductDetailPage::new(ui);
        assert_eq!(page.product_name().await, "Kính bơi Speedo");
        assert_eq!(page.product_price().await, "350.000đ");
        assert!(page.is_product_image_displayed().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_falls_back_to_history() {
        let (mock, ui) = fixture();
        mock.on_page("trangchu.html", |_, _| {});
        mock.on_page("chitiet_sp.html", |_, _| {});
        let page = ProductDetailPage::new(ui.clone());
        ui.open_page(PageKey::Home).await.unwrap();
        page.open_product("1").await.unwrap();

        page.click_back_button().await.unwrap();

        assert!(mock.was_called("go_back"));
        assert!(mock.url().contains("trangchu.html"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_uses_control_when_present() {
        let (mock, ui) = fixture();
        mock.add_element(MockElement::new(ProductDetailLocators::default().back_button));
        let page = ProductDetailPage::new(ui);
        page.click_back_button().await.unwrap();
        assert!(!mock.was_called("go_back"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_optional_controls() {
        let (mock, ui) = fixture();
        let l = ProductDetailLocators::default();
        mock.add_element(MockElement::new(l.quantity.clone()).with_value("1"));
        let page = ProductDetailPage::new(ui);
        assert!(page.set_quantity(3).await.unwrap());
        assert_eq!(mock.value_of(&l.quantity), "3");
        assert!(!page.select_size("M").await.unwrap());
    }
}
