//! Sign-in form.

use super::{Interactable, PageObject, StatusBanner};
use crate::config::PageKey;
use crate::locator::Locator;
use crate::result::ClubResult;
use std::time::Duration;

/// Login page locators
#[derive(Debug, Clone)]
pub struct LoginLocators {
    pub username: Locator,
    pub password: Locator,
    pub login_button: Locator,
    pub message: Locator,
    pub register_link: Locator,
    pub forgot_password_link: Locator,
}

impl Default for LoginLocators {
    fn default() -> Self {
        Self {
            username: Locator::id("username"),
            password: Locator::id("password"),
            login_button: Locator::id("loginBtn"),
            message: Locator::id("message"),
            register_link: Locator::css("a[href*=\"đk.html\"]"),
            forgot_password_link: Locator::css("a[href*=\"qmk.html\"]"),
        }
    }
}

/// Sign-in form
#[derive(Debug, Clone)]
pub struct LoginPage {
    ui: Interactable,
    locators: LoginLocators,
    banner: StatusBanner,
}

impl PageObject for LoginPage {
    fn page_key(&self) -> PageKey {
        PageKey::Login
    }

    fn ui(&self) -> &Interactable {
        &self.ui
    }
}

impl LoginPage {
    #[must_use]
    pub fn new(ui: Interactable) -> Self {
        let locators = LoginLocators::default();
        let banner = StatusBanner::new(locators.message.clone());
        Self {
            ui,
            locators,
            banner,
        }
    }

    #[must_use]
    pub const fn locators(&self) -> &LoginLocators {
        &self.locators
    }

    /// Fill both fields and submit
    pub async fn login(&self, email: &str, password: &str) -> ClubResult<()> {
        self.ui.type_into(&self.locators.username, email).await?;
        self.ui.type_into(&self.locators.password, password).await?;
        self.ui.safe_click(&self.locators.login_button).await
    }

    pub async fn message_text(&self) -> String {
        self.banner.text(&self.ui).await
    }

    pub async fn message_class(&self) -> String {
        self.banner.class(&self.ui).await
    }

    pub async fn is_success_message(&self) -> bool {
        self.banner.is_success(&self.ui).await
    }

    pub async fn is_error_message(&self) -> bool {
        self.banner.is_error(&self.ui).await
    }

    pub async fn click_register_link(&self) -> ClubResult<()> {
        self.ui.safe_click(&self.locators.register_link).await
    }

    pub async fn click_forgot_password_link(&self) -> ClubResult<()> {
        self.ui.safe_click(&self.locators.forgot_password_link).await
    }

    /// Wait until the URL contains `fragment`
    pub async fn wait_for_redirect(
        &self,
        fragment: &str,
        timeout: Option<Duration>,
    ) -> ClubResult<String> {
        self.ui.wait().wait_url_contains(fragment, timeout).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::MockElement;
    use crate::page::tests::fixture;

    fn login_form(mock: &crate::mock::MockSession) {
        let l = LoginLocators::default();
        mock.on_page("login.html", move |dom, _| {
            dom.add(MockElement::new(l.username.clone()));
            dom.add(MockElement::new(l.password.clone()));
            dom.add(MockElement::new(l.login_button.clone()));
            dom.add(MockElement::new(l.message.clone()).hidden());
            dom.add(MockElement::new(l.register_link.clone()));
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_fills_and_clicks() {
        let (mock, ui) = fixture();
        login_form(&mock);
        let page = LoginPage::new(ui);
        page.open().await.unwrap();

        page.login("testuser@example.com", "password123").await.unwrap();

        assert_eq!(mock.value_of(&page.locators().username), "testuser@example.com");
        assert_eq!(mock.value_of(&page.locators().password), "password123");
        assert_eq!(mock.count_calls("click:By.id(loginBtn)"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_banner_reads() {
        let (mock, ui) = fixture();
        login_form(&mock);
        let l = LoginLocators::default();
        mock.on_click(l.login_button.clone(), move |dom, _| {
            if let Some(msg) = dom.element_mut(&l.message) {
                msg.set_text("Sai mật khẩu");
                msg.set_attribute("class", "message error");
                msg.set_displayed(true);
            }
        });
        let page = LoginPage::new(ui);
        page.open().await.unwrap();
        page.login("a@b.c", "wrong").await.unwrap();

        assert_eq!(page.message_text().await, "Sai mật khẩu");
        assert!(page.is_error_message().await);
        assert!(!page.is_success_message().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_banner_degrades_when_hidden() {
        let (mock, ui) = fixture();
        login_form(&mock);
        let page = LoginPage::new(ui);
        page.open().await.unwrap();
        assert_eq!(page.message_text().await, "");
        assert_eq!(page.message_class().await, "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_register_link() {
        let (mock, ui) = fixture();
        login_form(&mock);
        let page = LoginPage::new(ui);
        page.open().await.unwrap();
        page.click_register_link().await.unwrap();
        assert!(mock.was_called("click:By.css(a[href*=\"đk.html\"])"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_redirect() {
        let (mock, ui) = fixture();
        mock.redirect_after("http://localhost:3000/HNT-SWIM-CLUB-main/sp_home/trangchu.html", 2);
        let page = LoginPage::new(ui);
        let url = page.wait_for_redirect("trangchu.html", None).await.unwrap();
        assert!(url.contains("sp_home"));
        assert!(page
            .wait_for_redirect("admin", Some(Duration::from_millis(100)))
            .await
            .unwrap_err()
            .is_timeout());
    }
}
