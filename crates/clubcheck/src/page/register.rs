//! Account registration form.

use super::{Interactable, PageObject, StatusBanner};
use crate::config::PageKey;
use crate::locator::Locator;
use crate::result::ClubResult;

/// Register page locators
#[derive(Debug, Clone)]
pub struct RegisterLocators {
    pub full_name: Locator,
    pub email: Locator,
    pub password: Locator,
    pub confirm_password: Locator,
    pub register_button: Locator,
    pub message: Locator,
    pub login_link: Locator,
}

impl Default for RegisterLocators {
    fn default() -> Self {
        Self {
            full_name: Locator::id("reg_fullname"),
            email: Locator::id("reg_email"),
            password: Locator::id("reg_password"),
            confirm_password: Locator::id("reg_confirm_password"),
            register_button: Locator::id("registerBtn"),
            message: Locator::id("message"),
            login_link: Locator::css("a[href*=\"login.html\"]"),
        }
    }
}

/// Account registration form
#[derive(Debug, Clone)]
pub struct RegisterPage {
    ui: Interactable,
    locators: RegisterLocators,
    banner: StatusBanner,
}

impl PageObject for RegisterPage {
    fn page_key(&self) -> PageKey {
        PageKey::Register
    }

    fn ui(&self) -> &Interactable {
        &self.ui
    }
}

impl RegisterPage {
    #[must_use]
    pub fn new(ui: Interactable) -> Self {
        let locators = RegisterLocators::default();
        let banner = StatusBanner::new(locators.message.clone());
        Self {
            ui,
            locators,
            banner,
        }
    }

    #[must_use]
    pub const fn locators(&self) -> &RegisterLocators {
        &self.locators
    }

    /// Fill the form and submit; `confirm` defaults to `password`
    pub async fn register(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
        confirm: Option<&str>,
    ) -> ClubResult<()> {
        let l = &self.locators;
        self.ui.type_into(&l.full_name, full_name).await?;
        self.ui.type_into(&l.email, email).await?;
        self.ui.type_into(&l.password, password).await?;
        self.ui
            .type_into(&l.confirm_password, confirm.unwrap_or(password))
            .await?;
        self.ui.safe_click(&l.register_button).await
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

    pub async fn click_login_link(&self) -> ClubResult<()> {
        self.ui.safe_click(&self.locators.login_link).await
    }

    /// Whether the submit button carries a `disabled` attribute.
    ///
    /// Boolean attributes read back as `""`, `"true"` or `"disabled"`
    /// depending on the driver; all three count.
    pub async fn is_register_button_disabled(&self) -> ClubResult<bool> {
        let session = self.ui.session();
        let Some(button) = session.try_find(&self.locators.register_button).await? else {
            return Ok(false);
        };
        let disabled = session.attribute(&button, "disabled").await?;
        Ok(matches!(disabled.as_deref(), Some("" | "true" | "disabled")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{MockElement, MockSession};
    use crate::page::tests::fixture;

    fn register_form(mock: &MockSession, button: MockElement) {
        let l = RegisterLocators::default();
        for loc in [&l.full_name, &l.email, &l.password, &l.confirm_password] {
            mock.add_element(MockElement::new(loc.clone()));
        }
        mock.add_element(button);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirm_defaults_to_password() {
        let (mock, ui) = fixture();
        register_form(&mock, MockElement::new(Locator::id("registerBtn")));
        let page = RegisterPage::new(ui);

        page.register("Test User", "t@test.com", "Test@123456", None)
            .await
            .unwrap();

        assert_eq!(mock.value_of(&page.locators().confirm_password), "Test@123456");
        assert_eq!(mock.value_of(&page.locators().full_name), "Test User");
        assert!(mock.was_called("click:By.id(registerBtn)"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_confirm() {
        let (mock, ui) = fixture();
        register_form(&mock, MockElement::new(Locator::id("registerBtn")));
        let page = RegisterPage::new(ui);
        page.register("A", "a@test.com", "Test@123", Some("Other@123"))
            .await
            .unwrap();
        assert_eq!(mock.value_of(&page.locators().confirm_password), "Other@123");
    }

    #[tokio::test]
    async fn test_disabled_attribute_forms() {
        for (attr, expected) in [
            (Some("disabled"), true),
            (Some("true"), true),
            (Some(""), true),
            (Some("false"), false),
            (None, false),
        ] {
            let (mock, ui) = fixture();
            let mut button = MockElement::new(Locator::id("registerBtn"));
            if let Some(value) = attr {
                button = button.with_attribute("disabled", value);
            }
            register_form(&mock, button);
            let page = RegisterPage::new(ui);
            assert_eq!(
                page.is_register_button_disabled().await.unwrap(),
                expected,
                "{attr:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_missing_button_is_not_disabled() {
        let (_, ui) = fixture();
        let page = RegisterPage::new(ui);
        assert!(!page.is_register_button_disabled().await.unwrap());
    }
}
