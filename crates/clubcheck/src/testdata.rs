//! Generated test records.
//!
//! Unique values are stamped with the current Unix time in milliseconds so
//! records from different runs never collide on the storefront's unique
//! email constraint.

use crate::config::SuiteConfig;
use serde::{Deserialize, Serialize};

/// Registration form input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    /// Display name
    pub full_name: String,
    /// Login email
    pub email: String,
    /// Password
    pub password: String,
}

/// Admin player form input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PlayerData {
    /// Full name; required when adding, left untouched when editing if unset
    pub full_name: Option<String>,
    /// Nickname
    pub nickname: Option<String>,
    /// Stroke / position
    pub position: Option<String>,
    /// Specialty event
    pub specialty: Option<String>,
    /// Age
    pub age: Option<String>,
    /// Achievements
    pub achievements: Option<String>,
    /// Biography
    pub bio: Option<String>,
    /// Portrait URL
    pub image_url: Option<String>,
}

/// Checkout form input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CheckoutData {
    /// Recipient name
    pub full_name: Option<String>,
    /// Phone number
    pub phone: Option<String>,
    /// Delivery address
    pub address: Option<String>,
    /// Order note
    pub note: Option<String>,
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Eight hex digits from a v4 UUID
fn random_suffix() -> String {
    let mut suffix = uuid::Uuid::new_v4().simple().to_string();
    suffix.truncate(8);
    suffix
}

/// `prefix_<millis>_<8 hex digits>@test.com`
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}_{}_{}@test.com", now_millis(), random_suffix())
}

/// `prefix_<millis>`
#[must_use]
pub fn unique_username(prefix: &str) -> String {
    format!("{prefix}_{}", now_millis())
}

/// Account to register.
///
/// With `unique` a fresh address is generated; otherwise the configured
/// customer account is reused.
#[must_use]
pub fn user_data(config: &SuiteConfig, unique: bool) -> UserData {
    if unique {
        UserData {
            full_name: format!("Test User {}", now_millis()),
            email: unique_email("testuser"),
            password: "Test@123456".to_string(),
        }
    } else {
        UserData {
            full_name: config.user.full_name.clone(),
            email: config.user.email.clone(),
            password: config.user.password.clone(),
        }
    }
}

/// Player record with a timestamped name
#[must_use]
pub fn player_data() -> PlayerData {
    let ts = now_millis();
    PlayerData {
        full_name: Some(format!("Tuyển thủ Test {ts}")),
        nickname: Some(format!("Nickname {ts}")),
        position: Some("Bơi ngửa".to_string()),
        specialty: Some("100m Ngửa".to_string()),
        age: Some("20".to_string()),
        achievements: Some("Vô địch giải Quốc gia 2024".to_string()),
        bio: Some("Đây là tuyển thủ test được tạo tự động".to_string()),
        image_url: None,
    }
}

/// Checkout form filled the way the shopping scenarios fill it
#[must_use]
pub fn checkout_data() -> CheckoutData {
    CheckoutData {
        full_name: Some("Test User".to_string()),
        phone: Some("0901234567".to_string()),
        address: Some("123 Test Street, District 1, Ho Chi Minh City".to_string()),
        note: Some("Test order".to_string()),
    }
}
