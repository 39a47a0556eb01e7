//! Suite configuration.
//!
//! Loaded once, in three layers: built-in defaults, an optional YAML file,
//! then environment overrides. The result is immutable and threaded into
//! every page object; nothing below this module reads the environment.

use crate::result::{ClubError, ClubResult};
use crate::wait::WaitOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Desktop Chrome user agent sent by every session
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Account credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Credentials {
    /// Login email
    pub email: String,
    /// Password
    pub password: String,
    /// Display name (used on registration)
    pub full_name: String,
}

impl Credentials {
    /// Create credentials without a display name
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            full_name: String::new(),
        }
    }

    /// Set display name
    #[must_use]
    pub fn with_full_name(mut self, name: impl Into<String>) -> Self {
        self.full_name = name.into();
        self
    }
}

/// Root configuration for a suite run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Storefront origin
    pub base_url: String,
    /// Backend API origin
    pub api_url: String,
    /// Regular customer account
    pub user: Credentials,
    /// Administrator account
    pub admin: Credentials,
    /// Run the browser without a window
    pub headless: bool,
    /// Per-command browser timeout in milliseconds
    pub implicit_wait_ms: u64,
    /// Default bounded-wait timeout in seconds
    pub explicit_wait_secs: u64,
    /// Register fresh accounts instead of reusing `user`
    pub generate_unique_users: bool,
    /// Chromium binary (None = auto-detect)
    pub chromium_path: Option<PathBuf>,
    /// Save a viewport PNG here when a scenario fails (None = off)
    pub screenshot_dir: Option<PathBuf>,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            api_url: "http://localhost:3000/api".to_string(),
            user: Credentials::new("testuser@example.com", "password123")
                .with_full_name("Test User"),
            admin: Credentials::new("admin@hntswimclub.com", "admin123"),
            headless: false,
            implicit_wait_ms: 5_000,
            explicit_wait_secs: 10,
            generate_unique_users: false,
            chromium_path: None,
            screenshot_dir: None,
        }
    }
}

impl SuiteConfig {
    /// Parse from YAML; missing keys keep their defaults
    pub fn from_yaml(yaml: &str) -> ClubResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> ClubResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Read a YAML file
    pub fn from_file(path: &Path) -> ClubResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Defaults, then `file` if given, then overrides from `lookup`.
    ///
    /// `lookup` stands in for the process environment, e.g.
    /// `|key| std::env::var(key).ok()`.
    pub fn load<F>(file: Option<&Path>, lookup: F) -> ClubResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(lookup)?;
        Ok(config)
    }

    /// Apply environment overrides
    pub fn apply_env<F>(&mut self, lookup: F) -> ClubResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |target: &mut String, key: &str| {
            if let Some(v) = lookup(key) {
                *target = v;
            }
        };
        set(&mut self.base_url, "BASE_URL");
        set(&mut self.api_url, "API_URL");
        set(&mut self.user.email, "USER_EMAIL");
        set(&mut self.user.password, "USER_PASSWORD");
        set(&mut self.user.full_name, "USER_FULLNAME");
        set(&mut self.admin.email, "ADMIN_EMAIL");
        set(&mut self.admin.password, "ADMIN_PASSWORD");

        if let Some(v) = lookup("HEADLESS") {
            self.headless = v == "true";
        }
        if let Some(v) = lookup("GENERATE_UNIQUE_USERS") {
            self.generate_unique_users = v == "true";
        }
        if let Some(v) = lookup("IMPLICIT_WAIT") {
            self.implicit_wait_ms = parse_number("IMPLICIT_WAIT", &v)?;
        }
        if let Some(v) = lookup("EXPLICIT_WAIT") {
            self.explicit_wait_secs = parse_number("EXPLICIT_WAIT", &v)?;
        }
        if let Some(v) = lookup("CHROMIUM_PATH") {
            self.chromium_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("SCREENSHOT_DIR") {
            self.screenshot_dir = (!v.is_empty()).then(|| PathBuf::from(v));
        }
        Ok(())
    }

    /// Absolute URL of a screen
    #[must_use]
    pub fn page_url(&self, page: PageKey) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), page.path())
    }

    /// Default explicit wait
    #[must_use]
    pub const fn explicit_wait(&self) -> Duration {
        Duration::from_secs(self.explicit_wait_secs)
    }

    /// Wait options derived from the explicit wait
    #[must_use]
    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions::new().with_timeout(self.explicit_wait_secs.saturating_mul(1_000))
    }
}

fn parse_number(key: &str, value: &str) -> ClubResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| ClubError::config(format!("{key} must be a whole number, got '{value}'")))
}

// =============================================================================
// PAGE PATHS
// =============================================================================

/// Logical storefront screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageKey {
    /// Sign-in form
    Login,
    /// Account registration form
    Register,
    /// Storefront landing page
    Home,
    /// Product catalogue
    Products,
    /// Single product
    ProductDetail,
    /// Shopping cart
    Cart,
    /// Checkout form
    Checkout,
    /// Profile and order history
    UserProfile,
    /// Admin dashboard
    AdminHome,
    /// Admin player table
    AdminPlayers,
    /// Admin player form
    AdminAddPlayer,
    /// Public player roster
    Players,
}

impl PageKey {
    /// Every screen
    pub const ALL: [Self; 12] = [
        Self::Login,
        Self::Register,
        Self::Home,
        Self::Products,
        Self::ProductDetail,
        Self::Cart,
        Self::Checkout,
        Self::UserProfile,
        Self::AdminHome,
        Self::AdminPlayers,
        Self::AdminAddPlayer,
        Self::Players,
    ];

    /// Path below the base URL
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/HNT-SWIM-CLUB-main/đn/login.html",
            Self::Register => "/HNT-SWIM-CLUB-main/đk/đk.html",
            Self::Home => "/HNT-SWIM-CLUB-main/sp_home/trangchu.html",
            Self::Products => "/HNT-SWIM-CLUB-main/sp_home/danhmuc_sp.html",
            Self::ProductDetail => "/HNT-SWIM-CLUB-main/sp_home/chitiet_sp.html",
            Self::Cart => "/HNT-SWIM-CLUB-main/giohang/ghtt.html",
            Self::Checkout => "/HNT-SWIM-CLUB-main/giohang/thanhtoan.html",
            Self::UserProfile => "/HNT-SWIM-CLUB-main/nguoidung/nguoidung.html",
            Self::AdminHome => "/HNT-SWIM-CLUB-main/admin/home.html",
            Self::AdminPlayers => "/HNT-SWIM-CLUB-main/admin/admin.html",
            Self::AdminAddPlayer => "/HNT-SWIM-CLUB-main/admin/addtt_admin.html",
            Self::Players => "/HNT-SWIM-CLUB-main/tuyenthu/user.html",
        }
    }

    /// Screen name as used in config dumps
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "LOGIN",
            Self::Register => "REGISTER",
            Self::Home => "HOME",
            Self::Products => "PRODUCTS",
            Self::ProductDetail => "PRODUCT_DETAIL",
            Self::Cart => "CART",
            Self::Checkout => "CHECKOUT",
            Self::UserProfile => "USER_PROFILE",
            Self::AdminHome => "ADMIN_HOME",
            Self::AdminPlayers => "ADMIN_PLAYERS",
            Self::AdminAddPlayer => "ADMIN_ADD_PLAYER",
            Self::Players => "PLAYERS",
        }
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// DRIVER CONFIG
// =============================================================================

/// How to launch the browser behind a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Window width
    pub window_width: u32,
    /// Window height
    pub window_height: u32,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// User agent string
    pub user_agent: String,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<PathBuf>,
    /// Timeout for a single browser command
    pub request_timeout: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::from_suite(&SuiteConfig::default())
    }
}

impl DriverConfig {
    /// Driver settings for a suite run
    #[must_use]
    pub fn from_suite(config: &SuiteConfig) -> Self {
        Self {
            headless: config.headless,
            window_width: 1920,
            window_height: 1080,
            sandbox: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            chromium_path: config.chromium_path.clone(),
            request_timeout: Duration::from_millis(config.implicit_wait_ms),
        }
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Extra Chromium switches beyond what the launcher sets itself
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "--disable-dev-shm-usage".to_string(),
            "--disable-gpu".to_string(),
            "--disable-blink-features=AutomationControlled".to_string(),
            format!("--user-agent={}", self.user_agent),
        ];
        if self.headless {
            args.push("--headless=new".to_string());
        }
        if !self.sandbox {
            args.push("--no-sandbox".to_string());
        }
        args
    }
}
