//! Business scenarios and the runner that executes them.
//!
//! A [`Scenario`] is a named async body over a [`ScenarioContext`]. Scenarios
//! are grouped the way the storefront's flows are (auth, admin, shopping,
//! orders); each [`ScenarioGroup`] runs in its own browser session, created
//! by a [`SessionFactory`] and closed when the group ends.
//!
//! Scenarios never sleep. Every "wait for the app to react" is a bounded
//! condition on the URL, a banner, a table, or `localStorage`.

pub mod admin;
pub mod auth;
pub mod orders;
pub mod runner;
pub mod shopping;

pub use runner::{RunReport, Runner, ScenarioOutcome, ScenarioResult};

use crate::config::SuiteConfig;
use crate::page::admin_players::AdminPlayersPage;
use crate::page::cart::CartPage;
use crate::page::home::HomePage;
use crate::page::login::LoginPage;
use crate::page::orders::OrdersPage;
use crate::page::product_detail::ProductDetailPage;
use crate::page::register::RegisterPage;
use crate::page::{Interactable, PageObject};
use crate::result::{ClubError, ClubResult};
use crate::session::Session;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

/// Body of a scenario or group hook
pub type ScenarioFn = for<'a> fn(&'a ScenarioContext) -> BoxFuture<'a, ClubResult<()>>;

/// Creates one browser session per scenario group
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn create(&self, config: &SuiteConfig) -> ClubResult<Arc<dyn Session>>;
}

/// A single named check
#[derive(Clone, Copy)]
pub struct Scenario {
    /// Scenario name, unique within its group
    pub name: &'static str,
    /// What the scenario does
    pub description: &'static str,
    body: ScenarioFn,
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario").field("name", &self.name).finish_non_exhaustive()
    }
}

impl Scenario {
    #[must_use]
    pub const fn new(name: &'static str, description: &'static str, body: ScenarioFn) -> Self {
        Self {
            name,
            description,
            body,
        }
    }

    /// Run the body
    pub async fn run(&self, ctx: &ScenarioContext) -> ClubResult<()> {
        (self.body)(ctx).await
    }
}

/// Scenarios sharing one session
#[derive(Clone)]
pub struct ScenarioGroup {
    /// Group name
    pub name: &'static str,
    /// Scenarios in run order
    pub scenarios: Vec<Scenario>,
    setup: Option<ScenarioFn>,
    before_each: Option<ScenarioFn>,
}

impl fmt::Debug for ScenarioGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioGroup")
            .field("name", &self.name)
            .field("scenarios", &self.scenarios)
            .field("setup", &self.setup.is_some())
            .field("before_each", &self.before_each.is_some())
            .finish()
    }
}

impl ScenarioGroup {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            scenarios: Vec::new(),
            setup: None,
            before_each: None,
        }
    }

    /// Run once after the session opens; failure fails every scenario
    #[must_use]
    pub fn with_setup(mut self, setup: ScenarioFn) -> Self {
        self.setup = Some(setup);
        self
    }

    /// Run before every scenario
    #[must_use]
    pub fn with_before_each(mut self, hook: ScenarioFn) -> Self {
        self.before_each = Some(hook);
        self
    }

    #[must_use]
    pub fn scenario(mut self, name: &'static str, description: &'static str, body: ScenarioFn) -> Self {
        self.scenarios.push(Scenario::new(name, description, body));
        self
    }

    #[must_use]
    pub fn scenario_count(&self) -> usize {
        self.scenarios.len()
    }

    pub(crate) async fn run_setup(&self, ctx: &ScenarioContext) -> ClubResult<()> {
        match self.setup {
            Some(setup) => setup(ctx).await,
            None => Ok(()),
        }
    }

    pub(crate) async fn run_before_each(&self, ctx: &ScenarioContext) -> ClubResult<()> {
        match self.before_each {
            Some(hook) => hook(ctx).await,
            None => Ok(()),
        }
    }
}

/// Every group, in run order
#[must_use]
pub fn all_groups() -> Vec<ScenarioGroup> {
    vec![auth::group(), admin::group(), shopping::group(), orders::group()]
}

/// Pages bound to one session
#[derive(Debug, Clone)]
pub struct ScenarioContext {
    pub ui: Interactable,
    pub login: LoginPage,
    pub register: RegisterPage,
    pub home: HomePage,
    pub admin_players: AdminPlayersPage,
    pub product_detail: ProductDetailPage,
    pub cart: CartPage,
    pub orders: OrdersPage,
}

impl ScenarioContext {
    #[must_use]
    pub fn new(session: Arc<dyn Session>, config: Arc<SuiteConfig>) -> Self {
        let ui = Interactable::new(session, config);
        Self {
            login: LoginPage::new(ui.clone()),
            register: RegisterPage::new(ui.clone()),
            home: HomePage::new(ui.clone()),
            admin_players: AdminPlayersPage::new(ui.clone()),
            product_detail: ProductDetailPage::new(ui.clone()),
            cart: CartPage::new(ui.clone()),
            orders: OrdersPage::new(ui.clone()),
            ui,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SuiteConfig {
        self.ui.config()
    }

    /// Wait until the URL contains any of `fragments`
    pub async fn wait_url_any(&self, fragments: &[&str]) -> ClubResult<String> {
        let ui = &self.ui;
        let description = format!("url containing one of {fragments:?}");
        ui.wait()
            .wait_condition(&description, None, || async move {
                let url = ui.current_url().await?;
                Ok(fragments.iter().any(|f| url.contains(f)).then_some(url))
            })
            .await
    }

    /// Wait until `localStorage` holds a login token
    pub async fn wait_logged_in(&self) -> ClubResult<()> {
        let auth = self.ui.auth();
        let auth = &auth;
        self.ui
            .wait()
            .wait_condition("login token stored", None, || async move {
                Ok(auth.is_logged_in().await?.then_some(()))
            })
            .await
    }

    /// Open the login page and sign in with `email`/`password`
    pub async fn sign_in(&self, email: &str, password: &str) -> ClubResult<()> {
        self.login.open().await?;
        self.login.login(email, password).await
    }

    /// Sign in as the configured customer and wait for the token
    pub async fn sign_in_as_user(&self) -> ClubResult<()> {
        let user = self.config().user.clone();
        self.sign_in(&user.email, &user.password).await?;
        self.wait_logged_in().await
    }
}

/// Fail the scenario with `message` unless `condition` holds
pub fn ensure(condition: bool, message: impl Into<String>) -> ClubResult<()> {
    if condition {
        Ok(())
    } else {
        Err(ClubError::assertion(message))
    }
}

/// Skip the scenario with `reason` unless `condition` holds
pub fn require(condition: bool, reason: impl Into<String>) -> ClubResult<()> {
    if condition {
        Ok(())
    } else {
        Err(ClubError::precondition(reason))
    }
}

/// Case-insensitive: does `text` mention any of `needles`
#[must_use]
pub fn mentions_any(text: &str, needles: &[&str]) -> bool {
    let text = text.to_lowercase();
    needles.iter().any(|n| text.contains(&n.to_lowercase()))
}
