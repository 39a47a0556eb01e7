//! Scenario runner.

use super::{Scenario, ScenarioContext, ScenarioGroup, SessionFactory};
use crate::config::SuiteConfig;
use crate::result::{ClubError, ClubResult};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// How one scenario ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioOutcome {
    /// Every assertion held
    Passed,
    /// An assertion or an action failed
    Failed(String),
    /// A precondition did not hold
    Skipped(String),
}

impl ScenarioOutcome {
    /// Map a scenario result; unmet preconditions skip
    #[must_use]
    pub fn from_result(result: &ClubResult<()>) -> Self {
        match result {
            Ok(()) => Self::Passed,
            Err(ClubError::PreconditionUnmet { reason }) => Self::Skipped(reason.clone()),
            Err(e) => Self::Failed(e.to_string()),
        }
    }

    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Passed => "PASS",
            Self::Failed(_) => "FAIL",
            Self::Skipped(_) => "SKIP",
        }
    }
}

impl fmt::Display for ScenarioOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => f.write_str("passed"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
            Self::Skipped(reason) => write!(f, "skipped: {reason}"),
        }
    }
}

/// Result of running a single scenario
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Group name
    pub group: String,
    /// Scenario name
    pub name: String,
    /// Outcome
    pub outcome: ScenarioOutcome,
    /// Wall time, including `before_each`
    pub duration: Duration,
}

/// Results from a run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Individual results, in run order
    pub results: Vec<ScenarioResult>,
    /// Total duration
    pub duration: Duration,
}

impl RunReport {
    /// No scenario failed (skips allowed)
    #[must_use]
    pub fn all_passed(&self) -> bool {
        !self.results.iter().any(|r| r.outcome.is_failed())
    }

    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.count(ScenarioOutcome::is_passed)
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(ScenarioOutcome::is_failed)
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, ScenarioOutcome::Skipped(_)))
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Get failed scenarios
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioResult> {
        self.results.iter().filter(|r| r.outcome.is_failed()).collect()
    }

    /// Look up one result
    #[must_use]
    pub fn get(&self, group: &str, name: &str) -> Option<&ScenarioResult> {
        self.results
            .iter()
            .find(|r| r.group == group && r.name == name)
    }

    fn count(&self, pred: impl Fn(&ScenarioOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Runs scenario groups, one session per group
#[derive(Debug, Clone, Default)]
pub struct Runner {
    /// Stop after the first failure
    pub fail_fast: bool,
    /// Only run the group with this name
    pub group: Option<String>,
    /// Only run scenarios whose name contains this. When some selected
    /// scenario is named exactly this, only exact matches run.
    pub filter: Option<String>,
}

impl Runner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable fail-fast mode
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    #[must_use]
    pub fn with_group(mut self, group: Option<String>) -> Self {
        self.group = group;
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    fn group_selected(&self, group: &ScenarioGroup) -> bool {
        self.group
            .as_deref()
            .map_or(true, |g| g.eq_ignore_ascii_case(group.name))
    }

    fn scenario_selected(&self, scenario: &Scenario, exact: bool) -> bool {
        self.filter.as_deref().map_or(true, |f| {
            if exact {
                scenario.name == f
            } else {
                scenario.name.contains(f)
            }
        })
    }

    /// Scenarios this runner would execute, by group
    #[must_use]
    pub fn plan<'g>(&self, groups: &'g [ScenarioGroup]) -> Vec<(&'g ScenarioGroup, Vec<&'g Scenario>)> {
        let groups: Vec<&ScenarioGroup> = groups.iter().filter(|g| self.group_selected(g)).collect();
        let exact = self.filter.as_deref().map_or(false, |f| {
            groups
                .iter()
                .flat_map(|g| g.scenarios.iter())
                .any(|s| s.name == f)
        });
        groups
            .into_iter()
            .filter_map(|g| {
                let selected: Vec<&Scenario> = g
                    .scenarios
                    .iter()
                    .filter(|s| self.scenario_selected(s, exact))
                    .collect();
                (!selected.is_empty()).then_some((g, selected))
            })
            .collect()
    }

    /// Run every selected scenario
    pub async fn run(
        &self,
        groups: &[ScenarioGroup],
        factory: &dyn SessionFactory,
        config: Arc<SuiteConfig>,
    ) -> RunReport {
        let start = Instant::now();
        let mut report = RunReport::default();

        for (group, scenarios) in self.plan(groups) {
            let stop = self
                .run_group(group, &scenarios, factory, Arc::clone(&config), &mut report)
                .await;
            if stop {
                break;
            }
        }

        report.duration = start.elapsed();
        info!(
            passed = report.passed_count(),
            failed = report.failed_count(),
            skipped = report.skipped_count(),
            elapsed_ms = report.duration.as_millis() as u64,
            "run finished"
        );
        report
    }

    /// Returns `true` when fail-fast says to stop
    async fn run_group(
        &self,
        group: &ScenarioGroup,
        scenarios: &[&Scenario],
        factory: &dyn SessionFactory,
        config: Arc<SuiteConfig>,
        report: &mut RunReport,
    ) -> bool {
        info!(group = group.name, scenarios = scenarios.len(), "group started");

        let session = match factory.create(&config).await {
            Ok(session) => session,
            Err(e) => {
                let reason = format!("session: {e}");
                self.fail_all(group, scenarios, &reason, report);
                return self.fail_fast;
            }
        };
        let screenshot_dir = config.screenshot_dir.clone();
        let ctx = ScenarioContext::new(Arc::clone(&session), config);

        let mut stop = false;
        if let Err(e) = group.run_setup(&ctx).await {
            let reason = format!("group setup: {e}");
            self.fail_all(group, scenarios, &reason, report);
            stop = self.fail_fast;
        } else {
            for scenario in scenarios {
                let started = Instant::now();
                let result = match group.run_before_each(&ctx).await {
                    Ok(()) => scenario.run(&ctx).await,
                    Err(e) => Err(e),
                };
                let outcome = ScenarioOutcome::from_result(&result);
                let failed = outcome.is_failed();
                if let Some(dir) = screenshot_dir.as_deref().filter(|_| failed) {
                    let path = dir.join(format!("{}_{}.png", group.name, scenario.name));
                    if let Err(e) = ctx.ui.screenshot(&path).await {
                        warn!(scenario = scenario.name, error = %e, "failure screenshot not saved");
                    }
                }
                record(report, group, scenario, outcome, started.elapsed());
                if failed && self.fail_fast {
                    stop = true;
                    break;
                }
            }
        }

        if let Err(e) = session.close().await {
            warn!(group = group.name, error = %e, "session close failed");
        }
        stop
    }

    fn fail_all(&self, group: &ScenarioGroup, scenarios: &[&Scenario], reason: &str, report: &mut RunReport) {
        for scenario in scenarios {
            record(
                report,
                group,
                scenario,
                ScenarioOutcome::Failed(reason.to_string()),
                Duration::ZERO,
            );
            if self.fail_fast {
                break;
            }
        }
    }
}

fn record(
    report: &mut RunReport,
    group: &ScenarioGroup,
    scenario: &Scenario,
    outcome: ScenarioOutcome,
    duration: Duration,
) {
    match &outcome {
        ScenarioOutcome::Passed => info!(group = group.name, scenario = scenario.name, "passed"),
        ScenarioOutcome::Failed(reason) => {
            info!(group = group.name, scenario = scenario.name, reason = %reason, "failed");
        }
        ScenarioOutcome::Skipped(reason) => {
            info!(group = group.name, scenario = scenario.name, reason = %reason, "skipped");
        }
    }
    report.results.push(ScenarioResult {
        group: group.name.to_string(),
        name: scenario.name.to_string(),
        outcome,
        duration,
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::MockSession;
    use crate::scenario::{ensure, require};
    use crate::session::Session;
    use async_trait::async_trait;
    use futures::future::BoxFuture;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct Factory {
        sessions: Mutex<Vec<MockSession>>,
        broken: bool,
    }

    #[async_trait]
    impl SessionFactory for Factory {
        async fn create(&self, _config: &SuiteConfig) -> ClubResult<Arc<dyn Session>> {
            if self.broken {
                return Err(ClubError::BrowserLaunch {
                    message: "no chromium".into(),
                });
            }
            let mock = MockSession::new();
            self.sessions.lock().unwrap().push(mock.clone());
            Ok(Arc::new(mock))
        }
    }

    fn pass(_: &ScenarioContext) -> BoxFuture<'_, ClubResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn fail(_: &ScenarioContext) -> BoxFuture<'_, ClubResult<()>> {
        Box::pin(async { ensure(false, "expected banner") })
    }

    fn skip(_: &ScenarioContext) -> BoxFuture<'_, ClubResult<()>> {
        Box::pin(async { require(false, "no orders") })
    }

    fn navigate(ctx: &ScenarioContext) -> BoxFuture<'_, ClubResult<()>> {
        Box::pin(async move { ctx.ui.navigate("http://localhost:3000/x.html").await })
    }

    fn groups() -> Vec<ScenarioGroup> {
        vec![
            ScenarioGroup::new("first")
                .scenario("passes", "", pass)
                .scenario("fails", "", fail)
                .scenario("skips", "", skip),
            ScenarioGroup::new("second")
                .with_before_each(navigate)
                .scenario("passes_too", "", pass),
        ]
    }

    fn config() -> Arc<SuiteConfig> {
        Arc::new(SuiteConfig::default())
    }

    mod outcome_tests {
        use super::*;

        #[test]
        fn test_from_result() {
            assert_eq!(ScenarioOutcome::from_result(&Ok(())), ScenarioOutcome::Passed);
            assert_eq!(
                ScenarioOutcome::from_result(&Err(ClubError::precondition("no orders"))),
                ScenarioOutcome::Skipped("no orders".into())
            );
            let failed = ScenarioOutcome::from_result(&Err(ClubError::Timeout {
                condition: "visible By.id(message)".into(),
                ms: 5000,
            }));
            assert!(failed.is_failed());
            assert_eq!(failed.label(), "FAIL");
        }
    }

    mod run_tests {
        use super::*;

        #[tokio::test]
        async fn test_run_counts_and_closes_sessions() {
            let factory = Factory::default();
            let report = Runner::new().run(&groups(), &factory, config()).await;

            assert_eq!(report.total(), 4);
            assert_eq!(report.passed_count(), 2);
            assert_eq!(report.failed_count(), 1);
            assert_eq!(report.skipped_count(), 1);
            assert!(!report.all_passed());
            assert_eq!(report.failures()[0].name, "fails");

            let sessions = factory.sessions.lock().unwrap();
            assert_eq!(sessions.len(), 2);
            assert!(sessions.iter().all(|s| s.was_called("close")));
            assert!(sessions[1].was_called("navigate:http://localhost:3000/x.html"));
        }

        #[tokio::test]
        async fn test_fail_fast_stops() {
            let factory = Factory::default();
            let report = Runner::new()
                .with_fail_fast(true)
                .run(&groups(), &factory, config())
                .await;
            assert_eq!(report.total(), 2);
            assert!(report.get("first", "skips").is_none());
            assert_eq!(factory.sessions.lock().unwrap().len(), 1);
        }

        #[tokio::test]
        async fn test_filters() {
            let factory = Factory::default();
            let runner = Runner::new()
                .with_group(Some("FIRST".into()))
                .with_filter(Some("pass".into()));
            let report = runner.run(&groups(), &factory, config()).await;
            assert_eq!(report.total(), 1);
            assert!(report.all_passed());
            assert!(report.get("first", "passes").is_some());
        }

        #[tokio::test]
        async fn test_exact_name_wins_over_substring() {
            let groups = vec![ScenarioGroup::new("login")
                .scenario("valid_login", "", pass)
                .scenario("invalid_login", "", fail)];

            let factory = Factory::default();
            let exact = Runner::new().with_filter(Some("valid_login".into()));
            let report = exact.run(&groups, &factory, config()).await;
            assert_eq!(report.total(), 1);
            assert!(report.get("login", "valid_login").is_some());

            let factory = Factory::default();
            let partial = Runner::new().with_filter(Some("login".into()));
            let report = partial.run(&groups, &factory, config()).await;
            assert_eq!(report.total(), 2);
        }

        #[tokio::test]
        async fn test_failure_saves_screenshot() {
            let dir = tempfile::tempdir().unwrap();
            let config = Arc::new(SuiteConfig {
                screenshot_dir: Some(dir.path().join("shots")),
                ..SuiteConfig::default()
            });
            let factory = Factory::default();
            let report = Runner::new().run(&groups(), &factory, config).await;
            assert_eq!(report.failed_count(), 1);

            let sessions = factory.sessions.lock().unwrap();
            let expected = dir.path().join("shots").join("first_fails.png");
            assert!(sessions[0].was_called(&format!("screenshot:{}", expected.display())));
            assert_eq!(sessions[0].count_calls("screenshot:"), 1);
            assert!(!sessions[1].was_called("screenshot:"));
        }

        #[tokio::test]
        async fn test_no_screenshot_without_directory() {
            let factory = Factory::default();
            Runner::new().run(&groups(), &factory, config()).await;
            let sessions = factory.sessions.lock().unwrap();
            assert!(sessions.iter().all(|s| !s.was_called("screenshot:")));
        }

        #[tokio::test]
        async fn test_empty_selection_opens_no_session() {
            let factory = Factory::default();
            let runner = Runner::new().with_filter(Some("nothing".into()));
            let report = runner.run(&groups(), &factory, config()).await;
            assert_eq!(report.total(), 0);
            assert!(factory.sessions.lock().unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_broken_factory_fails_group() {
            let factory = Factory {
                broken: true,
                ..Factory::default()
            };
            let report = Runner::new().run(&groups(), &factory, config()).await;
            assert_eq!(report.failed_count(), 4);
            let first = &report.results[0];
            assert!(matches!(&first.outcome, ScenarioOutcome::Failed(r) if r.contains("no chromium")));
        }

        #[tokio::test]
        async fn test_setup_failure_fails_group() {
            let factory = Factory::default();
            let groups = vec![ScenarioGroup::new("g")
                .with_setup(fail)
                .scenario("a", "", pass)
                .scenario("b", "", pass)];
            let report = Runner::new().run(&groups, &factory, config()).await;
            assert_eq!(report.failed_count(), 2);
            assert!(factory.sessions.lock().unwrap()[0].was_called("close"));
        }
    }
}
