//! Subcommand implementations

use crate::commands::{ConfigArgs, ListArgs, RunArgs, SelectArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::Reporter;
use clubcheck::{all_groups, Runner, SuiteConfig};
use std::path::Path;
use tracing::info;

/// Defaults, then the YAML file, then the process environment
pub fn load_suite_config(file: Option<&Path>) -> CliResult<SuiteConfig> {
    Ok(SuiteConfig::load(file, |key| std::env::var(key).ok())?)
}

fn runner(select: &SelectArgs) -> Runner {
    Runner::new()
        .with_group(select.group.clone())
        .with_filter(select.filter.clone())
}

fn reporter(config: &CliConfig) -> Reporter {
    Reporter::new(config.color.should_color(), config.verbosity.is_quiet())
}

/// `clubcheck list`
pub fn execute_list(config: &CliConfig, args: &ListArgs) -> CliResult<()> {
    let groups = all_groups();
    let plan = runner(&args.select).plan(&groups);
    if plan.is_empty() {
        return Err(CliError::invalid_argument("no scenario matches the selection"));
    }
    for line in reporter(config).plan_lines(&plan) {
        println!("{line}");
    }
    Ok(())
}

/// `clubcheck config`
pub fn execute_config(args: &ConfigArgs) -> CliResult<()> {
    let suite = load_suite_config(args.config.as_deref())?;
    print!("{}", suite.to_yaml()?);
    Ok(())
}

/// `clubcheck run`; fails when any scenario fails
pub async fn execute_run(config: &CliConfig, args: &RunArgs) -> CliResult<()> {
    let mut suite = load_suite_config(args.config.as_deref())?;
    if let Some(headless) = args.headless_override() {
        suite.headless = headless;
    }
    if let Some(dir) = &args.screenshot_dir {
        suite.screenshot_dir = Some(dir.clone());
    }

    let groups = all_groups();
    let runner = runner(&args.select).with_fail_fast(args.fail_fast);
    let planned: usize = runner.plan(&groups).iter().map(|(_, s)| s.len()).sum();
    if planned == 0 {
        return Err(CliError::invalid_argument("no scenario matches the selection"));
    }
    info!(scenarios = planned, base_url = %suite.base_url, headless = suite.headless, "starting run");

    let report = run_in_browser(&runner, &groups, suite).await?;
    reporter(config).print_report(&report);

    if report.all_passed() {
        Ok(())
    } else {
        Err(CliError::scenario_failure(format!(
            "{} scenario(s) failed",
            report.failed_count()
        )))
    }
}

#[cfg(feature = "browser")]
async fn run_in_browser(
    runner: &Runner,
    groups: &[clubcheck::ScenarioGroup],
    suite: SuiteConfig,
) -> CliResult<clubcheck::RunReport> {
    let factory = clubcheck::ChromiumFactory;
    Ok(runner.run(groups, &factory, std::sync::Arc::new(suite)).await)
}

#[cfg(not(feature = "browser"))]
async fn run_in_browser(
    _runner: &Runner,
    _groups: &[clubcheck::ScenarioGroup],
    _suite: SuiteConfig,
) -> CliResult<clubcheck::RunReport> {
    Err(CliError::config(
        "browser support not enabled. Rebuild with --features browser",
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url: http://shop.test\nexplicit_wait_secs: 4").unwrap();

        let suite = SuiteConfig::load(Some(file.path()), |_| None).unwrap();

        assert_eq!(suite.base_url, "http://shop.test");
        assert_eq!(suite.explicit_wait_secs, 4);
    }

    #[test]
    fn test_list_rejects_empty_selection() {
        let args = ListArgs {
            select: SelectArgs {
                group: Some("nope".to_string()),
                filter: None,
            },
        };
        let err = execute_list(&CliConfig::new(), &args).unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument { .. }));
    }
}
