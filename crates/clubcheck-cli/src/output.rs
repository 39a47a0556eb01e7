//! Console rendering of plans, results and summaries

use clubcheck::{RunReport, Scenario, ScenarioGroup, ScenarioOutcome, ScenarioResult};
use console::{style, StyledObject};

/// Writes human-readable run output to stdout
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode: summary only
    pub quiet: bool,
}

impl Reporter {
    #[must_use]
    pub const fn new(use_color: bool, quiet: bool) -> Self {
        Self { use_color, quiet }
    }

    fn paint<'a>(&self, text: &'a str, outcome: &ScenarioOutcome) -> StyledObject<&'a str> {
        let styled = style(text).force_styling(self.use_color);
        match outcome {
            ScenarioOutcome::Passed => styled.green(),
            ScenarioOutcome::Failed(_) => styled.red().bold(),
            ScenarioOutcome::Skipped(_) => styled.yellow(),
        }
    }

    /// One line per scenario result
    #[must_use]
    pub fn result_line(&self, result: &ScenarioResult) -> String {
        let label = self.paint(result.outcome.label(), &result.outcome);
        let mut line = format!(
            "{label} {}::{} ({:.1}s)",
            result.group,
            result.name,
            result.duration.as_secs_f64()
        );
        match &result.outcome {
            ScenarioOutcome::Failed(reason) | ScenarioOutcome::Skipped(reason) => {
                line.push_str(&format!("\n     {reason}"));
            }
            ScenarioOutcome::Passed => {}
        }
        line
    }

    /// Totals line
    #[must_use]
    pub fn summary_line(&self, report: &RunReport) -> String {
        let verdict = if report.all_passed() {
            style("ok").force_styling(self.use_color).green().bold()
        } else {
            style("FAILED").force_styling(self.use_color).red().bold()
        };
        format!(
            "{verdict}: {} passed, {} failed, {} skipped of {} in {:.1}s",
            report.passed_count(),
            report.failed_count(),
            report.skipped_count(),
            report.total(),
            report.duration.as_secs_f64()
        )
    }

    pub fn print_report(&self, report: &RunReport) {
        if !self.quiet {
            for result in &report.results {
                println!("{}", self.result_line(result));
            }
            println!();
        }
        println!("{}", self.summary_line(report));
    }

    /// Listing of the planned scenarios
    #[must_use]
    pub fn plan_lines(&self, plan: &[(&ScenarioGroup, Vec<&Scenario>)]) -> Vec<String> {
        let mut lines = Vec::new();
        for (group, scenarios) in plan {
            lines.push(
                style(group.name)
                    .force_styling(self.use_color)
                    .bold()
                    .to_string(),
            );
            for scenario in scenarios {
                lines.push(format!("  {:<28} {}", scenario.name, scenario.description));
            }
        }
        lines
    }
}
