//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// clubcheck: end-to-end checks for the HNT Swim Club storefront
#[derive(Parser, Debug)]
#[command(name = "clubcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenarios against a live browser
    Run(RunArgs),

    /// List scenarios without running them
    List(ListArgs),

    /// Print the resolved configuration as YAML
    Config(ConfigArgs),
}

/// Scenario selection shared by `run` and `list`
#[derive(Args, Debug, Clone, Default)]
pub struct SelectArgs {
    /// Only this group (auth, admin, shopping, orders)
    #[arg(short, long)]
    pub group: Option<String>,

    /// Only scenarios whose name contains this (an exact name runs alone)
    #[arg(short, long)]
    pub filter: Option<String>,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub select: SelectArgs,

    /// Stop after the first failing scenario
    #[arg(long)]
    pub fail_fast: bool,

    /// Run without a browser window
    #[arg(long, conflicts_with = "headed")]
    pub headless: bool,

    /// Run with a browser window
    #[arg(long)]
    pub headed: bool,

    /// Save a PNG for every failing scenario in this directory
    #[arg(long, value_name = "DIR")]
    pub screenshot_dir: Option<PathBuf>,

    /// YAML configuration file
    #[arg(short, long, env = "CLUBCHECK_CONFIG")]
    pub config: Option<PathBuf>,
}

impl RunArgs {
    /// Headless override from the flags, if any
    #[must_use]
    pub const fn headless_override(&self) -> Option<bool> {
        if self.headless {
            Some(true)
        } else if self.headed {
            Some(false)
        } else {
            None
        }
    }
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub select: SelectArgs,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// YAML configuration file
    #[arg(short, long, env = "CLUBCHECK_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Color argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Detect from the terminal
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_run_with_selection() {
            let cli = Cli::parse_from([
                "clubcheck", "run", "--group", "admin", "--filter", "delete", "--fail-fast",
            ]);
            let Commands::Run(args) = cli.command else {
                panic!("expected run");
            };
            assert_eq!(args.select.group.as_deref(), Some("admin"));
            assert_eq!(args.select.filter.as_deref(), Some("delete"));
            assert!(args.fail_fast);
            assert_eq!(args.headless_override(), None);
        }

        #[test]
        fn test_headless_flags() {
            let cli = Cli::parse_from(["clubcheck", "run", "--headless"]);
            let Commands::Run(args) = cli.command else {
                panic!("expected run");
            };
            assert_eq!(args.headless_override(), Some(true));

            let cli = Cli::parse_from(["clubcheck", "run", "--headed"]);
            let Commands::Run(args) = cli.command else {
                panic!("expected run");
            };
            assert_eq!(args.headless_override(), Some(false));
        }

        #[test]
        fn test_screenshot_dir_flag() {
            let cli = Cli::parse_from(["clubcheck", "run", "--screenshot-dir", "target/shots"]);
            let Commands::Run(args) = cli.command else {
                panic!("expected run");
            };
            assert_eq!(args.screenshot_dir, Some(PathBuf::from("target/shots")));
        }

        #[test]
        fn test_headless_and_headed_conflict() {
            let parsed = Cli::try_parse_from(["clubcheck", "run", "--headless", "--headed"]);
            assert!(parsed.is_err());
        }

        #[test]
        fn test_global_flags_after_subcommand() {
            let cli = Cli::parse_from(["clubcheck", "list", "-vv", "--log-json"]);
            assert_eq!(cli.verbose, 2);
            assert!(cli.log_json);
            assert!(matches!(cli.command, Commands::List(_)));
        }

        #[test]
        fn test_color_values() {
            let cli = Cli::parse_from(["clubcheck", "--color", "never", "config"]);
            assert!(matches!(cli.color, ColorArg::Never));
        }
    }
}
