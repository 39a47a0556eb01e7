//! clubcheck CLI: end-to-end checks for the HNT Swim Club storefront
//!
//! ## Usage
//!
//! ```bash
//! clubcheck run                           # Every scenario
//! clubcheck run --group admin --headless  # One group, no window
//! clubcheck run --filter payment          # Scenarios matching a name
//! clubcheck list                          # Show what would run
//! clubcheck config --config suite.yaml    # Resolved configuration
//! ```

use clap::Parser;
use clubcheck_cli::{
    handlers, init_logging, Cli, CliConfig, CliResult, ColorChoice, Commands, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_logging(&config);

    match cli.command {
        Commands::Run(args) => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(handlers::execute_run(&config, &args))
        }
        Commands::List(args) => handlers::execute_list(&config, &args),
        Commands::Config(args) => handlers::execute_config(&args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.clone().into();
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(color)
        .with_log_json(cli.log_json)
}
