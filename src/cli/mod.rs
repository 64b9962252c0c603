//! CLI surface for the control plane binary.
//!
//! # Commands
//!
//! - `run` - Start the control plane
//! - `validate-config` - Check a configuration file without starting anything
//! - `completions` - Generate shell completions

pub mod completions;
pub mod run;
pub mod validate_config;

pub use completions::handle_completions;
pub use run::handle_run;
pub use validate_config::handle_validate_config;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "aigw-control-plane",
    version,
    about = "Reconciles AI gateway routing, backend, and security-policy resources into host-gateway and external-processor configuration"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the control plane
    Run(RunArgs),
    /// Validate a configuration file without starting anything
    ValidateConfig(ValidateConfigArgs),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to configuration file. Defaults are used if omitted.
    #[arg(short, long, env = "AIGW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the configured log level (trace, debug, info, warn, error)
    #[arg(long, env = "AIGW_LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Args, Debug)]
pub struct ValidateConfigArgs {
    /// Path to configuration file to validate
    #[arg(short, long)]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_run_defaults() {
        let cli = Cli::try_parse_from(["aigw-control-plane", "run"]).unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert!(args.config.is_none());
                assert!(args.log_level.is_none());
            }
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn parse_run_with_config() {
        let cli =
            Cli::try_parse_from(["aigw-control-plane", "run", "-c", "control-plane.toml"])
                .unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.config, Some(PathBuf::from("control-plane.toml")))
            }
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn parse_validate_config() {
        let cli = Cli::try_parse_from([
            "aigw-control-plane",
            "validate-config",
            "-c",
            "control-plane.toml",
        ])
        .unwrap();
        match cli.command {
            Commands::ValidateConfig(args) => {
                assert_eq!(args.config, PathBuf::from("control-plane.toml"))
            }
            _ => panic!("expected ValidateConfig command"),
        }
    }

    #[test]
    fn parse_completions() {
        let cli = Cli::try_parse_from(["aigw-control-plane", "completions", "bash"]).unwrap();
        assert!(matches!(cli.command, Commands::Completions(_)));
    }
}
