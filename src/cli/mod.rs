//! Command-line interface for brigade
//!
//! - `args`: argument definitions (clap)
//! - `run`: entry point and command dispatch
//! - `commands`: command implementations

pub mod args;
mod commands;
mod run;

pub use args::{Cli, Commands};
pub use run::run;

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, Parser};
    use std::path::PathBuf;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_all_flags() {
        let cli = Cli::try_parse_from([
            "brigade",
            "run",
            "--brief",
            "b.json",
            "--config",
            "c.toml",
            "--prompts",
            "prompts",
            "--events",
            "--verbose",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Run {
                brief,
                config,
                prompts,
                events,
            } => {
                assert_eq!(brief, PathBuf::from("b.json"));
                assert_eq!(config, Some(PathBuf::from("c.toml")));
                assert_eq!(prompts, Some(PathBuf::from("prompts")));
                assert!(events);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_run_requires_brief() {
        assert!(Cli::try_parse_from(["brigade", "run"]).is_err());
    }

    #[test]
    fn test_parse_validate_brief() {
        let cli = Cli::try_parse_from(["brigade", "validate-brief", "--brief", "b.json"]).unwrap();
        assert!(matches!(cli.command, Commands::ValidateBrief { .. }));
    }
}
