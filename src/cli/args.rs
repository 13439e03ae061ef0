//! CLI argument definitions (clap)

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// brigade - plan, fan out and synthesize recipes with a generative model
#[derive(Debug, Parser)]
#[command(name = "brigade")]
#[command(about = "Turn a recipe brief into a structured recipe using a planner, specialists and a synthesizer")]
#[command(long_about = r#"
brigade sends a brief through three phases: a planner decides which
specialists are needed, every specialist is consulted concurrently, and a
synthesizer combines the surviving contributions into one recipe.

EXAMPLES:
  # Run a brief with built-in prompts and default configuration
  brigade run --brief ramen.json

  # Use a config file and custom prompt templates, streaming debug events
  brigade run --brief ramen.json --config brigade.toml --prompts prompts/ --events

  # Check a brief without calling the model
  brigade validate-brief --brief ramen.json

BRIEF FORMAT:
  {"title": "Weeknight ramen", "scope": "dish",
   "constraints": ["vegetarian"], "context": "Feeds two"}

EXIT CODES:
  0 success, 1 internal, 2 configuration, 3 invalid brief, 10 run timeout,
  65 extraction failure, 69 aggregate failure, 70 invocation failure
"#)]
#[command(version)]
pub struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a brief through the full pipeline
    Run {
        /// Path to the brief JSON file
        #[arg(long)]
        brief: PathBuf,

        /// Path to a TOML configuration file (defaults are used otherwise)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory containing planner.md, specialist.md and synthesizer.md
        #[arg(long)]
        prompts: Option<PathBuf>,

        /// Print debug events as NDJSON on stderr
        #[arg(long)]
        events: bool,
    },

    /// Validate a brief without calling the model
    ValidateBrief {
        /// Path to the brief JSON file
        #[arg(long)]
        brief: PathBuf,
    },
}
