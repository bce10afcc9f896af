//! # graphtour CLI Module
//!
//! ## Available Commands
//!
//! - `plan`   - Plan a traversal over a triplets JSON file
//! - `status` - Show the contents of a saved state file
//! - `export` - Write the plan from a state file as JSON
//! - `check`  - Re-plan from a state file and verify determinism

mod commands;

use clap::{Parser, Subcommand};
use graphtour_core::PlanError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// graphtour - knowledge-graph traversal planner
///
/// Turns extracted (subject, relation, object) triplets into a single
/// deterministic walk that visits every entity once, ordered to keep
/// topically close entities together.
#[derive(Parser, Debug)]
#[command(name = "graphtour")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Plan a traversal over extracted triplets
    Plan {
        /// Triplets JSON file (array of {subject, relationship, object})
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Where to write the plan JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Where to write the binary state file
        #[arg(short, long)]
        state: Option<PathBuf>,

        /// Community-detection seed
        #[arg(long)]
        seed: Option<u64>,

        /// TOML run configuration; command-line flags override it
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show what a state file contains
    Status {
        /// State file written by `plan`
        #[arg(short, long)]
        state: PathBuf,
    },

    /// Export the plan from a state file as JSON
    Export {
        /// State file written by `plan`
        #[arg(short, long)]
        state: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Re-plan from a state file and verify the stored plan matches
    Check {
        /// State file written by `plan`
        #[arg(short, long)]
        state: PathBuf,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), PlanError> {
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Plan {
            input,
            output,
            state,
            seed,
            config,
        }) => {
            let options = PlanOptions::resolve(input, output, state, seed, config.as_deref())?;
            cmd_plan(&options, json_mode)
        }
        Some(Commands::Status { state }) => cmd_status(&state, json_mode),
        Some(Commands::Export { state, output }) => cmd_export(&state, &output),
        Some(Commands::Check { state }) => cmd_check(&state, json_mode),
        None => {
            println!("nothing to do; try `graphtour plan --input triplets.json`");
            Ok(())
        }
    }
}
