//! # graphtour - Traversal Planner CLI
//!
//! The main binary for the graphtour planner.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │               apps/graphtour (THE BINARY)            │
//! │                                                      │
//! │   triplets.json ──► plan ──► plan.json / tour.state  │
//! │                      │                               │
//! │                      ▼                               │
//! │              ┌────────────────┐                      │
//! │              │ graphtour-core │                      │
//! │              │  (THE LOGIC)   │                      │
//! │              └────────────────┘                      │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! graphtour plan --input triplets.json --output plan.json --state tour.state
//! graphtour status --state tour.state
//! graphtour check --state tour.state
//! ```

use clap::Parser;
use graphtour::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // Initialize tracing — GRAPHTOUR_LOG_FORMAT=json enables
    // machine-parseable output.
    let log_format = std::env::var("GRAPHTOUR_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "graphtour=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet {
        print_banner();
    }

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the graphtour startup banner.
fn print_banner() {
    println!(
        "graphtour v{} :: every node once, neighbors stay neighbors",
        env!("CARGO_PKG_VERSION")
    );
}
