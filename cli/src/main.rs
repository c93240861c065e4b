#![deny(missing_docs)]

//! # apigw CLI
//!
//! Command Line Interface for the API gateway resource-tree generator.
//!
//! Supported Commands:
//! - `generate`: Manifest -> Routes -> Models -> Flattened Schemas -> Resource Tree.
//! - `inspect`: Read-only views of the routes declared in a manifest.

use apigw_core::AppResult;
use clap::{Parser, Subcommand};

mod generate;
mod inspect;
mod io;
mod logging;

#[derive(Parser, Debug)]
#[clap(author, version, about = "API gateway resource-tree generator")]
struct Cli {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    #[clap(long, global = true, env = "APIGW_LOG", default_value = "info")]
    log_level: String,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the resource tree, schemas and bindings for a manifest.
    Generate(generate::GenerateArgs),
    /// Show routes, tags, paths or parameter names of a manifest.
    Inspect(inspect::InspectArgs),
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level)?;

    match &cli.command {
        Commands::Generate(args) => generate::execute(args)?,
        Commands::Inspect(args) => inspect::execute(args)?,
    }

    Ok(())
}
