#![deny(missing_docs)]

//! # Generate Command
//!
//! Runs one generation over a manifest and writes the resulting document:
//! routes, resource tree, canonical parameter names, flattened schemas,
//! gateway models, method bindings and anomalies.

use crate::io::{emit, load_manifest};
use crate::logging::report_anomalies;
use apigw_core::error::{AppError, AppResult};
use apigw_core::{generate, GenerationConfig};
use std::path::PathBuf;
use tracing::info;

/// Arguments for the generate command.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Path to the route manifest (.yaml/.yml or .json).
    #[clap(long, env = "APIGW_MANIFEST")]
    pub manifest: PathBuf,

    /// Output path for the document.
    /// Supports .json and .yaml/.yml extensions.
    /// If not provided, prints JSON to stdout.
    #[clap(long)]
    pub output: Option<PathBuf>,

    /// Verbs never bound to resources. Defaults to OPTIONS.
    #[clap(long = "exclude-method", value_delimiter = ',')]
    pub exclude_methods: Vec<String>,

    /// Do not report renamed path parameters.
    #[clap(long)]
    pub quiet_aliases: bool,

    /// Exit with an error when any warning was reported.
    #[clap(long)]
    pub strict: bool,
}

impl GenerateArgs {
    /// Generation options derived from the flags.
    pub fn config(&self) -> GenerationConfig {
        let mut config = GenerationConfig::default();
        if !self.exclude_methods.is_empty() {
            config = config.with_excluded_methods(&self.exclude_methods);
        }
        config.report_parameter_aliases = !self.quiet_aliases;
        config
    }
}

/// Executes the generation.
///
/// # Arguments
///
/// * `args` - Command arguments.
pub fn execute(args: &GenerateArgs) -> AppResult<()> {
    let manifest = load_manifest(&args.manifest)?;
    let generation = generate(&manifest, &args.config())?;

    info!(
        "{} routes, {} models, {} resources, {} bindings",
        generation.routes.len(),
        generation.registry.len(),
        generation.tree.len(),
        generation.bindings.len()
    );
    report_anomalies(&generation.anomalies);

    emit(&generation.to_document(), args.output.as_deref())?;

    let warnings = generation.warnings().count();
    if args.strict && warnings > 0 {
        return Err(AppError::General(format!(
            "Generation reported {} warning(s)",
            warnings
        )));
    }
    Ok(())
}
