#![deny(missing_docs)]

//! # Inspect Command
//!
//! Read-only views over a manifest's routes, without building schemas or
//! writing a full document.

use crate::io::{emit, load_manifest};
use crate::logging::report_anomalies;
use apigw_core::error::{AppError, AppResult};
use apigw_core::routes::{gateway_paths, routes_by_tag, routes_for_path};
use apigw_core::{extract, ParameterNameMap, RouteDescriptor};
use indexmap::IndexMap;
use serde_json::{json, Value};
use std::path::PathBuf;

/// What to show.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Every extracted route.
    Routes,
    /// Route names grouped by tag.
    Tags,
    /// Unique path templates.
    Paths,
    /// Canonical parameter name per prefix.
    Parameters,
}

/// Arguments for the inspect command.
#[derive(clap::Args, Debug, Clone)]
pub struct InspectArgs {
    /// Path to the route manifest (.yaml/.yml or .json).
    #[clap(long, env = "APIGW_MANIFEST")]
    pub manifest: PathBuf,

    /// Which view to print.
    #[clap(long, value_enum, default_value = "routes")]
    pub view: View,

    /// Only show routes declared with this exact path template.
    #[clap(long)]
    pub path: Option<String>,

    /// Output path. Supports .json and .yaml/.yml extensions.
    #[clap(long)]
    pub output: Option<PathBuf>,
}

/// Builds the requested view.
pub fn render_view(args: &InspectArgs) -> AppResult<Value> {
    let manifest = load_manifest(&args.manifest)?;
    let table = manifest
        .routes
        .as_deref()
        .ok_or(AppError::MissingRouteTable)?;

    let extraction = extract(table);
    report_anomalies(&extraction.anomalies);

    let routes: Vec<RouteDescriptor> = match &args.path {
        Some(path) => routes_for_path(&extraction.routes, path)
            .into_iter()
            .cloned()
            .collect(),
        None => extraction.routes,
    };

    let view = match args.view {
        View::Routes => {
            let summaries: Vec<_> = routes.iter().map(|r| r.summary_view()).collect();
            json!(summaries)
        }
        View::Tags => {
            let groups: IndexMap<&str, Vec<&str>> = routes_by_tag(&routes)
                .into_iter()
                .map(|(tag, group)| (tag, group.into_iter().map(|r| r.name.as_str()).collect()))
                .collect();
            json!(groups)
        }
        View::Paths => json!(gateway_paths(&routes)),
        View::Parameters => {
            let names = ParameterNameMap::build(routes.iter().map(|r| r.path.as_str()));
            report_anomalies(&names.alias_anomalies());
            json!(names)
        }
    };
    Ok(view)
}

/// Executes the inspection.
///
/// # Arguments
///
/// * `args` - Command arguments.
pub fn execute(args: &InspectArgs) -> AppResult<()> {
    let view = render_view(args)?;
    emit(&view, args.output.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const MANIFEST: &str = r#"{
  "routes": [
    {"type": "http", "path": "/todos", "methods": ["GET"], "name": "list_todos", "tags": ["todos"]},
    {"type": "http", "path": "/todos/{todo_id}", "methods": ["GET"], "name": "get_todo", "tags": ["todos", "items"]},
    {"type": "http", "path": "/todos/{id}/done", "methods": ["POST"], "name": "finish_todo"},
    {"type": "websocket", "path": "/ws"}
  ]
}"#;

    fn args(view: View) -> (tempfile::TempDir, InspectArgs) {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("app.json");
        fs::write(&manifest, MANIFEST).unwrap();
        let args = InspectArgs {
            manifest,
            view,
            path: None,
            output: None,
        };
        (dir, args)
    }

    #[test]
    fn test_tags_view() {
        let (_dir, args) = args(View::Tags);
        let view = render_view(&args).unwrap();
        assert_eq!(
            view,
            json!({"todos": ["list_todos", "get_todo"], "items": ["get_todo"]})
        );
    }

    #[test]
    fn test_paths_view() {
        let (_dir, args) = args(View::Paths);
        let view = render_view(&args).unwrap();
        assert_eq!(view, json!(["/todos", "/todos/{todo_id}", "/todos/{id}/done"]));
    }

    #[test]
    fn test_parameters_view() {
        let (_dir, args) = args(View::Parameters);
        let view = render_view(&args).unwrap();
        assert_eq!(view["canonical"]["/todos"], "{todo_id}");
        assert_eq!(view["aliases"][0]["discarded"], "{id}");
    }

    #[test]
    fn test_routes_view_filtered_by_path() {
        let (_dir, mut args) = args(View::Routes);
        args.path = Some("/todos/{todo_id}".into());
        let view = render_view(&args).unwrap();
        assert_eq!(view.as_array().unwrap().len(), 1);
        assert_eq!(view[0]["name"], "get_todo");
    }

    #[test]
    fn test_missing_route_table() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("app.yaml");
        fs::write(&manifest, "title: Nothing\n").unwrap();
        let args = InspectArgs {
            manifest,
            view: View::Paths,
            path: None,
            output: None,
        };
        assert!(matches!(
            render_view(&args),
            Err(AppError::MissingRouteTable)
        ));
    }
}
