//! CLI domain: parse, route, output, and presentation only.
//! Sync semantics live in `sync`; the route table only wires config to it.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, ManifestCommands};
pub use presentation::{
    format_fingerprint, format_manifest_json, format_manifest_text, format_plan_json,
    format_plan_text, format_report_text, format_sync_event,
};
pub use route::RunContext;
