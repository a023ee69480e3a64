//! Presentation: text and JSON formatters for plans, reports, and manifests.

use crate::error::SyncError;
use crate::manifest::Manifest;
use crate::sync::{SyncEvent, SyncPlan, SyncReport};
use crate::types::Fingerprint;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::path::Path;

fn heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, SyncError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| SyncError::Config(format!("Failed to render JSON: {}", e)))
}

/// One line per progress event, printed as the run advances.
pub fn format_sync_event(event: &SyncEvent) -> String {
    match event {
        SyncEvent::ChangeDetected {
            relative_path,
            change,
        } => format!("Detected changes in: {} ({})", relative_path, change.label()),
        SyncEvent::Uploaded(uploaded) => format!(
            "Uploaded {} (ID: {})",
            uploaded.relative_path, uploaded.remote_id
        ),
        SyncEvent::Skipped(failed) => format!(
            "{} {}: {}",
            "Skipped".red(),
            failed.relative_path,
            failed.error
        ),
    }
}

pub fn format_report_text(report: &SyncReport) -> String {
    let mut s = format!(
        "Sync completed: {} uploaded, {} unchanged",
        report.uploaded.len(),
        report.unchanged
    );
    if !report.failed.is_empty() {
        s.push_str(&format!(", {} failed", report.failed.len()));
    }
    s
}

pub fn format_plan_text(plan: &SyncPlan) -> String {
    let mut sections = Vec::new();

    if plan.uploads.is_empty() {
        sections.push(format!(
            "Up to date: {} file(s) unchanged.",
            plan.unchanged
        ));
    } else {
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Path", "Change", "Size", "Fingerprint"]);
        for upload in &plan.uploads {
            table.add_row(vec![
                upload.relative_path.clone(),
                upload.change.label().to_string(),
                upload.size.to_string(),
                upload.fingerprint.short().to_string(),
            ]);
        }
        sections.push(format!(
            "{}\n{}\n{} to upload, {} unchanged",
            heading("Pending uploads"),
            table,
            plan.uploads.len(),
            plan.unchanged
        ));
    }

    if !plan.failed.is_empty() {
        let mut lines = vec![heading("Unreadable files")];
        for failed in &plan.failed {
            lines.push(format!("  - {}: {}", failed.relative_path, failed.error));
        }
        sections.push(lines.join("\n"));
    }

    if !plan.stale.is_empty() {
        let mut lines = vec![format!(
            "{} (kept in manifest, not pruned)",
            heading("Tracked but missing")
        )];
        for key in &plan.stale {
            lines.push(format!("  - {}", key.dimmed()));
        }
        sections.push(lines.join("\n"));
    }

    sections.join("\n\n")
}

pub fn format_plan_json(plan: &SyncPlan) -> Result<String, SyncError> {
    to_json(plan)
}

pub fn format_manifest_text(manifest: &Manifest, path: &Path) -> String {
    if manifest.is_empty() {
        return format!("Manifest {} is empty.", path.display());
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Path", "Fingerprint"]);
    for (key, fingerprint) in manifest.iter() {
        table.add_row(vec![key.to_string(), fingerprint.to_string()]);
    }
    format!(
        "{}\n{}\n{} entries",
        heading(&format!("Manifest {}", path.display())),
        table,
        manifest.len()
    )
}

pub fn format_manifest_json(manifest: &Manifest) -> Result<String, SyncError> {
    to_json(manifest)
}

pub fn format_fingerprint(fingerprint: &Fingerprint, algorithm: &str, path: &Path) -> String {
    format!("{}  {}  {}", fingerprint, algorithm, path.display())
}
