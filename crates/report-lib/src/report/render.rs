//! HTML report rendering
//!
//! The template is plain HTML with `{{key}}` placeholders, one per
//! top-level field of [`ReportData`]. String fields substitute
//! verbatim; everything else lands as JSON for the template's inline
//! script to consume.

use crate::models::ReportData;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Template compiled into the binary, used when no override is given
const DEFAULT_TEMPLATE: &str = include_str!("../../templates/report.html");

/// Render the report into `output`, creating parent directories.
///
/// A missing or unreadable template override is fatal; so is any
/// failure writing the artifact.
pub fn render_report(data: &ReportData, template: Option<&Path>, output: &Path) -> Result<()> {
    let template = match template {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read template {}", path.display()))?,
        None => DEFAULT_TEMPLATE.to_string(),
    };

    let html = merge(&template, data)?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    fs::write(output, html).with_context(|| format!("failed to write {}", output.display()))?;

    Ok(())
}

fn merge(template: &str, data: &ReportData) -> Result<String> {
    let value = serde_json::to_value(data).context("failed to serialize report data")?;
    let fields = value
        .as_object()
        .context("report data is not a JSON object")?;

    let mut html = template.to_string();
    for (key, field) in fields {
        let rendered = match field {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        html = html.replace(&format!("{{{{{}}}}}", key), &rendered);
    }
    Ok(html)
}
