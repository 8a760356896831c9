use std::io::Write;
use std::path::Path;

use algorithm_core::runtime::{Severity, ValidationReport, validate_graph};
use algorithm_core::source::FileSource;
use anyhow::Context as _;

fn print_report<W: Write>(title: &str, report: &ValidationReport, out: &mut W) -> std::io::Result<()> {
    if report.is_empty() {
        return writeln!(out, "{title}: no issues found");
    }
    let errors = report.errors().count();
    let warnings = report.issues.len() - errors;
    writeln!(out, "{title}: {errors} error(s), {warnings} warning(s)")?;
    for issue in &report.issues {
        let tag = match issue.severity() {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        writeln!(out, "  {tag}: {issue}")?;
    }
    Ok(())
}

/// Validate the document at `path`. Returns false when it has error-severity issues.
pub(crate) async fn run<W: Write>(path: &Path, json: bool, out: &mut W) -> anyhow::Result<bool> {
    let graph = FileSource::read_document(path)
        .await
        .with_context(|| format!("could not read {}", path.display()))?;
    let report = validate_graph(&graph);
    if json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        print_report(&graph.title, &report, out)?;
    }
    Ok(!report.has_errors())
}
