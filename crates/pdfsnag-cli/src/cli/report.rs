//! Line-by-line progress narration for the terminal.

use pdfsnag_core::fetcher::FetchOutcome;
use pdfsnag_core::harvest::{HarvestEvent, HarvestSummary, Stage};
use std::path::Path;

/// One terminal line per event worth showing; `None` for silent events.
pub fn format_event(event: &HarvestEvent<'_>) -> Option<String> {
    match event {
        HarvestEvent::StageChanged(Stage::BrowserStarting) => Some("Starting browser...".to_string()),
        HarvestEvent::StageChanged(Stage::PageLoading) => Some("Loading page...".to_string()),
        HarvestEvent::StageChanged(Stage::WaitingForContent) => {
            Some("Waiting for links to appear...".to_string())
        }
        HarvestEvent::StageChanged(Stage::Parsing) => Some("Page rendered, parsing links...".to_string()),
        HarvestEvent::StageChanged(_) => None,
        HarvestEvent::LinksFound { count } => Some(format!("Found {} PDF link(s)", count)),
        HarvestEvent::Fetched { url, outcome, .. } => Some(match outcome {
            FetchOutcome::Downloaded { filename, bytes } => {
                format!("  downloaded  {} ({} bytes) <- {}", filename, bytes, url)
            }
            FetchOutcome::AlreadyPresent { filename } => {
                format!("  exists      {} <- {}", filename, url)
            }
        }),
        HarvestEvent::FetchFailed { url, error, .. } => {
            Some(format!("  failed      {}: {}", url, error))
        }
    }
}

pub fn format_summary(summary: &HarvestSummary, output_dir: &Path) -> String {
    let mut line = format!(
        "Total PDFs downloaded: {} into {}",
        summary.succeeded(),
        output_dir.display()
    );
    if summary.already_present > 0 || summary.failed > 0 {
        line.push_str(&format!(
            " ({} new, {} already present, {} failed)",
            summary.downloaded, summary.already_present, summary.failed
        ));
    }
    line
}

/// Final stdout line for a fatal error, with its cause chain.
pub fn format_failure(err: &anyhow::Error) -> String {
    format!("pdfsnag error: {:#}", err)
}
