//! One-shot harvest: render the source page, extract PDF links, fetch each.
//!
//! Rendering errors are fatal and end the run. Fetch errors are per link:
//! they are reported to the observer, counted, and the next link proceeds.

use crate::config::HarvestConfig;
use crate::fetcher::{FetchError, FetchOutcome, PdfFetcher};
use crate::links::extract_pdf_links;
use crate::renderer::{PageRenderer, RenderError, RenderStage};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Pipeline position, used for progress reporting. Each stage is reported
/// once on entry; the render stages come from the [`PageRenderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    BrowserStarting,
    PageLoading,
    WaitingForContent,
    Parsing,
    Downloading { index: usize, total: usize },
    Done,
    Failed,
}

impl From<RenderStage> for Stage {
    fn from(s: RenderStage) -> Self {
        match s {
            RenderStage::BrowserStarting => Stage::BrowserStarting,
            RenderStage::PageLoading => Stage::PageLoading,
            RenderStage::WaitingForContent => Stage::WaitingForContent,
            RenderStage::Capturing => Stage::Parsing,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Idle => f.write_str("idle"),
            Stage::BrowserStarting => f.write_str("browser starting"),
            Stage::PageLoading => f.write_str("page loading"),
            Stage::WaitingForContent => f.write_str("waiting for content"),
            Stage::Parsing => f.write_str("parsing"),
            Stage::Downloading { index, total } => write!(f, "downloading {}/{}", index + 1, total),
            Stage::Done => f.write_str("done"),
            Stage::Failed => f.write_str("failed"),
        }
    }
}

/// Errors that abort the whole run.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("invalid source URL {url:?}: {source}")]
    InvalidSourceUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl HarvestError {
    /// Stage the run was in when it failed.
    pub fn stage(&self) -> Stage {
        match self {
            HarvestError::InvalidSourceUrl { .. } => Stage::Idle,
            HarvestError::Render(e) => e.stage().into(),
        }
    }
}

/// Progress notifications, delivered in pipeline order.
#[derive(Debug)]
pub enum HarvestEvent<'a> {
    StageChanged(Stage),
    LinksFound { count: usize },
    Fetched {
        index: usize,
        url: &'a Url,
        outcome: &'a FetchOutcome,
    },
    FetchFailed {
        index: usize,
        url: &'a Url,
        error: &'a FetchError,
    },
}

/// Counts for a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarvestSummary {
    pub links_found: usize,
    pub downloaded: usize,
    pub already_present: usize,
    pub failed: usize,
}

impl HarvestSummary {
    /// Successful outcomes, counting files that were already on disk.
    pub fn succeeded(&self) -> usize {
        self.downloaded + self.already_present
    }

    fn record(mut self, result: &Result<FetchOutcome, FetchError>) -> Self {
        match result {
            Ok(FetchOutcome::Downloaded { .. }) => self.downloaded += 1,
            Ok(FetchOutcome::AlreadyPresent { .. }) => self.already_present += 1,
            Err(_) => self.failed += 1,
        }
        self
    }
}

/// Drives renderer → extractor → fetcher for one source page.
pub struct Harvester<R> {
    source_url: Url,
    output_dir: PathBuf,
    content_wait: Duration,
    renderer: R,
    fetcher: PdfFetcher,
}

impl<R: PageRenderer> Harvester<R> {
    pub fn new(config: &HarvestConfig, renderer: R) -> Result<Self, HarvestError> {
        let source_url =
            Url::parse(&config.source_url).map_err(|source| HarvestError::InvalidSourceUrl {
                url: config.source_url.clone(),
                source,
            })?;
        Ok(Self {
            source_url,
            output_dir: config.output_dir.clone(),
            content_wait: config.content_wait_timeout(),
            renderer,
            fetcher: PdfFetcher::new(config.curl_options()),
        })
    }

    pub fn source_url(&self) -> &Url {
        &self.source_url
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Runs the harvest without progress callbacks.
    pub fn run(&mut self) -> Result<HarvestSummary, HarvestError> {
        self.run_with(|_| {})
    }

    /// Runs the harvest, reporting progress to `observer`.
    pub fn run_with<F>(&mut self, observer: F) -> Result<HarvestSummary, HarvestError>
    where
        F: FnMut(&HarvestEvent<'_>),
    {
        let mut progress = Progress::new(observer);

        progress.enter(Stage::BrowserStarting);
        let rendered = self.renderer.render(
            &self.source_url,
            self.content_wait,
            &mut |s: RenderStage| progress.enter(s.into()),
        );
        let html = match rendered {
            Ok(html) => html,
            Err(e) => {
                tracing::error!(stage = %e.stage(), error = %e, "render failed");
                progress.enter(Stage::Failed);
                return Err(e.into());
            }
        };

        progress.enter(Stage::Parsing);
        let links = extract_pdf_links(&html, &self.source_url);
        tracing::info!(count = links.len(), url = %self.source_url, "pdf links found");
        progress.emit(&HarvestEvent::LinksFound { count: links.len() });

        let total = links.len();
        let initial = HarvestSummary {
            links_found: total,
            ..HarvestSummary::default()
        };
        let summary = links.iter().enumerate().fold(initial, |summary, (index, url)| {
            progress.enter(Stage::Downloading { index, total });
            let result = self.fetcher.fetch(url, &self.output_dir);
            match &result {
                Ok(outcome) => progress.emit(&HarvestEvent::Fetched { index, url, outcome }),
                Err(error) => progress.emit(&HarvestEvent::FetchFailed { index, url, error }),
            }
            summary.record(&result)
        });

        tracing::info!(
            downloaded = summary.downloaded,
            already_present = summary.already_present,
            failed = summary.failed,
            "harvest complete"
        );
        progress.enter(Stage::Done);
        Ok(summary)
    }
}

/// Forwards events to the observer, reporting each stage once on entry.
struct Progress<F> {
    observer: F,
    stage: Stage,
}

impl<F> Progress<F>
where
    F: FnMut(&HarvestEvent<'_>),
{
    fn new(observer: F) -> Self {
        Self {
            observer,
            stage: Stage::Idle,
        }
    }

    fn enter(&mut self, stage: Stage) {
        if self.stage != stage {
            self.stage = stage;
            (self.observer)(&HarvestEvent::StageChanged(stage));
        }
    }

    fn emit(&mut self, event: &HarvestEvent<'_>) {
        (self.observer)(event)
    }
}
