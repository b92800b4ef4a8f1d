//! Page rendering: load a URL in a real browser and return the final DOM.
//!
//! The orchestrator only sees the [`PageRenderer`] trait, so tests can
//! substitute canned HTML for a browser.

mod chromium;

pub use chromium::{BrowserOptions, ChromiumRenderer};

use std::fmt;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Renders a page (scripts executed) and returns its HTML.
///
/// Implementations own whatever resources they need for the duration of one
/// call and release them before returning, on success and on error alike.
pub trait PageRenderer {
    /// Loads `url`, waits up to `content_wait` for at least one `<a>` element
    /// to appear, and returns the rendered HTML.
    ///
    /// `progress` is called with each [`RenderStage`] as it is entered.
    fn render(
        &mut self,
        url: &Url,
        content_wait: Duration,
        progress: &mut dyn FnMut(RenderStage),
    ) -> Result<String, RenderError>;
}

impl<R: PageRenderer + ?Sized> PageRenderer for &mut R {
    fn render(
        &mut self,
        url: &Url,
        content_wait: Duration,
        progress: &mut dyn FnMut(RenderStage),
    ) -> Result<String, RenderError> {
        (**self).render(url, content_wait, progress)
    }
}

impl<R: PageRenderer + ?Sized> PageRenderer for Box<R> {
    fn render(
        &mut self,
        url: &Url,
        content_wait: Duration,
        progress: &mut dyn FnMut(RenderStage),
    ) -> Result<String, RenderError> {
        (**self).render(url, content_wait, progress)
    }
}

/// Steps of one render, in order. Also labels where a failed render stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    BrowserStarting,
    PageLoading,
    WaitingForContent,
    Capturing,
}

impl fmt::Display for RenderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RenderStage::BrowserStarting => "starting browser",
            RenderStage::PageLoading => "loading page",
            RenderStage::WaitingForContent => "waiting for content",
            RenderStage::Capturing => "capturing HTML",
        };
        f.write_str(s)
    }
}

/// Fatal rendering failure. Any of these aborts the run.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("browser launch failed: {0}")]
    Launch(String),
    #[error("failed to load {url}: {message}")]
    Navigation { url: String, message: String },
    #[error("no links appeared on {url} within {}s", timeout.as_secs())]
    ContentTimeout { url: String, timeout: Duration },
    #[error("failed to capture page HTML: {0}")]
    Capture(String),
}

impl RenderError {
    pub fn stage(&self) -> RenderStage {
        match self {
            RenderError::Launch(_) => RenderStage::BrowserStarting,
            RenderError::Navigation { .. } => RenderStage::PageLoading,
            RenderError::ContentTimeout { .. } => RenderStage::WaitingForContent,
            RenderError::Capture(_) => RenderStage::Capturing,
        }
    }
}
