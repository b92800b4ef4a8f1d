//! Renderer that returns canned HTML instead of driving a browser.

use pdfsnag_core::links::count_anchors;
use pdfsnag_core::renderer::{PageRenderer, RenderError, RenderStage};
use std::time::Duration;
use url::Url;

pub struct StubRenderer {
    pub html: String,
    /// URLs the harvester asked to render, in order.
    pub requested: Vec<Url>,
}

impl StubRenderer {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            requested: Vec::new(),
        }
    }
}

impl PageRenderer for StubRenderer {
    /// Fails like a real browser would when the page never shows a link.
    fn render(
        &mut self,
        url: &Url,
        content_wait: Duration,
        progress: &mut dyn FnMut(RenderStage),
    ) -> Result<String, RenderError> {
        self.requested.push(url.clone());
        progress(RenderStage::BrowserStarting);
        progress(RenderStage::PageLoading);
        progress(RenderStage::WaitingForContent);
        if count_anchors(&self.html) == 0 {
            return Err(RenderError::ContentTimeout {
                url: url.to_string(),
                timeout: content_wait,
            });
        }
        progress(RenderStage::Capturing);
        Ok(self.html.clone())
    }
}
