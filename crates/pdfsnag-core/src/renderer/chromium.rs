//! Headless Chromium renderer over the DevTools protocol.
//!
//! chromiumoxide is async; each `render` call builds a private current-thread
//! tokio runtime and blocks on it, so callers stay synchronous. The browser
//! process lives only for the duration of one call.

use super::{PageRenderer, RenderError, RenderStage};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use url::Url;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Launch settings for the headless browser.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Explicit Chrome/Chromium binary. `None` lets chromiumoxide auto-detect.
    pub chrome_executable: Option<PathBuf>,
    /// Passed to the browser as `--user-agent`.
    pub user_agent: Option<String>,
    /// Timeout for individual DevTools requests (navigation included).
    pub request_timeout: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            chrome_executable: None,
            user_agent: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// [`PageRenderer`] backed by a headless Chromium process.
#[derive(Debug, Clone, Default)]
pub struct ChromiumRenderer {
    options: BrowserOptions,
}

impl ChromiumRenderer {
    pub fn new(options: BrowserOptions) -> Self {
        Self { options }
    }

    /// Fixed launch profile: headless, no sandbox, no GPU.
    fn browser_config(&self) -> Result<BrowserConfig, RenderError> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(self.options.request_timeout)
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check");

        if let Some(ua) = &self.options.user_agent {
            builder = builder.arg(format!("--user-agent={}", ua));
        }
        if let Some(path) = &self.options.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(RenderError::Launch)
    }

    async fn render_async(
        &self,
        url: &Url,
        content_wait: Duration,
        progress: &mut dyn FnMut(RenderStage),
    ) -> Result<String, RenderError> {
        progress(RenderStage::BrowserStarting);
        let config = self.browser_config()?;

        tracing::info!("launching headless browser");
        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("browser handler: {}", e);
                }
            }
        });

        let result = load_and_capture(&browser, url, content_wait, progress).await;

        // Release the browser on every path before handing back the HTML.
        if let Err(e) = browser.close().await {
            tracing::warn!("failed to close browser cleanly: {}", e);
        }
        if let Err(e) = browser.wait().await {
            tracing::warn!("failed to wait for browser exit: {}", e);
        }
        handler_task.abort();
        tracing::debug!("browser closed");

        result
    }
}

impl PageRenderer for ChromiumRenderer {
    fn render(
        &mut self,
        url: &Url,
        content_wait: Duration,
        progress: &mut dyn FnMut(RenderStage),
    ) -> Result<String, RenderError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| RenderError::Launch(format!("tokio runtime: {}", e)))?;
        runtime.block_on(self.render_async(url, content_wait, progress))
    }
}

async fn load_and_capture(
    browser: &Browser,
    url: &Url,
    content_wait: Duration,
    progress: &mut dyn FnMut(RenderStage),
) -> Result<String, RenderError> {
    let navigation = |e: chromiumoxide::error::CdpError| RenderError::Navigation {
        url: url.to_string(),
        message: e.to_string(),
    };

    progress(RenderStage::PageLoading);
    tracing::info!(%url, "loading page");
    let page = browser.new_page("about:blank").await.map_err(navigation)?;
    page.goto(url.as_str()).await.map_err(navigation)?;

    progress(RenderStage::WaitingForContent);
    wait_for_anchor(&page, url, content_wait).await?;

    progress(RenderStage::Capturing);
    page.content()
        .await
        .map_err(|e| RenderError::Capture(e.to_string()))
}

/// Polls the DOM until an `<a>` element exists or `timeout` elapses.
async fn wait_for_anchor(page: &Page, url: &Url, timeout: Duration) -> Result<(), RenderError> {
    let start = Instant::now();
    loop {
        if page.find_element("a").await.is_ok() {
            tracing::debug!("links present after {:.2}s", start.elapsed().as_secs_f64());
            return Ok(());
        }
        if start.elapsed() >= timeout {
            return Err(RenderError::ContentTimeout {
                url: url.to_string(),
                timeout,
            });
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
