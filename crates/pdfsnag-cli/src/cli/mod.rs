//! CLI for pdfsnag.

mod report;

pub use report::format_failure;

use anyhow::{Context, Result};
use clap::Parser;
use pdfsnag_core::config::{self, HarvestConfig};
use pdfsnag_core::harvest::Harvester;
use pdfsnag_core::renderer::ChromiumRenderer;
use std::path::PathBuf;

/// Render a web page and download every PDF it links to.
///
/// With no arguments, everything comes from `~/.config/pdfsnag/config.toml`
/// (created with defaults on first run).
#[derive(Debug, Parser)]
#[command(name = "pdfsnag")]
#[command(about = "Render a web page and download every PDF it links to", long_about = None)]
pub struct Cli {
    /// Page to scan for PDF links.
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Directory to save PDFs into (created if missing).
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Seconds to wait for links to appear in the rendered page.
    #[arg(long, value_name = "SECS")]
    pub wait_timeout: Option<u64>,

    /// Chrome/Chromium executable to use instead of auto-detection.
    #[arg(long, value_name = "PATH")]
    pub chrome: Option<PathBuf>,

    /// Read configuration from this file instead of the XDG default.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Overlay command-line values on top of the loaded config.
    pub fn apply(&self, mut cfg: HarvestConfig) -> HarvestConfig {
        if let Some(url) = &self.url {
            cfg.source_url = url.clone();
        }
        if let Some(dir) = &self.output_dir {
            cfg.output_dir = dir.clone();
        }
        if let Some(secs) = self.wait_timeout {
            cfg.content_wait_timeout_secs = secs;
        }
        if let Some(chrome) = &self.chrome {
            cfg.chrome_executable = Some(chrome.clone());
        }
        cfg
    }

    fn load_config(&self) -> Result<HarvestConfig> {
        let cfg = match &self.config {
            Some(path) => config::load_from_path(path)?,
            None => config::load_or_init()?,
        };
        Ok(self.apply(cfg))
    }

    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = cli.load_config()?;
        tracing::debug!("loaded config: {:?}", cfg);

        let renderer = ChromiumRenderer::new(cfg.browser_options());
        let mut harvester = Harvester::new(&cfg, renderer)?;

        println!("Scanning {}", harvester.source_url());
        let summary = harvester
            .run_with(|event| {
                if let Some(line) = report::format_event(event) {
                    println!("{}", line);
                }
            })
            .with_context(|| format!("harvest of {} failed", cfg.source_url))?;

        println!();
        println!("{}", report::format_summary(&summary, harvester.output_dir()));
        Ok(())
    }
}
