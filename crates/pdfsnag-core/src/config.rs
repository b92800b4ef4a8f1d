use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fetcher::CurlOptions;
use crate::renderer::BrowserOptions;

/// Browser-identifying User-Agent sent with every PDF request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const DEFAULT_SOURCE_URL: &str = "https://sch2083.mskobr.ru/info_edu/all_docs/";
pub const DEFAULT_OUTPUT_DIR: &str = "downloaded_pdfs";

/// Run configuration loaded from `~/.config/pdfsnag/config.toml`.
/// Missing keys take their default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Page to render and scan for PDF links.
    pub source_url: String,
    /// Flat output directory, relative to the working directory unless absolute.
    pub output_dir: PathBuf,
    /// How long to wait for the first `<a>` to appear in the rendered page.
    pub content_wait_timeout_secs: u64,
    pub user_agent: String,
    pub connect_timeout_secs: u64,
    /// Upper bound for one PDF transfer.
    pub request_timeout_secs: u64,
    /// Chrome/Chromium binary; auto-detected when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome_executable: Option<PathBuf>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            content_wait_timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout_secs: 30,
            request_timeout_secs: 600,
            chrome_executable: None,
        }
    }
}

impl HarvestConfig {
    pub fn content_wait_timeout(&self) -> Duration {
        Duration::from_secs(self.content_wait_timeout_secs)
    }

    pub fn curl_options(&self) -> CurlOptions {
        CurlOptions {
            user_agent: self.user_agent.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn browser_options(&self) -> BrowserOptions {
        BrowserOptions {
            chrome_executable: self.chrome_executable.clone(),
            user_agent: Some(self.user_agent.clone()),
            ..BrowserOptions::default()
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pdfsnag")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from the default location, creating a default file if none exists.
pub fn load_or_init() -> Result<HarvestConfig> {
    let path = config_path()?;
    load_or_init_at(&path)
}

/// Like [`load_or_init`] but for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<HarvestConfig> {
    if !path.exists() {
        let default_cfg = HarvestConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(path)
}

/// Load configuration from an existing file.
pub fn load_from_path(path: &Path) -> Result<HarvestConfig> {
    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: HarvestConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
