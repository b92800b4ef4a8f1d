//! pdfsnag core: render one web page, find its PDF links, download them.

pub mod config;
pub mod fetcher;
pub mod harvest;
pub mod links;
pub mod logging;
pub mod renderer;
pub mod storage;
pub mod url_model;

pub use config::HarvestConfig;
pub use fetcher::{FetchError, FetchOutcome, PdfFetcher};
pub use harvest::{HarvestError, HarvestEvent, HarvestSummary, Harvester, Stage};
pub use renderer::{ChromiumRenderer, PageRenderer, RenderError};
