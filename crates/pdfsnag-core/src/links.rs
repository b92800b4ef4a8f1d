//! PDF link discovery in rendered HTML.

use scraper::{Html, Selector};
use url::Url;

/// Substring (matched case-insensitively) that marks a resolved URL as a PDF link.
pub const PDF_MARKER: &str = ".pdf";

const ANCHOR_SELECTOR: &str = "a[href]";

/// A discovered anchor: the resolved absolute URL and the raw `href` text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    pub url: Url,
    pub href: String,
}

fn anchor_selector() -> Selector {
    // Static selector; parse cannot fail.
    Selector::parse(ANCHOR_SELECTOR).expect("valid anchor selector")
}

/// Finds every anchor in `html` whose href, resolved against `base_url`,
/// contains `.pdf` (case-insensitive). Document order is preserved and
/// duplicates are kept.
pub fn extract_candidates(html: &str, base_url: &Url) -> Vec<CandidateLink> {
    let document = Html::parse_document(html);
    let selector = anchor_selector();

    document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| match base_url.join(href) {
            Ok(url) => Some(CandidateLink {
                url,
                href: href.to_string(),
            }),
            Err(e) => {
                tracing::debug!(href, error = %e, "skipping unresolvable href");
                None
            }
        })
        .filter(|link| is_pdf_like(&link.url))
        .collect()
}

/// Absolute URLs of the PDF links in `html`, in document order.
pub fn extract_pdf_links(html: &str, base_url: &Url) -> Vec<Url> {
    extract_candidates(html, base_url)
        .into_iter()
        .map(|link| link.url)
        .collect()
}

/// Number of `<a href>` elements in `html`.
pub fn count_anchors(html: &str) -> usize {
    Html::parse_document(html).select(&anchor_selector()).count()
}

fn is_pdf_like(url: &Url) -> bool {
    url.as_str().to_lowercase().contains(PDF_MARKER)
}
