// src/fetch/variant.rs

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::Fetcher;
use crate::config::CrawlerConfig;
use crate::crawl::SkipReason;

static DOCUMENT_TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table.tableFile").expect("document table selector"));
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("anchor selector"));

const STRUCTURED_EXT: &str = ".xml";
const PLAIN_EXT: &str = ".txt";

/// Downloadable documents listed on a filing detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidates {
    /// First structured-markup document, if the filing has one.
    pub structured: Option<Url>,
    /// Plain-text documents in page order.
    pub plain: Vec<Url>,
}

impl Candidates {
    pub fn is_empty(&self) -> bool {
        self.structured.is_none() && self.plain.is_empty()
    }
}

/// A plain-text candidate and the size its server advertised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measured {
    pub url: Url,
    pub content_length: Option<u64>,
}

/// Collect candidate document links from the detail page's document table.
pub fn parse_candidates(html: &str, config: &CrawlerConfig) -> Candidates {
    let doc = Html::parse_document(html);
    let mut out = Candidates::default();
    let Some(table) = doc.select(&DOCUMENT_TABLE).next() else {
        return out;
    };

    for href in table.select(&ANCHOR).filter_map(|a| a.value().attr("href")) {
        if href.contains(STRUCTURED_EXT) {
            out.structured = config.resolve(href);
            if out.structured.is_some() {
                break;
            }
        } else if href.contains(PLAIN_EXT) {
            if let Some(url) = config.resolve(href) {
                out.plain.push(url);
            }
        }
    }
    out
}

/// Pick the smallest measured candidate; the full submission text carries a
/// signature header the bare document lacks. Ties go to the earlier link.
/// Unmeasured candidates only win when nothing could be measured, and then
/// the first one does.
pub fn pick_smallest(measured: &[Measured]) -> Option<&Url> {
    measured
        .iter()
        .filter(|m| m.content_length.is_some())
        .min_by_key(|m| m.content_length)
        .or_else(|| measured.first())
        .map(|m| &m.url)
}

/// Fetch the detail page behind `detail_link` and return the body of the
/// best document variant it lists.
#[instrument(level = "info", skip(fetcher, config, detail_link), fields(link = %detail_link))]
pub async fn select_best_variant<F: Fetcher + ?Sized>(
    fetcher: &F,
    config: &CrawlerConfig,
    detail_link: &Url,
) -> Result<Vec<u8>, SkipReason> {
    let page = fetcher
        .get_bytes(detail_link)
        .await
        .map_err(SkipReason::DetailPage)?;
    let candidates = parse_candidates(&String::from_utf8_lossy(&page), config);
    debug!(
        structured = candidates.structured.is_some(),
        plain = candidates.plain.len(),
        "document candidates"
    );

    if let Some(url) = candidates.structured {
        info!(%url, "using structured document");
        return fetcher.get_bytes(&url).await.map_err(SkipReason::Document);
    }
    if candidates.plain.is_empty() {
        return Err(SkipReason::NoCandidates);
    }

    let mut measured = Vec::with_capacity(candidates.plain.len());
    for url in candidates.plain {
        let content_length = match fetcher.content_length(&url).await {
            Ok(Some(len)) => Some(len),
            Ok(None) => {
                warn!(%url, "no content length advertised");
                None
            }
            Err(e) => {
                warn!(%url, error = %e, "content length probe failed");
                None
            }
        };
        measured.push(Measured {
            url,
            content_length,
        });
    }

    let url = pick_smallest(&measured).ok_or(SkipReason::NoCandidates)?;
    info!(%url, "using smallest text document");
    fetcher.get_bytes(url).await.map_err(SkipReason::Document)
}
