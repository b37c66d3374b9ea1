// src/fetch/listing.rs

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, trace};
use url::Url;

use super::Fetcher;
use crate::config::CrawlerConfig;

static FILINGS_TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table.tableFile2").expect("filings table selector"));
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("row selector"));
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("cell selector"));
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("anchor selector"));

const TITLE_COL: usize = 0;
const LINK_COL: usize = 1;
const DATE_COL: usize = 3;

/// One row of the company filing index that passed the title filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilingReference {
    pub title: String,
    pub document_link: Url,
    pub filing_date: String,
}

/// Parse an EDGAR company browse page and keep the rows whose title contains
/// `filter` (case-sensitive; empty matches everything). Rows missing a column
/// or a link are skipped. Document order is kept.
pub fn parse_filing_index(html: &str, filter: &str, config: &CrawlerConfig) -> Vec<FilingReference> {
    let doc = Html::parse_document(html);
    let Some(table) = doc.select(&FILINGS_TABLE).next() else {
        debug!("no filings table on index page");
        return Vec::new();
    };

    let mut out = Vec::new();
    for row in table.select(&ROW) {
        let cells: Vec<ElementRef<'_>> = row.select(&CELL).collect();
        if cells.len() <= DATE_COL {
            trace!(cells = cells.len(), "skipping short row");
            continue;
        }
        let title = cell_text(&cells[TITLE_COL]);
        let filing_date = cell_text(&cells[DATE_COL]);
        if !title.contains(filter) {
            continue;
        }
        let Some(document_link) = cells[LINK_COL]
            .select(&ANCHOR)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| config.resolve(href))
        else {
            trace!(%title, "skipping row without document link");
            continue;
        };
        out.push(FilingReference {
            title,
            document_link,
            filing_date,
        });
    }
    out
}

fn cell_text(cell: &ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Fetch the index page for `identifier` and list matching filings.
#[instrument(level = "info", skip(fetcher, config))]
pub async fn list_filings<F: Fetcher + ?Sized>(
    fetcher: &F,
    config: &CrawlerConfig,
    identifier: &str,
    filter: &str,
) -> Result<Vec<FilingReference>> {
    let url = config.index_url(identifier)?;
    info!(%url, "fetching filing index");
    let body = fetcher
        .get_bytes(&url)
        .await
        .with_context(|| format!("fetching filing index for {}", identifier))?;
    let html = String::from_utf8_lossy(&body);
    let filings = parse_filing_index(&html, filter, config);
    info!(count = filings.len(), "filings matched");
    Ok(filings)
}
