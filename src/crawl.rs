// src/crawl.rs

use anyhow::Result;
use futures::{stream, StreamExt};
use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::{
    config::CrawlerConfig,
    extract::{table::extract_from_raw, MarkupParser, TolerantXmlParser},
    fetch::{
        listing::{list_filings, FilingReference},
        variant::select_best_variant,
        FetchError, Fetcher,
    },
    process::{
        normalize::normalize_block,
        write::{result_file_name, write_records},
    },
};

/// Why a filing produced no results file.
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error("detail page unavailable: {0}")]
    DetailPage(FetchError),
    #[error("detail page lists no .xml or .txt document")]
    NoCandidates,
    #[error("document download failed: {0}")]
    Document(FetchError),
    #[error("nothing recoverable from document markup")]
    Unparseable,
    #[error("document has no table")]
    NoTable,
    #[error("writing results failed: {0:#}")]
    Write(anyhow::Error),
}

#[derive(Debug)]
pub struct FilingOutcome {
    pub filing: FilingReference,
    pub result: Result<PathBuf, SkipReason>,
}

/// Everything one run did, in index order.
#[derive(Debug)]
pub struct CrawlSummary {
    pub identifier: String,
    pub filter: String,
    pub outcomes: Vec<FilingOutcome>,
}

impl CrawlSummary {
    /// Distinct files written, in index order. A filing sharing its output
    /// path with an earlier one overwrote it, so the path is listed once.
    pub fn written(&self) -> Vec<&Path> {
        let mut seen = HashSet::new();
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(PathBuf::as_path))
            .filter(|p| seen.insert(*p))
            .collect()
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&FilingReference, &SkipReason)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (&o.filing, e)))
    }
}

/// Runs list → best variant → tables → records → TSV for every matching
/// filing of one identifier. A failed filing is logged and skipped; only a
/// failed index fetch aborts the run.
pub struct Crawler<F, P = TolerantXmlParser> {
    fetcher: F,
    parser: P,
    config: CrawlerConfig,
}

impl<F: Fetcher> Crawler<F> {
    pub fn new(fetcher: F, config: CrawlerConfig) -> Self {
        Self::with_parser(fetcher, TolerantXmlParser, config)
    }
}

impl<F: Fetcher, P: MarkupParser> Crawler<F, P> {
    pub fn with_parser(fetcher: F, parser: P, config: CrawlerConfig) -> Self {
        Self {
            fetcher,
            parser,
            config,
        }
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    #[instrument(level = "info", skip(self))]
    pub async fn run(&self, identifier: &str, filter: &str) -> Result<CrawlSummary> {
        let filings = list_filings(&self.fetcher, &self.config, identifier, filter).await?;

        // Filings sharing an output path run one at a time in index order
        // (the tokio lock is FIFO), so the last successful one wins.
        let mut locks: HashMap<String, Arc<Mutex<()>>> = HashMap::new();
        let jobs: Vec<(FilingReference, String, Arc<Mutex<()>>)> = filings
            .into_iter()
            .map(|filing| {
                let file_name =
                    result_file_name(identifier, &filing.title, &filing.filing_date);
                let lock = locks.entry(file_name.clone()).or_default().clone();
                (filing, file_name, lock)
            })
            .collect();

        let outcomes: Vec<FilingOutcome> = stream::iter(jobs)
            .map(|(filing, file_name, lock)| async move {
                let result = {
                    let _claim = lock.lock().await;
                    self.process_filing(&filing, &file_name).await
                };
                match &result {
                    Ok(path) => info!(
                        title = %filing.title,
                        date = %filing.filing_date,
                        path = %path.display(),
                        "converted filing"
                    ),
                    Err(reason) => warn!(
                        title = %filing.title,
                        date = %filing.filing_date,
                        %reason,
                        "skipping filing"
                    ),
                }
                FilingOutcome { filing, result }
            })
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        let summary = CrawlSummary {
            identifier: identifier.to_string(),
            filter: filter.to_string(),
            outcomes,
        };
        info!(
            written = summary.written().len(),
            skipped = summary.skipped().count(),
            "crawl finished"
        );
        Ok(summary)
    }

    #[instrument(level = "debug", skip(self, filing), fields(title = %filing.title, date = %filing.filing_date))]
    async fn process_filing(
        &self,
        filing: &FilingReference,
        file_name: &str,
    ) -> Result<PathBuf, SkipReason> {
        let raw = select_best_variant(&self.fetcher, &self.config, &filing.document_link).await?;
        let text = extract_from_raw(&self.parser, &raw)?;
        let records = normalize_block(&text);
        write_records(&self.config.results_dir, file_name, &records).map_err(SkipReason::Write)
    }
}
