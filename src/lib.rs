//! Crawl the EDGAR filing index for a company, pull the tables out of each
//! matching filing and save them as TSV.

pub mod config;
pub mod crawl;
pub mod extract;
pub mod fetch;
pub mod process;

pub use config::CrawlerConfig;
pub use crawl::{CrawlSummary, Crawler, FilingOutcome, SkipReason};
