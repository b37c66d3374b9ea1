// src/config.rs

use anyhow::{Context, Result};
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.sec.gov/";
pub const DEFAULT_USER_AGENT: &str = "edgarscraper admin@example.com";
pub const DEFAULT_RESULTS_DIR: &str = "results";

/// Runtime knobs for one crawl. Built by the CLI, passed down by reference.
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Site root that index, detail and document links are resolved against.
    pub base_url: Url,
    /// EDGAR refuses requests without a contactable agent string.
    pub user_agent: String,
    pub results_dir: PathBuf,
    /// Filings processed at once. `1` keeps the pipeline strictly sequential.
    pub concurrency: usize,
}

impl CrawlerConfig {
    pub fn new(base_url: &str, user_agent: impl Into<String>) -> Result<Self> {
        let mut base_url =
            Url::parse(base_url).with_context(|| format!("parsing base URL {}", base_url))?;
        // `Url::join` drops the last path segment unless the base ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            user_agent: user_agent.into(),
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            concurrency: 1,
        })
    }

    pub fn with_results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.results_dir = dir.into();
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Company browse page listing every filing for `identifier` (ticker or CIK).
    pub fn index_url(&self, identifier: &str) -> Result<Url> {
        let mut url = self
            .base_url
            .join("cgi-bin/browse-edgar")
            .context("building browse-edgar URL")?;
        url.query_pairs_mut()
            .append_pair("CIK", identifier)
            .append_pair("Find", "Search")
            .append_pair("owner", "exclude")
            .append_pair("action", "getcompany");
        Ok(url)
    }

    /// Resolve an href scraped from an EDGAR page against the site root.
    pub fn resolve(&self, href: &str) -> Option<Url> {
        self.base_url.join(href).ok()
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL should parse"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            concurrency: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_url_carries_identifier_and_fixed_query() -> Result<()> {
        let cfg = CrawlerConfig::default();
        let url = cfg.index_url("0001166559")?;
        assert_eq!(
            url.as_str(),
            "https://www.sec.gov/cgi-bin/browse-edgar?CIK=0001166559&Find=Search&owner=exclude&action=getcompany"
        );
        Ok(())
    }

    #[test]
    fn base_without_trailing_slash_still_joins_under_it() -> Result<()> {
        let cfg = CrawlerConfig::new("http://127.0.0.1:8080/mirror", "test")?;
        let url = cfg.index_url("AAPL")?;
        assert!(url.as_str().starts_with("http://127.0.0.1:8080/mirror/cgi-bin/browse-edgar?"));
        Ok(())
    }

    #[test]
    fn absolute_hrefs_resolve_against_site_root() -> Result<()> {
        let cfg = CrawlerConfig::new("https://www.sec.gov/", "test")?;
        let url = cfg
            .resolve("/Archives/edgar/data/1166559/0001104659-05-006620-index.htm")
            .expect("href should resolve");
        assert_eq!(
            url.as_str(),
            "https://www.sec.gov/Archives/edgar/data/1166559/0001104659-05-006620-index.htm"
        );
        Ok(())
    }

    #[test]
    fn concurrency_is_at_least_one() {
        let cfg = CrawlerConfig::default().with_concurrency(0);
        assert_eq!(cfg.concurrency, 1);
    }
}
