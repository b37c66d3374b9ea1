use anyhow::Result;
use clap::Parser;
use edgarscraper::{
    config::{DEFAULT_BASE_URL, DEFAULT_RESULTS_DIR, DEFAULT_USER_AGENT},
    fetch::HttpFetcher,
    Crawler, CrawlerConfig,
};
use std::path::PathBuf;
use tokio::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Pull holdings tables out of EDGAR filings and save them as TSV.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Ticker or CIK number
    #[arg(short, long = "id")]
    id: String,

    /// Only filings whose title contains this text (case-sensitive)
    #[arg(short, long, default_value = "")]
    filter: String,

    /// Contact string sent as User-Agent; EDGAR rejects anonymous clients
    #[arg(long, env = "EDGAR_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    #[arg(long, env = "EDGAR_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, default_value = DEFAULT_RESULTS_DIR)]
    results_dir: PathBuf,

    /// Filings processed at once
    #[arg(long, env = "EDGAR_CONCURRENCY", default_value_t = 1)]
    concurrency: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,edgarscraper=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    // ─── 2) configure ────────────────────────────────────────────────
    let args = Args::parse();
    let config = CrawlerConfig::new(&args.base_url, args.user_agent)?
        .with_results_dir(args.results_dir)
        .with_concurrency(args.concurrency);
    info!(id = %args.id, filter = %args.filter, "startup");

    // ─── 3) crawl ────────────────────────────────────────────────────
    let start = Instant::now();
    let fetcher = HttpFetcher::new(&config)?;
    let crawler = Crawler::new(fetcher, config);
    let summary = crawler.run(&args.id, &args.filter).await?;

    // ─── 4) report ───────────────────────────────────────────────────
    for (filing, reason) in summary.skipped() {
        println!("skipped {} ({}): {}", filing.title, filing.filing_date, reason);
    }
    let written: Vec<String> = summary
        .written()
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    println!(
        "Results of {} for filter {:?} saved to {:?}",
        summary.identifier, summary.filter, written
    );
    info!(elapsed = ?start.elapsed(), "all done");
    Ok(())
}
