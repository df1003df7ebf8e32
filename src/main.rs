use std::process;
use std::sync::Arc;
use std::time::Instant;

use domrank::cli::Cli;
use domrank::config::Config;
use domrank::crawler::{Crawler, CrawlerConfig};
use domrank::export::{self, MetricsRow};
use domrank::logging;
use domrank::network::HttpClient;
use domrank::store::GraphStore;

fn main() {
    let args = match Cli::parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("error: {message}");
            process::exit(1);
        }
    };

    logging::init();

    if let Err(error) = run(&args) {
        tracing::error!(%error, "run failed");
        process::exit(1);
    }
}

fn run(args: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let fetcher = Arc::new(HttpClient::new()?);

    let crawler = Crawler::new(CrawlerConfig {
        seed_url: args.seed_url.clone(),
        max_pages: args.max_pages,
        num_threads: args.num_threads,
    });

    let (buffers, summary) = crawler.run(fetcher)?;

    let merge_start = Instant::now();
    let mut store = GraphStore::new();
    store.merge_buffers(buffers);
    tracing::info!(
        elapsed_ms = merge_start.elapsed().as_millis() as u64,
        "merge phase finished"
    );

    let rank_start = Instant::now();
    store.compute_pagerank(Config::PAGERANK_ITERATIONS);
    tracing::info!(
        elapsed_ms = rank_start.elapsed().as_millis() as u64,
        "ranking phase finished"
    );

    export::write_crawled_pages(&store, "crawled_pages.csv")?;
    export::write_rankings(&store, "pagerank_results.csv")?;

    let metrics = MetricsRow::new(
        &args.seed_url,
        args.max_pages,
        args.num_threads,
        summary.elapsed.as_millis() as u64,
        summary.pages_crawled,
    );
    export::append_metrics(&metrics, "metrics.csv")?;

    tracing::info!(
        pages_crawled = summary.pages_crawled,
        urls_visited = summary.urls_visited,
        "done; wrote crawled_pages.csv, pagerank_results.csv, metrics.csv"
    );

    Ok(())
}
