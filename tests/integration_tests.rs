//! End-to-end crawl scenarios against a deterministic in-memory fetcher.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use tempfile::TempDir;

use domrank::config::Config;
use domrank::crawler::{CrawlSummary, Crawler, CrawlerConfig};
use domrank::export::{self, MetricsRow};
use domrank::network::{FetchError, Fetcher};
use domrank::store::GraphStore;
use domrank::url_utils;

/// Fetcher serving canned bodies by normalized URL. URLs in `failures`
/// return a 500; everything unknown returns a 404. Fetch counts are recorded
/// per URL so tests can assert at-most-once delivery.
struct StubFetcher {
    pages: HashMap<String, String>,
    failures: HashSet<String>,
    fetch_counts: Mutex<HashMap<String, usize>>,
}

impl StubFetcher {
    fn new(pages: &[(&str, &str)], failures: &[&str]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, body)| (url_utils::normalize_url(url), body.to_string()))
                .collect(),
            failures: failures
                .iter()
                .map(|url| url_utils::normalize_url(url))
                .collect(),
            fetch_counts: Mutex::new(HashMap::new()),
        }
    }

    fn fetch_count(&self, url: &str) -> usize {
        self.fetch_counts
            .lock()
            .get(&url_utils::normalize_url(url))
            .copied()
            .unwrap_or(0)
    }
}

impl Fetcher for StubFetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        *self.fetch_counts.lock().entry(url.to_string()).or_insert(0) += 1;

        if self.failures.contains(url) {
            return Err(FetchError::HttpStatus(500));
        }
        self.pages
            .get(url)
            .cloned()
            .ok_or(FetchError::HttpStatus(404))
    }
}

/// Run the full pipeline: crawl, merge, rank.
fn crawl_and_rank(
    fetcher: Arc<StubFetcher>,
    seed: &str,
    max_pages: usize,
    num_threads: usize,
) -> (GraphStore, CrawlSummary) {
    let crawler = Crawler::new(CrawlerConfig {
        seed_url: seed.to_string(),
        max_pages,
        num_threads,
    });

    let (buffers, summary) = crawler.run(fetcher).expect("crawl failed to start");

    let mut store = GraphStore::new();
    store.merge_buffers(buffers);
    store.compute_pagerank(Config::PAGERANK_ITERATIONS);
    (store, summary)
}

#[test]
fn test_single_page_no_links() {
    let fetcher = Arc::new(StubFetcher::new(&[("http://a.test/", "<html></html>")], &[]));
    let (store, summary) = crawl_and_rank(Arc::clone(&fetcher), "http://a.test/", 5, 2);

    assert_eq!(summary.pages_crawled, 1);
    assert_eq!(store.link_graph().len(), 1);
    assert_eq!(store.link_graph()["a.test"].len(), 0);
    assert_eq!(store.visit_count("a.test"), 1);

    let scores = store.pagerank_scores();
    assert_eq!(scores.len(), 1);
    assert!((scores["a.test"] - 1.0).abs() < 1e-9);

    // The emitted tables carry exactly the expected rows.
    let dir = TempDir::new().unwrap();
    let crawled = dir.path().join("crawled_pages.csv");
    let rankings = dir.path().join("pagerank_results.csv");
    export::write_crawled_pages(&store, &crawled).unwrap();
    export::write_rankings(&store, &rankings).unwrap();

    assert_eq!(
        std::fs::read_to_string(&crawled).unwrap(),
        "domain,outgoing_links,visit_count\na.test,0,1\n"
    );
    assert_eq!(
        std::fs::read_to_string(&rankings).unwrap(),
        "domain,pagerank_score\na.test,1.000000\n"
    );
}

#[test]
fn test_two_cycle() {
    let fetcher = Arc::new(StubFetcher::new(
        &[
            ("http://a.test/", r#"<a href="http://b.test/">b</a>"#),
            ("http://b.test/", r#"<a href="http://a.test/">a</a>"#),
        ],
        &[],
    ));
    let (store, summary) = crawl_and_rank(Arc::clone(&fetcher), "http://a.test/", 10, 2);

    assert_eq!(summary.pages_crawled, 2);
    assert_eq!(fetcher.fetch_count("http://a.test/"), 1);
    assert_eq!(fetcher.fetch_count("http://b.test/"), 1);

    assert_eq!(store.link_graph()["a.test"], vec!["b.test"]);
    assert_eq!(store.link_graph()["b.test"], vec!["a.test"]);
    assert_eq!(store.visit_count("a.test"), 1);
    assert_eq!(store.visit_count("b.test"), 1);

    let pr_a = store.pagerank_of("a.test");
    let pr_b = store.pagerank_of("b.test");
    assert!((pr_a - 0.5).abs() < 1e-4);
    assert!((pr_a + pr_b - 1.0).abs() < 1e-9);
}

#[test]
fn test_star_with_dangling_leaves() {
    let hub_body = r#"
        <a href="http://l1.test/">1</a>
        <a href="http://l2.test/">2</a>
        <a href="http://l3.test/">3</a>
    "#;
    let fetcher = Arc::new(StubFetcher::new(
        &[
            ("http://hub.test/", hub_body),
            ("http://l1.test/", "<html><body>leaf</body></html>"),
            ("http://l2.test/", "<html><body>leaf</body></html>"),
            ("http://l3.test/", "<html><body>leaf</body></html>"),
        ],
        &[],
    ));
    let (store, _) = crawl_and_rank(fetcher, "http://hub.test/", 10, 2);

    let scores = store.pagerank_scores();
    assert_eq!(scores.len(), 4);
    for node in ["hub.test", "l1.test", "l2.test", "l3.test"] {
        assert!(scores.contains_key(node), "missing node {node}");
    }

    assert!((scores["l1.test"] - scores["l2.test"]).abs() < 1e-9);
    assert!((scores["l2.test"] - scores["l3.test"]).abs() < 1e-9);
    // The hub is the only source, so it bleeds rank to its leaves.
    assert!(scores["hub.test"] < scores["l1.test"]);
}

#[test]
fn test_dedup_across_workers() {
    let seed_body: String = (0..20)
        .map(|_| r#"<a href="http://x.test/page">x</a>"#)
        .collect();
    let fetcher = Arc::new(StubFetcher::new(
        &[
            ("http://seed.test/", seed_body.as_str()),
            ("http://x.test/page", "<html><body>x</body></html>"),
        ],
        &[],
    ));
    let crawler = Crawler::new(CrawlerConfig {
        seed_url: "http://seed.test/".to_string(),
        max_pages: 5,
        num_threads: 4,
    });
    let (buffers, _) = crawler.run(Arc::clone(&fetcher) as Arc<dyn Fetcher>).unwrap();

    assert_eq!(fetcher.fetch_count("http://x.test/page"), 1);

    // Seed adjacency preserves all twenty occurrences.
    let seed_links: Vec<String> = buffers
        .iter()
        .filter_map(|b| b.local_graph.get("seed.test").cloned())
        .flatten()
        .collect();
    assert_eq!(seed_links.len(), 20);
    assert!(seed_links.iter().all(|d| d == "x.test"));
}

#[test]
fn test_fetch_failures_are_dropped() {
    let seed_body = r#"
        <a href="http://s1.test/">ok</a>
        <a href="http://s2.test/">ok</a>
        <a href="http://s3.test/">ok</a>
        <a href="http://s4.test/">ok</a>
        <a href="http://s5.test/">ok</a>
        <a href="http://f1.test/">bad</a>
        <a href="http://f2.test/">bad</a>
        <a href="http://f3.test/">bad</a>
        <a href="http://f4.test/">bad</a>
        <a href="http://f5.test/">bad</a>
    "#;
    let leaf = "<html><body>leaf</body></html>";
    let fetcher = Arc::new(StubFetcher::new(
        &[
            ("http://seed.test/", seed_body),
            ("http://s1.test/", leaf),
            ("http://s2.test/", leaf),
            ("http://s3.test/", leaf),
            ("http://s4.test/", leaf),
            ("http://s5.test/", leaf),
        ],
        &[
            "http://f1.test/",
            "http://f2.test/",
            "http://f3.test/",
            "http://f4.test/",
            "http://f5.test/",
        ],
    ));
    let (store, summary) = crawl_and_rank(fetcher, "http://seed.test/", 20, 3);

    // Seed plus the five successes; failures never count toward the budget.
    assert_eq!(summary.pages_crawled, 6);
    // Every link entered the dedup set exactly once.
    assert_eq!(summary.urls_visited, 11);

    for failed in ["f1.test", "f2.test", "f3.test", "f4.test", "f5.test"] {
        assert!(!store.link_graph().contains_key(failed));
        // Still ranked: they appear as destinations of the seed page.
        assert!(store.pagerank_scores().contains_key(failed));
    }
}

#[test]
fn test_visit_sum_matches_pages_crawled() {
    let fetcher = Arc::new(StubFetcher::new(
        &[
            ("http://a.test/", r#"<a href="http://b.test/">b</a>"#),
            ("http://b.test/", r#"<a href="http://c.test/">c</a>"#),
            ("http://c.test/", "<html><body>end</body></html>"),
        ],
        &[],
    ));
    let (store, summary) = crawl_and_rank(fetcher, "http://a.test/", 50, 3);

    assert_eq!(store.total_visits(), summary.pages_crawled as u64);
}

#[test]
fn test_normalization_collapses_variants() {
    // Both spellings reach the same page; it is fetched once.
    let seed_body = r#"
        <a href="HTTP://Example.COM/Foo#bar">first</a>
        <a href="http://example.com/Foo">second</a>
    "#;
    let fetcher = Arc::new(StubFetcher::new(
        &[
            ("http://seed.test/", seed_body),
            ("http://example.com/foo", "<html><body>target</body></html>"),
        ],
        &[],
    ));
    let (_, summary) = crawl_and_rank(Arc::clone(&fetcher), "http://seed.test/", 10, 2);

    assert_eq!(summary.pages_crawled, 2);
    assert_eq!(fetcher.fetch_count("http://example.com/foo"), 1);
    // Seed plus the single normalized target.
    assert_eq!(summary.urls_visited, 2);
}

#[test]
fn test_zero_page_run_still_produces_outputs() {
    let fetcher = Arc::new(StubFetcher::new(&[], &[]));
    let (store, summary) = crawl_and_rank(fetcher, "http://unreachable.test/", 5, 2);

    assert_eq!(summary.pages_crawled, 0);
    assert!(store.link_graph().is_empty());
    assert!(store.pagerank_scores().is_empty());

    let dir = TempDir::new().unwrap();
    let crawled = dir.path().join("crawled_pages.csv");
    let rankings = dir.path().join("pagerank_results.csv");
    let metrics = dir.path().join("metrics.csv");

    export::write_crawled_pages(&store, &crawled).unwrap();
    export::write_rankings(&store, &rankings).unwrap();
    let row = MetricsRow::new(
        "http://unreachable.test/",
        5,
        2,
        summary.elapsed.as_millis() as u64,
        summary.pages_crawled,
    );
    export::append_metrics(&row, &metrics).unwrap();

    assert_eq!(
        std::fs::read_to_string(&crawled).unwrap().trim_end(),
        "domain,outgoing_links,visit_count"
    );
    assert_eq!(
        std::fs::read_to_string(&rankings).unwrap().trim_end(),
        "domain,pagerank_score"
    );

    let metrics_content = std::fs::read_to_string(&metrics).unwrap();
    let last = metrics_content.lines().last().unwrap();
    assert!(last.ends_with(",0,0.00"), "unexpected metrics row: {last}");
}

#[test]
fn test_pagerank_conservation_end_to_end() {
    let fetcher = Arc::new(StubFetcher::new(
        &[
            (
                "http://a.test/",
                r#"<a href="http://b.test/">b</a><a href="http://c.test/">c</a>"#,
            ),
            ("http://b.test/", r#"<a href="http://c.test/">c</a>"#),
            ("http://c.test/", r#"<a href="http://a.test/">a</a>"#),
        ],
        &[],
    ));
    let (store, _) = crawl_and_rank(fetcher, "http://a.test/", 10, 2);

    let total: f64 = store.pagerank_scores().values().sum();
    assert!((total - 1.0).abs() < 1e-9);
}
