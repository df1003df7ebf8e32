//! Worker pool and crawl coordination.
//!
//! N OS threads drain the shared frontier in parallel. Each worker owns its
//! buffer for the whole crawl and returns it through the thread's join
//! handle, so buffer contents are published to the coordinator by the join
//! itself. A detached observer thread logs progress once per second.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::frontier::Frontier;
use crate::network::Fetcher;
use crate::parser;
use crate::store::WorkerBuffer;
use crate::url_utils;

#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    pub seed_url: String,
    pub max_pages: usize,
    pub num_threads: usize,
}

/// Outcome of a finished crawl phase, before merge and ranking.
#[derive(Debug)]
pub struct CrawlSummary {
    pub pages_crawled: usize,
    pub urls_visited: usize,
    pub elapsed: Duration,
}

pub struct Crawler {
    config: CrawlerConfig,
    frontier: Arc<Frontier>,
    pages_crawled: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
}

struct WorkerContext {
    thread_id: usize,
    frontier: Arc<Frontier>,
    fetcher: Arc<dyn Fetcher>,
    pages_crawled: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_pages: usize,
}

impl Crawler {
    pub fn new(config: CrawlerConfig) -> Self {
        Self {
            config,
            frontier: Arc::new(Frontier::new()),
            pages_crawled: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Run the crawl phase: seed the frontier, spawn the workers and the
    /// progress observer, join the workers, and hand back their buffers in
    /// worker-index order together with the crawl summary.
    pub fn run(&self, fetcher: Arc<dyn Fetcher>) -> io::Result<(Vec<WorkerBuffer>, CrawlSummary)> {
        tracing::info!(
            seed_url = %self.config.seed_url,
            max_pages = self.config.max_pages,
            workers = self.config.num_threads,
            "crawl started"
        );

        // Seed with the normalized form so links back to the seed page
        // dedup against it.
        self.frontier
            .init(&url_utils::normalize_url(&self.config.seed_url));
        let start = Instant::now();

        let mut handles = Vec::with_capacity(self.config.num_threads);
        for thread_id in 0..self.config.num_threads {
            let context = WorkerContext {
                thread_id,
                frontier: Arc::clone(&self.frontier),
                fetcher: Arc::clone(&fetcher),
                pages_crawled: Arc::clone(&self.pages_crawled),
                in_flight: Arc::clone(&self.in_flight),
                max_pages: self.config.max_pages,
            };

            let handle = thread::Builder::new()
                .name(format!("worker-{thread_id}"))
                .spawn(move || worker_loop(context))?;
            handles.push(handle);
        }

        self.spawn_progress_observer()?;

        // Join publishes every buffer write that happened on the worker.
        let mut buffers = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.join() {
                Ok(buffer) => buffers.push(buffer),
                Err(_) => tracing::error!("worker thread panicked; its buffer is lost"),
            }
        }

        self.frontier.mark_done();

        let summary = CrawlSummary {
            pages_crawled: self.pages_crawled.load(Ordering::Relaxed),
            urls_visited: self.frontier.visited_count(),
            elapsed: start.elapsed(),
        };

        tracing::info!(
            pages_crawled = summary.pages_crawled,
            urls_visited = summary.urls_visited,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "crawl complete"
        );

        Ok((buffers, summary))
    }

    /// Best-effort progress logging once per second. The thread holds only
    /// Arc clones, so its accesses stay valid no matter when it wakes; it
    /// exits once the budget is reached, the queue drains after the first
    /// page, or the coordinator marks the frontier done.
    fn spawn_progress_observer(&self) -> io::Result<()> {
        let frontier = Arc::clone(&self.frontier);
        let pages_crawled = Arc::clone(&self.pages_crawled);
        let max_pages = self.config.max_pages;

        thread::Builder::new()
            .name("progress".to_string())
            .spawn(move || {
                while pages_crawled.load(Ordering::Relaxed) < max_pages {
                    thread::sleep(Duration::from_millis(Config::PROGRESS_INTERVAL_MS));

                    let pages = pages_crawled.load(Ordering::Relaxed);
                    tracing::info!(
                        pages,
                        max_pages,
                        queue = frontier.queue_size(),
                        visited = frontier.visited_count(),
                        "crawl progress"
                    );

                    if frontier.is_done() || (frontier.queue_size() == 0 && pages > 0) {
                        break;
                    }
                }
            })
            .map(|_| ())
    }
}

fn worker_loop(context: WorkerContext) -> WorkerBuffer {
    let WorkerContext {
        thread_id,
        frontier,
        fetcher,
        pages_crawled,
        in_flight,
        max_pages,
    } = context;

    let mut buffer = WorkerBuffer::new();
    let mut backoff_ms = Config::BACKOFF_BASE_MS;

    while pages_crawled.load(Ordering::Relaxed) < max_pages {
        // The in-flight count covers the whole dequeue-to-enqueue span so an
        // empty queue plus zero in-flight workers means no URL anywhere can
        // still repopulate the frontier.
        in_flight.fetch_add(1, Ordering::AcqRel);
        let Some(url) = frontier.try_dequeue() else {
            in_flight.fetch_sub(1, Ordering::AcqRel);

            if in_flight.load(Ordering::Acquire) == 0 && frontier.queue_size() == 0 {
                tracing::debug!(worker = thread_id, "frontier drained, exiting");
                break;
            }

            thread::sleep(Duration::from_millis(backoff_ms));
            if backoff_ms < Config::BACKOFF_MAX_MS {
                backoff_ms = (backoff_ms * 2).min(Config::BACKOFF_MAX_MS);
            }
            continue;
        };
        backoff_ms = Config::BACKOFF_BASE_MS;

        process_url(&url, thread_id, &frontier, fetcher.as_ref(), &pages_crawled, &mut buffer);
        in_flight.fetch_sub(1, Ordering::AcqRel);
    }

    tracing::debug!(worker = thread_id, "worker finished");
    buffer
}

/// Process one dequeued URL. Fetch or parse trouble drops the URL silently;
/// the worker carries on either way.
fn process_url(
    url: &str,
    thread_id: usize,
    frontier: &Frontier,
    fetcher: &dyn Fetcher,
    pages_crawled: &AtomicUsize,
    buffer: &mut WorkerBuffer,
) {
    tracing::debug!(worker = thread_id, %url, "downloading");

    let body = match fetcher.fetch(url) {
        Ok(body) if !body.is_empty() => body,
        Ok(_) => {
            tracing::debug!(worker = thread_id, %url, "empty body, dropped");
            return;
        }
        Err(error) => {
            tracing::debug!(worker = thread_id, %url, %error, "fetch failed, dropped");
            return;
        }
    };

    let Some(domain) = url_utils::extract_domain(url) else {
        return;
    };

    let links = parser::extract_links(&body, url);
    tracing::debug!(
        worker = thread_id,
        %domain,
        bytes = body.len(),
        links = links.len(),
        "page processed"
    );

    buffer.record_page(&domain, &links);

    let newly_added = frontier.batch_enqueue(&links);
    if newly_added > 0 {
        tracing::debug!(worker = thread_id, newly_added, "enqueued new URLs");
    }

    pages_crawled.fetch_add(1, Ordering::Relaxed);
}
