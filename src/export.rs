//! CSV emission for crawl results.
//!
//! Two overwritten tables (crawled pages, PageRank scores) and one
//! append-only metrics table whose header is written only when the file is
//! new or empty. Rows in the overwritten tables are sorted by domain so
//! consecutive runs diff cleanly.

use std::fs::OpenOptions;
use std::path::Path;

use serde::Serialize;

use crate::store::GraphStore;

#[derive(Debug, Serialize)]
struct CrawledPageRow<'a> {
    domain: &'a str,
    outgoing_links: usize,
    visit_count: u64,
}

#[derive(Debug, Serialize)]
struct RankingRow<'a> {
    domain: &'a str,
    pagerank_score: String,
}

/// One line of the cumulative metrics table.
#[derive(Debug, Serialize)]
pub struct MetricsRow {
    pub seed_url: String,
    pub max_pages: usize,
    pub num_threads: usize,
    pub total_ms: u64,
    pub pages_crawled: usize,
    pub throughput: String,
}

impl MetricsRow {
    pub fn new(
        seed_url: &str,
        max_pages: usize,
        num_threads: usize,
        total_ms: u64,
        pages_crawled: usize,
    ) -> Self {
        let throughput = if total_ms > 0 {
            pages_crawled as f64 * 1000.0 / total_ms as f64
        } else {
            0.0
        };

        Self {
            seed_url: seed_url.to_string(),
            max_pages,
            num_threads,
            total_ms,
            pages_crawled,
            throughput: format!("{throughput:.2}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize row for {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

impl ExportError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Write the crawled-pages table: one row per source domain with its
/// out-degree (not deduplicated) and total visit count.
pub fn write_crawled_pages<P: AsRef<Path>>(store: &GraphStore, path: P) -> Result<(), ExportError> {
    let path = path.as_ref();
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| ExportError::csv(path, e))?;

    // Written by hand so a zero-page run still gets a header-only table.
    writer
        .write_record(["domain", "outgoing_links", "visit_count"])
        .map_err(|e| ExportError::csv(path, e))?;

    let mut domains: Vec<&String> = store.link_graph().keys().collect();
    domains.sort();

    for domain in domains {
        let row = CrawledPageRow {
            domain: domain.as_str(),
            outgoing_links: store.link_graph()[domain].len(),
            visit_count: store.visit_count(domain),
        };
        writer.serialize(row).map_err(|e| ExportError::csv(path, e))?;
    }

    writer.flush().map_err(|e| ExportError::io(path, e))?;
    tracing::info!(path = %path.display(), "exported crawled pages");
    Ok(())
}

/// Write the ranking table: one row per PageRank node, scores with six
/// decimal digits.
pub fn write_rankings<P: AsRef<Path>>(store: &GraphStore, path: P) -> Result<(), ExportError> {
    let path = path.as_ref();
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| ExportError::csv(path, e))?;

    writer
        .write_record(["domain", "pagerank_score"])
        .map_err(|e| ExportError::csv(path, e))?;

    let mut domains: Vec<&String> = store.pagerank_scores().keys().collect();
    domains.sort();

    for domain in domains {
        let row = RankingRow {
            domain: domain.as_str(),
            pagerank_score: format!("{:.6}", store.pagerank_of(domain)),
        };
        writer.serialize(row).map_err(|e| ExportError::csv(path, e))?;
    }

    writer.flush().map_err(|e| ExportError::io(path, e))?;
    tracing::info!(path = %path.display(), "exported PageRank results");
    Ok(())
}

/// Append one row to the cumulative metrics table, writing the header only
/// when the file is new or empty.
pub fn append_metrics<P: AsRef<Path>>(row: &MetricsRow, path: P) -> Result<(), ExportError> {
    let path = path.as_ref();

    let needs_header = match std::fs::metadata(path) {
        Ok(meta) => meta.len() == 0,
        Err(_) => true,
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ExportError::io(path, e))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_header)
        .from_writer(file);

    writer.serialize(row).map_err(|e| ExportError::csv(path, e))?;
    writer.flush().map_err(|e| ExportError::io(path, e))?;

    tracing::info!(path = %path.display(), "appended metrics row");
    Ok(())
}
