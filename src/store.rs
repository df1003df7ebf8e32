//! Graph storage: per-worker buffers during the crawl, one merged
//! domain-level graph afterwards.
//!
//! Each worker owns its buffer exclusively while crawling; ownership moves
//! to the merged store only after the worker thread is joined, so the merge
//! runs single-threaded over fully published data.

use std::collections::{HashMap, HashSet};

use crate::config::Config;
use crate::pagerank;
use crate::url_utils;

/// Buffer exclusively owned by one worker for the duration of the crawl.
#[derive(Debug, Default)]
pub struct WorkerBuffer {
    /// Domain -> outgoing-link domains from the most recently processed page
    /// of that domain. Duplicates and page order preserved.
    pub local_graph: HashMap<String, Vec<String>>,
    /// Domain -> pages successfully processed from that domain.
    pub local_visit_count: HashMap<String, u64>,
    /// Domains this worker touched.
    pub local_domains: HashSet<String>,
}

impl WorkerBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one successfully processed page: replace the domain's adjacency
    /// list with this page's outgoing-link domains and bump its visit count.
    pub fn record_page(&mut self, domain: &str, outgoing_links: &[String]) {
        let outgoing_domains: Vec<String> = outgoing_links
            .iter()
            .filter_map(|link| url_utils::extract_domain(link))
            .collect();

        self.local_graph.insert(domain.to_string(), outgoing_domains);
        *self.local_visit_count.entry(domain.to_string()).or_insert(0) += 1;
        self.local_domains.insert(domain.to_string());
    }
}

/// The merged domain graph plus PageRank scores.
#[derive(Debug, Default)]
pub struct GraphStore {
    link_graph: HashMap<String, Vec<String>>,
    visit_count: HashMap<String, u64>,
    pagerank: HashMap<String, f64>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collapse per-worker buffers into the merged graph.
    ///
    /// Buffers are consumed in index order. Adjacency lists are
    /// last-writer-wins: when two workers crawled the same domain, the list
    /// from the later-indexed buffer survives. Visit counts sum across
    /// buffers, so per-domain crawl volume is preserved either way.
    pub fn merge_buffers(&mut self, buffers: Vec<WorkerBuffer>) {
        tracing::info!(buffers = buffers.len(), "merging worker buffers");

        for buffer in buffers {
            for (domain, links) in buffer.local_graph {
                self.link_graph.insert(domain, links);
            }
            for (domain, count) in buffer.local_visit_count {
                *self.visit_count.entry(domain).or_insert(0) += count;
            }
        }

        tracing::info!(domains = self.link_graph.len(), "merge complete");
    }

    /// Run fixed-iteration PageRank over the merged graph.
    ///
    /// The node set is the union of graph sources and every destination.
    /// An empty graph leaves the scores empty.
    pub fn compute_pagerank(&mut self, iterations: usize) {
        tracing::info!(iterations, "computing PageRank");
        self.pagerank = pagerank::compute(&self.link_graph, iterations, Config::PAGERANK_DAMPING);

        if self.pagerank.is_empty() {
            tracing::warn!("no nodes to rank");
        } else {
            let total: f64 = self.pagerank.values().sum();
            tracing::info!(nodes = self.pagerank.len(), total, "PageRank complete");
        }
    }

    pub fn link_graph(&self) -> &HashMap<String, Vec<String>> {
        &self.link_graph
    }

    pub fn pagerank_scores(&self) -> &HashMap<String, f64> {
        &self.pagerank
    }

    pub fn visit_count(&self, domain: &str) -> u64 {
        self.visit_count.get(domain).copied().unwrap_or(0)
    }

    pub fn pagerank_of(&self, domain: &str) -> f64 {
        self.pagerank.get(domain).copied().unwrap_or(0.0)
    }

    /// Total pages recorded across all domains.
    pub fn total_visits(&self) -> u64 {
        self.visit_count.values().sum()
    }
}
