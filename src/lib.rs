pub mod cli;
pub mod config;
pub mod crawler;
pub mod export;
pub mod frontier;
pub mod logging;
pub mod network;
pub mod pagerank;
pub mod parser;
pub mod store;
pub mod url_utils;

// Re-export main types for library usage
pub use crawler::{CrawlSummary, Crawler, CrawlerConfig};
pub use frontier::Frontier;
pub use network::{FetchError, Fetcher, HttpClient};
pub use parser::extract_links;
pub use store::{GraphStore, WorkerBuffer};
