pub struct Config;

impl Config {
    /// URLs longer than this are rejected by the frontier and the parser.
    pub const MAX_URL_LEN: usize = 10_000;
    /// Bodies above this size yield no links.
    pub const MAX_BODY_BYTES: usize = 100 * 1024 * 1024;

    pub const FETCH_TIMEOUT_SECS: u64 = 10;
    pub const USER_AGENT: &'static str = "Mozilla/5.0 (X11; Linux x86_64) domrank/0.1";

    pub const BACKOFF_BASE_MS: u64 = 10;
    pub const BACKOFF_MAX_MS: u64 = 500;

    pub const PROGRESS_INTERVAL_MS: u64 = 1_000;
    pub const MAX_WORKERS: usize = 64;

    pub const PAGERANK_DAMPING: f64 = 0.85;
    pub const PAGERANK_ITERATIONS: usize = 30;
}
