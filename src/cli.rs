use clap::Parser;

use crate::config::Config;
use crate::url_utils;

/// domrank cli
#[derive(Debug, Parser)]
#[command(name = "domrank")]
#[command(about = "Multithreaded BFS web crawler with domain-level PageRank")]
#[command(version)]
pub struct Cli {
    /// Starting URL (must begin with http:// or https://)
    pub seed_url: String,

    /// Maximum number of pages to crawl
    pub max_pages: usize,

    /// Number of worker threads (1-64)
    pub num_threads: usize,
}

impl Cli {
    /// Parse and validate the command line.
    ///
    /// Any parse or validation failure becomes a one-line diagnostic; the
    /// caller prints it to stderr and exits 1. Help and version requests are
    /// served here and exit 0.
    pub fn parse_args() -> Result<Self, String> {
        let cli = match Self::try_parse() {
            Ok(cli) => cli,
            Err(err) if err.use_stderr() => {
                let rendered = err.to_string();
                let first_line = rendered.lines().next().unwrap_or("invalid arguments");
                return Err(first_line.to_string());
            }
            Err(err) => {
                // --help / --version
                let _ = err.print();
                std::process::exit(0);
            }
        };

        cli.validate()?;
        Ok(cli)
    }

    fn validate(&self) -> Result<(), String> {
        if !url_utils::has_http_scheme(&self.seed_url) {
            return Err("seed URL must start with http:// or https://".to_string());
        }
        if self.max_pages == 0 {
            return Err("max_pages must be positive".to_string());
        }
        if self.num_threads == 0 {
            return Err("num_threads must be positive".to_string());
        }
        if self.num_threads > Config::MAX_WORKERS {
            return Err(format!(
                "num_threads cannot exceed {}",
                Config::MAX_WORKERS
            ));
        }
        Ok(())
    }
}
