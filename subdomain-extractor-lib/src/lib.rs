//! # Subdomain Extractor Library
//!
//! Fetches a set of web pages concurrently and extracts every subdomain of a
//! target domain that appears in their bodies, each reported once per run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use subdomain_extractor_lib::{Dispatcher, ExtractConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractConfig::default().with_threads(5).with_rps(10);
//!     let dispatcher = Dispatcher::new("example.com", config)?;
//!
//!     let mut results = dispatcher.spawn(vec!["https://example.com/".to_string()]);
//!     while let Some(subdomain) = results.recv().await {
//!         println!("{}", subdomain);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - **Fetcher**: one HTTP GET per URL, `200 OK` only, optional TLS relaxation
//! - **Extractor**: `(label.)+domain` matching with the domain taken literally
//! - **Dispatcher**: start-rate limiting, in-flight cap, run-wide deduplication
//!
//! Per-URL failures are dropped silently; a run never fails halfway.

pub use concurrent::{RateLimiter, SeenSet};
pub use config::{
    load_env_config, load_env_config_from, parse_timeout_string, ConfigManager, DefaultsConfig,
    EnvConfig, FileConfig,
};
pub use dispatcher::Dispatcher;
pub use error::ExtractorError;
pub use extractor::{find_subdomains, SubdomainExtractor};
pub use fetcher::{Fetcher, HttpFetcher};
pub use types::{ExtractConfig, RunStats, StatsSnapshot, DEFAULT_MAX_RPS, DEFAULT_MAX_THREADS};
pub use utils::{parse_url_list, read_url_file, validate_domain};

mod concurrent;
mod config;
mod dispatcher;
mod error;
mod extractor;
mod fetcher;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, ExtractorError>;

// Library version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
