//! Run orchestration: fan out one unit per URL, fan matches back in.
//!
//! Every unit waits on the shared [`RateLimiter`], takes a semaphore permit,
//! fetches, gives the permit back, extracts, and publishes unseen matches
//! through the shared [`SeenSet`]. A supervisor task joins every unit and then
//! drops the last sender, which closes the output channel.

use crate::concurrent::{RateLimiter, SeenSet};
use crate::error::ExtractorError;
use crate::extractor::SubdomainExtractor;
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::types::{ExtractConfig, RunStats};
use futures::stream::Stream;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Drives a run from a URL list to a stream of unique subdomains.
///
/// # Example
///
/// ```rust,no_run
/// use subdomain_extractor_lib::{Dispatcher, ExtractConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let dispatcher = Dispatcher::new("ford.com", ExtractConfig::default())?;
///     let urls = vec!["https://www.ford.com/".to_string()];
///
///     for subdomain in dispatcher.run(urls).await {
///         println!("{}", subdomain);
///     }
///     Ok(())
/// }
/// ```
pub struct Dispatcher<F: Fetcher + 'static = HttpFetcher> {
    config: ExtractConfig,
    fetcher: Arc<F>,
    extractor: Arc<SubdomainExtractor>,
    stats: Arc<RunStats>,
}

/// State shared by every unit of a single run.
struct RunContext<F: Fetcher + 'static> {
    fetcher: Arc<F>,
    extractor: Arc<SubdomainExtractor>,
    stats: Arc<RunStats>,
    limiter: RateLimiter,
    slots: Semaphore,
    seen: SeenSet,
}

impl Dispatcher<HttpFetcher> {
    /// Create a dispatcher fetching over HTTP.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the domain or limits are invalid, or if
    /// the HTTP client cannot be built.
    pub fn new(domain: &str, config: ExtractConfig) -> Result<Self, ExtractorError> {
        let fetcher = HttpFetcher::with_config(&config)?;
        Self::with_fetcher(domain, config, fetcher)
    }
}

impl<F: Fetcher + 'static> Dispatcher<F> {
    /// Create a dispatcher with a custom fetcher.
    pub fn with_fetcher(
        domain: &str,
        config: ExtractConfig,
        fetcher: F,
    ) -> Result<Self, ExtractorError> {
        config.validate()?;
        let extractor = SubdomainExtractor::new(domain)?;

        Ok(Self {
            config,
            fetcher: Arc::new(fetcher),
            extractor: Arc::new(extractor),
            stats: Arc::new(RunStats::new()),
        })
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    pub fn domain(&self) -> &str {
        self.extractor.domain()
    }

    /// Live counters, shared with every run started from this dispatcher.
    pub fn stats(&self) -> Arc<RunStats> {
        Arc::clone(&self.stats)
    }

    /// Start a run and return the output sink.
    ///
    /// The receiver yields each unique subdomain once, in discovery order, and
    /// closes after every URL has been processed. Per-URL failures are logged at
    /// `debug` and otherwise dropped. Must be called from within a tokio runtime.
    pub fn spawn(&self, urls: Vec<String>) -> UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();

        let ctx = Arc::new(RunContext {
            fetcher: Arc::clone(&self.fetcher),
            extractor: Arc::clone(&self.extractor),
            stats: Arc::clone(&self.stats),
            limiter: RateLimiter::new(self.config.tick_period()),
            slots: Semaphore::new(self.config.max_threads),
            seen: SeenSet::new(),
        });

        self.stats.record_dispatched(urls.len());
        tracing::info!(
            urls = urls.len(),
            domain = %self.extractor.domain(),
            max_threads = self.config.max_threads,
            max_rps = self.config.max_rps,
            "starting run"
        );

        tokio::spawn(supervise(ctx, urls, tx));
        rx
    }

    /// Start a run and expose its output as a stream.
    pub fn stream(&self, urls: Vec<String>) -> Pin<Box<dyn Stream<Item = String> + Send>> {
        let rx = self.spawn(urls);
        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|subdomain| (subdomain, rx))
        });
        Box::pin(stream)
    }

    /// Run to completion and collect the output in discovery order.
    pub async fn run(&self, urls: Vec<String>) -> Vec<String> {
        let mut rx = self.spawn(urls);
        let mut found = Vec::new();
        while let Some(subdomain) = rx.recv().await {
            found.push(subdomain);
        }
        found
    }
}

/// Spawn every unit, wait for all of them, then close the sink.
async fn supervise<F: Fetcher + 'static>(
    ctx: Arc<RunContext<F>>,
    urls: Vec<String>,
    tx: UnboundedSender<String>,
) {
    let mut units = JoinSet::new();
    for url in urls {
        units.spawn(process_url(Arc::clone(&ctx), url, tx.clone()));
    }

    while let Some(joined) = units.join_next().await {
        if let Err(e) = joined {
            tracing::warn!("unit ended abnormally: {}", e);
        }
    }

    let stats = ctx.stats.snapshot();
    tracing::info!(
        fetched = stats.fetched,
        failed = stats.failed,
        emitted = stats.emitted,
        "run finished"
    );
    drop(tx);
}

/// One URL: rate limit, bounded fetch, extract, publish.
async fn process_url<F: Fetcher + 'static>(
    ctx: Arc<RunContext<F>>,
    url: String,
    tx: UnboundedSender<String>,
) {
    ctx.limiter.until_ready().await;

    let body = {
        // The semaphore is never closed.
        let Ok(_permit) = ctx.slots.acquire().await else {
            return;
        };
        ctx.fetcher.fetch(&url).await
    };

    let body = match body {
        Ok(body) => {
            ctx.stats.record_fetch(true);
            body
        }
        Err(e) => {
            ctx.stats.record_fetch(false);
            tracing::debug!(url = %url, "skipping: {}", e);
            return;
        }
    };

    let matches = ctx.extractor.extract(&body);
    let published = ctx.seen.publish_new(matches, &tx);
    ctx.stats.record_emitted(published);
}
