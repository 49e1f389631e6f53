//! Crawl coordinator - two-level fan-out orchestration
//!
//! This module drives the whole crawl:
//! - one worker per listing page (0..max_pages), spawned up front
//! - one worker per restaurant card discovered on each page
//! - a page worker finishes only after every card worker it spawned has
//!   finished, and `run` returns only after every page worker has
//! - a single aggregation task owns the result and error collections (or
//!   the caller's output channels); workers reach it exclusively through
//!   two channels, so the shared aggregate needs no locks
//!
//! Failures are isolated: a failed fetch or parse is recorded as a
//! stage-tagged error and the rest of the crawl continues. Nothing is
//! retried.

use crate::config::Config;
use crate::crawler::{listing, menu, Fetcher, HttpFetcher};
use crate::model::{CrawlResult, Restaurant};
use crate::{ConfigError, CrawlError, FetchError};
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot, Semaphore};
use tokio_util::sync::CancellationToken;

/// Output channels supplied by the caller in stream mode
///
/// Restaurants and errors are forwarded as they complete; the done signal
/// fires strictly after the last forwarded value.
pub struct StreamOutputs {
    pub items: mpsc::UnboundedSender<Restaurant>,
    pub errors: mpsc::UnboundedSender<CrawlError>,
    pub done: oneshot::Sender<()>,
}

/// Where completed work goes
enum Output {
    Collect,
    Stream(StreamOutputs),
}

/// Builder for [`Crawler`]
///
/// Collect mode is the default. Stream mode requires all three output
/// channels; `build` fails eagerly with
/// [`ConfigError::MissingStreamOutputs`] when any is absent, before any
/// worker starts.
pub struct CrawlerBuilder {
    config: Config,
    fetcher: Option<Arc<dyn Fetcher>>,
    stream: bool,
    items: Option<mpsc::UnboundedSender<Restaurant>>,
    errors: Option<mpsc::UnboundedSender<CrawlError>>,
    done: Option<oneshot::Sender<()>>,
    cancel: CancellationToken,
}

impl CrawlerBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            fetcher: None,
            stream: false,
            items: None,
            errors: None,
            done: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the HTTP fetcher with a custom collaborator
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Switches to stream mode; the three output channels must also be set
    pub fn stream(mut self) -> Self {
        self.stream = true;
        self
    }

    /// Channel that receives each completed restaurant (stream mode)
    pub fn item_channel(mut self, items: mpsc::UnboundedSender<Restaurant>) -> Self {
        self.items = Some(items);
        self
    }

    /// Channel that receives each crawl error (stream mode)
    pub fn error_channel(mut self, errors: mpsc::UnboundedSender<CrawlError>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Signal fired once after the last restaurant and error (stream mode)
    pub fn done_channel(mut self, done: oneshot::Sender<()>) -> Self {
        self.done = Some(done);
        self
    }

    /// Token that cancels outstanding fetches; the run still drains cleanly
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn build(self) -> Result<Crawler, ConfigError> {
        let output = if self.stream {
            match (self.items, self.errors, self.done) {
                (Some(items), Some(errors), Some(done)) => Output::Stream(StreamOutputs {
                    items,
                    errors,
                    done,
                }),
                _ => return Err(ConfigError::MissingStreamOutputs),
            }
        } else {
            if self.items.is_some() || self.errors.is_some() || self.done.is_some() {
                return Err(ConfigError::Validation(
                    "output channels were supplied without stream mode".to_string(),
                ));
            }
            Output::Collect
        };

        let fetcher: Arc<dyn Fetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::new(
                &self.config.crawler.user_agent,
                Duration::from_secs(self.config.crawler.request_timeout_secs),
            )?),
        };

        // 0 keeps the source site's unbounded fan-out
        let limiter = match self.config.crawler.max_concurrent_fetches {
            0 => None,
            cap => Some(Arc::new(Semaphore::new(cap as usize))),
        };

        Ok(Crawler {
            listing_url: self.config.listing_url(),
            base_url: self
                .config
                .site
                .base_url
                .trim_end_matches('/')
                .to_string(),
            max_pages: self.config.crawler.max_pages,
            fetcher,
            limiter,
            cancel: self.cancel,
            output,
        })
    }
}

/// A configured crawl run
///
/// The listing URL and page count are fixed for the lifetime of the run.
pub struct Crawler {
    listing_url: String,
    base_url: String,
    max_pages: u32,
    fetcher: Arc<dyn Fetcher>,
    limiter: Option<Arc<Semaphore>>,
    cancel: CancellationToken,
    output: Output,
}

impl Crawler {
    /// Runs the crawl to completion
    ///
    /// Spawns exactly `max_pages` page workers and blocks until every page
    /// worker and every card worker they spawned has finished and the
    /// aggregator has drained both channels. In collect mode the returned
    /// result holds the accumulated restaurants and errors; in stream mode
    /// it is empty and the done signal fires after the last forwarded
    /// value.
    pub async fn run(self) -> CrawlResult {
        let started = Instant::now();
        tracing::debug!(max_pages = self.max_pages, url = %self.listing_url, "starting crawl");

        let (item_tx, item_rx) = mpsc::unbounded_channel();
        let (error_tx, error_rx) = mpsc::unbounded_channel();

        // The sole writer of the aggregate, started before any worker can
        // produce output.
        let aggregator = tokio::spawn(aggregate(item_rx, error_rx, self.output));

        let context = Arc::new(WorkerContext {
            listing_url: self.listing_url,
            base_url: self.base_url,
            fetcher: self.fetcher,
            limiter: self.limiter,
            cancel: self.cancel,
            items: item_tx,
            errors: error_tx,
        });

        let pages: Vec<_> = (0..self.max_pages)
            .map(|page| tokio::spawn(page_worker(Arc::clone(&context), page)))
            .collect();
        for joined in join_all(pages).await {
            if let Err(error) = joined {
                tracing::error!(%error, "page worker task failed");
            }
        }

        // Every worker has finished; dropping the last sender handles lets
        // the aggregator drain and complete.
        drop(context);

        let result = aggregator.await.unwrap_or_default();
        tracing::debug!(
            restaurants = result.restaurants.len(),
            errors = result.errors.len(),
            elapsed = ?started.elapsed(),
            "crawl finished"
        );
        result
    }
}

/// Shared state handed to every worker
///
/// Each worker exclusively owns its Restaurant value until it hands it to
/// the aggregator through `items`.
struct WorkerContext {
    listing_url: String,
    base_url: String,
    fetcher: Arc<dyn Fetcher>,
    limiter: Option<Arc<Semaphore>>,
    cancel: CancellationToken,
    items: mpsc::UnboundedSender<Restaurant>,
    errors: mpsc::UnboundedSender<CrawlError>,
}

impl WorkerContext {
    /// Network fetch gated by the concurrency cap and the cancellation
    /// token
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let _permit = match &self.limiter {
            Some(semaphore) => Some(
                semaphore
                    .acquire()
                    .await
                    .map_err(|_| FetchError::Cancelled)?,
            ),
            None => None,
        };

        tokio::select! {
            _ = self.cancel.cancelled() => Err(FetchError::Cancelled),
            body = self.fetcher.fetch(url) => body,
        }
    }

    // The aggregator keeps both receivers open until all workers have
    // finished, so failed sends are only possible after teardown.
    fn send_item(&self, restaurant: Restaurant) {
        let _ = self.items.send(restaurant);
    }

    fn send_error(&self, error: CrawlError) {
        let _ = self.errors.send(error);
    }
}

/// Fetches one listing page, extracts its cards, and waits for every card
/// worker it spawned
async fn page_worker(context: Arc<WorkerContext>, page: u32) {
    let url = format!("{}?&Search_PageNo={}", context.listing_url, page);
    tracing::debug!(page, %url, "pulling listing page");

    let body = match context.fetch(&url).await {
        Ok(body) => body,
        Err(source) => {
            tracing::warn!(page, error = %source, "listing page fetch failed");
            context.send_error(CrawlError::ListingFetch { page, source });
            return;
        }
    };

    let outcome = listing::extract_cards(&body);
    tracing::debug!(page, cards = outcome.cards.len(), "listing page parsed");
    for error in outcome.errors {
        context.send_error(error);
    }

    // The page is complete only once every one of its card workers is.
    let workers: Vec<_> = outcome
        .cards
        .into_iter()
        .map(|card| tokio::spawn(card_worker(Arc::clone(&context), card)))
        .collect();
    for joined in join_all(workers).await {
        if let Err(error) = joined {
            tracing::error!(page, %error, "card worker task failed");
        }
    }
}

/// Fetches a restaurant's detail page and attaches its menu
///
/// A failed detail fetch still forwards the restaurant, with an empty menu
/// and a `DetailFetch` error alongside.
async fn card_worker(context: Arc<WorkerContext>, mut restaurant: Restaurant) {
    if restaurant.url.is_empty() {
        // No detail link on the card; forward the summary as-is.
        context.send_item(restaurant);
        return;
    }

    let url = format!("{}{}", context.base_url, restaurant.url);
    tracing::debug!(%url, "pulling detail page");

    match context.fetch(&url).await {
        Ok(body) => {
            let outcome = menu::extract_menu(&body, &restaurant.url);
            for error in outcome.errors {
                context.send_error(error);
            }
            restaurant.menu = outcome.meals;
        }
        Err(source) => {
            tracing::warn!(%url, error = %source, "detail page fetch failed");
            context.send_error(CrawlError::DetailFetch {
                url: restaurant.url.clone(),
                source,
            });
        }
    }

    context.send_item(restaurant);
}

/// Single-writer aggregation task
///
/// Drains both channels until every sender is gone, then (in stream mode)
/// fires the completion signal. Completion is derived from the nested
/// worker joins closing the channels, never from timing.
async fn aggregate(
    mut items: mpsc::UnboundedReceiver<Restaurant>,
    mut errors: mpsc::UnboundedReceiver<CrawlError>,
    output: Output,
) -> CrawlResult {
    let mut result = CrawlResult::default();
    let mut items_open = true;
    let mut errors_open = true;

    while items_open || errors_open {
        tokio::select! {
            item = items.recv(), if items_open => match item {
                Some(restaurant) => match &output {
                    Output::Collect => result.restaurants.push(restaurant),
                    Output::Stream(out) => {
                        let _ = out.items.send(restaurant);
                    }
                },
                None => items_open = false,
            },
            error = errors.recv(), if errors_open => match error {
                Some(error) => match &output {
                    Output::Collect => result.errors.push(error),
                    Output::Stream(out) => {
                        let _ = out.errors.send(error);
                    }
                },
                None => errors_open = false,
            },
        }
    }

    if let Output::Stream(out) = output {
        let _ = out.done.send(());
    }

    result
}
