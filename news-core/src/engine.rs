use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::article::{Article, RemoteArticle};
use crate::client::FeedSource;
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::state::{shared_feed_state, FeedState, SharedFeedState};
use crate::store::{CacheStore, CACHE_KEY};
use crate::view::FeedHandle;

/// What a single synchronization pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// Next slice of the cached batch was shown.
    FromCache { added: usize },
    /// A remote fetch replaced the cache.
    Fetched { added: usize, country: String },
    /// Another pass was already running.
    Skipped,
    /// The engine was stopped before the pass could write anything.
    Inactive,
    /// The pass failed; the working list was left untouched.
    Failed { error: String },
}

enum Merge {
    FromCache(Vec<Article>),
    Fetched {
        articles: Vec<Article>,
        country: String,
    },
}

/// Keeps the working list fed from the cache, refetching when it runs dry.
#[derive(Clone)]
pub struct SyncEngine {
    state: SharedFeedState,
    store: Arc<dyn CacheStore>,
    source: Arc<dyn FeedSource>,
    config: Arc<SyncConfig>,
    in_flight: Arc<Mutex<()>>,
    active: Arc<AtomicBool>,
    epoch: Arc<AtomicU64>,
}

impl SyncEngine {
    pub fn new(config: SyncConfig, store: Arc<dyn CacheStore>, source: Arc<dyn FeedSource>) -> Self {
        Self::with_state(config, store, source, shared_feed_state(FeedState::new()))
    }

    pub fn with_state(
        config: SyncConfig,
        store: Arc<dyn CacheStore>,
        source: Arc<dyn FeedSource>,
        state: SharedFeedState,
    ) -> Self {
        Self {
            state,
            store,
            source,
            config: Arc::new(config),
            in_flight: Arc::new(Mutex::new(())),
            active: Arc::new(AtomicBool::new(true)),
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn state(&self) -> SharedFeedState {
        self.state.clone()
    }

    pub fn feed(&self) -> FeedHandle {
        FeedHandle::new(self.state.clone(), self.config.failing_after)
    }

    pub async fn clear_cache(&self) -> Result<(), SyncError> {
        self.store.remove(CACHE_KEY).await
    }

    /// Clears the cache, runs a first pass, then keeps running passes on the
    /// configured interval until the returned handle is stopped or dropped.
    pub fn spawn(self) -> SyncHandle {
        self.active.store(true, Ordering::SeqCst);
        let (cancel_tx, mut cancel_rx) = broadcast::channel(1);
        let engine = self.clone();
        let join = tokio::spawn(async move {
            if let Err(e) = engine.clear_cache().await {
                warn!(error = %e, "failed to clear article cache on start");
            }

            // first tick fires immediately and doubles as the initial pass
            let mut ticker = tokio::time::interval(engine.config.interval());
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancel_rx.recv() => {
                        info!("sync shutdown requested");
                        break;
                    }
                    _ = ticker.tick() => {
                        tokio::select! {
                            _ = cancel_rx.recv() => {
                                info!("sync shutdown requested, abandoning pass in flight");
                                break;
                            }
                            outcome = engine.run_pass() => {
                                debug!(?outcome, "synchronization pass finished");
                            }
                        }
                    }
                }
            }
        });

        info!(interval_ms = self.config.interval_ms, "sync engine started");
        SyncHandle {
            engine: self,
            cancel_tx,
            join: Some(join),
        }
    }

    /// One synchronization pass. Never fails: errors are logged, recorded in
    /// the sync status and reported as [`PassOutcome::Failed`].
    pub async fn run_pass(&self) -> PassOutcome {
        let Ok(_guard) = self.in_flight.try_lock() else {
            debug!("synchronization pass already in flight, skipping");
            return PassOutcome::Skipped;
        };

        let epoch = self.epoch.load(Ordering::SeqCst);
        if !self.is_current(epoch) {
            return PassOutcome::Inactive;
        }
        self.state.write().await.begin_pass();

        let result = self.sync_once(epoch).await;

        let mut state = self.state.write().await;
        if !self.is_current(epoch) {
            debug!("engine stopped during pass, discarding result");
            return PassOutcome::Inactive;
        }
        state.finish_pass();
        match result {
            Ok(Merge::FromCache(articles)) => {
                state.advance_cursor(articles.len());
                let added = state.prepend(articles, self.config.dedup_on_merge);
                state.record_success(Utc::now());
                debug!(added, total = state.len(), "merged articles from cache");
                PassOutcome::FromCache { added }
            }
            Ok(Merge::Fetched { articles, country }) => {
                state.reset_cursor(articles.len());
                let added = state.prepend(articles, self.config.dedup_on_merge);
                state.record_success(Utc::now());
                info!(%country, added, total = state.len(), "fetched fresh headlines");
                PassOutcome::Fetched { added, country }
            }
            Err(SyncError::Stopped) => PassOutcome::Inactive,
            Err(e) => {
                warn!(error = %e, "synchronization pass failed");
                state.record_failure(e.to_string());
                PassOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    async fn sync_once(&self, epoch: u64) -> Result<Merge, SyncError> {
        let cursor = self.state.read().await.cache_cursor();
        let cached: Vec<RemoteArticle> = match self.store.get(CACHE_KEY).await? {
            Some(blob) if !blob.trim().is_empty() => serde_json::from_str(&blob)?,
            _ => Vec::new(),
        };

        if cached.is_empty() {
            return self.fetch_remote(self.config.initial_take, epoch).await;
        }

        if cursor >= cached.len() {
            debug!(cursor, cached = cached.len(), "article cache exhausted, refetching");
            self.ensure_current(epoch)?;
            self.store.remove(CACHE_KEY).await?;
            return self.fetch_remote(self.config.refill_take, epoch).await;
        }

        let end = cursor.saturating_add(self.config.batch_size).min(cached.len());
        Ok(Merge::FromCache(
            cached[cursor..end].iter().map(Article::from_remote).collect(),
        ))
    }

    async fn fetch_remote(&self, take: usize, epoch: u64) -> Result<Merge, SyncError> {
        let country = self.config.countries.pick();
        let fetched = self
            .source
            .fetch_headlines(&country, self.config.page_size)
            .await?;

        self.ensure_current(epoch)?;
        let blob = serde_json::to_string(&fetched)?;
        self.store.set(CACHE_KEY, &blob).await?;

        Ok(Merge::Fetched {
            articles: fetched.iter().take(take).map(Article::from_remote).collect(),
            country,
        })
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.active.load(Ordering::SeqCst) && self.epoch.load(Ordering::SeqCst) == epoch
    }

    fn ensure_current(&self, epoch: u64) -> Result<(), SyncError> {
        if self.is_current(epoch) {
            Ok(())
        } else {
            Err(SyncError::Stopped)
        }
    }

    fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }
}

/// Owns the repeating sync task. Dropping it aborts the task.
pub struct SyncHandle {
    engine: SyncEngine,
    cancel_tx: broadcast::Sender<()>,
    join: Option<JoinHandle<()>>,
}

impl SyncHandle {
    pub fn feed(&self) -> FeedHandle {
        self.engine.feed()
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    /// Runs a pass right away, outside the ticker.
    pub async fn sync_now(&self) -> PassOutcome {
        self.engine.run_pass().await
    }

    /// Cancels the ticker, waits for the task and any pass still in flight to
    /// finish, then clears the cache.
    pub async fn stop(mut self) -> Result<(), SyncError> {
        self.engine.deactivate();
        let _ = self.cancel_tx.send(());
        let joined = match self.join.take() {
            Some(join) => join.await.map_err(SyncError::from),
            None => Ok(()),
        };
        // a pass started from a clone may still be writing the cache
        let cleared = {
            let _pass = self.engine.in_flight.lock().await;
            self.engine.clear_cache().await
        };
        info!("sync engine stopped");
        joined?;
        cleared
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        if let Some(join) = self.join.take() {
            self.engine.deactivate();
            join.abort();
        }
    }
}
