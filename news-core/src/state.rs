use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::article::Article;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SyncPhase {
    Idle,
    Loading,
    Ready,
}

/// Coarse view of how recent passes went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SyncHealth {
    /// No pass has completed yet.
    Pending,
    Fresh,
    /// Recent passes failed; the next tick retries.
    Stale { failures: u32 },
    /// Enough passes failed in a row that retrying is unlikely to help.
    Failing { failures: u32 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
}

impl SyncStatus {
    pub fn health(&self, failing_after: u32) -> SyncHealth {
        match self.consecutive_failures {
            0 if self.last_success_at.is_some() => SyncHealth::Fresh,
            0 => SyncHealth::Pending,
            n if n >= failing_after.max(1) => SyncHealth::Failing { failures: n },
            n => SyncHealth::Stale { failures: n },
        }
    }
}

/// Working list of articles, newest-fetched first.
///
/// Storage order is arrival order; the pinned/unpinned partition is only
/// computed when a view is requested (see the `view` module).
#[derive(Debug, Clone)]
pub struct FeedState {
    pub(crate) articles: Vec<Article>,
    phase: SyncPhase,
    status: SyncStatus,
    // cached entries already taken into the list, whether or not dedup kept them
    cache_cursor: usize,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            articles: Vec::new(),
            phase: SyncPhase::Idle,
            status: SyncStatus::default(),
            cache_cursor: 0,
        }
    }
}

impl FeedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_articles(articles: Vec<Article>) -> Self {
        Self {
            articles,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// Articles in storage (arrival) order.
    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase != SyncPhase::Ready
    }

    pub fn status(&self) -> &SyncStatus {
        &self.status
    }

    /// How far into the cached batch the list has read.
    pub fn cache_cursor(&self) -> usize {
        self.cache_cursor
    }

    /// Puts `incoming` in front of the list, keeping its order. With `dedup`
    /// set, articles whose content key is already present (or repeated within
    /// `incoming`) are dropped. Returns how many were added.
    pub fn prepend(&mut self, incoming: Vec<Article>, dedup: bool) -> usize {
        let incoming: Vec<Article> = if dedup {
            let mut seen: HashSet<String> =
                self.articles.iter().map(Article::content_key).collect();
            incoming
                .into_iter()
                .filter(|article| seen.insert(article.content_key()))
                .collect()
        } else {
            incoming
        };
        let added = incoming.len();
        self.articles.splice(0..0, incoming);
        added
    }

    pub(crate) fn begin_pass(&mut self) {
        if self.phase == SyncPhase::Idle {
            self.phase = SyncPhase::Loading;
        }
    }

    pub(crate) fn finish_pass(&mut self) {
        self.phase = SyncPhase::Ready;
    }

    pub(crate) fn record_success(&mut self, at: DateTime<Utc>) {
        self.status.last_success_at = Some(at);
        self.status.last_error = None;
        self.status.consecutive_failures = 0;
    }

    pub(crate) fn advance_cursor(&mut self, consumed: usize) {
        self.cache_cursor = self.cache_cursor.saturating_add(consumed);
    }

    pub(crate) fn reset_cursor(&mut self, consumed: usize) {
        self.cache_cursor = consumed;
    }

    pub(crate) fn record_failure(&mut self, error: String) {
        self.status.last_error = Some(error);
        self.status.consecutive_failures = self.status.consecutive_failures.saturating_add(1);
    }
}

pub type SharedFeedState = Arc<RwLock<FeedState>>;

pub fn shared_feed_state(initial: FeedState) -> SharedFeedState {
    Arc::new(RwLock::new(initial))
}
