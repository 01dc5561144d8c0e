//! Ordered, mutable view of the working list for the presentation layer.
//!
//! Positions taken and returned here are positions in the ordered view
//! (pinned first), never raw storage indices.

use crate::article::Article;
use crate::state::{FeedState, SharedFeedState, SyncHealth, SyncStatus};

/// Render key for the article at `position` of a view. Only unique per
/// position, so keys change when the view reorders.
pub fn identity_key_for(article: &Article, position: usize) -> String {
    format!("{}-{}", article.title, position)
}

impl FeedState {
    /// Pinned articles then unpinned ones, each in storage order. Recomputed on
    /// every call; clone the iterator to walk it again.
    pub fn ordered_view(&self) -> impl Iterator<Item = &Article> + Clone + '_ {
        self.ordered_indices().map(move |index| &self.articles[index])
    }

    pub fn keyed_view(&self) -> Vec<(String, &Article)> {
        self.ordered_view()
            .enumerate()
            .map(|(position, article)| (identity_key_for(article, position), article))
            .collect()
    }

    /// Flips the pinned flag of the article at `view_index`. Returns the new
    /// flag, or `None` when the index is out of range.
    pub fn toggle_pin(&mut self, view_index: usize) -> Option<bool> {
        let index = self.storage_index(view_index)?;
        let article = &mut self.articles[index];
        article.pinned = !article.pinned;
        Some(article.pinned)
    }

    /// Removes the article at `view_index`; out of range is a no-op.
    pub fn delete_at(&mut self, view_index: usize) -> Option<Article> {
        let index = self.storage_index(view_index)?;
        Some(self.articles.remove(index))
    }

    fn ordered_indices(&self) -> impl Iterator<Item = usize> + Clone + '_ {
        let pinned = self
            .articles
            .iter()
            .enumerate()
            .filter(|(_, article)| article.pinned)
            .map(|(index, _)| index);
        let unpinned = self
            .articles
            .iter()
            .enumerate()
            .filter(|(_, article)| !article.pinned)
            .map(|(index, _)| index);
        pinned.chain(unpinned)
    }

    fn storage_index(&self, view_index: usize) -> Option<usize> {
        self.ordered_indices().nth(view_index)
    }
}

/// Clone-able handle the presentation layer holds on to.
#[derive(Debug, Clone)]
pub struct FeedHandle {
    state: SharedFeedState,
    failing_after: u32,
}

impl FeedHandle {
    pub fn new(state: SharedFeedState, failing_after: u32) -> Self {
        Self {
            state,
            failing_after,
        }
    }

    pub async fn ordered_view(&self) -> Vec<Article> {
        self.state.read().await.ordered_view().cloned().collect()
    }

    pub async fn keyed_view(&self) -> Vec<(String, Article)> {
        self.state
            .read()
            .await
            .keyed_view()
            .into_iter()
            .map(|(key, article)| (key, article.clone()))
            .collect()
    }

    pub async fn toggle_pin(&self, view_index: usize) -> Option<bool> {
        self.state.write().await.toggle_pin(view_index)
    }

    pub async fn delete_at(&self, view_index: usize) -> Option<Article> {
        self.state.write().await.delete_at(view_index)
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.is_empty()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.is_loading()
    }

    pub async fn status(&self) -> SyncStatus {
        self.state.read().await.status().clone()
    }

    pub async fn health(&self) -> SyncHealth {
        self.state.read().await.status().health(self.failing_after)
    }
}
