pub mod article;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod state;
pub mod store;
pub mod view;

pub use article::{Article, RemoteArticle, SourceRef, PLACEHOLDER_IMAGE_URL};
pub use client::{FeedSource, NewsApiClient};
pub use config::{CountryPolicy, SyncConfig};
pub use engine::{PassOutcome, SyncEngine, SyncHandle};
pub use error::{ConfigError, SyncError};
pub use state::{shared_feed_state, FeedState, SharedFeedState, SyncHealth, SyncPhase, SyncStatus};
pub use store::{CacheStore, FileStore, MemoryStore, CACHE_KEY};
pub use view::{identity_key_for, FeedHandle};
