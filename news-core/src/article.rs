use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Image shown for articles that come without one.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://placehold.co/600x200";

// null and missing both become the default value
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceRef {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One article record exactly as the headline endpoint returns it.
///
/// Fields the reader does not use (url, description, publishedAt, ...) are
/// kept in `extra` so the cache blob carries the record as it was received.
/// Nothing user-specific (such as the pinned flag) is ever written to it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteArticle {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: SourceRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_to_image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Envelope of a headline response.
#[derive(Debug, Clone, Deserialize)]
pub struct HeadlinesResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub articles: Vec<RemoteArticle>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub image_url: Option<String>,
    pub source_name: String,
    #[serde(default)]
    pub pinned: bool,
}

impl Article {
    pub fn new(title: impl Into<String>, source_name: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            image_url: None,
            source_name: source_name.into(),
            pinned: false,
        }
    }

    pub fn from_remote(remote: &RemoteArticle) -> Self {
        Self {
            title: remote.title.clone(),
            image_url: remote
                .url_to_image
                .as_deref()
                .filter(|url| !url.trim().is_empty())
                .map(ToOwned::to_owned),
            source_name: remote.source.name.clone(),
            pinned: false,
        }
    }

    pub fn image_or_placeholder(&self) -> &str {
        self.image_url.as_deref().unwrap_or(PLACEHOLDER_IMAGE_URL)
    }

    /// Key used to drop repeated articles when merge dedup is enabled.
    pub fn content_key(&self) -> String {
        format!("{}\u{1f}{}", self.title, self.source_name)
    }
}

impl From<RemoteArticle> for Article {
    fn from(remote: RemoteArticle) -> Self {
        Self::from_remote(&remote)
    }
}
