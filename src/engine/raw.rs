//! Raw metadata as reported by the extraction engine

use crate::error::VidgrabError;
use serde::{Deserialize, Deserializer};

/// Info dictionary of a single item or a collection
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInfo {
    #[serde(rename = "_type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub entries: Option<Vec<RawInfo>>,
    pub title: Option<String>,
    pub duration: Option<f64>,
    pub thumbnail: Option<String>,
    pub webpage_url: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub formats: Vec<RawFormat>,
    pub extractor: Option<String>,
    pub extractor_key: Option<String>,
}

/// One variant record from the engine
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFormat {
    pub format_id: Option<String>,
    pub ext: Option<String>,
    pub resolution: Option<String>,
    pub filesize: Option<u64>,
    pub vcodec: Option<String>,
    pub acodec: Option<String>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl RawInfo {
    /// Whether this is a collection rather than a single item
    pub fn is_collection(&self) -> bool {
        self.kind.as_deref() == Some("playlist")
    }

    /// Unwrap a collection to its first entry; single items pass through
    pub fn into_representative(self) -> Result<RawInfo, VidgrabError> {
        if !self.is_collection() {
            return Ok(self);
        }

        self.entries
            .and_then(|entries| entries.into_iter().next())
            .ok_or_else(|| VidgrabError::Resolution("No videos found in playlist".to_string()))
    }

    /// Non-empty title, if any
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.trim().is_empty())
    }
}
