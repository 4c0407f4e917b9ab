use serde::de;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Raised when a record id part is empty or contains characters outside the
/// item-id alphabet (word characters only)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid record id: {0}")]
pub struct InvalidRecordId(pub String);

/// Two-part key identifying one catalogued item.
///
/// A record id has two renderings that both derive from the same parts:
/// the public form `/dataset/local` used when talking to the record search
/// service, and the storage form `dataset/local` used as the vector store's
/// primary key. Parsing either form (quoted or not) is the exact inverse of
/// rendering it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId {
    dataset_id: String,
    local_id: String,
}

impl RecordId {
    /// Create a record id from its two parts.
    ///
    /// Both parts must be non-empty and consist of word characters only.
    /// The routing layer validates ids before they get here, but the model
    /// rejects malformed parts anyway.
    pub fn new(
        dataset_id: impl Into<String>,
        local_id: impl Into<String>,
    ) -> Result<Self, InvalidRecordId> {
        let dataset_id = dataset_id.into();
        let local_id = local_id.into();
        if !is_valid_part(&dataset_id) || !is_valid_part(&local_id) {
            return Err(InvalidRecordId(format!("/{dataset_id}/{local_id}")));
        }
        Ok(Self {
            dataset_id,
            local_id,
        })
    }

    pub fn dataset_id(&self) -> &str {
        &self.dataset_id
    }

    pub fn local_id(&self) -> &str {
        &self.local_id
    }

    /// Public rendering, e.g. `/92062/BibliographicResource_1000126189360`
    pub fn public_id(&self) -> String {
        format!("/{}/{}", self.dataset_id, self.local_id)
    }

    /// Storage rendering used as the vector store's primary key,
    /// e.g. `92062/BibliographicResource_1000126189360`
    pub fn storage_id(&self) -> String {
        format!("{}/{}", self.dataset_id, self.local_id)
    }

    /// Storage rendering wrapped in double quotes, as expected in the vector
    /// store's filter expressions and primary-key lists
    pub fn storage_id_quoted(&self) -> String {
        format!("\"{}/{}\"", self.dataset_id, self.local_id)
    }

    /// Parse a record id from a catalogue item uri such as
    /// `http://data.example.org/item/92062/BibRes_1000126189360`.
    /// Plain public or storage forms are accepted as well.
    pub fn from_item_uri(uri: &str) -> Result<Self, InvalidRecordId> {
        match uri.find("/item/") {
            Some(idx) => uri[idx + "/item".len()..].parse(),
            None => uri.parse(),
        }
    }
}

fn is_valid_part(part: &str) -> bool {
    !part.is_empty()
        && part
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl FromStr for RecordId {
    type Err = InvalidRecordId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unquoted = match s.strip_prefix('"') {
            Some(rest) => rest
                .strip_suffix('"')
                .ok_or_else(|| InvalidRecordId(s.to_string()))?,
            None => s,
        };
        let combined = unquoted.strip_prefix('/').unwrap_or(unquoted);
        let (dataset_id, local_id) = combined
            .split_once('/')
            .ok_or_else(|| InvalidRecordId(s.to_string()))?;
        Self::new(dataset_id, local_id).map_err(|_| InvalidRecordId(s.to_string()))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.dataset_id, self.local_id)
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.public_id())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
