use crate::record_id::RecordId;
use log::warn;
use serde::de;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Relevant data of a curated collection ("set"), as returned by the set
/// store. A set with a non-blank `is_defined_by` query is an open set: it has
/// no fixed item list and is not supported for recommendations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub title: HashMap<String, String>,

    #[serde(default)]
    pub description: HashMap<String, String>,

    #[serde(default, rename = "isDefinedBy")]
    pub is_defined_by: Option<String>,

    #[serde(default)]
    pub items: Vec<String>,
}

impl Collection {
    /// True if the set is defined by a query instead of an explicit item list
    pub fn is_open(&self) -> bool {
        self.is_defined_by
            .as_deref()
            .is_some_and(|query| !query.trim().is_empty())
    }

    /// Record ids of all items in this set. Malformed item references are
    /// skipped and logged, they never abort the request.
    pub fn item_record_ids(&self) -> Vec<RecordId> {
        let mut result = Vec::with_capacity(self.items.len());
        for item in &self.items {
            match RecordId::from_item_uri(item) {
                Ok(id) => result.push(id),
                Err(err) => warn!("Skipping malformed item reference in set {}: {err}", self.id),
            }
        }
        result
    }
}

/// Result page of a set search, used to find the best-items set associated
/// with an entity
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectionSearch {
    #[serde(default)]
    pub total: u64,

    #[serde(default)]
    pub items: Vec<Collection>,
}

/// The entity categories recommendations can be generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Agent,
    Concept,
    Place,
    Timespan,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported entity type: {0}")]
pub struct UnsupportedEntityType(pub String);

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Agent => "agent",
            EntityType::Concept => "concept",
            EntityType::Place => "place",
            EntityType::Timespan => "timespan",
        }
    }
}

impl FromStr for EntityType {
    type Err = UnsupportedEntityType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "agent" => Ok(EntityType::Agent),
            "concept" => Ok(EntityType::Concept),
            "place" => Ok(EntityType::Place),
            "timespan" => Ok(EntityType::Timespan),
            other => Err(UnsupportedEntityType(other.to_string())),
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EntityType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EntityType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Relevant data of a named entity, as returned by the entity store
#[derive(Debug, Clone, Deserialize)]
pub struct Entity {
    #[serde(default)]
    pub id: String,

    #[serde(rename = "type")]
    pub kind: EntityType,

    #[serde(default, rename = "prefLabel")]
    pub pref_label: HashMap<String, String>,

    #[serde(default, rename = "altLabel")]
    pub alt_label: HashMap<String, Vec<String>>,
}

/// Derive the uri naming an entity, e.g. `http://data.example.org/agent/123`.
/// The set store indexes best-items sets by this uri.
pub fn entity_uri(base_url: &str, kind: EntityType, id: u64) -> String {
    format!("{}/{kind}/{id}", base_url.trim_end_matches('/'))
}
