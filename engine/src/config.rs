use serde::{Deserialize, Serialize};

/// Tuning knobs of the recommendation engine. The weights reflect how
/// trustworthy each candidate source is: an entity's own metadata describes
/// it better than the items someone curated for it, and a set's metadata
/// better than its individual items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of recommendations returned when the caller does not ask for a
    /// specific page size
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Upper bound on the page size a caller may request
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    /// Weight of candidates found from a set's title and description
    #[serde(default = "default_set_metadata_weight")]
    pub set_metadata_weight: f32,

    /// Weight of candidates similar to a set's items
    #[serde(default = "default_set_items_weight")]
    pub set_items_weight: f32,

    /// Weight of candidates found from an entity's labels
    #[serde(default = "default_entity_metadata_weight")]
    pub entity_metadata_weight: f32,

    /// Weight of candidates similar to the items of an entity's best-items set
    #[serde(default = "default_entity_set_items_weight")]
    pub entity_set_items_weight: f32,

    /// Base url under which entity uris are minted, e.g.
    /// `http://data.example.org`
    #[serde(default = "default_entity_uri_base")]
    pub entity_uri_base: String,
}

fn default_page_size() -> usize {
    10
}

fn default_max_page_size() -> usize {
    50
}

fn default_set_metadata_weight() -> f32 {
    3.0
}

fn default_set_items_weight() -> f32 {
    1.0
}

fn default_entity_metadata_weight() -> f32 {
    10.0
}

fn default_entity_set_items_weight() -> f32 {
    1.0
}

fn default_entity_uri_base() -> String {
    "http://data.example.org".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            set_metadata_weight: default_set_metadata_weight(),
            set_items_weight: default_set_items_weight(),
            entity_metadata_weight: default_entity_metadata_weight(),
            entity_set_items_weight: default_entity_set_items_weight(),
            entity_uri_base: default_entity_uri_base(),
        }
    }
}

impl EngineConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.default_page_size == 0 {
            return Err("default_page_size must be > 0".to_string());
        }
        if self.max_page_size < self.default_page_size {
            return Err("max_page_size must be >= default_page_size".to_string());
        }
        for (name, weight) in [
            ("set_metadata_weight", self.set_metadata_weight),
            ("set_items_weight", self.set_items_weight),
            ("entity_metadata_weight", self.entity_metadata_weight),
            ("entity_set_items_weight", self.entity_set_items_weight),
        ] {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(format!("{name} must be a positive number"));
            }
        }
        if self.entity_uri_base.trim().is_empty() {
            return Err("entity_uri_base must not be empty".to_string());
        }
        Ok(())
    }
}
