//! Catalog types returned by the catalog search

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::utils::time_span;

/// A concrete representation of a resource (data type and sample period).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Representation {
    pub data_type: String,
    #[serde(with = "time_span")]
    pub sample_period: Duration,
    #[serde(default)]
    pub parameters: Option<BTreeMap<String, serde_json::Value>>,
}

/// A resource with its free-form properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    #[serde(default)]
    pub properties: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub representations: Option<Vec<Representation>>,
}

impl Resource {
    /// Property value when present *and* a JSON string.
    pub fn string_property(&self, key: &str) -> Option<&str> {
        self.properties.as_ref()?.get(key)?.as_str()
    }
}

/// A resource bound to one representation, addressable by a resource path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub resource: Resource,
    pub representation: Representation,
    #[serde(default)]
    pub parameters: Option<BTreeMap<String, String>>,
}
