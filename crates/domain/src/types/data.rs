//! Loaded time series

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::catalog::CatalogItem;
use crate::utils::time_span;

/// Result of loading one resource path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataResponse {
    pub catalog_item: CatalogItem,
    /// The resource id.
    pub name: String,
    pub unit: Option<String>,
    pub description: Option<String>,
    #[serde(with = "time_span")]
    pub sample_period: Duration,
    pub values: Vec<f64>,
}
