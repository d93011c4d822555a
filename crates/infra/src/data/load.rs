//! Load several resources at once

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use nexus_core::{decode_f64_payload, CatalogsApi, DataApi, LoadProgress};
use nexus_domain::constants::{PROPERTY_DESCRIPTION, PROPERTY_UNIT};
use nexus_domain::{ApiError, CatalogItem, DataResponse, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Resolves catalog metadata and fetches the raw series of each resource.
#[derive(Clone)]
pub struct BatchLoader {
    catalogs: Arc<dyn CatalogsApi>,
    data: Arc<dyn DataApi>,
}

impl BatchLoader {
    pub fn new(catalogs: Arc<dyn CatalogsApi>, data: Arc<dyn DataApi>) -> Self {
        Self { catalogs, data }
    }

    /// Load `[begin, end)` for every resource path.
    ///
    /// Metadata for all paths is resolved in one round trip; the series are
    /// then fetched one after another. After each resource the cumulative
    /// progress (`1 / resolved count` per resource) is reported.
    ///
    /// # Errors
    /// - [`ApiError::InvalidDataLength`] if a payload is not a whole number of
    ///   8-byte values
    /// - [`ApiError::StreamEndedEarly`] if a payload is shorter than its
    ///   `Content-Length`
    /// - [`ApiError::Cancelled`] when `cancel` fires
    /// - any catalog or data sub-client error
    #[instrument(skip_all, fields(resources = resource_paths.len()))]
    pub async fn load(
        &self,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
        resource_paths: &[String],
        on_progress: Option<&LoadProgress>,
        cancel: Option<&CancellationToken>,
    ) -> Result<HashMap<String, DataResponse>> {
        let catalog_items = self.catalogs.search_catalog_items(resource_paths).await?;
        debug!(resolved = catalog_items.len(), "Catalog items resolved");

        #[allow(clippy::cast_precision_loss)]
        let step = 1.0 / catalog_items.len() as f64;
        let mut progress = 0.0;
        let mut result = HashMap::with_capacity(catalog_items.len());

        for (resource_path, catalog_item) in catalog_items {
            let values = match cancel {
                Some(token) => tokio::select! {
                    () = token.cancelled() => return Err(ApiError::Cancelled),
                    values = self.fetch_values(&resource_path, begin, end) => values?,
                },
                None => self.fetch_values(&resource_path, begin, end).await?,
            };

            debug!(resource_path = %resource_path, values = values.len(), "Resource loaded");
            result.insert(resource_path, data_response(catalog_item, values));

            progress += step;
            if let Some(callback) = on_progress {
                callback(progress);
            }
        }

        info!(resources = result.len(), "Resources loaded");
        Ok(result)
    }

    async fn fetch_values(
        &self,
        resource_path: &str,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<f64>> {
        let body = self.data.get_stream(resource_path, begin, end).await?;

        if let Some(length) = body.content_length() {
            if length % 8 != 0 {
                return Err(ApiError::InvalidDataLength {
                    length: usize::try_from(length).unwrap_or(usize::MAX),
                });
            }
        }

        let bytes = body.read_to_end().await?;
        decode_f64_payload(&bytes)
    }
}

fn data_response(catalog_item: CatalogItem, values: Vec<f64>) -> DataResponse {
    let resource = &catalog_item.resource;

    DataResponse {
        name: resource.id.clone(),
        unit: resource.string_property(PROPERTY_UNIT).map(str::to_owned),
        description: resource.string_property(PROPERTY_DESCRIPTION).map(str::to_owned),
        sample_period: catalog_item.representation.sample_period,
        values,
        catalog_item,
    }
}

impl std::fmt::Debug for BatchLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchLoader").finish_non_exhaustive()
    }
}
