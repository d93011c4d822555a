use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use nexus_core::CatalogsApi;
use nexus_domain::constants::ROUTE_SEARCH_CATALOG_ITEMS;
use nexus_domain::{CatalogItem, Result};

use crate::api::client::{ClientCore, RefreshPolicy};
use crate::api::request::{ApiRequest, DecodeAs};

/// Catalog endpoints
#[derive(Clone)]
pub struct CatalogsClient {
    core: Arc<ClientCore>,
}

impl CatalogsClient {
    pub(crate) fn new(core: Arc<ClientCore>) -> Self {
        Self { core }
    }
}

#[async_trait]
impl CatalogsApi for CatalogsClient {
    async fn search_catalog_items(
        &self,
        resource_paths: &[String],
    ) -> Result<HashMap<String, CatalogItem>> {
        let request = ApiRequest::post(ROUTE_SEARCH_CATALOG_ITEMS).json(resource_paths)?;
        self.core
            .invoke::<DecodeAs<HashMap<String, CatalogItem>>>(request, RefreshPolicy::OnExpiredToken)
            .await
    }
}
