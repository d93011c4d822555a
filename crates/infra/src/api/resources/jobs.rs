use std::sync::Arc;

use async_trait::async_trait;
use nexus_core::JobsApi;
use nexus_domain::constants::{ROUTE_EXPORT, ROUTE_JOBS};
use nexus_domain::{ExportParameters, Job, JobStatus, Result};
use uuid::Uuid;

use crate::api::client::{ClientCore, RefreshPolicy};
use crate::api::request::{ApiRequest, DecodeAs};

/// Job endpoints
#[derive(Clone)]
pub struct JobsClient {
    core: Arc<ClientCore>,
}

impl JobsClient {
    pub(crate) fn new(core: Arc<ClientCore>) -> Self {
        Self { core }
    }
}

#[async_trait]
impl JobsApi for JobsClient {
    async fn export(&self, parameters: &ExportParameters) -> Result<Job> {
        let request = ApiRequest::post(ROUTE_EXPORT).json(parameters)?;
        self.core.invoke::<DecodeAs<Job>>(request, RefreshPolicy::OnExpiredToken).await
    }

    async fn get_job_status(&self, job_id: Uuid) -> Result<JobStatus> {
        let request = ApiRequest::get(format!("{ROUTE_JOBS}/{job_id}/status"))
            .accept("application/json");
        self.core.invoke::<DecodeAs<JobStatus>>(request, RefreshPolicy::OnExpiredToken).await
    }
}
