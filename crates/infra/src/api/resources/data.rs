use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use nexus_core::{ByteStream, DataApi};
use nexus_domain::constants::ROUTE_DATA;
use nexus_domain::Result;

use crate::api::client::{ClientCore, RefreshPolicy};
use crate::api::request::{ApiRequest, RawTransport};
use crate::api::stream::into_byte_stream;

/// Data endpoints
#[derive(Clone)]
pub struct DataClient {
    core: Arc<ClientCore>,
}

impl DataClient {
    pub(crate) fn new(core: Arc<ClientCore>) -> Self {
        Self { core }
    }
}

fn data_path(resource_path: &str, begin: DateTime<Utc>, end: DateTime<Utc>) -> String {
    let begin = begin.to_rfc3339_opts(SecondsFormat::AutoSi, true);
    let end = end.to_rfc3339_opts(SecondsFormat::AutoSi, true);
    format!(
        "{ROUTE_DATA}?resourcePath={}&begin={}&end={}",
        urlencoding::encode(resource_path),
        urlencoding::encode(&begin),
        urlencoding::encode(&end),
    )
}

#[async_trait]
impl DataApi for DataClient {
    async fn get_stream(
        &self,
        resource_path: &str,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<ByteStream> {
        let request =
            ApiRequest::get(data_path(resource_path, begin, end)).accept("application/octet-stream");
        let response =
            self.core.invoke::<RawTransport>(request, RefreshPolicy::OnExpiredToken).await?;
        Ok(into_byte_stream(response))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn query_is_encoded() {
        let begin = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();

        assert_eq!(
            data_path("/a/b/c/T1/1_s", begin, end),
            "api/v1/data?resourcePath=%2Fa%2Fb%2Fc%2FT1%2F1_s&begin=2020-01-01T00%3A00%3A00Z&end=2020-01-02T00%3A00%3A00Z"
        );
    }
}
