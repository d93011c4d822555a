//! Conversions from external infrastructure errors into domain errors.

use std::io::Error as IoError;

use nexus_domain::ApiError;
use reqwest::Error as HttpError;
use zip::result::ZipError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ApiError);

impl From<InfraError> for ApiError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ApiError> for InfraError {
    fn from(value: ApiError) -> Self {
        Self(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoApiError {
    fn into_api_error(self) -> ApiError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ApiError */
/* -------------------------------------------------------------------------- */

impl IntoApiError for HttpError {
    fn into_api_error(self) -> ApiError {
        if self.is_timeout() {
            return ApiError::Network("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return ApiError::Network("HTTP connection failure".into());
        }

        if self.is_builder() {
            return ApiError::Config(format!("invalid HTTP request: {self}"));
        }

        if self.is_decode() {
            return ApiError::Decode(self.to_string());
        }

        // Status errors only come from `error_for_status`; the invoker builds
        // its own transport errors so this is a fallback.
        if let Some(status) = self.status() {
            return ApiError::transport(status.as_u16(), "");
        }

        ApiError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_api_error())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → ApiError */
/* -------------------------------------------------------------------------- */

impl IntoApiError for IoError {
    fn into_api_error(self) -> ApiError {
        ApiError::Io(format!("{:?}: {self}", self.kind()))
    }
}

impl From<IoError> for InfraError {
    fn from(value: IoError) -> Self {
        Self(value.into_api_error())
    }
}

/* -------------------------------------------------------------------------- */
/* zip::result::ZipError → ApiError */
/* -------------------------------------------------------------------------- */

impl IntoApiError for ZipError {
    fn into_api_error(self) -> ApiError {
        match self {
            ZipError::Io(err) => err.into_api_error(),
            other => ApiError::Archive(other.to_string()),
        }
    }
}

impl From<ZipError> for InfraError {
    fn from(value: ZipError) -> Self {
        Self(value.into_api_error())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
