//! Infrastructure error conversions

mod conversions;

pub use conversions::InfraError;

use nexus_domain::ApiError;

/// Map any infrastructure error with a known conversion into an [`ApiError`].
pub(crate) fn to_api_error<E: Into<InfraError>>(err: E) -> ApiError {
    err.into().into()
}
