//! Request description and result kinds

use std::marker::PhantomData;

use bytes::Bytes;
use futures::future::{BoxFuture, FutureExt};
use nexus_domain::{ApiError, Result};
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::to_api_error;

const APPLICATION_JSON: &str = "application/json";

/// One logical API call.
///
/// The body is kept as [`Bytes`] so the request can be rebuilt and resent
/// after a token refresh.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) accept: Option<String>,
    pub(crate) content_type: Option<String>,
    pub(crate) body: Option<Bytes>,
}

impl ApiRequest {
    /// `path` is relative to the client's base URL and may carry a query.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), accept: None, content_type: None, body: None }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn accept(mut self, value: impl Into<String>) -> Self {
        self.accept = Some(value.into());
        self
    }

    /// Raw body. The content type only goes out together with a body.
    pub fn body(mut self, body: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self.content_type = Some(content_type.into());
        self
    }

    /// JSON body; also asks for a JSON response unless an `Accept` value is
    /// already set.
    ///
    /// # Errors
    /// Returns [`ApiError::Decode`] if `value` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        let body = serde_json::to_vec(value)?;
        let request = self.body(body, APPLICATION_JSON);
        Ok(if request.accept.is_some() { request } else { request.accept(APPLICATION_JSON) })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// What the caller wants back from a successful response.
///
/// Chosen statically at the call site:
/// `client.invoke::<DecodeAs<Job>>(request)`.
pub trait ResultKind {
    type Output: Send + 'static;

    /// Turn a successful response into the output. Every kind except
    /// [`RawTransport`] releases the response before returning.
    fn complete(response: Response) -> BoxFuture<'static, Result<Self::Output>>;
}

/// No body expected; the response is released.
#[derive(Debug)]
pub enum Unit {}

/// The caller takes ownership of the unconsumed response.
#[derive(Debug)]
pub enum RawTransport {}

/// Decode the JSON body into `T`.
#[derive(Debug)]
pub struct DecodeAs<T>(PhantomData<fn() -> T>);

impl ResultKind for Unit {
    type Output = ();

    fn complete(response: Response) -> BoxFuture<'static, Result<()>> {
        drop(response);
        futures::future::ready(Ok(())).boxed()
    }
}

impl ResultKind for RawTransport {
    type Output = Response;

    fn complete(response: Response) -> BoxFuture<'static, Result<Response>> {
        futures::future::ready(Ok(response)).boxed()
    }
}

impl<T> ResultKind for DecodeAs<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Output = T;

    fn complete(response: Response) -> BoxFuture<'static, Result<T>> {
        async move {
            // `bytes` consumes the response, so it is released on every path.
            let body = response.bytes().await.map_err(to_api_error)?;
            decode_body(&body)
        }
        .boxed()
    }
}

/// Decode a JSON body, rejecting one that carries no value (`null`).
pub(crate) fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    if value.is_null() {
        return Err(ApiError::Decode("response body is null".to_owned()));
    }
    Ok(serde_json::from_value(value)?)
}
