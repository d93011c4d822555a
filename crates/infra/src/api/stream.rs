//! Response bodies handed to callers as [`ByteStream`]s

use futures::StreamExt;
use nexus_core::ByteStream;
use reqwest::Response;

use crate::errors::to_api_error;

/// Wrap an unconsumed response body. Chunk errors surface as network errors.
pub(crate) fn into_byte_stream(response: Response) -> ByteStream {
    let content_length = response.content_length();
    let chunks = response.bytes_stream().map(|chunk| chunk.map_err(to_api_error)).boxed();
    ByteStream::new(content_length, chunks)
}
