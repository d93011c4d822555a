//! Unconsumed response bodies

use std::fmt;

use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use nexus_domain::{ApiError, Result};

/// Upper bound on the buffer reserved up front from an announced length.
const MAX_PREALLOCATION: usize = 8 * 1024 * 1024;

/// A response body handed to the caller without being read.
///
/// Dropping the stream releases the underlying connection.
pub struct ByteStream {
    content_length: Option<u64>,
    inner: BoxStream<'static, Result<Bytes>>,
}

impl ByteStream {
    pub fn new(content_length: Option<u64>, inner: BoxStream<'static, Result<Bytes>>) -> Self {
        Self { content_length, inner }
    }

    /// In-memory stream yielding the given chunks, with an exact length.
    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = Bytes>,
    {
        let chunks: Vec<Bytes> = chunks.into_iter().collect();
        let length = chunks.iter().map(|chunk| chunk.len() as u64).sum();
        Self::new(Some(length), stream::iter(chunks.into_iter().map(Ok)).boxed())
    }

    /// Value of the `Content-Length` header, if the server sent one.
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// Next chunk, `None` once the body is exhausted.
    pub async fn next_chunk(&mut self) -> Option<Result<Bytes>> {
        self.inner.next().await
    }

    /// Read the whole body into memory.
    ///
    /// # Errors
    /// Fails with [`ApiError::StreamEndedEarly`] when the body is shorter than
    /// the announced `Content-Length`.
    pub async fn read_to_end(mut self) -> Result<Vec<u8>> {
        let capacity = self
            .content_length
            .and_then(|len| usize::try_from(len).ok())
            .unwrap_or(0)
            .min(MAX_PREALLOCATION);
        let mut buffer = Vec::with_capacity(capacity);

        while let Some(chunk) = self.next_chunk().await {
            buffer.extend_from_slice(&chunk?);
        }

        if let Some(expected) = self.content_length {
            let received = buffer.len() as u64;
            if received < expected {
                return Err(ApiError::StreamEndedEarly { expected, received });
            }
        }

        Ok(buffer)
    }
}

impl fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteStream").field("content_length", &self.content_length).finish_non_exhaustive()
    }
}
