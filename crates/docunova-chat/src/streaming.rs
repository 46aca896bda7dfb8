//! Chunked answer streams.
//!
//! The query endpoint answers with a raw text body and no framing: the
//! answer is simply every body byte, in order, and the end is signalled
//! by the transport. This module turns that byte stream into text deltas,
//! one per transport chunk, handling code points split across chunks.

use std::pin::Pin;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::ApiError;

type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Incremental UTF-8 decoder.
///
/// Holds back an incomplete trailing code point until the bytes that
/// finish it arrive.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `chunk`, returning the text completed by it.
    ///
    /// The result is empty when the chunk only extends a partial code point.
    /// On a malformed sequence the text before it is returned in the
    /// [`DecodeFailure`].
    pub fn decode(&mut self, chunk: &[u8]) -> Result<String, DecodeFailure> {
        self.pending.extend_from_slice(chunk);

        let valid_up_to = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            Err(e) => {
                if let Some(len) = e.error_len() {
                    let offset = e.valid_up_to();
                    self.pending.truncate(offset);
                    let text = String::from_utf8_lossy(&std::mem::take(&mut self.pending))
                        .into_owned();
                    return Err(DecodeFailure {
                        text,
                        error: ApiError::DecodeError(format!(
                            "invalid UTF-8 ({len} byte(s) at offset {offset})"
                        )),
                    });
                }
                e.valid_up_to()
            }
        };

        let rest = self.pending.split_off(valid_up_to);
        let complete = std::mem::replace(&mut self.pending, rest);
        Ok(String::from_utf8_lossy(&complete).into_owned())
    }

    /// Number of bytes held back waiting for the rest of a code point.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Signal end of input. Fails if a code point was left unfinished.
    pub fn finish(&mut self) -> Result<(), ApiError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let dangling = self.pending.len();
        self.pending.clear();
        Err(ApiError::DecodeError(format!(
            "body ended inside a multi-byte character ({dangling} dangling byte(s))"
        )))
    }
}

/// A malformed byte sequence and the valid text that preceded it.
#[derive(Debug)]
pub struct DecodeFailure {
    pub text: String,
    pub error: ApiError,
}

/// Cancelable subscription of text deltas read from a chunked body.
///
/// Yields `Some(Ok(delta))` per non-empty decoded chunk, `None` once the
/// body ended cleanly, and `Some(Err(_))` exactly once on failure or
/// cancellation, after which it yields `None`.
pub struct DeltaStream {
    body: Option<ByteStream>,
    decoder: Utf8Decoder,
    cancel: CancellationToken,
    received: usize,
    failed: Option<ApiError>,
}

impl DeltaStream {
    pub fn new<S, E>(body: S, cancel: CancellationToken) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: std::fmt::Display,
    {
        let body = body.map(|result| result.map_err(|e| std::io::Error::other(e.to_string())));
        Self {
            body: Some(Box::pin(body)),
            decoder: Utf8Decoder::new(),
            cancel,
            received: 0,
            failed: None,
        }
    }

    /// Wrap the body of a response whose status was already checked.
    pub fn from_response(response: reqwest::Response, cancel: CancellationToken) -> Self {
        Self::new(response.bytes_stream(), cancel)
    }

    /// Total body bytes received so far.
    pub fn bytes_received(&self) -> usize {
        self.received
    }

    /// Wait for the next delta.
    pub async fn next_delta(&mut self) -> Option<Result<String, ApiError>> {
        if let Some(e) = self.failed.take() {
            return Some(Err(e));
        }
        loop {
            let cancel = self.cancel.clone();
            let next = {
                let body = self.body.as_mut()?;
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    chunk = body.next() => Some(chunk),
                }
            };

            match next {
                None => {
                    // Dropping the body releases the connection.
                    self.body = None;
                    debug!(bytes = self.received, "stream cancelled");
                    return Some(Err(ApiError::Cancelled));
                }
                Some(None) => {
                    self.body = None;
                    debug!(bytes = self.received, "stream ended");
                    return self.decoder.finish().err().map(Err);
                }
                Some(Some(Err(e))) => {
                    self.body = None;
                    return Some(Err(ApiError::StreamTransportFailed(e.to_string())));
                }
                Some(Some(Ok(bytes))) => {
                    self.received += bytes.len();
                    match self.decoder.decode(&bytes) {
                        Ok(text) if text.is_empty() => continue,
                        Ok(text) => return Some(Ok(text)),
                        Err(DecodeFailure { text, error }) => {
                            self.body = None;
                            if text.is_empty() {
                                return Some(Err(error));
                            }
                            self.failed = Some(error);
                            return Some(Ok(text));
                        }
                    }
                }
            }
        }
    }

    /// Drain the stream into one string.
    pub async fn collect_text(mut self) -> Result<String, ApiError> {
        let mut text = String::new();
        while let Some(delta) = self.next_delta().await {
            text.push_str(&delta?);
        }
        Ok(text)
    }
}

impl std::fmt::Debug for DeltaStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeltaStream")
            .field("open", &self.body.is_some())
            .field("received", &self.received)
            .field("pending", &self.decoder.pending_len())
            .finish()
    }
}
