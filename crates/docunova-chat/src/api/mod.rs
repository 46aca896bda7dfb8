//! HTTP client for the DocuNova backend.
//!
//! Implements [`Backend`](crate::Backend) over the `/api/v1` REST
//! endpoints, attaching the bearer token from a
//! [`TokenProvider`](crate::TokenProvider) to every request.

mod backend;
mod client;

pub use client::ApiClient;
