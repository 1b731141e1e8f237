//! REST API client module for the member registry.
//!
//! `MemberRegistrar` is the seam the form controller submits through;
//! `ApiClient` is the production implementation that POSTs the payload as
//! JSON to the configured registration endpoint.

pub mod client;
pub mod error;

use crate::models::MemberPayload;

pub use client::ApiClient;
pub use error::ApiError;
pub use futures::future::BoxFuture;

/// Sends one registration. Any 2xx answer is success.
pub trait MemberRegistrar: Send + Sync {
    fn register<'a>(&'a self, payload: &'a MemberPayload) -> BoxFuture<'a, Result<(), ApiError>>;
}
