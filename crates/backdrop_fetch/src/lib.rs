//! Network fetch primitives for Backdrop.
//!
//! - [`fetch_manifest`] - manifest download with a hard timeout
//! - [`fetch_binary_with_retry`] - payload download with deterministic exponential backoff
//! - [`run_bounded`] - order-preserving worker pool with a concurrency cap
//!
//! All network access goes through the [`Transport`] trait so tests can
//! substitute scripted responses for [`ReqwestTransport`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod bounded;
mod manifest;
mod retry;
mod transport;

pub use bounded::run_bounded;
pub use manifest::fetch_manifest;
pub use retry::{backoff_delays, fetch_binary_with_retry};
pub use transport::{ReqwestTransport, Transport, TransportResponse};
