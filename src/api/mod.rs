//! Remote API client for the Dermascan backend
//!
//! Every call is a single HTTP request with no retries. Responses are
//! classified before decoding:
//!
//! - no response at all is a connectivity failure
//! - an HTML body is a malformed-upstream failure, whatever the status
//! - a non-2xx JSON body is a server failure carrying the body's `message`
//! - a 2xx body with `"success": false` is a rejection
//!
//! Response schemas accept both `id` and `_id` spellings; see
//! [`normalize_ids`].

mod client;
mod error;
pub mod types;

pub use client::{normalize_ids, ApiClient};
pub use error::{ApiError, GENERIC_FAILURE_MESSAGE};
pub use types::*;
