//! Dermascan - dermatology scan client library
//!
//! This library provides the client side of the Dermascan platform: a
//! persistent key-value store, the session, the diagnosis and appointment
//! caches, and a typed client for the remote HTTP API.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `storage`: Key-value store trait with sled and in-memory backends
//! - `session`: Session value and its persistence
//! - `diagnosis`: Per-patient cache of the latest diagnosis
//! - `appointments`: Doctor-side confirmation cache and its expiry sweep
//! - `api`: HTTP client, request/response schemas, and API errors
//! - `validation`: Form checks run before any network call
//! - `preferences`: Theme, profile image, and selected doctor
//! - `context`: Dependency bundle and cross-component workflows
//! - `config`: Configuration management and validation
//! - `error`: Error types, result alias, and user-facing categories
//! - `cli` / `commands`: Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use dermascan::{AppContext, Config};
//! use dermascan::validation::LoginForm;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let ctx = AppContext::new(&config)?;
//!     let session = ctx
//!         .login(&LoginForm {
//!             email: "a@b.com".to_string(),
//!             password: "secret1".to_string(),
//!         })
//!         .await?;
//!     println!("Welcome, {}", session.display_name);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod appointments;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod diagnosis;
pub mod error;
pub mod preferences;
pub mod session;
pub mod storage;
pub mod validation;

// Re-export commonly used types
pub use api::{ApiClient, ApiError};
pub use appointments::{ConfirmationCache, ConfirmedAppointmentEntry, ExpirySweep};
pub use config::Config;
pub use context::AppContext;
pub use diagnosis::{DiagnosisCache, DiagnosisRecord};
pub use error::{DermascanError, ErrorCategory, Result};
pub use session::{Role, Session, SessionManager};
pub use storage::{KeyValueStore, MemoryStore, SledStore};

#[cfg(test)]
pub mod test_utils;
