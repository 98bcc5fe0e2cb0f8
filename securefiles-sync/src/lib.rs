//! Secure file sync for project-scoped file custody services.
//!
//! Provides:
//! - An authenticated API client (job token or private token) that lists
//!   and deletes a project's secure files
//! - Per-file download into a working directory with nested path
//!   reconstruction, SHA-256 verification and restrictive permissions
//!
//! A checksum mismatch surfaces as [`SecureFilesError::IntegrityFailure`],
//! which callers must treat as fatal (see [`SecureFilesError::is_fatal`]).

pub mod api_client;
pub mod config;
pub mod error;
pub mod secure_file;
pub mod types;

pub use api_client::SecureFilesClient;
pub use config::ServiceCoordinates;
pub use error::{SecureFilesError, SecureFilesResult};
pub use secure_file::SecureFile;
pub use types::*;
