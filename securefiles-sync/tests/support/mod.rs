//! Shared helpers for secure file integration tests.

#![allow(dead_code)]

use securefiles_sync::{SecureFileRecord, SecureFilesClient, ServiceCoordinates};
use sha2::{Digest, Sha256};
use tracing_subscriber::EnvFilter;
use wiremock::MockServer;

pub const PROJECT_ID: &str = "sample/project";
pub const ENCODED_PROJECT: &str = "sample%2Fproject";

/// Installs a test subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Coordinates for the public API, as used in the URL tests.
pub fn example_coordinates() -> ServiceCoordinates {
    ServiceCoordinates::new("https://gitlab.example.com/api/v4", PROJECT_ID)
}

/// Client pointed at a mock server, authenticated with a private token.
pub fn mock_client(server: &MockServer) -> SecureFilesClient {
    init_tracing();
    let coordinates = ServiceCoordinates::new(format!("{}/api/v4", server.uri()), PROJECT_ID)
        .with_private_token("abc123");
    SecureFilesClient::new(coordinates).unwrap()
}

/// Path the mock server sees for the collection endpoint.
pub fn collection_path() -> String {
    format!("/api/v4/projects/{ENCODED_PROJECT}/secure_files")
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

pub fn record(id: &str, name: &str, checksum: &str) -> SecureFileRecord {
    SecureFileRecord {
        id: id.into(),
        name: name.into(),
        checksum: checksum.into(),
        ..Default::default()
    }
}
