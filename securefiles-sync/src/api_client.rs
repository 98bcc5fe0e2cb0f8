//! HTTP client for a project's secure files API.
//!
//! Resolves the authentication header from the configured tokens and attaches
//! it to every request. Requests are sent once; failures go back to the caller.

use crate::config::ServiceCoordinates;
use crate::error::{SecureFilesError, SecureFilesResult};
use crate::secure_file::SecureFile;
use crate::types::{AuthCredential, JOB_TOKEN_HEADER, PRIVATE_TOKEN_HEADER, SecureFileRecord};
use reqwest::{Client, Method, Response};
use tracing::{debug, info};

/// Client for one project's secure file store.
pub struct SecureFilesClient {
    client: Client,
    coordinates: ServiceCoordinates,
}

impl SecureFilesClient {
    /// Builds a client with a default transport. No timeout is configured;
    /// use [`SecureFilesClient::with_http_client`] to supply one.
    pub fn new(coordinates: ServiceCoordinates) -> SecureFilesResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("securefiles-sync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_http_client(coordinates, client))
    }

    pub fn with_http_client(coordinates: ServiceCoordinates, client: Client) -> Self {
        Self {
            client,
            coordinates,
        }
    }

    pub fn coordinates(&self) -> &ServiceCoordinates {
        &self.coordinates
    }

    /// `{api}/projects/{project}/secure_files`, with the project id encoded
    /// as a single path segment.
    pub fn base_url(&self) -> String {
        format!(
            "{}/projects/{}/secure_files",
            self.coordinates.api_base_url,
            urlencoding::encode(&self.coordinates.project_id)
        )
    }

    // ── Auth ──

    /// Header name for the active token. A job token wins over a private token.
    pub fn authentication_key(&self) -> Option<&'static str> {
        if self.coordinates.job_token.is_some() {
            Some(JOB_TOKEN_HEADER)
        } else if self.coordinates.private_token.is_some() {
            Some(PRIVATE_TOKEN_HEADER)
        } else {
            None
        }
    }

    pub fn authentication_value(&self) -> Option<&str> {
        self.coordinates
            .job_token
            .as_deref()
            .or(self.coordinates.private_token.as_deref())
    }

    pub fn credential(&self) -> Option<AuthCredential> {
        Some(AuthCredential {
            header: self.authentication_key()?,
            value: self.authentication_value()?.to_string(),
        })
    }

    // ── Requests ──

    /// Sends an authenticated request and returns the raw response.
    ///
    /// Only transport failures are errors here; status handling is up to the
    /// caller. Without any token the request goes out unauthenticated.
    pub async fn execute_request(&self, url: &str, method: Method) -> SecureFilesResult<Response> {
        let mut request = self.client.request(method.clone(), url);
        if let Some(credential) = self.credential() {
            request = request.header(credential.header, credential.value);
        }

        debug!("{method} {url}");
        Ok(request.send().await?)
    }

    // ── Secure files ──

    /// Lists the project's secure files in response order.
    pub async fn files(&self) -> SecureFilesResult<Vec<SecureFile<'_>>> {
        let resp = self.execute_request(&self.base_url(), Method::GET).await?;
        let body = ensure_success(resp)?.text().await?;

        let records: Vec<SecureFileRecord> = serde_json::from_str(&body)?;
        debug!("listed {} secure files", records.len());

        Ok(records
            .into_iter()
            .map(|record| SecureFile::new(record, self))
            .collect())
    }

    pub async fn delete(&self, file_id: &str) -> SecureFilesResult<()> {
        let url = format!("{}/{file_id}", self.base_url());
        let resp = self.execute_request(&url, Method::DELETE).await?;
        ensure_success(resp)?;

        info!("deleted secure file {file_id}");
        Ok(())
    }
}

/// Maps a non-2xx response to [`SecureFilesError::Api`].
pub(crate) fn ensure_success(resp: Response) -> SecureFilesResult<Response> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(SecureFilesError::Api {
            status: status.as_u16(),
            url: resp.url().to_string(),
        })
    }
}
