//! Remote service coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a project's secure files live and how to authenticate against them.
#[derive(Clone, Serialize, Deserialize)]
pub struct ServiceCoordinates {
    /// Base URL of the versioned API (e.g., "https://gitlab.com/api/v4").
    pub api_base_url: String,

    /// Project identifier. Either a numeric id or a namespaced path such as
    /// "group/project"; it is percent-encoded as one path segment.
    pub project_id: String,

    /// CI job token. Takes precedence over `private_token`.
    #[serde(default)]
    pub job_token: Option<String>,

    /// Long-lived personal/project access token.
    #[serde(default)]
    pub private_token: Option<String>,
}

impl Default for ServiceCoordinates {
    fn default() -> Self {
        Self {
            api_base_url: "https://gitlab.com/api/v4".to_string(),
            project_id: String::new(),
            job_token: None,
            private_token: None,
        }
    }
}

impl ServiceCoordinates {
    pub fn new(api_base_url: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            project_id: project_id.into(),
            job_token: None,
            private_token: None,
        }
    }

    pub fn with_job_token(mut self, token: impl Into<String>) -> Self {
        self.job_token = Some(token.into());
        self
    }

    pub fn with_private_token(mut self, token: impl Into<String>) -> Self {
        self.private_token = Some(token.into());
        self
    }
}

// Tokens never reach log output.
impl fmt::Debug for ServiceCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |token: &Option<String>| token.as_ref().map(|_| "<redacted>");
        f.debug_struct("ServiceCoordinates")
            .field("api_base_url", &self.api_base_url)
            .field("project_id", &self.project_id)
            .field("job_token", &redact(&self.job_token))
            .field("private_token", &redact(&self.private_token))
            .finish()
    }
}
