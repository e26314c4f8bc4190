//! GitHub gist implementation of [`RemoteDocuments`] over the REST API.
//!
//! ```text
//! POST  {api}/gists        {"description", "public", "files": {"<name>": {"content"}}}
//! PATCH {api}/gists/{id}   {"files": {"<name>": {"content"}}}
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use automagist_core::{RemoteId, Settings};

use crate::error::{io_err, SyncError};
use crate::remote::{remote_file_name, RemoteDocuments};

const API_VERSION: &str = "2022-11-28";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GistFile {
    pub content: String,
}

/// Body of `PATCH /gists/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GistUpdate {
    pub files: BTreeMap<String, GistFile>,
}

/// Body of `POST /gists`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GistCreate {
    pub description: String,
    pub public: bool,
    pub files: BTreeMap<String, GistFile>,
}

#[derive(Debug, Deserialize)]
struct GistResponse {
    id: String,
}

impl GistUpdate {
    pub fn new(local_path: &Path, content: &[u8]) -> Self {
        Self {
            files: single_file(local_path, content),
        }
    }
}

impl GistCreate {
    pub fn new(local_path: &Path, content: &[u8], description: &str, public: bool) -> Self {
        Self {
            description: description.to_string(),
            public,
            files: single_file(local_path, content),
        }
    }
}

fn single_file(local_path: &Path, content: &[u8]) -> BTreeMap<String, GistFile> {
    let mut files = BTreeMap::new();
    files.insert(
        remote_file_name(local_path),
        GistFile {
            content: String::from_utf8_lossy(content).into_owned(),
        },
    );
    files
}

/// Blocking gist API client.
pub struct GistClient {
    agent: ureq::Agent,
    base_url: String,
    token: String,
}

impl GistClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// Client configured from settings, with a token from the environment or `gh`.
    pub fn from_settings(settings: &Settings) -> Result<Self, SyncError> {
        let token = resolve_token().ok_or(SyncError::MissingToken)?;
        Ok(Self::new(
            settings.api_base_url.clone(),
            token,
            settings.request_timeout(),
        ))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorize(&self, request: ureq::Request) -> ureq::Request {
        request
            .set("Accept", "application/vnd.github+json")
            .set("X-GitHub-Api-Version", API_VERSION)
            .set("Authorization", &format!("Bearer {}", self.token))
    }
}

impl RemoteDocuments for GistClient {
    fn create_document(
        &self,
        local_path: &Path,
        description: &str,
        public: bool,
    ) -> Result<RemoteId, SyncError> {
        let content = std::fs::read(local_path).map_err(|e| io_err(local_path, e))?;
        let payload = GistCreate::new(local_path, &content, description, public);
        let endpoint = self.endpoint("gists");

        let response = self
            .authorize(self.agent.post(&endpoint))
            .send_json(&payload)
            .map_err(|source| SyncError::Http {
                endpoint: endpoint.clone(),
                source: Box::new(source),
            })?;
        let created: GistResponse = response
            .into_json()
            .map_err(|source| SyncError::Decode { endpoint, source })?;

        tracing::debug!(gist_id = %created.id, path = %local_path.display(), "created gist");
        Ok(RemoteId::from(created.id))
    }

    fn update_document(
        &self,
        remote_id: &RemoteId,
        local_path: &Path,
        content: &[u8],
    ) -> Result<(), SyncError> {
        let payload = GistUpdate::new(local_path, content);
        let endpoint = self.endpoint(&format!("gists/{remote_id}"));

        self.authorize(self.agent.patch(&endpoint))
            .send_json(&payload)
            .map_err(|source| SyncError::Http {
                endpoint,
                source: Box::new(source),
            })?;
        Ok(())
    }
}

/// `GH_TOKEN`, then `GITHUB_TOKEN`, then `gh auth token`.
fn resolve_token() -> Option<String> {
    for var in ["GH_TOKEN", "GITHUB_TOKEN"] {
        if let Ok(token) = std::env::var(var) {
            if !token.trim().is_empty() {
                return Some(token.trim().to_string());
            }
        }
    }

    let output = Command::new("gh").args(["auth", "token"]).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!token.is_empty()).then_some(token)
}
