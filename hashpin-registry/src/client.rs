//! Blocking GitHub REST client built on `ureq`.
//!
//! One request at a time; the agent's request timeout is the only timeout.

use std::time::Duration;

use serde::de::DeserializeOwned;

use hashpin_core::RepoId;

use crate::api::{GitHubApi, GitObject, GitRef, RefNamespace, Release, TagObject};
use crate::error::RegistryError;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("hashpin/", env!("CARGO_PKG_VERSION"));

pub struct GitHubClient {
    agent: ureq::Agent,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn repo_url(&self, repo: &RepoId, tail: &str) -> String {
        repo_url(&self.base_url, repo, tail)
    }

    /// `Ok(None)` on 404.
    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>, RegistryError> {
        tracing::debug!(url, "GET");
        let mut request = self
            .agent
            .get(url)
            .set("Accept", "application/vnd.github+json")
            .set("X-GitHub-Api-Version", API_VERSION);
        if let Some(token) = &self.token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }

        let response = match request.call() {
            Ok(response) => response,
            Err(ureq::Error::Status(404, _)) => return Ok(None),
            Err(ureq::Error::Status(status, response)) => {
                return Err(classify_status(
                    url,
                    status,
                    response.header("x-ratelimit-remaining"),
                    response.header("x-ratelimit-reset"),
                ))
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(RegistryError::Transport {
                    url: url.to_string(),
                    message: transport.to_string(),
                })
            }
        };

        let body = response
            .into_string()
            .map_err(|e| RegistryError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|source| RegistryError::Decode {
                url: url.to_string(),
                source,
            })
    }
}

impl GitHubApi for GitHubClient {
    fn fetch_latest_release(&self, repo: &RepoId) -> Result<Option<Release>, RegistryError> {
        self.get_json(&self.repo_url(repo, "releases/latest"))
    }

    fn git_ref(
        &self,
        repo: &RepoId,
        namespace: RefNamespace,
        name: &str,
    ) -> Result<Option<GitRef>, RegistryError> {
        let tail = format!("git/ref/{}/{}", namespace.as_str(), name);
        self.get_json(&self.repo_url(repo, &tail))
    }

    fn tag_target(&self, repo: &RepoId, tag_sha: &str) -> Result<Option<GitObject>, RegistryError> {
        let tag: Option<TagObject> = self.get_json(&self.repo_url(repo, &format!("git/tags/{tag_sha}")))?;
        Ok(tag.map(|t| t.object))
    }
}

fn repo_url(base_url: &str, repo: &RepoId, tail: &str) -> String {
    format!("{base_url}/repos/{}/{}/{tail}", repo.owner, repo.repo)
}

/// Map a non-404 error status. GitHub signals an exhausted quota with 403 or
/// 429 and `x-ratelimit-remaining: 0`.
fn classify_status(
    url: &str,
    status: u16,
    remaining: Option<&str>,
    reset: Option<&str>,
) -> RegistryError {
    if matches!(status, 403 | 429) && remaining.map(str::trim) == Some("0") {
        return RegistryError::RateLimited {
            reset: reset.and_then(|r| r.trim().parse().ok()),
        };
    }
    RegistryError::Http {
        status,
        url: url.to_string(),
    }
}
