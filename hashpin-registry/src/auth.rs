//! API token discovery.
//!
//! Order: `GITHUB_TOKEN`, `GH_TOKEN`, then `gh auth token`. Anonymous access
//! is a supported fallback with a lower rate limit.

use std::fmt;
use std::process::Command;

pub const TOKEN_ENV_VARS: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

/// Where the token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    Env(&'static str),
    GhCli,
    Anonymous,
}

impl fmt::Display for AuthSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthSource::Env(var) => f.write_str(var),
            AuthSource::GhCli => f.write_str("gh CLI"),
            AuthSource::Anonymous => f.write_str("anonymous"),
        }
    }
}

#[derive(Clone)]
pub struct Credentials {
    pub token: Option<String>,
    pub source: AuthSource,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("source", &self.source)
            .finish()
    }
}

/// Discover credentials from the process environment and the `gh` CLI.
pub fn discover() -> Credentials {
    discover_with(|var| std::env::var(var).ok(), gh_cli_token)
}

/// Discovery with injectable lookups.
pub fn discover_with(
    env: impl Fn(&str) -> Option<String>,
    gh: impl FnOnce() -> Option<String>,
) -> Credentials {
    for var in TOKEN_ENV_VARS {
        if let Some(token) = env(var).map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) {
            return Credentials {
                token: Some(token),
                source: AuthSource::Env(var),
            };
        }
    }
    match gh() {
        Some(token) => Credentials {
            token: Some(token),
            source: AuthSource::GhCli,
        },
        None => Credentials {
            token: None,
            source: AuthSource::Anonymous,
        },
    }
}

fn gh_cli_token() -> Option<String> {
    let output = Command::new("gh").args(["auth", "token"]).output().ok()?;
    if !output.status.success() {
        tracing::debug!("gh auth token exited with {}", output.status);
        return None;
    }
    let token = String::from_utf8(output.stdout).ok()?.trim().to_string();
    (!token.is_empty()).then_some(token)
}
