//! Run configuration built once in `main` and handed to every command.

use std::path::{Path, PathBuf};

/// Build metadata. `HASHPIN_GIT_COMMIT` and `HASHPIN_BUILD_TIME` are read at
/// compile time when the release pipeline sets them.
#[derive(Debug, Clone, Copy)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_commit: &'static str,
    pub build_time: &'static str,
}

impl BuildInfo {
    pub const fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            git_commit: match option_env!("HASHPIN_GIT_COMMIT") {
                Some(commit) => commit,
                None => "unknown",
            },
            build_time: match option_env!("HASHPIN_BUILD_TIME") {
                Some(time) => time,
                None => "unknown",
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub build: BuildInfo,
    pub workflows_dir: PathBuf,
    pub api_url: String,
}

impl RunConfig {
    pub fn workflows_dir(&self) -> &Path {
        &self.workflows_dir
    }

    /// Resolve an `update` target. A bare file name is looked up inside the
    /// workflow directory; anything with a directory component is taken as is.
    pub fn resolve_target(&self, target: &Path) -> PathBuf {
        let bare = target
            .parent()
            .map_or(true, |parent| parent.as_os_str().is_empty());
        if bare {
            self.workflows_dir.join(target)
        } else {
            target.to_path_buf()
        }
    }
}
