//! Per-repository ref rewrites applied before lookup.
//!
//! Some projects tag releases with an extra prefix segment. The table maps a
//! repository to a rule so those cases are data rather than branches in the
//! resolver.

use std::borrow::Cow;

use hashpin_core::RepoId;

/// `refs of <repo> starting with <when_prefix> are looked up as <prepend><ref>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefRewrite {
    pub repo: RepoId,
    pub when_prefix: String,
    pub prepend: String,
}

impl RefRewrite {
    pub fn new(repo: RepoId, when_prefix: impl Into<String>, prepend: impl Into<String>) -> Self {
        Self {
            repo,
            when_prefix: when_prefix.into(),
            prepend: prepend.into(),
        }
    }

    /// The rewritten ref, or `None` when the rule does not apply.
    pub fn apply(&self, repo: &RepoId, reference: &str) -> Option<String> {
        (self.repo == *repo && reference.starts_with(&self.when_prefix))
            .then(|| format!("{}{}", self.prepend, reference))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefRewriteTable {
    rules: Vec<RefRewrite>,
}

impl RefRewriteTable {
    /// A table with no rules.
    pub fn empty() -> Self {
        Self::default()
    }

    /// CodeQL publishes its action releases as `codeql-bundle-vX.Y.Z`.
    pub fn builtin() -> Self {
        Self::empty().with_rule(RefRewrite::new(
            RepoId::new("github", "codeql-action"),
            "v",
            "codeql-bundle-",
        ))
    }

    pub fn with_rule(mut self, rule: RefRewrite) -> Self {
        self.rules.push(rule);
        self
    }

    /// First matching rule wins; unmatched refs pass through unchanged.
    pub fn rewrite<'a>(&self, repo: &RepoId, reference: &'a str) -> Cow<'a, str> {
        self.rules
            .iter()
            .find_map(|rule| rule.apply(repo, reference))
            .map_or(Cow::Borrowed(reference), Cow::Owned)
    }
}
