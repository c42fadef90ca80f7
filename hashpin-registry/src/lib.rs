//! # hashpin-registry
//!
//! Resolves action references against the GitHub REST API.
//!
//! [`Resolver`] implements [`ResolveRef`] on top of any [`GitHubApi`];
//! [`GitHubClient`] is the `ureq`-backed implementation and [`auth`] finds a
//! token for it.

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod resolver;
pub mod rewrite;

pub use api::{GitHubApi, GitObject, GitRef, ObjectKind, RefNamespace, Release};
pub use auth::{AuthSource, Credentials};
pub use client::{GitHubClient, DEFAULT_API_URL};
pub use error::RegistryError;
pub use resolver::{ResolveRef, Resolver};
pub use rewrite::{RefRewrite, RefRewriteTable};
