//! Composite identities
//!
//! Resources are addressed by slash-joined keys: `owner/name` for
//! repositories and `owner/repo/key` for anything scoped to a repository.
//! Joining performs no escaping. A scoped key may itself contain `/`
//! because decoding keeps everything after the second slash as the key.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

const REPO_FORMAT: &str = "owner/name (e.g. octocat/hello-world)";
const SCOPED_FORMAT: &str = "owner/repo/key (e.g. octocat/hello-world/fancy_pants)";

/// `owner/name`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl FromStr for RepoId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('/').collect();
        match parts.as_slice() {
            [owner, name] => Ok(Self::new(*owner, *name)),
            _ => Err(Error::parse(s, REPO_FORMAT)),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// `owner/repo/key`, where key is a secret name or registry address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopedId {
    pub owner: String,
    pub repo: String,
    pub key: String,
}

impl ScopedId {
    pub fn new(repo: &RepoId, key: impl Into<String>) -> Self {
        Self {
            owner: repo.owner.clone(),
            repo: repo.name.clone(),
            key: key.into(),
        }
    }

    /// The owning repository
    pub fn repo_id(&self) -> RepoId {
        RepoId::new(&self.owner, &self.repo)
    }
}

impl FromStr for ScopedId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(3, '/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(repo), Some(key)) => Ok(Self {
                owner: owner.to_string(),
                repo: repo.to_string(),
                key: key.to_string(),
            }),
            _ => Err(Error::parse(s, SCOPED_FORMAT)),
        }
    }
}

impl fmt::Display for ScopedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.owner, self.repo, self.key)
    }
}

/// Stricter check applied to the `repository` attribute: exactly one slash,
/// both halves non-empty and free of whitespace.
pub fn is_valid_repository(s: &str) -> bool {
    match s.split_once('/') {
        Some((owner, name)) => [owner, name].iter().all(|part| {
            !part.is_empty() && !part.contains('/') && !part.chars().any(char::is_whitespace)
        }),
        None => false,
    }
}
