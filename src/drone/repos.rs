//! Drone Repositories
//!
//! Repository records and the endpoints that activate, patch and
//! deactivate them.

use super::client::DroneClient;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Repository visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private,
    Public,
    Internal,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Public => "public",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Repository as returned by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repo {
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "namespace", alias = "owner")]
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub config_path: String,
    #[serde(default)]
    pub protected: bool,
    #[serde(default)]
    pub trusted: bool,
    #[serde(default)]
    pub timeout: i64,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub active: bool,
}

/// Partial repository update. Unset fields are left untouched by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trusted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

impl DroneClient {
    /// Fetch a single repository
    pub async fn repo(&self, owner: &str, name: &str) -> Result<Repo> {
        self.get(&self.repo_url(owner, name)).await
    }

    /// List repositories visible to the authenticated user
    pub async fn repo_list(&self) -> Result<Vec<Repo>> {
        self.get(&self.api_url("user/repos")).await
    }

    /// Activate a repository on the server
    pub async fn repo_enable(&self, owner: &str, name: &str) -> Result<Repo> {
        self.post::<(), _>(&self.repo_url(owner, name), None).await
    }

    /// Apply a partial update to a repository
    pub async fn repo_update(&self, owner: &str, name: &str, patch: &RepoPatch) -> Result<Repo> {
        self.patch(&self.repo_url(owner, name), patch).await
    }

    /// Deactivate a repository
    pub async fn repo_delete(&self, owner: &str, name: &str) -> Result<()> {
        self.delete(&self.repo_url(owner, name)).await
    }
}
