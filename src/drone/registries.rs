//! Drone Registry Credentials
//!
//! Per-repository container registry logins. Passwords are write-only.

use super::client::DroneClient;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Registry credential as sent to and returned by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub id: i64,
    pub address: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

fn is_zero(id: &i64) -> bool {
    *id == 0
}

impl DroneClient {
    /// Fetch a single registry credential
    pub async fn registry(&self, owner: &str, repo: &str, address: &str) -> Result<Registry> {
        self.get(&self.registry_url(owner, repo, address)).await
    }

    /// List registry credentials of a repository
    pub async fn registry_list(&self, owner: &str, repo: &str) -> Result<Vec<Registry>> {
        self.get(&self.registries_url(owner, repo)).await
    }

    /// Create a registry credential
    pub async fn registry_create(
        &self,
        owner: &str,
        repo: &str,
        registry: &Registry,
    ) -> Result<Registry> {
        self.post(&self.registries_url(owner, repo), Some(registry))
            .await
    }

    /// Update the credential for `registry.address`
    pub async fn registry_update(
        &self,
        owner: &str,
        repo: &str,
        registry: &Registry,
    ) -> Result<Registry> {
        self.patch(&self.registry_url(owner, repo, &registry.address), registry)
            .await
    }

    /// Delete a registry credential
    pub async fn registry_delete(&self, owner: &str, repo: &str, address: &str) -> Result<()> {
        self.delete(&self.registry_url(owner, repo, address)).await
    }
}
