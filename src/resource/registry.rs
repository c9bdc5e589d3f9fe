//! `drone_registry` - registry credentials

use super::identity::{RepoId, ScopedId};
use super::{found, ResourceKind};
use crate::drone::{DroneClient, Registry};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Attributes of a `drone_registry` resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryAttributes {
    pub repository: String,
    pub address: String,
    pub username: String,
    /// Write-only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

pub fn to_request(attrs: &RegistryAttributes) -> Registry {
    Registry {
        id: 0,
        address: attrs.address.clone(),
        username: attrs.username.clone(),
        password: attrs.password.clone(),
    }
}

pub fn from_response(repo: &RepoId, registry: &Registry) -> RegistryAttributes {
    RegistryAttributes {
        repository: repo.to_string(),
        address: registry.address.clone(),
        username: registry.username.clone(),
        password: None,
    }
}

pub struct RegistryResource;

impl ResourceKind for RegistryResource {
    const TYPE_NAME: &'static str = "drone_registry";

    type Attributes = RegistryAttributes;

    fn identity(attrs: &RegistryAttributes) -> String {
        format!("{}/{}", attrs.repository, attrs.address)
    }

    async fn create(client: &DroneClient, attrs: &RegistryAttributes) -> Result<RegistryAttributes> {
        let repo: RepoId = attrs.repository.parse()?;
        let registry = client
            .registry_create(&repo.owner, &repo.name, &to_request(attrs))
            .await?;
        Ok(from_response(&repo, &registry))
    }

    async fn read(client: &DroneClient, id: &str) -> Result<RegistryAttributes> {
        let id: ScopedId = id.parse()?;
        let registry = client.registry(&id.owner, &id.repo, &id.key).await?;
        Ok(from_response(&id.repo_id(), &registry))
    }

    async fn update(client: &DroneClient, attrs: &RegistryAttributes) -> Result<RegistryAttributes> {
        let repo: RepoId = attrs.repository.parse()?;
        let registry = client
            .registry_update(&repo.owner, &repo.name, &to_request(attrs))
            .await?;
        Ok(from_response(&repo, &registry))
    }

    async fn delete(client: &DroneClient, id: &str) -> Result<()> {
        let id: ScopedId = id.parse()?;
        client.registry_delete(&id.owner, &id.repo, &id.key).await
    }

    async fn exists(client: &DroneClient, id: &str) -> Result<bool> {
        let id: ScopedId = id.parse()?;
        let registry = found(client.registry(&id.owner, &id.repo, &id.key).await)?;
        Ok(registry.is_some_and(|r| r.address == id.key))
    }
}
