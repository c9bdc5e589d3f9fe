//! `drone_repo` - repository activation and settings

use super::identity::RepoId;
use super::{found, ResourceKind};
use crate::drone::{DroneClient, Repo, RepoPatch, Visibility};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Attributes of a `drone_repo` resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoAttributes {
    pub repository: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trusted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

/// Build the patch sent on create and update. Unset attributes are left to
/// the server, except visibility which falls back to private.
pub fn to_request(attrs: &RepoAttributes) -> RepoPatch {
    RepoPatch {
        config_path: attrs.configuration.clone(),
        protected: attrs.protected,
        trusted: attrs.trusted,
        timeout: attrs.timeout,
        visibility: Some(attrs.visibility.unwrap_or_default()),
    }
}

pub fn from_response(repo: &Repo) -> RepoAttributes {
    RepoAttributes {
        repository: RepoId::new(&repo.owner, &repo.name).to_string(),
        configuration: Some(repo.config_path.clone()),
        protected: Some(repo.protected),
        trusted: Some(repo.trusted),
        timeout: Some(repo.timeout),
        visibility: Some(repo.visibility),
    }
}

pub struct RepoResource;

impl ResourceKind for RepoResource {
    const TYPE_NAME: &'static str = "drone_repo";

    type Attributes = RepoAttributes;

    fn identity(attrs: &RepoAttributes) -> String {
        attrs.repository.clone()
    }

    async fn create(client: &DroneClient, attrs: &RepoAttributes) -> Result<RepoAttributes> {
        let id: RepoId = attrs.repository.parse()?;

        // A repository has to be activated before its settings can be patched
        client.repo_enable(&id.owner, &id.name).await?;
        let repo = client
            .repo_update(&id.owner, &id.name, &to_request(attrs))
            .await?;

        Ok(from_response(&repo))
    }

    async fn read(client: &DroneClient, id: &str) -> Result<RepoAttributes> {
        let id: RepoId = id.parse()?;
        let repo = client.repo(&id.owner, &id.name).await?;
        Ok(from_response(&repo))
    }

    async fn update(client: &DroneClient, attrs: &RepoAttributes) -> Result<RepoAttributes> {
        let id: RepoId = attrs.repository.parse()?;
        let repo = client
            .repo_update(&id.owner, &id.name, &to_request(attrs))
            .await?;
        Ok(from_response(&repo))
    }

    async fn delete(client: &DroneClient, id: &str) -> Result<()> {
        let id: RepoId = id.parse()?;
        client.repo_delete(&id.owner, &id.name).await
    }

    async fn exists(client: &DroneClient, id: &str) -> Result<bool> {
        let id: RepoId = id.parse()?;
        let repo = found(client.repo(&id.owner, &id.name).await)?;
        Ok(repo.is_some_and(|r| r.owner == id.owner && r.name == id.name))
    }
}
