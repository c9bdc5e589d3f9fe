//! `drone_secret` - repository secrets
//!
//! The secret value is write-only: it is sent on create and update but the
//! server never returns it, so [`from_response`] leaves it unset.

use super::identity::{RepoId, ScopedId};
use super::{found, ResourceKind};
use crate::drone::{DroneClient, Event, Secret};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Events a secret is exposed to when none are configured
pub const DEFAULT_EVENTS: [Event; 3] = [Event::Push, Event::Tag, Event::Deployment];

/// Attributes of a `drone_secret` resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretAttributes {
    pub repository: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_pull_requests: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<BTreeSet<Event>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<BTreeSet<String>>,
}

pub fn to_request(attrs: &SecretAttributes) -> Secret {
    let events = match &attrs.events {
        Some(events) => events.iter().copied().collect(),
        None => DEFAULT_EVENTS.to_vec(),
    };

    Secret {
        id: 0,
        name: attrs.name.clone(),
        data: attrs.value.clone(),
        pull_request: attrs.allow_pull_requests.unwrap_or(false),
        events,
        images: attrs.images.iter().flatten().cloned().collect(),
    }
}

pub fn from_response(repo: &RepoId, secret: &Secret) -> SecretAttributes {
    SecretAttributes {
        repository: repo.to_string(),
        name: secret.name.clone(),
        value: None,
        allow_pull_requests: Some(secret.pull_request),
        events: Some(secret.events.iter().copied().collect()),
        images: Some(secret.images.iter().cloned().collect()),
    }
}

pub struct SecretResource;

impl ResourceKind for SecretResource {
    const TYPE_NAME: &'static str = "drone_secret";

    type Attributes = SecretAttributes;

    fn identity(attrs: &SecretAttributes) -> String {
        format!("{}/{}", attrs.repository, attrs.name)
    }

    async fn create(client: &DroneClient, attrs: &SecretAttributes) -> Result<SecretAttributes> {
        let repo: RepoId = attrs.repository.parse()?;
        let secret = client
            .secret_create(&repo.owner, &repo.name, &to_request(attrs))
            .await?;
        Ok(from_response(&repo, &secret))
    }

    async fn read(client: &DroneClient, id: &str) -> Result<SecretAttributes> {
        let id: ScopedId = id.parse()?;
        let secret = client.secret(&id.owner, &id.repo, &id.key).await?;
        Ok(from_response(&id.repo_id(), &secret))
    }

    async fn update(client: &DroneClient, attrs: &SecretAttributes) -> Result<SecretAttributes> {
        let repo: RepoId = attrs.repository.parse()?;
        let secret = client
            .secret_update(&repo.owner, &repo.name, &to_request(attrs))
            .await?;
        Ok(from_response(&repo, &secret))
    }

    async fn delete(client: &DroneClient, id: &str) -> Result<()> {
        let id: ScopedId = id.parse()?;
        client.secret_delete(&id.owner, &id.repo, &id.key).await
    }

    async fn exists(client: &DroneClient, id: &str) -> Result<bool> {
        let id: ScopedId = id.parse()?;
        let secret = found(client.secret(&id.owner, &id.repo, &id.key).await)?;
        Ok(secret.is_some_and(|s| s.name == id.key))
    }
}
