//! Drone Secrets
//!
//! Repository-scoped secrets. The server never returns `data`.

use super::client::DroneClient;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Build event a secret may be exposed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    Push,
    PullRequest,
    Tag,
    Deployment,
}

impl Event {
    pub const ALL: [Event; 4] = [Event::Push, Event::PullRequest, Event::Tag, Event::Deployment];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::PullRequest => "pull_request",
            Self::Tag => "tag",
            Self::Deployment => "deployment",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Secret as sent to and returned by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Secret {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default)]
    pub pull_request: bool,
    #[serde(default, rename = "event")]
    pub events: Vec<Event>,
    #[serde(default, rename = "image")]
    pub images: Vec<String>,
}

fn is_zero(id: &i64) -> bool {
    *id == 0
}

impl DroneClient {
    /// Fetch a single secret (without its value)
    pub async fn secret(&self, owner: &str, repo: &str, name: &str) -> Result<Secret> {
        self.get(&self.secret_url(owner, repo, name)).await
    }

    /// List the secrets of a repository
    pub async fn secret_list(&self, owner: &str, repo: &str) -> Result<Vec<Secret>> {
        self.get(&self.secrets_url(owner, repo)).await
    }

    /// Create a secret
    pub async fn secret_create(&self, owner: &str, repo: &str, secret: &Secret) -> Result<Secret> {
        self.post(&self.secrets_url(owner, repo), Some(secret)).await
    }

    /// Update the secret named by `secret.name`
    pub async fn secret_update(&self, owner: &str, repo: &str, secret: &Secret) -> Result<Secret> {
        self.patch(&self.secret_url(owner, repo, &secret.name), secret)
            .await
    }

    /// Delete a secret
    pub async fn secret_delete(&self, owner: &str, repo: &str, name: &str) -> Result<()> {
        self.delete(&self.secret_url(owner, repo, name)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_wire_names() {
        assert_eq!(
            serde_json::to_value(Event::PullRequest).unwrap(),
            json!("pull_request")
        );
        assert_eq!(Event::Deployment.to_string(), "deployment");
    }

    #[test]
    fn test_secret_without_data_omits_field() {
        let secret = Secret {
            name: "password".to_string(),
            events: vec![Event::Push],
            ..Default::default()
        };
        let value = serde_json::to_value(&secret).unwrap();
        assert!(value.get("data").is_none());
        assert!(value.get("id").is_none());
        assert_eq!(value["event"], json!(["push"]));
    }
}
