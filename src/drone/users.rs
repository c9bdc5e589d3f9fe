//! Drone Users

use super::client::DroneClient;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// User account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub id: i64,
    pub login: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub active: bool,
}

/// Partial user update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

fn is_zero(id: &i64) -> bool {
    *id == 0
}

impl DroneClient {
    /// Fetch the user owning the API token
    pub async fn self_user(&self) -> Result<User> {
        self.get(&self.api_url("user")).await
    }

    /// Fetch a user by login
    pub async fn user(&self, login: &str) -> Result<User> {
        self.get(&self.user_url(login)).await
    }

    /// List all users (admin only)
    pub async fn user_list(&self) -> Result<Vec<User>> {
        self.get(&self.api_url("users")).await
    }

    /// Create a user
    pub async fn user_create(&self, user: &User) -> Result<User> {
        self.post(&self.api_url("users"), Some(user)).await
    }

    /// Apply a partial update to a user
    pub async fn user_update(&self, login: &str, patch: &UserPatch) -> Result<User> {
        self.patch(&self.user_url(login), patch).await
    }

    /// Delete a user
    pub async fn user_delete(&self, login: &str) -> Result<()> {
        self.delete(&self.user_url(login)).await
    }
}
