//! `drone_user` - user accounts, identified by login

use super::{found, ResourceKind};
use crate::drone::{DroneClient, User, UserPatch};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Attributes of a `drone_user` resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserAttributes {
    pub login: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

pub fn to_request(attrs: &UserAttributes) -> User {
    User {
        login: attrs.login.clone(),
        admin: attrs.admin.unwrap_or(false),
        active: true,
        ..Default::default()
    }
}

pub fn from_response(user: &User) -> UserAttributes {
    UserAttributes {
        login: user.login.clone(),
        admin: Some(user.admin),
        email: Some(user.email.clone()),
        active: Some(user.active),
    }
}

pub struct UserResource;

impl ResourceKind for UserResource {
    const TYPE_NAME: &'static str = "drone_user";

    type Attributes = UserAttributes;

    fn identity(attrs: &UserAttributes) -> String {
        attrs.login.clone()
    }

    async fn create(client: &DroneClient, attrs: &UserAttributes) -> Result<UserAttributes> {
        let user = client.user_create(&to_request(attrs)).await?;
        Ok(from_response(&user))
    }

    async fn read(client: &DroneClient, id: &str) -> Result<UserAttributes> {
        let user = client.user(id).await?;
        Ok(from_response(&user))
    }

    async fn update(client: &DroneClient, attrs: &UserAttributes) -> Result<UserAttributes> {
        let patch = UserPatch {
            admin: attrs.admin,
            active: None,
        };
        let user = client.user_update(&attrs.login, &patch).await?;
        Ok(from_response(&user))
    }

    async fn delete(client: &DroneClient, id: &str) -> Result<()> {
        client.user_delete(id).await
    }

    async fn exists(client: &DroneClient, id: &str) -> Result<bool> {
        let user = found(client.user(id).await)?;
        Ok(user.is_some_and(|u| u.login == id))
    }
}
