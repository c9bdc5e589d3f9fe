//! Drone Client
//!
//! Main client for the Drone API, combining the token, the server URL
//! and the HTTP wrapper. Per-resource endpoints live in sibling modules
//! as further `impl DroneClient` blocks.

use super::http::DroneHttpClient;
use crate::config::ProviderConfig;
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

/// Main Drone client
#[derive(Clone)]
pub struct DroneClient {
    http: DroneHttpClient,
    server: Url,
    token: String,
}

impl std::fmt::Debug for DroneClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DroneClient")
            .field("server", &self.server.as_str())
            .finish_non_exhaustive()
    }
}

impl DroneClient {
    /// Create a new Drone client
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            http: DroneHttpClient::new()?,
            server: config.server.clone(),
            token: config.token.clone(),
        })
    }

    /// Create a client and verify the token against the current-user endpoint
    pub async fn connect(config: &ProviderConfig) -> Result<Self> {
        let client = Self::new(config)?;
        let user = client.self_user().await?;
        tracing::info!("Authenticated to {} as {}", client.server, user.login);
        Ok(client)
    }

    /// Server this client talks to
    pub fn server(&self) -> &Url {
        &self.server
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.http.get(url, &self.token).await
    }

    pub(crate) async fn post<B, T>(&self, url: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.http.post(url, &self.token, body).await
    }

    pub(crate) async fn patch<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.http.patch(url, &self.token, body).await
    }

    pub(crate) async fn delete(&self, url: &str) -> Result<()> {
        self.http.delete(url, &self.token).await
    }

    // =========================================================================
    // URL helpers
    // =========================================================================

    /// Build an API URL from a path relative to `/api`
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/api/{}", self.server.as_str().trim_end_matches('/'), path)
    }

    /// Build a repository URL
    pub fn repo_url(&self, owner: &str, name: &str) -> String {
        self.api_url(&format!(
            "repos/{}/{}",
            urlencoding::encode(owner),
            urlencoding::encode(name)
        ))
    }

    /// Build the secrets collection URL of a repository
    pub fn secrets_url(&self, owner: &str, name: &str) -> String {
        format!("{}/secrets", self.repo_url(owner, name))
    }

    /// Build a single secret URL
    pub fn secret_url(&self, owner: &str, name: &str, secret: &str) -> String {
        format!(
            "{}/{}",
            self.secrets_url(owner, name),
            urlencoding::encode(secret)
        )
    }

    /// Build the registry credentials collection URL of a repository
    pub fn registries_url(&self, owner: &str, name: &str) -> String {
        format!("{}/registry", self.repo_url(owner, name))
    }

    /// Build a single registry credential URL
    pub fn registry_url(&self, owner: &str, name: &str, address: &str) -> String {
        format!(
            "{}/{}",
            self.registries_url(owner, name),
            urlencoding::encode(address)
        )
    }

    /// Build a user URL
    pub fn user_url(&self, login: &str) -> String {
        self.api_url(&format!("users/{}", urlencoding::encode(login)))
    }
}
