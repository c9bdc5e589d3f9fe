//! Resource abstraction layer
//!
//! Maps the four Drone resource types onto the Create/Read/Update/Delete/
//! Exists lifecycle driven by the host.
//!
//! # Architecture
//!
//! - [`identity`] - Composite identity parsing (`owner/repo[/key]`)
//! - [`schema`] - Attribute schemas loaded from embedded JSON
//! - [`repo`], [`secret`], [`registry`], [`user`] - Typed attributes, the
//!   mapping to and from API records, and the per-type operations
//! - [`dispatch`] - Attribute-bag entry points used by the host
//!
//! # Example
//!
//! ```ignore
//! use drone_provider::resource::dispatch;
//! use serde_json::json;
//!
//! async fn enable(client: &DroneClient) -> drone_provider::error::Result<()> {
//!     let attrs = json!({"repository": "octocat/hello-world"});
//!     let state = dispatch::create(client, "drone_repo", attrs.as_object().unwrap()).await?;
//!     assert_eq!(state.id, "octocat/hello-world");
//!     Ok(())
//! }
//! ```

pub mod dispatch;
pub mod identity;
pub mod registry;
pub mod repo;
pub mod schema;
pub mod secret;
pub mod user;

use crate::drone::DroneClient;
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use dispatch::ResourceState;
pub use identity::{RepoId, ScopedId};
pub use registry::RegistryResource;
pub use repo::RepoResource;
pub use schema::{get_schema, resource_types};
pub use secret::SecretResource;
pub use user::UserResource;

/// One resource type's lifecycle against the Drone API.
///
/// `create` and `update` take identity from the attributes; the other
/// operations take the persisted composite identity.
#[allow(async_fn_in_trait)]
pub trait ResourceKind {
    /// Type name used by the host (e.g. `drone_repo`)
    const TYPE_NAME: &'static str;

    type Attributes: Serialize + DeserializeOwned;

    /// Composite identity of the resource described by `attrs`
    fn identity(attrs: &Self::Attributes) -> String;

    async fn create(client: &DroneClient, attrs: &Self::Attributes) -> Result<Self::Attributes>;

    async fn read(client: &DroneClient, id: &str) -> Result<Self::Attributes>;

    async fn update(client: &DroneClient, attrs: &Self::Attributes) -> Result<Self::Attributes>;

    async fn delete(client: &DroneClient, id: &str) -> Result<()>;

    /// True only when the fetch succeeds and the natural key matches
    async fn exists(client: &DroneClient, id: &str) -> Result<bool>;
}

/// Turn a 404 into `None` so existence checks can answer `false`
pub(crate) fn found<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}
