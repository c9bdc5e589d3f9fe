//! Resource Dispatch
//!
//! Attribute-bag entry points for the host. Each call validates the bag
//! against the schema, routes on the resource type name to the typed
//! handler and turns the result back into a bag plus composite identity.

use super::schema::{get_schema, ResourceSchema};
use super::{RegistryResource, RepoResource, ResourceKind, SecretResource, UserResource};
use crate::drone::DroneClient;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

/// Flat attribute bag as exchanged with the host
pub type Attributes = Map<String, Value>;

/// What the host persists for a resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    pub id: String,
    #[serde(default)]
    pub attributes: Attributes,
}

impl ResourceState {
    /// State carrying only an identity, as used for imports
    pub fn from_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Attributes::new(),
        }
    }
}

/// Registered resource types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Repo,
    Secret,
    Registry,
    User,
}

impl Kind {
    pub const ALL: [Kind; 4] = [Kind::Repo, Kind::Secret, Kind::Registry, Kind::User];

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Repo => RepoResource::TYPE_NAME,
            Self::Secret => SecretResource::TYPE_NAME,
            Self::Registry => RegistryResource::TYPE_NAME,
            Self::User => UserResource::TYPE_NAME,
        }
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.type_name() == s)
            .ok_or_else(|| Error::validation(s, "unknown resource type"))
    }
}

/// Create a resource from its configured attributes
pub async fn create(
    client: &DroneClient,
    resource_type: &str,
    attrs: &Attributes,
) -> Result<ResourceState> {
    let kind: Kind = resource_type.parse()?;
    let schema = get_schema(resource_type)?;
    let bag = prepare(schema, resource_type, attrs)?;

    let redacted = Value::Object(schema.redact(&bag));
    tracing::info!("create: type={}, attributes={}", resource_type, redacted);

    let mut state = match kind {
        Kind::Repo => create_as::<RepoResource>(client, &bag).await?,
        Kind::Secret => create_as::<SecretResource>(client, &bag).await?,
        Kind::Registry => create_as::<RegistryResource>(client, &bag).await?,
        Kind::User => create_as::<UserResource>(client, &bag).await?,
    };

    carry_write_only(schema, &mut state, &bag);
    Ok(state)
}

/// Refresh a resource from the server using its persisted identity
pub async fn read(
    client: &DroneClient,
    resource_type: &str,
    prior: &ResourceState,
) -> Result<ResourceState> {
    let kind: Kind = resource_type.parse()?;
    let schema = get_schema(resource_type)?;

    tracing::info!("read: type={}, id={}", resource_type, prior.id);

    let mut state = match kind {
        Kind::Repo => read_as::<RepoResource>(client, &prior.id).await?,
        Kind::Secret => read_as::<SecretResource>(client, &prior.id).await?,
        Kind::Registry => read_as::<RegistryResource>(client, &prior.id).await?,
        Kind::User => read_as::<UserResource>(client, &prior.id).await?,
    };

    carry_write_only(schema, &mut state, &prior.attributes);
    Ok(state)
}

/// Apply configured attributes to an existing resource
pub async fn update(
    client: &DroneClient,
    resource_type: &str,
    prior: &ResourceState,
    attrs: &Attributes,
) -> Result<ResourceState> {
    let kind: Kind = resource_type.parse()?;
    let schema = get_schema(resource_type)?;
    let bag = prepare(schema, resource_type, attrs)?;

    let replaced = schema.force_new_changes(&prior.attributes, &bag);
    if !replaced.is_empty() {
        return Err(Error::validation(
            resource_type,
            format!(
                "changing {} requires replacing the resource",
                replaced.join(", ")
            ),
        ));
    }

    let redacted = Value::Object(schema.redact(&bag));
    tracing::info!(
        "update: type={}, id={}, attributes={}",
        resource_type,
        prior.id,
        redacted
    );

    let mut state = match kind {
        Kind::Repo => update_as::<RepoResource>(client, &prior.id, &bag).await?,
        Kind::Secret => update_as::<SecretResource>(client, &prior.id, &bag).await?,
        Kind::Registry => update_as::<RegistryResource>(client, &prior.id, &bag).await?,
        Kind::User => update_as::<UserResource>(client, &prior.id, &bag).await?,
    };

    carry_write_only(schema, &mut state, &bag);
    Ok(state)
}

/// Delete a resource by identity
pub async fn delete(client: &DroneClient, resource_type: &str, id: &str) -> Result<()> {
    let kind: Kind = resource_type.parse()?;

    tracing::info!("delete: type={}, id={}", resource_type, id);

    match kind {
        Kind::Repo => RepoResource::delete(client, id).await,
        Kind::Secret => SecretResource::delete(client, id).await,
        Kind::Registry => RegistryResource::delete(client, id).await,
        Kind::User => UserResource::delete(client, id).await,
    }
}

/// Check whether the resource behind an identity still exists
pub async fn exists(client: &DroneClient, resource_type: &str, id: &str) -> Result<bool> {
    let kind: Kind = resource_type.parse()?;

    let exists = match kind {
        Kind::Repo => RepoResource::exists(client, id).await?,
        Kind::Secret => SecretResource::exists(client, id).await?,
        Kind::Registry => RegistryResource::exists(client, id).await?,
        Kind::User => UserResource::exists(client, id).await?,
    };

    tracing::debug!("exists: type={}, id={} -> {}", resource_type, id, exists);
    Ok(exists)
}

/// Adopt an existing remote resource by identity
pub async fn import(client: &DroneClient, resource_type: &str, id: &str) -> Result<ResourceState> {
    read(client, resource_type, &ResourceState::from_id(id)).await
}

fn prepare(schema: &ResourceSchema, resource_type: &str, attrs: &Attributes) -> Result<Attributes> {
    let mut bag = attrs.clone();
    schema.normalize(&mut bag);
    schema.validate(resource_type, &bag)?;
    Ok(bag)
}

fn decode<K: ResourceKind>(bag: &Attributes) -> Result<K::Attributes> {
    // Nulls mean "not set"; drop them so optional fields fall back to defaults
    let bag: Attributes = bag
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    serde_json::from_value(Value::Object(bag))
        .map_err(|e| Error::validation(K::TYPE_NAME, e.to_string()))
}

fn encode<K: ResourceKind>(attrs: &K::Attributes) -> Result<ResourceState> {
    let value =
        serde_json::to_value(attrs).map_err(|e| Error::validation(K::TYPE_NAME, e.to_string()))?;

    match value {
        Value::Object(attributes) => Ok(ResourceState {
            id: K::identity(attrs),
            attributes,
        }),
        _ => Err(Error::validation(
            K::TYPE_NAME,
            "attributes must serialize to an object",
        )),
    }
}

async fn create_as<K: ResourceKind>(client: &DroneClient, bag: &Attributes) -> Result<ResourceState> {
    let attrs = decode::<K>(bag)?;
    encode::<K>(&K::create(client, &attrs).await?)
}

async fn read_as<K: ResourceKind>(client: &DroneClient, id: &str) -> Result<ResourceState> {
    encode::<K>(&K::read(client, id).await?)
}

/// Updates target the resource named by the attributes, which must be the
/// one behind the persisted identity
async fn update_as<K: ResourceKind>(
    client: &DroneClient,
    id: &str,
    bag: &Attributes,
) -> Result<ResourceState> {
    let attrs = decode::<K>(bag)?;

    let target = K::identity(&attrs);
    if !id.is_empty() && target != id {
        return Err(Error::validation(
            K::TYPE_NAME,
            format!("attributes describe {target:?} but the resource is {id:?}"),
        ));
    }

    encode::<K>(&K::update(client, &attrs).await?)
}

/// The server never returns write-only attributes; keep whatever the host
/// supplied so persisted state stays in sync with configuration.
fn carry_write_only(schema: &ResourceSchema, state: &mut ResourceState, source: &Attributes) {
    for name in schema.write_only_attributes() {
        let present = state.attributes.get(name).is_some_and(|v| !v.is_null());
        if present {
            continue;
        }
        if let Some(value) = source.get(name).filter(|v| !v.is_null()) {
            state.attributes.insert(name.to_string(), value.clone());
        }
    }
}
