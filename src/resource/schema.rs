//! Schema Registry - Load resource schemas from JSON
//!
//! Attribute schemas for every resource type are embedded at compile time
//! and drive validation, default values, redaction of sensitive values and
//! carry-over of write-only attributes.

use super::identity::is_valid_repository;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Embedded schema JSON files (compiled into the binary)
const SCHEMA_FILES: &[&str] = &[include_str!("../resources/drone.json")];

/// Placeholder written in place of sensitive values
pub const REDACTED: &str = "<sensitive>";

/// Attribute value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
    Bool,
    Int,
    /// Unordered collection of strings
    Set,
}

impl AttributeType {
    fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Bool => value.is_boolean(),
            Self::Int => value.is_i64(),
            Self::Set => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Set => "set",
        }
    }
}

/// Extra syntactic check on string attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeFormat {
    /// `owner/name` without whitespace
    Repository,
}

/// Attribute definition from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeDef {
    #[serde(rename = "type")]
    pub kind: AttributeType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub optional: bool,
    /// Filled in from the server when not configured
    #[serde(default)]
    pub computed: bool,
    /// Changing the value requires replacing the resource
    #[serde(default)]
    pub force_new: bool,
    #[serde(default)]
    pub sensitive: bool,
    /// Accepted on write, never returned by the server
    #[serde(default)]
    pub write_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Case-insensitive allowed values (strings and set elements)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<AttributeFormat>,
    #[serde(default)]
    pub description: String,
}

impl AttributeDef {
    /// Reported by the server only; never configurable
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }
}

/// Resource schema from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSchema {
    pub display_name: String,
    /// Human-readable identity format
    pub identity: String,
    pub attributes: BTreeMap<String, AttributeDef>,
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceSchema>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<SchemaConfig> = OnceLock::new();

/// Get the schema registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static SchemaConfig {
    REGISTRY.get_or_init(|| {
        let mut final_config = SchemaConfig {
            resources: BTreeMap::new(),
        };

        for content in SCHEMA_FILES {
            let partial: SchemaConfig = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded schema JSON: {}", e));
            final_config.resources.extend(partial.resources);
        }

        final_config
    })
}

/// Get a resource schema by type name
pub fn get_schema(resource_type: &str) -> Result<&'static ResourceSchema> {
    get_registry()
        .resources
        .get(resource_type)
        .ok_or_else(|| Error::validation(resource_type, "unknown resource type"))
}

/// Get all registered resource type names (sorted)
pub fn resource_types() -> Vec<&'static str> {
    get_registry()
        .resources
        .keys()
        .map(|s| s.as_str())
        .collect()
}

impl ResourceSchema {
    /// Fill in defaults for missing attributes and lower-case values that are
    /// restricted to an allowed list
    pub fn normalize(&self, bag: &mut Map<String, Value>) {
        for (name, def) in &self.attributes {
            let missing = bag.get(name).map_or(true, Value::is_null);
            if missing {
                if let Some(default) = &def.default {
                    bag.insert(name.clone(), default.clone());
                }
                continue;
            }

            if def.allowed.is_empty() {
                continue;
            }
            if let Some(value) = bag.get_mut(name) {
                lowercase_strings(value);
            }
        }
    }

    /// Check a configured attribute bag against the schema
    pub fn validate(&self, resource_type: &str, bag: &Map<String, Value>) -> Result<()> {
        for (key, value) in bag {
            match self.attributes.get(key) {
                None => {
                    return Err(Error::validation(
                        resource_type,
                        format!("unsupported attribute {key:?}"),
                    ))
                }
                Some(def) if def.is_computed_only() && !value.is_null() => {
                    return Err(Error::validation(
                        resource_type,
                        format!("attribute {key:?} is computed and cannot be set"),
                    ))
                }
                Some(_) => {}
            }
        }

        for (name, def) in &self.attributes {
            let value = match bag.get(name) {
                Some(Value::Null) | None => {
                    if def.required {
                        return Err(Error::validation(
                            resource_type,
                            format!("missing required attribute {name:?}"),
                        ));
                    }
                    continue;
                }
                Some(value) => value,
            };

            if !def.kind.matches(value) {
                return Err(Error::validation(
                    resource_type,
                    format!("attribute {name:?} must be of type {}", def.kind.as_str()),
                ));
            }

            if !def.allowed.is_empty() {
                for item in string_values(value) {
                    let allowed = def.allowed.iter().any(|a| a.eq_ignore_ascii_case(item));
                    if !allowed {
                        return Err(Error::validation(
                            resource_type,
                            format!(
                                "attribute {name:?} has invalid value {item:?}, expected one of: {}",
                                def.allowed.join(", ")
                            ),
                        ));
                    }
                }
            }

            if def.format == Some(AttributeFormat::Repository) {
                let valid = value.as_str().is_some_and(is_valid_repository);
                if !valid {
                    return Err(Error::validation(
                        resource_type,
                        format!("invalid {name} (e.g. octocat/hello-world)"),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Copy of the bag with sensitive values replaced, for logging
    pub fn redact(&self, bag: &Map<String, Value>) -> Map<String, Value> {
        bag.iter()
            .map(|(name, value)| {
                let sensitive = self.attributes.get(name).is_some_and(|def| def.sensitive);
                if sensitive && !value.is_null() {
                    (name.clone(), Value::String(REDACTED.to_string()))
                } else {
                    (name.clone(), value.clone())
                }
            })
            .collect()
    }

    /// Force-new attributes whose value differs between two bags.
    /// Attributes missing from either side are not compared.
    pub fn force_new_changes(
        &self,
        old: &Map<String, Value>,
        new: &Map<String, Value>,
    ) -> Vec<String> {
        self.attributes
            .iter()
            .filter(|(_, def)| def.force_new)
            .filter_map(|(name, _)| match (old.get(name), new.get(name)) {
                (Some(a), Some(b)) if !a.is_null() && !b.is_null() && a != b => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Names of attributes the server never returns
    pub fn write_only_attributes(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .iter()
            .filter(|(_, def)| def.write_only)
            .map(|(name, _)| name.as_str())
    }
}

fn string_values(value: &Value) -> Vec<&str> {
    match value {
        Value::String(s) => vec![s.as_str()],
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn lowercase_strings(value: &mut Value) {
    match value {
        Value::String(s) => *s = s.to_lowercase(),
        Value::Array(items) => items.iter_mut().for_each(lowercase_strings),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_registry_loads_successfully() {
        assert_eq!(
            resource_types(),
            vec!["drone_registry", "drone_repo", "drone_secret", "drone_user"]
        );
    }

    #[test]
    fn test_unknown_resource_type() {
        assert!(matches!(
            get_schema("drone_cron"),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_normalize_applies_defaults_and_lowercases() {
        let schema = get_schema("drone_secret").unwrap();
        let mut attrs = bag(json!({"repository": "octocat/hello-world", "name": "a", "value": "b"}));
        schema.normalize(&mut attrs);
        assert_eq!(attrs["events"], json!(["push", "tag", "deployment"]));

        let mut attrs = bag(json!({"events": ["Push", "PULL_REQUEST"]}));
        schema.normalize(&mut attrs);
        assert_eq!(attrs["events"], json!(["push", "pull_request"]));
    }

    #[test]
    fn test_repo_visibility_defaults_to_private() {
        let schema = get_schema("drone_repo").unwrap();
        let mut attrs = bag(json!({"repository": "octocat/hello-world", "visibility": null}));
        schema.normalize(&mut attrs);
        assert_eq!(attrs["visibility"], "private");
    }

    #[test]
    fn test_validate_required_and_types() {
        let schema = get_schema("drone_registry").unwrap();

        let ok = bag(json!({
            "repository": "octocat/hello-world",
            "address": "docker.io",
            "username": "octocat",
            "password": "hunter2"
        }));
        assert!(schema.validate("drone_registry", &ok).is_ok());

        let mut missing = ok.clone();
        missing.remove("password");
        let err = schema.validate("drone_registry", &missing).unwrap_err();
        assert!(err.to_string().contains("password"));

        let mut wrong_type = ok.clone();
        wrong_type.insert("username".to_string(), json!(42));
        assert!(schema.validate("drone_registry", &wrong_type).is_err());

        let mut unknown = ok;
        unknown.insert("email".to_string(), json!("a@b.c"));
        let err = schema.validate("drone_registry", &unknown).unwrap_err();
        assert!(err.to_string().contains("unsupported attribute"));
    }

    #[test]
    fn test_validate_rejects_computed_only_attributes() {
        let schema = get_schema("drone_user").unwrap();

        let attrs = bag(json!({"login": "hubot", "admin": true}));
        assert!(schema.validate("drone_user", &attrs).is_ok());

        for (name, value) in [("email", json!("hubot@example.com")), ("active", json!(false))] {
            let mut attrs = attrs.clone();
            attrs.insert(name.to_string(), value);
            let err = schema.validate("drone_user", &attrs).unwrap_err();
            assert!(err.to_string().contains("is computed and cannot be set"));
        }

        // Optional computed attributes stay configurable
        let schema = get_schema("drone_repo").unwrap();
        let attrs = bag(json!({"repository": "octocat/hello-world", "timeout": 90}));
        assert!(schema.validate("drone_repo", &attrs).is_ok());
    }

    #[test]
    fn test_validate_allowed_values_and_format() {
        let schema = get_schema("drone_repo").unwrap();

        let attrs = bag(json!({"repository": "octocat/hello-world", "visibility": "Public"}));
        assert!(schema.validate("drone_repo", &attrs).is_ok());

        let attrs = bag(json!({"repository": "octocat/hello-world", "visibility": "secret"}));
        assert!(schema.validate("drone_repo", &attrs).is_err());

        let attrs = bag(json!({"repository": "octocat"}));
        let err = schema.validate("drone_repo", &attrs).unwrap_err();
        assert!(err.to_string().contains("octocat/hello-world"));
    }

    #[test]
    fn test_redact_masks_sensitive_values() {
        let schema = get_schema("drone_secret").unwrap();
        let attrs = bag(json!({"name": "password", "value": "1234567890"}));
        let redacted = schema.redact(&attrs);
        assert_eq!(redacted["name"], "password");
        assert_eq!(redacted["value"], REDACTED);
    }

    #[test]
    fn test_force_new_changes() {
        let schema = get_schema("drone_secret").unwrap();
        let old = bag(json!({"repository": "octocat/a", "name": "x", "value": "1"}));
        let new = bag(json!({"repository": "octocat/b", "name": "x", "value": "2"}));
        assert_eq!(schema.force_new_changes(&old, &new), vec!["repository"]);
        assert!(schema.force_new_changes(&Map::new(), &new).is_empty());
    }

    #[test]
    fn test_write_only_attributes() {
        let secret: Vec<_> = get_schema("drone_secret")
            .unwrap()
            .write_only_attributes()
            .collect();
        assert_eq!(secret, vec!["value"]);

        let user: Vec<_> = get_schema("drone_user")
            .unwrap()
            .write_only_attributes()
            .collect();
        assert!(user.is_empty());
    }
}
