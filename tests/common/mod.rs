//! In-memory Drone server for lifecycle tests
//!
//! Implements just enough of the Drone API behind a wiremock `Respond`
//! so a sequence of provider calls observes its own writes.

#![allow(dead_code)]

use drone_provider::config::ProviderConfig;
use drone_provider::drone::{DroneClient, Registry, Repo, RepoPatch, Secret, User, UserPatch, Visibility};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use wiremock::matchers::bearer_token;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const TOKEN: &str = "test-token";

type RepoKey = (String, String);
type ScopedKey = (String, String, String);

#[derive(Default)]
struct State {
    next_id: i64,
    repos: BTreeMap<RepoKey, Repo>,
    secrets: BTreeMap<ScopedKey, Secret>,
    secret_values: BTreeMap<ScopedKey, String>,
    registries: BTreeMap<ScopedKey, Registry>,
    registry_passwords: BTreeMap<ScopedKey, String>,
    users: BTreeMap<String, User>,
}

/// Stateful fake Drone server
#[derive(Clone, Default)]
pub struct FakeDrone {
    state: Arc<Mutex<State>>,
}

/// Start a mock server backed by a fresh [`FakeDrone`]
pub async fn start() -> (MockServer, FakeDrone) {
    let server = MockServer::start().await;
    let fake = FakeDrone::default();

    Mock::given(bearer_token(TOKEN))
        .respond_with(fake.clone())
        .mount(&server)
        .await;

    (server, fake)
}

/// Client for a mock server, constructed per test
pub fn client(server: &MockServer) -> DroneClient {
    let config = ProviderConfig::new(&server.uri(), TOKEN).unwrap();
    DroneClient::new(&config).unwrap()
}

/// Unwrap a `json!` object literal into an attribute bag
pub fn attrs(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

impl FakeDrone {
    pub fn secret_value(&self, owner: &str, repo: &str, name: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state.secret_values.get(&scoped(owner, repo, name)).cloned()
    }

    pub fn registry_password(&self, owner: &str, repo: &str, address: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .registry_passwords
            .get(&scoped(owner, repo, address))
            .cloned()
    }

    pub fn has_repo(&self, owner: &str, name: &str) -> bool {
        let state = self.state.lock().unwrap();
        state
            .repos
            .contains_key(&(owner.to_string(), name.to_string()))
    }
}

impl Respond for FakeDrone {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let segments: Vec<String> = request
            .url
            .path()
            .trim_start_matches('/')
            .split('/')
            .map(|s| urlencoding::decode(s).map(|s| s.into_owned()).unwrap_or_default())
            .collect();
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
        let method = request.method.as_str();

        let mut state = self.state.lock().unwrap();
        state.handle(method, &segments, &request.body)
    }
}

fn scoped(owner: &str, repo: &str, key: &str) -> ScopedKey {
    (owner.to_string(), repo.to_string(), key.to_string())
}

fn ok<T: Serialize>(body: &T) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

fn error(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({ "message": message }))
}

fn not_found() -> ResponseTemplate {
    error(404, "Not Found")
}

fn decode<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ResponseTemplate> {
    serde_json::from_slice(body).map_err(|e| error(400, &e.to_string()))
}

impl State {
    fn id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn handle(&mut self, method: &str, segments: &[&str], body: &[u8]) -> ResponseTemplate {
        let result = match segments {
            ["api", "user"] => Ok(ok(&json!({"login": "octocat", "admin": true, "active": true}))),
            ["api", "user", "repos"] => Ok(ok(&self.repos.values().collect::<Vec<_>>())),
            ["api", "repos", owner, name] => self.repo(method, owner, name, body),
            ["api", "repos", owner, name, "secrets", rest @ ..] => {
                self.secrets(method, owner, name, rest, body)
            }
            ["api", "repos", owner, name, "registry", rest @ ..] => {
                self.registries(method, owner, name, rest, body)
            }
            ["api", "users", rest @ ..] => self.users(method, rest, body),
            _ => Ok(not_found()),
        };

        result.unwrap_or_else(|response| response)
    }

    fn repo(
        &mut self,
        method: &str,
        owner: &str,
        name: &str,
        body: &[u8],
    ) -> Result<ResponseTemplate, ResponseTemplate> {
        let key = (owner.to_string(), name.to_string());

        match method {
            "GET" => self.repos.get(&key).map(ok).ok_or_else(not_found),
            "POST" => {
                let id = self.id();
                let repo = self.repos.entry(key).or_insert_with(|| Repo {
                    id,
                    owner: owner.to_string(),
                    name: name.to_string(),
                    slug: format!("{owner}/{name}"),
                    config_path: ".drone.yml".to_string(),
                    protected: false,
                    trusted: false,
                    timeout: 60,
                    visibility: Visibility::Public,
                    active: true,
                });
                Ok(ok(&*repo))
            }
            "PATCH" => {
                let patch: RepoPatch = decode(body)?;
                let repo = self.repos.get_mut(&key).ok_or_else(not_found)?;
                if let Some(config_path) = patch.config_path {
                    repo.config_path = config_path;
                }
                if let Some(protected) = patch.protected {
                    repo.protected = protected;
                }
                if let Some(trusted) = patch.trusted {
                    repo.trusted = trusted;
                }
                if let Some(timeout) = patch.timeout {
                    repo.timeout = timeout;
                }
                if let Some(visibility) = patch.visibility {
                    repo.visibility = visibility;
                }
                Ok(ok(&*repo))
            }
            "DELETE" => {
                self.repos.remove(&key).ok_or_else(not_found)?;
                self.secrets.retain(|(o, r, _), _| (o, r) != (&key.0, &key.1));
                self.registries.retain(|(o, r, _), _| (o, r) != (&key.0, &key.1));
                Ok(ResponseTemplate::new(204))
            }
            _ => Ok(error(405, "Method Not Allowed")),
        }
    }

    fn secrets(
        &mut self,
        method: &str,
        owner: &str,
        repo: &str,
        rest: &[&str],
        body: &[u8],
    ) -> Result<ResponseTemplate, ResponseTemplate> {
        if !self.repos.contains_key(&(owner.to_string(), repo.to_string())) {
            return Err(not_found());
        }

        match (method, rest) {
            ("GET", []) => {
                let list: Vec<&Secret> = self
                    .secrets
                    .iter()
                    .filter(|((o, r, _), _)| o == owner && r == repo)
                    .map(|(_, s)| s)
                    .collect();
                Ok(ok(&list))
            }
            ("POST", []) => {
                let mut secret: Secret = decode(body)?;
                let key = scoped(owner, repo, &secret.name);
                if self.secrets.contains_key(&key) {
                    return Err(error(409, "Secret already exists"));
                }
                if let Some(data) = secret.data.take() {
                    self.secret_values.insert(key.clone(), data);
                }
                secret.id = self.id();
                self.secrets.insert(key, secret.clone());
                Ok(ok(&secret))
            }
            ("GET", [name]) => self
                .secrets
                .get(&scoped(owner, repo, name))
                .map(ok)
                .ok_or_else(not_found),
            ("PATCH", [name]) => {
                let mut patch: Secret = decode(body)?;
                let key = scoped(owner, repo, name);
                let data = patch.data.take();
                let secret = self.secrets.get_mut(&key).ok_or_else(not_found)?;
                secret.pull_request = patch.pull_request;
                secret.events = patch.events;
                secret.images = patch.images;
                let response = ok(&*secret);
                if let Some(data) = data {
                    self.secret_values.insert(key, data);
                }
                Ok(response)
            }
            ("DELETE", [name]) => {
                let key = scoped(owner, repo, name);
                self.secrets.remove(&key).ok_or_else(not_found)?;
                self.secret_values.remove(&key);
                Ok(ResponseTemplate::new(204))
            }
            _ => Ok(error(405, "Method Not Allowed")),
        }
    }

    fn registries(
        &mut self,
        method: &str,
        owner: &str,
        repo: &str,
        rest: &[&str],
        body: &[u8],
    ) -> Result<ResponseTemplate, ResponseTemplate> {
        if !self.repos.contains_key(&(owner.to_string(), repo.to_string())) {
            return Err(not_found());
        }

        // Addresses may contain slashes once decoded
        let address = rest.join("/");

        match (method, address.is_empty()) {
            ("GET", true) => {
                let list: Vec<&Registry> = self
                    .registries
                    .iter()
                    .filter(|((o, r, _), _)| o == owner && r == repo)
                    .map(|(_, reg)| reg)
                    .collect();
                Ok(ok(&list))
            }
            ("POST", true) => {
                let mut registry: Registry = decode(body)?;
                let key = scoped(owner, repo, &registry.address);
                if self.registries.contains_key(&key) {
                    return Err(error(409, "Registry already exists"));
                }
                if let Some(password) = registry.password.take() {
                    self.registry_passwords.insert(key.clone(), password);
                }
                registry.id = self.id();
                self.registries.insert(key, registry.clone());
                Ok(ok(&registry))
            }
            ("GET", false) => self
                .registries
                .get(&scoped(owner, repo, &address))
                .map(ok)
                .ok_or_else(not_found),
            ("PATCH", false) => {
                let mut patch: Registry = decode(body)?;
                let key = scoped(owner, repo, &address);
                let password = patch.password.take();
                let registry = self.registries.get_mut(&key).ok_or_else(not_found)?;
                registry.username = patch.username;
                let response = ok(&*registry);
                if let Some(password) = password {
                    self.registry_passwords.insert(key, password);
                }
                Ok(response)
            }
            ("DELETE", false) => {
                let key = scoped(owner, repo, &address);
                self.registries.remove(&key).ok_or_else(not_found)?;
                self.registry_passwords.remove(&key);
                Ok(ResponseTemplate::new(204))
            }
            _ => Ok(error(405, "Method Not Allowed")),
        }
    }

    fn users(
        &mut self,
        method: &str,
        rest: &[&str],
        body: &[u8],
    ) -> Result<ResponseTemplate, ResponseTemplate> {
        match (method, rest) {
            ("GET", []) => Ok(ok(&self.users.values().collect::<Vec<_>>())),
            ("POST", []) => {
                let mut user: User = decode(body)?;
                if self.users.contains_key(&user.login) {
                    return Err(error(409, "User already exists"));
                }
                user.id = self.id();
                user.email = format!("{}@example.com", user.login);
                user.active = true;
                self.users.insert(user.login.clone(), user.clone());
                Ok(ok(&user))
            }
            ("GET", [login]) => self.users.get(*login).map(ok).ok_or_else(not_found),
            ("PATCH", [login]) => {
                let patch: UserPatch = decode(body)?;
                let user = self.users.get_mut(*login).ok_or_else(not_found)?;
                if let Some(admin) = patch.admin {
                    user.admin = admin;
                }
                if let Some(active) = patch.active {
                    user.active = active;
                }
                Ok(ok(&*user))
            }
            ("DELETE", [login]) => {
                self.users.remove(*login).ok_or_else(not_found)?;
                Ok(ResponseTemplate::new(204))
            }
            _ => Ok(error(405, "Method Not Allowed")),
        }
    }
}
