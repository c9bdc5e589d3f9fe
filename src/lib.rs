//! Drone CI resource provider
//!
//! Manages Drone repositories, secrets, registry credentials and users
//! through a Create/Read/Update/Delete/Exists lifecycle. The host hands in
//! flat attribute bags; [`resource::dispatch`] validates them, calls the
//! typed [`drone::DroneClient`] and returns the state to persist.

pub mod config;
pub mod drone;
pub mod error;
pub mod resource;

/// Version injected at compile time via DRONE_PROVIDER_VERSION env var
/// (set by CI/CD), or "dev" for local builds.
pub const VERSION: &str = match option_env!("DRONE_PROVIDER_VERSION") {
    Some(v) => v,
    None => "dev",
};
