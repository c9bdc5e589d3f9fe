//! Drone API interaction module
//!
//! This module provides the typed client the resource handlers call into.
//!
//! # Module Structure
//!
//! - [`client`] - Main Drone client (server URL, token, URL helpers)
//! - [`http`] - HTTP utilities for REST API calls
//! - [`repos`] - Repository records and endpoints
//! - [`secrets`] - Secret records and endpoints
//! - [`registries`] - Registry credential records and endpoints
//! - [`users`] - User records and endpoints
//!
//! # Example
//!
//! ```ignore
//! use drone_provider::config::ProviderConfig;
//! use drone_provider::drone::DroneClient;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let config = ProviderConfig::new("https://drone.example.com", "token")?;
//!     let client = DroneClient::new(&config)?;
//!     let repo = client.repo("octocat", "hello-world").await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod http;
pub mod registries;
pub mod repos;
pub mod secrets;
pub mod users;

pub use client::DroneClient;
pub use registries::Registry;
pub use repos::{Repo, RepoPatch, Visibility};
pub use secrets::{Event, Secret};
pub use users::{User, UserPatch};
