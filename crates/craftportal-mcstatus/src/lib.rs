//! Client for the public Minecraft server status API.
//!
//! Queries `<base>/api/status/<ip>:<port>` and normalizes the upstream payload
//! into [`craftportal_core::ServerStatus`].

pub mod client;
pub mod error;
pub(crate) mod types;

pub use client::McStatusClient;
pub use error::StatusError;
