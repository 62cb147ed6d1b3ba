#![doc = "The `turify_tasks` library crate."]
#![doc = ""]
#![doc = "Contains the session-gated REST backend (configuration, SQLite access,"]
#![doc = "authentication, repositories and route handlers) and the `client` module:"]
#![doc = "a reactive task store with filters, counts and optimistic updates that"]
#![doc = "talks to the backend over HTTP. The binary (`main.rs`) wires the server."]

pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;

pub use crate::config::Config;
pub use crate::error::AppError;
