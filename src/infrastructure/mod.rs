//! Infrastructure layer - Framework implementations
//!
//! This layer contains:
//! - Database connection and schema (db)
//! - HTTP application assembly (server)
//! - Configuration loading (config)
//! - Bearer-token identity (auth)
//! - Cover image storage (media)
//! - Repository implementations (repositories)
//! - Application state (state)

pub mod auth;
pub mod config;
pub mod db;
pub mod media;
pub mod repositories;
pub mod server;
pub mod state;

pub use repositories::*;
pub use state::{ApiSettings, AppState};
