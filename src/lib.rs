pub mod api;
pub mod domain;
pub mod infrastructure;
pub mod models;
pub mod serializers;

pub use infrastructure::auth;
pub use infrastructure::config;
pub use infrastructure::db;
pub use infrastructure::media;
pub use infrastructure::server;
