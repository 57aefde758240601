// Infrastructure layer - implements interfaces defined in the domain layer
pub mod apis;
pub mod config;
pub mod http_client;
pub mod logging;
pub mod persistence;
pub mod repositories;
