// Presentation layer - HTTP surface over the application services
pub mod errors;
pub mod routes;
