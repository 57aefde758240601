// Application layer - use cases on top of the domain repositories
pub mod dto;
pub mod errors;
pub mod services;
