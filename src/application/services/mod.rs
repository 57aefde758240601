pub mod catalog_service;
pub mod theme_service;
