pub mod theme_catalog_repository;
pub mod theme_repository;
