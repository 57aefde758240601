pub mod http_theme_catalog_repository;
