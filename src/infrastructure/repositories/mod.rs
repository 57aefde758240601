pub mod file_theme_repository;
