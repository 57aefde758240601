pub mod file_system;
pub mod screenshot;
pub mod theme_archive;
