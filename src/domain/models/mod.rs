pub mod catalog;
pub mod theme;
