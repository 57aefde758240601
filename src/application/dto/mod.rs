// Data Transfer Objects
pub mod catalog_dto;
pub mod theme_dto;
