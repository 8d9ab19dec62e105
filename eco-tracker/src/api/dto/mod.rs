// src/api/dto/mod.rs
pub mod auth_dto;
pub mod incident_dto;
pub mod user_dto;
