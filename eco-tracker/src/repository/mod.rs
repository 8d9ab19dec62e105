// src/repository/mod.rs
pub mod incident_repository;
pub mod user_repository;
