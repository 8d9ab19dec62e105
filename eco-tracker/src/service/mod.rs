// src/service/mod.rs
pub mod auth_service;
pub mod incident_service;
pub mod storage_service;
pub mod user_service;
