// src/api/handlers/mod.rs
pub mod auth_handler;
pub mod incident_handler;
pub mod system_handler;
pub mod user_handler;
