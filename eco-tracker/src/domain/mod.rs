// src/domain/mod.rs
pub mod geo_point;
pub mod incident_category;
pub mod incident_model;
pub mod incident_severity;
pub mod incident_status;
pub mod incident_validation;
pub mod user_model;
pub mod user_role;
