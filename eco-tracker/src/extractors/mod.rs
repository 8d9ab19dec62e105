// src/extractors/mod.rs

pub mod incident_submission;
pub mod json;
pub mod uuid;

pub use incident_submission::IncidentSubmission;
pub use json::JsonBody;
pub use uuid::ValidatedUuid;
