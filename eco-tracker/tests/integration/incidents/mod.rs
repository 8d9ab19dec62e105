// tests/integration/incidents/mod.rs
mod admin_tests;
mod create_tests;
mod feed_tests;
mod ownership_tests;
mod upload_tests;
