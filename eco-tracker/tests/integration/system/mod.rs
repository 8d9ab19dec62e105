// tests/integration/system/mod.rs
mod health_tests;
