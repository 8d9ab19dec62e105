// tests/integration/users/mod.rs
mod account_tests;
mod ranking_tests;
