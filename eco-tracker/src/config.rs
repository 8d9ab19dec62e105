// src/config.rs
pub mod app;

pub use app::{AppConfig, InitialAdminConfig, PasswordConfig, ServerConfig};

// 互換エイリアス
pub type Config = AppConfig;
