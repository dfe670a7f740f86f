// ABOUTME: Library root for renova - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod backup;
pub mod config;
pub mod deps;
pub mod error;
pub mod frontend;
pub mod fsops;
pub mod health;
pub mod hooks;
pub mod output;
pub mod scripts;
pub mod service;
pub mod sync;
pub mod types;
pub mod update;
