//! # Database Module
//!
//! PostgreSQL integration using tokio-postgres with a deadpool pool.
//! Includes connection management, models, and migrations.

pub mod connection;
pub mod migrations;
pub mod models;

pub use connection::{DatabaseConfig, DatabaseConnection};
