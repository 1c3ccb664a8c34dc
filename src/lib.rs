//! Docflow - document approval workflow with audit trail and expiration

pub mod accounts;
pub mod api;
pub mod blob;
pub mod config;
pub mod db;
pub mod delegation;
pub mod error;
pub mod expiration;
pub mod identity;
pub mod lifecycle;
pub mod models;
pub mod store;
pub mod telemetry;

pub use api::AppState;
