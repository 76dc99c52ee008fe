//! Equipment Registry
//!
//! REST JSON API tracking equipment by serial number. Each equipment type
//! carries a serial number mask; equipment is created in validated batches
//! and read back grouped by type and notation.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod mask;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
