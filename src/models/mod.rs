//! Data models for the equipment registry

pub mod equipment;
pub mod equipment_type;
pub mod user;

use serde::Deserialize;
use utoipa::IntoParams;
use validator::ValidationError;

// Re-export commonly used types
pub use equipment::{CreateEquipment, Equipment, EquipmentView, UpdateEquipment};
pub use equipment_type::{CreateEquipmentType, EquipmentType, UpdateEquipmentType};
pub use user::{User, UserClaims};

/// Rejects text that is empty once surrounding whitespace is trimmed
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Search and pagination query parameters shared by list endpoints
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Terms separated by whitespace or commas; every term must match
    pub search: Option<String>,
    /// Page number (default: 1)
    pub page: Option<i64>,
    /// Items per page
    pub per_page: Option<i64>,
}

impl SearchQuery {
    /// Split the search string into non-empty terms
    pub fn terms(&self) -> Vec<String> {
        self.search
            .as_deref()
            .unwrap_or_default()
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Requested page size, defaulted and clamped to `1..=max`
    pub fn per_page(&self, default: i64, max: i64) -> i64 {
        self.per_page.unwrap_or(default).clamp(1, max.max(1))
    }
}
