//! Equipment type model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::not_blank;

/// Equipment type record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EquipmentType {
    pub id: i32,
    pub name: String,
    /// Serial number mask (see the `mask` module for placeholder characters)
    pub serial_number_mask: String,
}

/// Create equipment type request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateEquipmentType {
    #[validate(
        length(min = 1, max = 100, message = "Name must be 1 to 100 characters"),
        custom(function = "not_blank", message = "Name may not be blank")
    )]
    pub name: String,
    #[validate(length(max = 100, message = "Mask must be at most 100 characters"))]
    #[serde(default)]
    pub serial_number_mask: String,
}

/// Update equipment type request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateEquipmentType {
    #[validate(
        length(min = 1, max = 100, message = "Name must be 1 to 100 characters"),
        custom(function = "not_blank", message = "Name may not be blank")
    )]
    pub name: Option<String>,
    #[validate(length(max = 100, message = "Mask must be at most 100 characters"))]
    pub serial_number_mask: Option<String>,
}
