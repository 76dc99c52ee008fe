//! Equipment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{equipment_type::EquipmentType, not_blank};

/// Equipment record as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Equipment {
    pub id: i32,
    /// Equipment type ID
    #[serde(rename = "type")]
    pub type_id: i32,
    /// Serial number, unique across all equipment
    pub serial_number: String,
    /// Free-text annotation
    pub notation: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Read representation of an equipment record.
///
/// `serial_numbers` lists every serial number sharing this record's type and notation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EquipmentView {
    pub id: i32,
    #[serde(rename = "type")]
    pub equipment_type: EquipmentType,
    pub serial_numbers: Vec<String>,
    pub notation: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create equipment request (one record per serial number)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateEquipment {
    /// Serial numbers to register
    pub serial_number: Vec<String>,
    /// Equipment type ID
    #[serde(rename = "type")]
    pub type_id: i32,
    #[validate(custom(function = "not_blank", message = "Notation may not be blank"))]
    pub notation: String,
}

/// Update equipment request.
///
/// PUT requires every field, PATCH any subset. `serial_number` keeps the list
/// shape of the create request but must hold exactly one element.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateEquipment {
    pub serial_number: Option<Vec<String>>,
    #[serde(rename = "type")]
    pub type_id: Option<i32>,
    #[validate(custom(function = "not_blank", message = "Notation may not be blank"))]
    pub notation: Option<String>,
}
