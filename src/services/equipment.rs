//! Equipment service
//!
//! Owns serial number validation: every candidate of a request is checked
//! against the type's mask and against existing records before anything is
//! written, and all failures are reported together.

use std::collections::{HashMap, HashSet};

use validator::Validate;

use crate::{
    error::{AppError, AppResult, SerialNumberError, SerialNumberErrors},
    mask::SerialMask,
    models::{CreateEquipment, Equipment, EquipmentType, EquipmentView, SearchQuery, UpdateEquipment},
    repository::Repository,
};

#[derive(Clone)]
pub struct EquipmentService {
    repository: Repository,
}

impl EquipmentService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Compile a type's mask; failure means the regex engine refused the pattern
    fn compile_mask(equipment_type: &EquipmentType) -> AppResult<SerialMask> {
        SerialMask::compile(&equipment_type.serial_number_mask).map_err(|e| {
            AppError::Internal(format!(
                "Cannot compile mask of equipment type {}: {}",
                equipment_type.id, e
            ))
        })
    }

    /// Check candidates against the mask, then against storage.
    ///
    /// A mask failure short-circuits the storage check for that candidate.
    /// A serial repeated within the batch counts as already existing.
    async fn check_serial_numbers(
        &self,
        mask: &SerialMask,
        serial_numbers: &[String],
        exclude_id: Option<i32>,
    ) -> AppResult<SerialNumberErrors> {
        let mut errors = SerialNumberErrors::new();
        let mut seen = HashSet::new();

        for serial in serial_numbers {
            if errors.contains_key(serial) {
                continue;
            }
            let error = if !mask.is_match(serial) {
                Some(SerialNumberError::MaskMismatch {
                    serial: serial.clone(),
                    mask: mask.mask().to_string(),
                })
            } else if !seen.insert(serial.as_str())
                || self.repository.equipment.serial_exists(serial, exclude_id).await?
            {
                Some(SerialNumberError::Duplicate {
                    serial: serial.clone(),
                })
            } else {
                None
            };

            if let Some(error) = error {
                errors.insert(serial.clone(), error);
            }
        }

        Ok(errors)
    }

    /// Build the read representation of a record.
    ///
    /// `serial_numbers` is recomputed from storage on every call.
    pub async fn project_for_read(&self, equipment: Equipment) -> AppResult<EquipmentView> {
        let equipment_type = self
            .repository
            .equipment_types
            .get_by_id(equipment.type_id)
            .await?;
        self.project_with_type(equipment, equipment_type).await
    }

    async fn project_with_type(
        &self,
        equipment: Equipment,
        equipment_type: EquipmentType,
    ) -> AppResult<EquipmentView> {
        let serial_numbers = self
            .repository
            .equipment
            .list_by_group(equipment.type_id, &equipment.notation)
            .await?
            .into_iter()
            .map(|e| e.serial_number)
            .collect();

        Ok(EquipmentView {
            id: equipment.id,
            equipment_type,
            serial_numbers,
            notation: equipment.notation,
            created_at: equipment.created_at,
            updated_at: equipment.updated_at,
        })
    }

    /// Project several records, loading each referenced type once
    async fn project_all(&self, rows: Vec<Equipment>) -> AppResult<Vec<EquipmentView>> {
        let mut types: HashMap<i32, EquipmentType> = HashMap::new();
        let mut views = Vec::with_capacity(rows.len());
        for equipment in rows {
            let equipment_type = match types.get(&equipment.type_id) {
                Some(t) => t.clone(),
                None => {
                    let t = self
                        .repository
                        .equipment_types
                        .get_by_id(equipment.type_id)
                        .await?;
                    types.insert(t.id, t.clone());
                    t
                }
            };
            views.push(self.project_with_type(equipment, equipment_type).await?);
        }
        Ok(views)
    }

    /// Search equipment by type name or serial number
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, query: &SearchQuery, page: i64, per_page: i64) -> AppResult<(Vec<EquipmentView>, i64)> {
        let (rows, total) = self
            .repository
            .equipment
            .list(&query.terms(), page, per_page)
            .await?;
        Ok((self.project_all(rows).await?, total))
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<EquipmentView> {
        let equipment = self.repository.equipment.get_by_id(id).await?;
        self.project_for_read(equipment).await
    }

    /// Validate every serial number, then create one record per serial.
    ///
    /// Either all records are created or none; rejected serials are reported
    /// together in a single `AppError::SerialNumbers`.
    #[tracing::instrument(skip(self), fields(type_id = data.type_id, count = data.serial_number.len()))]
    pub async fn create(&self, data: &CreateEquipment) -> AppResult<Vec<EquipmentView>> {
        data.validate()?;

        let equipment_type = self
            .repository
            .equipment_types
            .get_by_id(data.type_id)
            .await?;
        let mask = Self::compile_mask(&equipment_type)?;

        let errors = self
            .check_serial_numbers(&mask, &data.serial_number, None)
            .await?;
        if !errors.is_empty() {
            tracing::info!(rejected = errors.len(), "Serial numbers rejected");
            return Err(AppError::SerialNumbers(errors));
        }

        if data.serial_number.is_empty() {
            return Ok(Vec::new());
        }

        let created = self
            .repository
            .equipment
            .create_batch(equipment_type.id, data.notation.trim(), &data.serial_number)
            .await?;
        tracing::info!(created = created.len(), "Equipment created");

        let mut views = Vec::with_capacity(created.len());
        for equipment in created {
            views.push(self.project_with_type(equipment, equipment_type.clone()).await?);
        }
        Ok(views)
    }

    /// Update a record. `partial` selects PATCH semantics; otherwise every
    /// field must be present (PUT).
    #[tracing::instrument(skip(self))]
    pub async fn update(&self, id: i32, data: &UpdateEquipment, partial: bool) -> AppResult<EquipmentView> {
        data.validate()?;

        if !partial
            && (data.serial_number.is_none() || data.type_id.is_none() || data.notation.is_none())
        {
            return Err(AppError::Validation(
                "serial_number, type and notation are required".to_string(),
            ));
        }

        let serial_number = match data.serial_number.as_deref() {
            None => None,
            Some([serial]) => Some(serial.clone()),
            Some(_) => {
                return Err(AppError::Validation(
                    "serial_number must contain exactly one element".to_string(),
                ))
            }
        };

        let current = self.repository.equipment.get_by_id(id).await?;
        let type_id = data.type_id.unwrap_or(current.type_id);
        let serial_number = serial_number.unwrap_or_else(|| current.serial_number.clone());
        let notation = data
            .notation
            .as_deref()
            .map(str::trim)
            .unwrap_or(&current.notation)
            .to_string();

        let equipment_type = self.repository.equipment_types.get_by_id(type_id).await?;
        let mask = Self::compile_mask(&equipment_type)?;

        let errors = self
            .check_serial_numbers(&mask, std::slice::from_ref(&serial_number), Some(id))
            .await?;
        if !errors.is_empty() {
            return Err(AppError::SerialNumbers(errors));
        }

        let updated = self
            .repository
            .equipment
            .update(id, type_id, &serial_number, &notation)
            .await?;
        self.project_with_type(updated, equipment_type).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.equipment.delete(id).await
    }
}
