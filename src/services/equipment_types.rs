//! Equipment types service

use validator::Validate;

use crate::{
    error::AppResult,
    models::{CreateEquipmentType, EquipmentType, SearchQuery, UpdateEquipmentType},
    repository::Repository,
};

#[derive(Clone)]
pub struct EquipmentTypesService {
    repository: Repository,
}

impl EquipmentTypesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search types by name or mask
    pub async fn list(&self, query: &SearchQuery, page: i64, per_page: i64) -> AppResult<(Vec<EquipmentType>, i64)> {
        self.repository
            .equipment_types
            .list(&query.terms(), page, per_page)
            .await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<EquipmentType> {
        self.repository.equipment_types.get_by_id(id).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn create(&self, data: &CreateEquipmentType) -> AppResult<EquipmentType> {
        data.validate()?;
        self.repository
            .equipment_types
            .create(data.name.trim(), &data.serial_number_mask)
            .await
    }

    /// Update name and/or mask. Existing equipment is not re-validated.
    #[tracing::instrument(skip(self))]
    pub async fn update(&self, id: i32, data: &UpdateEquipmentType) -> AppResult<EquipmentType> {
        data.validate()?;
        let current = self.repository.equipment_types.get_by_id(id).await?;
        let name = data.name.as_deref().map(str::trim).unwrap_or(&current.name);
        let mask = data
            .serial_number_mask
            .as_deref()
            .unwrap_or(&current.serial_number_mask);
        self.repository.equipment_types.update(id, name, mask).await
    }

    /// Delete a type and, with it, all of its equipment
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.equipment_types.delete(id).await?;
        tracing::info!(type_id = id, "Equipment type deleted");
        Ok(())
    }
}
