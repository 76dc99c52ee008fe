//! Business logic services

pub mod auth;
pub mod equipment;
pub mod equipment_types;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub equipment: equipment::EquipmentService,
    pub equipment_types: equipment_types::EquipmentTypesService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            equipment: equipment::EquipmentService::new(repository.clone()),
            equipment_types: equipment_types::EquipmentTypesService::new(repository),
        }
    }
}
