//! Equipment type API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{CreateEquipmentType, EquipmentType, SearchQuery, UpdateEquipmentType},
};

use super::{pagination, AppJson, AuthenticatedUser, PaginatedResponse};

/// List equipment types, searching name and mask
#[utoipa::path(
    get,
    path = "/equipment-type",
    tag = "equipment-type",
    security(("bearer_auth" = [])),
    params(SearchQuery),
    responses(
        (status = 200, description = "Equipment type list", body = crate::api::EquipmentTypePage),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_equipment_types(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<PaginatedResponse<EquipmentType>>> {
    let (page, per_page) = pagination(&state, &query);
    let (items, total) = state
        .services
        .equipment_types
        .list(&query, page, per_page)
        .await?;
    Ok(Json(PaginatedResponse {
        items,
        total,
        page,
        per_page,
    }))
}

/// Get equipment type by ID
#[utoipa::path(
    get,
    path = "/equipment-type/{id}",
    tag = "equipment-type",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment type ID")),
    responses(
        (status = 200, description = "Equipment type details", body = EquipmentType),
        (status = 404, description = "Equipment type not found")
    )
)]
pub async fn get_equipment_type(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<EquipmentType>> {
    let equipment_type = state.services.equipment_types.get_by_id(id).await?;
    Ok(Json(equipment_type))
}

/// Create an equipment type (admin only)
#[utoipa::path(
    post,
    path = "/equipment-type",
    tag = "equipment-type",
    security(("bearer_auth" = [])),
    request_body = CreateEquipmentType,
    responses(
        (status = 201, description = "Equipment type created", body = EquipmentType),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn create_equipment_type(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppJson(data): AppJson<CreateEquipmentType>,
) -> AppResult<(StatusCode, Json<EquipmentType>)> {
    claims.require_admin()?;
    let equipment_type = state.services.equipment_types.create(&data).await?;
    Ok((StatusCode::CREATED, Json(equipment_type)))
}

/// Update an equipment type (admin only)
#[utoipa::path(
    put,
    path = "/equipment-type/{id}",
    tag = "equipment-type",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment type ID")),
    request_body = UpdateEquipmentType,
    responses(
        (status = 200, description = "Equipment type updated", body = EquipmentType),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn update_equipment_type(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    AppJson(data): AppJson<UpdateEquipmentType>,
) -> AppResult<Json<EquipmentType>> {
    claims.require_admin()?;
    let equipment_type = state.services.equipment_types.update(id, &data).await?;
    Ok(Json(equipment_type))
}

/// Delete an equipment type and all of its equipment (admin only)
#[utoipa::path(
    delete,
    path = "/equipment-type/{id}",
    tag = "equipment-type",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment type ID")),
    responses(
        (status = 204, description = "Equipment type deleted"),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn delete_equipment_type(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;
    state.services.equipment_types.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
