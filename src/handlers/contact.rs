//! 联系人 CRUD 处理器

use crate::{
    error::AppError,
    middleware::AppState,
    models::contact::{ContactEnvelope, CreateContactRequest, UpdateContactRequest},
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use validator::Validate;

/// 列出联系人
pub async fn list_contacts(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let contacts = state.contacts.list().await?;

    Ok(Json(ContactEnvelope::new("Fetched contacts successfully!", contacts)))
}

/// 创建联系人
pub async fn create_contact(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateContactRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    req.validate()?;

    let contact = state.contacts.create(req).await?;
    tracing::info!(contact_id = contact.id, "Contact created");

    // 与列表、更新接口一致返回 200
    Ok(Json(ContactEnvelope::new("Contact created successfully!", contact)))
}

/// 获取单个联系人
pub async fn get_contact(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;

    let contact = state
        .contacts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("contact"))?;

    Ok(Json(ContactEnvelope::new("Fetched contact successfully!", contact)))
}

/// 更新联系人
pub async fn update_contact(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateContactRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;
    let Json(req) = payload?;
    req.validate()?;

    let contact = state
        .contacts
        .update(id, req)
        .await?
        .ok_or_else(|| AppError::not_found("contact"))?;

    tracing::info!(contact_id = contact.id, "Contact updated");

    Ok(Json(ContactEnvelope::new("Contact updated successfully!", contact)))
}

/// 删除联系人（软删除）
pub async fn delete_contact(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;

    if !state.contacts.soft_delete(id).await? {
        return Err(AppError::not_found("contact"));
    }

    tracing::info!(contact_id = id, "Contact deleted");

    Ok(Json(ContactEnvelope::message("Contact deleted successfully!")))
}
