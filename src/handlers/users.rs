// src/handlers/users.rs

use axum::{extract::State, Json};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AdminUser, client_info::ClientInfo, i18n::Locale},
    models::auth::{MessageResponse, ToggleUserStatusPayload, User},
};

// GET /api/admin/users
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Users",
    responses(
        (status = 200, description = "Todos os usuários, mais recentes primeiro", body = Vec<User>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = app_state.user_service
        .list_users()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(users))
}

// POST /api/admin/users/toggle-status
#[utoipa::path(
    post,
    path = "/api/admin/users/toggle-status",
    tag = "Users",
    request_body = ToggleUserStatusPayload,
    responses(
        (status = 200, description = "Status alterado", body = MessageResponse),
        (status = 403, description = "Administradores não podem ser alterados"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn toggle_status(
    State(app_state): State<AppState>,
    locale: Locale,
    AdminUser(admin): AdminUser,
    ClientInfo(client): ClientInfo,
    Json(payload): Json<ToggleUserStatusPayload>,
) -> Result<Json<MessageResponse>, ApiError> {
    app_state.user_service
        .toggle_status(&admin, payload.user_id, payload.is_active, &client)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let message = if payload.is_active { "User activated" } else { "User restricted" };
    Ok(Json(MessageResponse::new(message)))
}
