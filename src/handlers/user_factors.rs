// src/handlers/user_factors.rs

use axum::{extract::State, Json};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AdminUser, client_info::ClientInfo, i18n::Locale},
    models::{
        auth::MessageResponse,
        pricing::{AssignFactorPayload, RemoveFactorPayload, UserWithFactor},
    },
};

// GET /api/admin/user-factors
#[utoipa::path(
    get,
    path = "/api/admin/user-factors",
    tag = "User Factors",
    responses(
        (status = 200, description = "Usuários ativos e seus fatores", body = Vec<UserWithFactor>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_user_factors(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
) -> Result<Json<Vec<UserWithFactor>>, ApiError> {
    let rows = app_state.pricing_service
        .list_user_factors()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(rows))
}

// POST /api/admin/user-factors
#[utoipa::path(
    post,
    path = "/api/admin/user-factors",
    tag = "User Factors",
    request_body = AssignFactorPayload,
    responses(
        (status = 200, description = "Fator atribuído", body = MessageResponse),
        (status = 404, description = "Fator ou usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_factor(
    State(app_state): State<AppState>,
    locale: Locale,
    AdminUser(admin): AdminUser,
    ClientInfo(client): ClientInfo,
    Json(payload): Json<AssignFactorPayload>,
) -> Result<Json<MessageResponse>, ApiError> {
    app_state.pricing_service
        .assign_factor(payload.user_id, payload.factor_id, admin.id, &client)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(MessageResponse::new("Factor assigned successfully")))
}

// DELETE /api/admin/user-factors
#[utoipa::path(
    delete,
    path = "/api/admin/user-factors",
    tag = "User Factors",
    request_body = RemoveFactorPayload,
    responses(
        (status = 200, description = "Atribuição removida", body = MessageResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_factor(
    State(app_state): State<AppState>,
    locale: Locale,
    AdminUser(admin): AdminUser,
    ClientInfo(client): ClientInfo,
    Json(payload): Json<RemoveFactorPayload>,
) -> Result<Json<MessageResponse>, ApiError> {
    app_state.pricing_service
        .remove_factor(payload.user_id, admin.id, &client)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(MessageResponse::new("Factor removed successfully")))
}
