// src/handlers/invitations.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AdminUser, i18n::Locale},
    models::invitation::{CreateInvitationPayload, UserInvitation},
};

// POST /api/admin/invitations
#[utoipa::path(
    post,
    path = "/api/admin/invitations",
    tag = "Invitations",
    request_body = CreateInvitationPayload,
    responses(
        (status = 201, description = "Convite criado (link registrado no log)", body = UserInvitation),
        (status = 409, description = "Usuário já existe ou convite pendente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_invitation(
    State(app_state): State<AppState>,
    locale: Locale,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreateInvitationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let invitation = app_state.invitation_service
        .create_invitation(&payload.email, admin.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(invitation)))
}
