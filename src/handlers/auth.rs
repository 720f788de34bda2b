// src/handlers/auth.rs

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, client_info::ClientInfo, i18n::Locale},
    models::auth::{
        AuthResponse, LoginUserPayload, SignupPayload, User, VerifyInvitationPayload,
        VerifyInvitationResponse,
    },
};

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Login realizado", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas"),
        (status = 403, description = "Conta desativada")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    ClientInfo(client): ClientInfo,
    Json(payload): Json<LoginUserPayload>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let response = app_state.auth_service
        .login_user(&payload.email, &payload.password, &client)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(response))
}

// POST /api/auth/verify-invitation
#[utoipa::path(
    post,
    path = "/api/auth/verify-invitation",
    tag = "Auth",
    request_body = VerifyInvitationPayload,
    responses(
        (status = 200, description = "Convite válido", body = VerifyInvitationResponse),
        (status = 400, description = "Convite inválido, usado ou expirado")
    )
)]
pub async fn verify_invitation(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<VerifyInvitationPayload>,
) -> Result<Json<VerifyInvitationResponse>, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let email = app_state.invitation_service
        .verify(&payload.token)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(VerifyInvitationResponse { email }))
}

// POST /api/auth/signup
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "Auth",
    request_body = SignupPayload,
    responses(
        (status = 200, description = "Conta criada", body = AuthResponse),
        (status = 400, description = "Dados inválidos ou convite inválido"),
        (status = 409, description = "E-mail já cadastrado")
    )
)]
pub async fn signup(
    State(app_state): State<AppState>,
    locale: Locale,
    ClientInfo(client): ClientInfo,
    Json(payload): Json<SignupPayload>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let response = app_state.auth_service
        .signup(&payload, &client)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(response))
}

// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Usuário logado", body = User),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<User> {
    Json(user)
}
