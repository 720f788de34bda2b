// src/middleware/auth.rs

use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::auth::User,
};

type BearerHeader = TypedHeader<Authorization<Bearer>>;

// Rotas protegidas: sem token válido, 401
pub async fn auth_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    bearer: Option<BearerHeader>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = bearer
        .ok_or_else(|| AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store))?;

    let user = app_state.auth_service
        .validate_token(bearer.token())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // Insere o usuário nos "extensions" da requisição
    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

// Listagens: visitante anônimo é permitido (usa a fórmula padrão)
pub async fn optional_auth(
    State(app_state): State<AppState>,
    bearer: Option<BearerHeader>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(TypedHeader(Authorization(bearer))) = bearer {
        match app_state.auth_service.validate_token(bearer.token()).await {
            Ok(user) => {
                request.extensions_mut().insert(AuthenticatedUser(user));
            }
            Err(e) => {
                tracing::debug!(error = %e, "Token ignorado, seguindo como anônimo");
            }
        }
    }
    next.run(request).await
}

// Extrator para obter o usuário autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                let app_state = AppState::from_ref(state);
                AppError::InvalidToken.to_api_error(&Locale::from_headers(&parts.headers), &app_state.i18n_store)
            })
    }
}

impl<S> OptionalFromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<AuthenticatedUser>().cloned())
    }
}

/// Guardião das rotas /api/admin: usuário autenticado E com papel admin.
pub struct AdminUser(pub User);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(user) =
            <AuthenticatedUser as FromRequestParts<S>>::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            let app_state = AppState::from_ref(state);
            tracing::warn!(user_id = user.id, "⛔ Acesso de não-admin a rota administrativa");
            return Err(AppError::AdminRequired
                .to_api_error(&Locale::from_headers(&parts.headers), &app_state.i18n_store));
        }

        Ok(AdminUser(user))
    }
}
