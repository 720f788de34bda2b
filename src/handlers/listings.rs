// src/handlers/listings.rs

use axum::{extract::State, Json};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        listing::{BroadcastRow, ListicleRow, PublicationRow, TelevisionRow},
        pricing::PricingRule,
    },
};

// Uma consulta de regras por requisição; anônimo = fórmula padrão
async fn viewer_rules(app_state: &AppState, viewer: Option<AuthenticatedUser>) -> Option<Vec<PricingRule>> {
    match viewer {
        Some(AuthenticatedUser(user)) => app_state.rule_store.get_rules_for_user(user.id).await,
        None => None,
    }
}

// GET /api/listings/publications
#[utoipa::path(
    get,
    path = "/api/listings/publications",
    tag = "Listings",
    responses(
        (status = 200, description = "Publicações com preço final", body = Vec<PublicationRow>),
        (status = 400, description = "Arquivo de dados em formato inválido")
    ),
    security((), ("api_jwt" = []))
)]
pub async fn publications(
    State(app_state): State<AppState>,
    locale: Locale,
    viewer: Option<AuthenticatedUser>,
) -> Result<Json<Vec<PublicationRow>>, ApiError> {
    let rules = viewer_rules(&app_state, viewer).await;

    let rows = app_state.listing_service
        .publications(rules.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(rows))
}

// GET /api/listings/listicles
#[utoipa::path(
    get,
    path = "/api/listings/listicles",
    tag = "Listings",
    responses(
        (status = 200, description = "Pacotes de listicles (preço fechado)", body = Vec<ListicleRow>)
    )
)]
pub async fn listicles(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<Vec<ListicleRow>>, ApiError> {
    let rows = app_state.listing_service
        .listicles()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(rows))
}

// GET /api/listings/television
#[utoipa::path(
    get,
    path = "/api/listings/television",
    tag = "Listings",
    responses(
        (status = 200, description = "Programas de TV com preço final", body = Vec<TelevisionRow>)
    ),
    security((), ("api_jwt" = []))
)]
pub async fn television(
    State(app_state): State<AppState>,
    locale: Locale,
    viewer: Option<AuthenticatedUser>,
) -> Result<Json<Vec<TelevisionRow>>, ApiError> {
    let rules = viewer_rules(&app_state, viewer).await;

    let rows = app_state.listing_service
        .television(rules.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(rows))
}

// GET /api/listings/broadcast-television
#[utoipa::path(
    get,
    path = "/api/listings/broadcast-television",
    tag = "Listings",
    responses(
        (status = 200, description = "Emissoras com preço final", body = Vec<BroadcastRow>)
    ),
    security((), ("api_jwt" = []))
)]
pub async fn broadcast_television(
    State(app_state): State<AppState>,
    locale: Locale,
    viewer: Option<AuthenticatedUser>,
) -> Result<Json<Vec<BroadcastRow>>, ApiError> {
    let rules = viewer_rules(&app_state, viewer).await;

    let rows = app_state.listing_service
        .broadcast_television(rules.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(rows))
}
