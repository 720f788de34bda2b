// src/handlers/pricing_factors.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AdminUser, i18n::Locale},
    models::{
        auth::MessageResponse,
        pricing::{PricingFactor, PricingFactorDetail, PricingFactorPayload, PricingFactorSummary},
    },
};

// Validação por campo + regra entre campos (teto >= piso)
fn validate_payload(payload: &PricingFactorPayload) -> Result<(), AppError> {
    payload.validate()?;
    payload.validate_rule_bounds()?;
    Ok(())
}

// GET /api/admin/pricing-factors
#[utoipa::path(
    get,
    path = "/api/admin/pricing-factors",
    tag = "Pricing Factors",
    responses(
        (status = 200, description = "Fatores ativos", body = Vec<PricingFactorSummary>),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_factors(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
) -> Result<Json<Vec<PricingFactorSummary>>, ApiError> {
    let factors = app_state.pricing_service
        .list_factors()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(factors))
}

// GET /api/admin/pricing-factors/{id}
#[utoipa::path(
    get,
    path = "/api/admin/pricing-factors/{id}",
    tag = "Pricing Factors",
    params(("id" = i32, Path, description = "ID do fator")),
    responses(
        (status = 200, description = "Fator e suas regras", body = PricingFactorDetail),
        (status = 404, description = "Fator não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_factor(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<Json<PricingFactorDetail>, ApiError> {
    let detail = app_state.pricing_service
        .get_factor(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(detail))
}

// POST /api/admin/pricing-factors
#[utoipa::path(
    post,
    path = "/api/admin/pricing-factors",
    tag = "Pricing Factors",
    request_body = PricingFactorPayload,
    responses(
        (status = 201, description = "Fator criado", body = PricingFactor),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_factor(
    State(app_state): State<AppState>,
    locale: Locale,
    AdminUser(admin): AdminUser,
    Json(payload): Json<PricingFactorPayload>,
) -> Result<impl IntoResponse, ApiError> {
    validate_payload(&payload).map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let factor = app_state.pricing_service
        .create_factor(&payload, admin.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(factor)))
}

// PUT /api/admin/pricing-factors/{id}
#[utoipa::path(
    put,
    path = "/api/admin/pricing-factors/{id}",
    tag = "Pricing Factors",
    params(("id" = i32, Path, description = "ID do fator")),
    request_body = PricingFactorPayload,
    responses(
        (status = 200, description = "Fator atualizado (regras substituídas)", body = PricingFactor),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Fator não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_factor(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    Path(id): Path<i32>,
    Json(payload): Json<PricingFactorPayload>,
) -> Result<Json<PricingFactor>, ApiError> {
    validate_payload(&payload).map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let factor = app_state.pricing_service
        .update_factor(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(factor))
}

// DELETE /api/admin/pricing-factors/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/pricing-factors/{id}",
    tag = "Pricing Factors",
    params(("id" = i32, Path, description = "ID do fator")),
    responses(
        (status = 200, description = "Fator desativado", body = MessageResponse),
        (status = 400, description = "O fator padrão não pode ser removido"),
        (status = 404, description = "Fator não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_factor(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    app_state.pricing_service
        .delete_factor(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(MessageResponse::new("Pricing factor deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pricing::{AdditionType, PricingRulePayload};

    #[test]
    fn payload_validation_combines_field_and_bound_checks() {
        let mut payload = PricingFactorPayload {
            name: "Premium".into(),
            description: None,
            rules: vec![PricingRulePayload {
                min_price: 100.0,
                max_price: Some(50.0),
                addition_type: AdditionType::Percentage,
                addition_value: 10.0,
            }],
        };
        assert!(matches!(validate_payload(&payload), Err(AppError::ValidationError(_))));

        payload.rules[0].max_price = None;
        assert!(validate_payload(&payload).is_ok());
    }
}
