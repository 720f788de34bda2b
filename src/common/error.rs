use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// Nosso tipo de erro, agora com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Convite pendente para este e-mail")]
    InvitationAlreadyPending,

    #[error("Convite inválido ou expirado")]
    InvalidInvitation,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Conta desativada")]
    AccountDisabled,

    #[error("Acesso restrito a administradores")]
    AdminRequired,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Contas de administrador não podem ser alteradas")]
    CannotModifyAdmin,

    #[error("Fator de preço não encontrado")]
    FactorNotFound,

    #[error("O fator padrão não pode ser removido")]
    DefaultFactorProtected,

    #[error("Formato de dados inválido: {0}")]
    InvalidDataFormat(String),

    #[error("Falha ao ler a fonte de dados: {0}")]
    DataSource(String),

    // Variante para erros de banco de dados (exemplo com sqlx)
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// O erro que de fato vai para o cliente (já traduzido)
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidInvitation => StatusCode::BAD_REQUEST,
            AppError::DefaultFactorProtected => StatusCode::BAD_REQUEST,
            AppError::InvalidDataFormat(_) => StatusCode::BAD_REQUEST,
            AppError::EmailAlreadyExists => StatusCode::CONFLICT,
            AppError::InvitationAlreadyPending => StatusCode::CONFLICT,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::AccountDisabled => StatusCode::FORBIDDEN,
            AppError::AdminRequired => StatusCode::FORBIDDEN,
            AppError::CannotModifyAdmin => StatusCode::FORBIDDEN,
            AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::FactorNotFound => StatusCode::NOT_FOUND,
            // Todos os outros erros (banco, IO, bcrypt, jwt...) viram 500.
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Chave da mensagem nos arquivos locales/*.json
    pub fn message_key(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "error.validation",
            AppError::EmailAlreadyExists => "error.email_exists",
            AppError::InvitationAlreadyPending => "error.invitation_pending",
            AppError::InvalidInvitation => "error.invalid_invitation",
            AppError::InvalidCredentials => "error.invalid_credentials",
            AppError::InvalidToken => "error.invalid_token",
            AppError::AccountDisabled => "error.account_disabled",
            AppError::AdminRequired => "error.admin_required",
            AppError::UserNotFound => "error.user_not_found",
            AppError::CannotModifyAdmin => "error.cannot_modify_admin",
            AppError::FactorNotFound => "error.factor_not_found",
            AppError::DefaultFactorProtected => "error.default_factor_protected",
            AppError::InvalidDataFormat(_) => "error.invalid_data_format",
            _ => "error.internal",
        }
    }

    pub fn to_api_error(self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let status = self.status();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // O `tracing` loga a mensagem detalhada; o cliente recebe só a genérica.
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let message = i18n.translate(&locale.0, self.message_key());

        let details = match &self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                collect_validation_messages("", errors, &mut details);
                Some(Value::Object(details))
            }
            _ => None,
        };

        ApiError { status, error: message, details }
    }
}

// Achata erros aninhados (structs e listas) em chaves como "rules[1].min_price"
fn collect_validation_messages(prefix: &str, errors: &ValidationErrors, out: &mut serde_json::Map<String, Value>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() { field.to_string() } else { format!("{}.{}", prefix, field) };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| match &e.message {
                        Some(m) => m.to_string(),
                        None => e.code.to_string(),
                    })
                    .collect();
                out.insert(path, json!(messages));
            }
            ValidationErrorsKind::Struct(nested) => collect_validation_messages(&path, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_validation_messages(&format!("{}[{}]", path, index), nested, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{Validate, ValidationError};
    use crate::models::pricing::{AdditionType, PricingFactorPayload, PricingRulePayload};

    fn locale(lang: &str) -> Locale {
        Locale(lang.to_string())
    }

    #[test]
    fn maps_domain_errors_to_status_codes() {
        assert_eq!(AppError::FactorNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::DefaultFactorProtected.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::CannotModifyAdmin.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::EmailAlreadyExists.status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::DataSource("data.json".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn translates_by_locale_with_english_fallback() {
        let store = I18nStore::load().unwrap();

        let pt = AppError::FactorNotFound.to_api_error(&locale("pt"), &store);
        let en = AppError::FactorNotFound.to_api_error(&locale("en"), &store);
        let unknown = AppError::FactorNotFound.to_api_error(&locale("de"), &store);

        assert_eq!(pt.error, "Fator de preço não encontrado.");
        assert_eq!(en.error, "Pricing factor not found.");
        assert_eq!(unknown.error, en.error);
    }

    #[test]
    fn internal_errors_hide_details() {
        let store = I18nStore::load().unwrap();
        let err = AppError::DataSource("/srv/data/data1.csv: permission denied".into())
            .to_api_error(&locale("en"), &store);

        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.error.contains("permission denied"));
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let store = I18nStore::load().unwrap();
        let mut errors = ValidationErrors::new();
        let mut field = ValidationError::new("length");
        field.message = Some("O nome do fator é obrigatório.".into());
        errors.add("name", field);

        let api = AppError::ValidationError(errors).to_api_error(&locale("pt"), &store);

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.unwrap();
        assert_eq!(details["name"][0], "O nome do fator é obrigatório.");
    }

    #[test]
    fn nested_rule_errors_are_reported_with_their_index() {
        let store = I18nStore::load().unwrap();
        let payload = PricingFactorPayload {
            name: "Premium".into(),
            description: None,
            rules: vec![
                PricingRulePayload {
                    min_price: 0.0,
                    max_price: Some(500.0),
                    addition_type: AdditionType::Fixed,
                    addition_value: 100.0,
                },
                PricingRulePayload {
                    min_price: -10.0,
                    max_price: None,
                    addition_type: AdditionType::Percentage,
                    addition_value: 20.0,
                },
            ],
        };

        let errors = payload.validate().unwrap_err();
        let api = AppError::ValidationError(errors).to_api_error(&locale("pt"), &store);

        let details = api.details.unwrap();
        assert_eq!(details["rules[1].min_price"][0], "O preço mínimo não pode ser negativo.");
        assert!(details.get("rules[0].min_price").is_none());
    }
}
