// src/models/pricing.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

/// ID do fator padrão do sistema. Ele não pode ser removido.
pub const DEFAULT_FACTOR_ID: i32 = 1;

// Mapeia o CREATE TYPE addition_type do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "addition_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AdditionType {
    Fixed,
    Percentage,
}

impl AdditionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdditionType::Fixed => "fixed",
            AdditionType::Percentage => "percentage",
        }
    }
}

/// Uma faixa de preço e o acréscimo aplicado a ela.
///
/// É a visão usada no cálculo: só os campos que importam para casar e somar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingRule {
    #[schema(example = 0.0)]
    pub min_price: f64,

    /// `None` = sem teto
    #[schema(example = 500.0)]
    pub max_price: Option<f64>,

    pub addition_type: AdditionType,

    #[schema(example = 100.0)]
    pub addition_value: f64,
}

// O que sai do banco (Tabela pricing_factor_rules)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingFactorRule {
    pub id: i32,
    pub factor_id: i32,
    pub min_price: f64,
    pub max_price: Option<f64>,
    pub addition_type: AdditionType,
    pub addition_value: f64,
    pub created_at: DateTime<Utc>,
}

// O que sai do banco (Tabela pricing_factors)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingFactor {
    #[schema(example = 2)]
    pub id: i32,

    #[schema(example = "Clientes Premium")]
    pub name: String,

    #[schema(example = "Margem reduzida para contas grandes")]
    pub description: Option<String>,

    pub is_active: bool,
    pub created_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Listagem do admin: fator + e-mail de quem criou
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingFactorSummary {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub factor: PricingFactor,

    pub created_by_email: Option<String>,
}

// Fator completo (fator + regras ordenadas por min_price)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingFactorDetail {
    pub factor: PricingFactor,
    pub rules: Vec<PricingFactorRule>,
}

// Linha da tela "usuários x fatores"
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserWithFactor {
    pub id: i32,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: crate::models::auth::UserRole,
    pub factor_id: Option<i32>,
    pub factor_name: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub assigned_by_email: Option<String>,
}

// ---
// Payloads
// ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingRulePayload {
    #[validate(range(min = 0.0, message = "O preço mínimo não pode ser negativo."))]
    #[schema(example = 0.0)]
    pub min_price: f64,

    #[validate(range(min = 0.0, message = "O preço máximo não pode ser negativo."))]
    #[schema(example = 500.0)]
    pub max_price: Option<f64>,

    pub addition_type: AdditionType,

    #[validate(range(min = 0.0, message = "O acréscimo não pode ser negativo."))]
    #[schema(example = 100.0)]
    pub addition_value: f64,
}

impl From<&PricingRulePayload> for PricingRule {
    fn from(payload: &PricingRulePayload) -> Self {
        Self {
            min_price: payload.min_price,
            max_price: payload.max_price,
            addition_type: payload.addition_type,
            addition_value: payload.addition_value,
        }
    }
}

// Criação e edição usam o mesmo formulário
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingFactorPayload {
    #[validate(length(min = 1, message = "O nome do fator é obrigatório."))]
    #[schema(example = "Clientes Premium")]
    pub name: String,

    pub description: Option<String>,

    #[validate(nested)]
    #[schema(example = json!([
        { "minPrice": 0.0, "maxPrice": 500.0, "additionType": "fixed", "additionValue": 100.0 },
        { "minPrice": 500.01, "maxPrice": null, "additionType": "percentage", "additionValue": 20.0 }
    ]))]
    pub rules: Vec<PricingRulePayload>,
}

impl PricingFactorPayload {
    /// Regra entre campos: quando há teto, ele não pode ficar abaixo do piso.
    pub fn validate_rule_bounds(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        for (index, rule) in self.rules.iter().enumerate() {
            if let Some(max) = rule.max_price {
                if max < rule.min_price {
                    let mut err = ValidationError::new("max_below_min");
                    err.add_param("index".into(), &index);
                    err.message = Some(
                        format!("Regra {}: o preço máximo deve ser maior ou igual ao mínimo.", index + 1)
                            .into(),
                    );
                    errors.add("rules", err);
                }
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    pub fn to_rules(&self) -> Vec<PricingRule> {
        self.rules.iter().map(PricingRule::from).collect()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignFactorPayload {
    #[schema(example = 42)]
    pub user_id: i32,

    #[schema(example = 2)]
    pub factor_id: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFactorPayload {
    #[schema(example = 42)]
    pub user_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(min: f64, max: Option<f64>, value: f64) -> PricingRulePayload {
        PricingRulePayload {
            min_price: min,
            max_price: max,
            addition_type: AdditionType::Fixed,
            addition_value: value,
        }
    }

    fn payload(rules: Vec<PricingRulePayload>) -> PricingFactorPayload {
        PricingFactorPayload {
            name: "Premium".into(),
            description: None,
            rules,
        }
    }

    #[test]
    fn accepts_well_formed_rules() {
        let p = payload(vec![rule(0.0, Some(500.0), 100.0), rule(500.0, None, 50.0)]);
        assert!(p.validate().is_ok());
        assert!(p.validate_rule_bounds().is_ok());
    }

    #[test]
    fn rejects_negative_fields() {
        assert!(payload(vec![rule(-1.0, None, 10.0)]).validate().is_err());
        assert!(payload(vec![rule(0.0, None, -10.0)]).validate().is_err());
    }

    #[test]
    fn rejects_empty_name() {
        let mut p = payload(vec![]);
        p.name = String::new();
        assert!(p.validate().is_err());
    }

    #[test]
    fn rejects_max_below_min() {
        let p = payload(vec![rule(0.0, Some(100.0), 10.0), rule(300.0, Some(200.0), 10.0)]);
        let errors = p.validate_rule_bounds().unwrap_err();
        assert!(errors.field_errors().contains_key("rules"));
    }

    #[test]
    fn equal_bounds_are_allowed() {
        assert!(payload(vec![rule(250.0, Some(250.0), 10.0)]).validate_rule_bounds().is_ok());
    }

    #[test]
    fn addition_type_uses_lowercase_on_the_wire() {
        let parsed: PricingRulePayload = serde_json::from_str(
            r#"{"minPrice": 0, "maxPrice": null, "additionType": "percentage", "additionValue": 10}"#,
        )
        .unwrap();
        assert_eq!(parsed.addition_type, AdditionType::Percentage);
        assert_eq!(parsed.max_price, None);
    }
}
