// src/db/pricing_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::pricing::{
        PricingFactor, PricingFactorRule, PricingFactorSummary, PricingRule,
        UserWithFactor,
    },
    services::rule_store::{AssignedRules, RuleLookupError, RuleSource},
};

#[derive(Clone)]
pub struct PricingRepository {
    pool: PgPool,
}

impl PricingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // 1. Fatores ativos, com o e-mail de quem criou
    pub async fn list_active_factors(&self) -> Result<Vec<PricingFactorSummary>, AppError> {
        let factors = sqlx::query_as::<_, PricingFactorSummary>(
            r#"
            SELECT pf.*, u.email AS created_by_email
            FROM pricing_factors pf
            LEFT JOIN users u ON pf.created_by = u.id
            WHERE pf.is_active = true
            ORDER BY pf.name
            "#,
        )
            .fetch_all(&self.pool)
            .await?;
        Ok(factors)
    }

    pub async fn find_factor(&self, id: i32) -> Result<Option<PricingFactor>, AppError> {
        let factor = sqlx::query_as::<_, PricingFactor>("SELECT * FROM pricing_factors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(factor)
    }

    // Regras sempre ordenadas por min_price: é essa ordem que define a precedência
    pub async fn list_rules(&self, factor_id: i32) -> Result<Vec<PricingFactorRule>, AppError> {
        let rules = sqlx::query_as::<_, PricingFactorRule>(
            r#"
            SELECT * FROM pricing_factor_rules
            WHERE factor_id = $1
            ORDER BY min_price ASC
            "#,
        )
            .bind(factor_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rules)
    }

    // 2. Criar o fator (as regras entram em seguida, na mesma transação)
    pub async fn create_factor<'e, E>(
        &self,
        executor: E,
        name: &str,
        description: Option<&str>,
        created_by: i32,
    ) -> Result<PricingFactor, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let factor = sqlx::query_as::<_, PricingFactor>(
            r#"
            INSERT INTO pricing_factors (name, description, created_by)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
            .bind(name)
            .bind(description)
            .bind(created_by)
            .fetch_one(executor)
            .await?;
        Ok(factor)
    }

    pub async fn update_factor<'e, E>(
        &self,
        executor: E,
        id: i32,
        name: &str,
        description: Option<&str>,
    ) -> Result<Option<PricingFactor>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let factor = sqlx::query_as::<_, PricingFactor>(
            r#"
            UPDATE pricing_factors
            SET name = $1, description = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING *
            "#,
        )
            .bind(name)
            .bind(description)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(factor)
    }

    pub async fn delete_rules<'e, E>(&self, executor: E, factor_id: i32) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM pricing_factor_rules WHERE factor_id = $1")
            .bind(factor_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    // 3. Inserção em massa usando UNNEST
    pub async fn insert_rules<'e, E>(
        &self,
        executor: E,
        factor_id: i32,
        rules: &[PricingRule],
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if rules.is_empty() {
            return Ok(());
        }

        let min_prices: Vec<f64> = rules.iter().map(|r| r.min_price).collect();
        let max_prices: Vec<Option<f64>> = rules.iter().map(|r| r.max_price).collect();
        let addition_types: Vec<&str> = rules.iter().map(|r| r.addition_type.as_str()).collect();
        let addition_values: Vec<f64> = rules.iter().map(|r| r.addition_value).collect();

        sqlx::query(
            r#"
            INSERT INTO pricing_factor_rules (factor_id, min_price, max_price, addition_type, addition_value)
            SELECT $1, r.min_price, r.max_price, r.addition_type::addition_type, r.addition_value
            FROM UNNEST($2::float8[], $3::float8[], $4::text[], $5::float8[])
                AS r(min_price, max_price, addition_type, addition_value)
            "#,
        )
            .bind(factor_id)
            .bind(min_prices)
            .bind(max_prices)
            .bind(addition_types)
            .bind(addition_values)
            .execute(executor)
            .await?;

        Ok(())
    }

    // 4. "Remover" é desativar; retorna false se o fator não existe
    pub async fn deactivate_factor(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE pricing_factors SET is_active = false, updated_at = NOW() WHERE id = $1",
        )
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // 5. Atribuição: uma por usuário, atribuir de novo substitui
    pub async fn assign_to_user(
        &self,
        user_id: i32,
        factor_id: i32,
        assigned_by: i32,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO user_pricing_factors (user_id, factor_id, assigned_by, assigned_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET factor_id = EXCLUDED.factor_id,
                          assigned_by = EXCLUDED.assigned_by,
                          assigned_at = NOW()
            "#,
        )
            .bind(user_id)
            .bind(factor_id)
            .bind(assigned_by)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::UserNotFound;
                    }
                }
                e.into()
            })?;
        Ok(())
    }

    pub async fn remove_from_user(&self, user_id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM user_pricing_factors WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_users_with_factors(&self) -> Result<Vec<UserWithFactor>, AppError> {
        let rows = sqlx::query_as::<_, UserWithFactor>(
            r#"
            SELECT
                u.id,
                u.email,
                u.first_name,
                u.last_name,
                u.role,
                pf.id AS factor_id,
                pf.name AS factor_name,
                upf.assigned_at,
                assigned_by_user.email AS assigned_by_email
            FROM users u
            LEFT JOIN user_pricing_factors upf ON u.id = upf.user_id
            LEFT JOIN pricing_factors pf ON upf.factor_id = pf.id
            LEFT JOIN users assigned_by_user ON upf.assigned_by = assigned_by_user.id
            WHERE u.is_active = true
            ORDER BY u.email
            "#,
        )
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

// Erros de decodificação (tipo desconhecido, NULL inesperado) = dado malformado
fn classify(e: sqlx::Error) -> RuleLookupError {
    match e {
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::ColumnNotFound(_) => {
            RuleLookupError::Malformed(e.to_string())
        }
        other => RuleLookupError::Unavailable(other),
    }
}

#[async_trait]
impl RuleSource for PricingRepository {
    async fn find_assigned_factor_rules(&self, user_id: i32) -> Result<AssignedRules, RuleLookupError> {
        let assigned: Option<(i32, String)> = sqlx::query_as(
            r#"
            SELECT pf.id, pf.name FROM pricing_factors pf
            JOIN user_pricing_factors upf ON pf.id = upf.factor_id
            WHERE upf.user_id = $1 AND pf.is_active = true
            "#,
        )
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)?;

        let Some((factor_id, factor_name)) = assigned else {
            return Ok(AssignedRules::NotAssigned);
        };

        let rules = sqlx::query_as::<_, PricingRule>(
            r#"
            SELECT min_price, max_price, addition_type, addition_value
            FROM pricing_factor_rules
            WHERE factor_id = $1
            ORDER BY min_price ASC
            "#,
        )
            .bind(factor_id)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)?;

        if let Some(bad) = rules.iter().find(|r| !r.min_price.is_finite() || !r.addition_value.is_finite()) {
            return Err(RuleLookupError::Malformed(format!(
                "regra do fator {} com valor não numérico: {:?}",
                factor_id, bad
            )));
        }

        tracing::debug!(user_id, factor_id, factor = %factor_name, rules = rules.len(), "📋 Regras carregadas");
        Ok(AssignedRules::Assigned(rules))
    }
}
