// src/services/pricing_service.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{ActivityRepository, PricingRepository},
    models::{
        activity::{ActivityAction, ClientMetadata},
        pricing::{
            PricingFactor, PricingFactorDetail, PricingFactorPayload, PricingFactorSummary,
            PricingRule, UserWithFactor, DEFAULT_FACTOR_ID,
        },
    },
    services::price_calculator::find_overlaps,
};

// Escrita dos fatores/regras (só admin). A leitura para cálculo passa pelo RuleStore.
#[derive(Clone)]
pub struct PricingService {
    repo: PricingRepository,
    activity_repo: ActivityRepository,
    pool: PgPool,
}

impl PricingService {
    pub fn new(repo: PricingRepository, activity_repo: ActivityRepository, pool: PgPool) -> Self {
        Self { repo, activity_repo, pool }
    }

    pub async fn list_factors(&self) -> Result<Vec<PricingFactorSummary>, AppError> {
        self.repo.list_active_factors().await
    }

    pub async fn get_factor(&self, id: i32) -> Result<PricingFactorDetail, AppError> {
        let factor = self.repo.find_factor(id).await?.ok_or(AppError::FactorNotFound)?;
        let rules = self.repo.list_rules(id).await?;
        Ok(PricingFactorDetail { factor, rules })
    }

    pub async fn create_factor(
        &self,
        payload: &PricingFactorPayload,
        created_by: i32,
    ) -> Result<PricingFactor, AppError> {
        let rules = payload.to_rules();
        warn_on_overlaps(&payload.name, &rules);

        // 1. Inicia Transação
        let mut tx = self.pool.begin().await?;

        // 2. Cria o Fator
        let factor = self.repo
            .create_factor(&mut *tx, &payload.name, payload.description.as_deref(), created_by)
            .await?;

        // 3. Cria as Regras
        self.repo.insert_rules(&mut *tx, factor.id, &rules).await?;

        // 4. Commit
        tx.commit().await?;

        tracing::info!(factor_id = factor.id, rules = rules.len(), "✅ Fator de preço criado");
        Ok(factor)
    }

    // Edição substitui todas as regras do fator
    pub async fn update_factor(
        &self,
        id: i32,
        payload: &PricingFactorPayload,
    ) -> Result<PricingFactor, AppError> {
        let rules = payload.to_rules();
        warn_on_overlaps(&payload.name, &rules);

        let mut tx = self.pool.begin().await?;

        let factor = self.repo
            .update_factor(&mut *tx, id, &payload.name, payload.description.as_deref())
            .await?
            .ok_or(AppError::FactorNotFound)?; // rollback automático no drop

        self.repo.delete_rules(&mut *tx, id).await?;
        self.repo.insert_rules(&mut *tx, id, &rules).await?;

        tx.commit().await?;

        tracing::info!(factor_id = id, rules = rules.len(), "✅ Fator de preço atualizado");
        Ok(factor)
    }

    pub async fn delete_factor(&self, id: i32) -> Result<(), AppError> {
        ensure_deletable(id)?;

        if !self.repo.deactivate_factor(id).await? {
            return Err(AppError::FactorNotFound);
        }

        tracing::info!(factor_id = id, "🗑️ Fator de preço desativado");
        Ok(())
    }

    pub async fn list_user_factors(&self) -> Result<Vec<UserWithFactor>, AppError> {
        self.repo.list_users_with_factors().await
    }

    pub async fn assign_factor(
        &self,
        user_id: i32,
        factor_id: i32,
        assigned_by: i32,
        client: &ClientMetadata,
    ) -> Result<(), AppError> {
        // Não faz sentido atribuir um fator desativado: ele seria ignorado no cálculo
        let factor = self.repo.find_factor(factor_id).await?;
        if !factor.is_some_and(|f| f.is_active) {
            return Err(AppError::FactorNotFound);
        }

        self.repo.assign_to_user(user_id, factor_id, assigned_by).await?;
        self.activity_repo
            .log_best_effort(assigned_by, ActivityAction::FactorAssigned, &format!("USER:{}", user_id), client)
            .await;
        tracing::info!(user_id, factor_id, assigned_by, "🔗 Fator atribuído ao usuário");
        Ok(())
    }

    pub async fn remove_factor(
        &self,
        user_id: i32,
        removed_by: i32,
        client: &ClientMetadata,
    ) -> Result<(), AppError> {
        let removed = self.repo.remove_from_user(user_id).await?;
        if removed {
            self.activity_repo
                .log_best_effort(removed_by, ActivityAction::FactorUnassigned, &format!("USER:{}", user_id), client)
                .await;
        }
        tracing::info!(user_id, removed, "Atribuição de fator removida");
        Ok(())
    }
}

pub(crate) fn ensure_deletable(id: i32) -> Result<(), AppError> {
    if id == DEFAULT_FACTOR_ID {
        return Err(AppError::DefaultFactorProtected);
    }
    Ok(())
}

// Sobreposição é aceita (vale a primeira regra), mas fica registrada
fn warn_on_overlaps(factor_name: &str, rules: &[PricingRule]) {
    for (first, second) in find_overlaps(rules) {
        tracing::warn!(
            factor = %factor_name,
            first = first + 1,
            second = second + 1,
            "⚠️ Faixas de preço sobrepostas: a regra que vier primeiro (menor min_price) vence"
        );
    }
}
