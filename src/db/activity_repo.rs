// src/db/activity_repo.rs

use sqlx::PgPool;
use crate::{
    common::error::AppError,
    models::activity::{ActivityAction, ClientMetadata},
};

#[derive(Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn log(
        &self,
        user_id: i32,
        action: ActivityAction,
        resource: &str,
        client: &ClientMetadata,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO activity_logs (user_id, action, resource, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
            .bind(user_id)
            .bind(action.as_str())
            .bind(resource)
            .bind(client.ip_address.as_deref())
            .bind(client.user_agent.as_deref())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // O log de atividade não pode derrubar a operação principal
    pub async fn log_best_effort(
        &self,
        user_id: i32,
        action: ActivityAction,
        resource: &str,
        client: &ClientMetadata,
    ) {
        if let Err(e) = self.log(user_id, action, resource, client).await {
            tracing::warn!(user_id, %action, error = %e, "Falha ao gravar log de atividade");
        }
    }
}
