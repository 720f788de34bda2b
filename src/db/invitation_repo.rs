// src/db/invitation_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use crate::{common::error::AppError, models::invitation::UserInvitation};

#[derive(Clone)]
pub struct InvitationRepository {
    pool: PgPool,
}

impl InvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
        created_by: i32,
    ) -> Result<UserInvitation, AppError> {
        let invitation = sqlx::query_as::<_, UserInvitation>(
            r#"
            INSERT INTO user_invitations (email, token, expires_at, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
            .bind(email)
            .bind(token)
            .bind(expires_at)
            .bind(created_by)
            .fetch_one(&self.pool)
            .await?;
        Ok(invitation)
    }

    // Só convites ainda válidos: não usados e não expirados
    pub async fn find_valid_by_token<'e, E>(
        &self,
        executor: E,
        token: &str,
    ) -> Result<Option<UserInvitation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let invitation = sqlx::query_as::<_, UserInvitation>(
            "SELECT * FROM user_invitations WHERE token = $1 AND expires_at > NOW() AND used = false",
        )
            .bind(token)
            .fetch_optional(executor)
            .await?;
        Ok(invitation)
    }

    pub async fn find_valid(&self, token: &str) -> Result<Option<UserInvitation>, AppError> {
        self.find_valid_by_token(&self.pool, token).await
    }

    pub async fn find_pending_by_email(&self, email: &str) -> Result<Option<UserInvitation>, AppError> {
        let invitation = sqlx::query_as::<_, UserInvitation>(
            r#"
            SELECT * FROM user_invitations
            WHERE email = $1 AND expires_at > NOW() AND used = false
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(invitation)
    }

    // Retorna false se outro cadastro usou o convite antes (corrida)
    pub async fn mark_as_used<'e, E>(&self, executor: E, id: i32) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE user_invitations SET used = true, used_at = NOW() WHERE id = $1 AND used = false",
        )
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
