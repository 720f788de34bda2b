// src/services/invitation_service.rs

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{InvitationRepository, UserRepository},
    models::invitation::UserInvitation,
};

const INVITATION_TTL_HOURS: i64 = 24;

#[derive(Clone)]
pub struct InvitationService {
    invitation_repo: InvitationRepository,
    user_repo: UserRepository,
    app_url: String,
}

impl InvitationService {
    pub fn new(invitation_repo: InvitationRepository, user_repo: UserRepository, app_url: String) -> Self {
        Self { invitation_repo, user_repo, app_url }
    }

    pub async fn create_invitation(&self, email: &str, created_by: i32) -> Result<UserInvitation, AppError> {
        let email = normalize_email(email);

        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::EmailAlreadyExists);
        }
        if self.invitation_repo.find_pending_by_email(&email).await?.is_some() {
            return Err(AppError::InvitationAlreadyPending);
        }

        let token = Uuid::new_v4().simple().to_string();
        let expires_at = Utc::now() + Duration::hours(INVITATION_TTL_HOURS);

        let invitation = self.invitation_repo
            .create(&email, &token, expires_at, created_by)
            .await?;

        // Sem servidor de e-mail: o link vai para o log
        tracing::info!(
            invitation_id = invitation.id,
            email = %invitation.email,
            link = %invitation_link(&self.app_url, &token),
            "📨 Convite criado"
        );
        Ok(invitation)
    }

    // E-mail do convite, se ele ainda puder ser usado
    pub async fn verify(&self, token: &str) -> Result<String, AppError> {
        self.invitation_repo
            .find_valid(token)
            .await?
            .map(|invitation| invitation.email)
            .ok_or(AppError::InvalidInvitation)
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn invitation_link(app_url: &str, token: &str) -> String {
    format!("{}/signup/{}", app_url.trim_end_matches('/'), token)
}
