// src/services/user_service.rs

use crate::{
    common::error::AppError,
    db::{ActivityRepository, UserRepository},
    models::{
        activity::{ActivityAction, ClientMetadata},
        auth::User,
    },
};

#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    activity_repo: ActivityRepository,
}

impl UserService {
    pub fn new(user_repo: UserRepository, activity_repo: ActivityRepository) -> Self {
        Self { user_repo, activity_repo }
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.user_repo.list_all().await
    }

    // Bloqueia ou libera o acesso de um usuário comum
    pub async fn toggle_status(
        &self,
        admin: &User,
        user_id: i32,
        is_active: bool,
        client: &ClientMetadata,
    ) -> Result<(), AppError> {
        let target = self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        ensure_modifiable(&target)?;

        self.user_repo.set_active(target.id, is_active).await?;

        let action = status_action(is_active);
        self.activity_repo
            .log_best_effort(admin.id, action, &format!("USER:{}", target.id), client)
            .await;

        tracing::info!(admin_id = admin.id, user_id = target.id, %action, "🔒 Status do usuário alterado");
        Ok(())
    }
}

pub(crate) fn ensure_modifiable(target: &User) -> Result<(), AppError> {
    if target.is_admin() {
        return Err(AppError::CannotModifyAdmin);
    }
    Ok(())
}

pub(crate) fn status_action(is_active: bool) -> ActivityAction {
    if is_active { ActivityAction::UserActivated } else { ActivityAction::UserRestricted }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::UserRole;
    use chrono::Utc;

    fn user(role: UserRole) -> User {
        User {
            id: 7,
            email: "alvo@agencia.com".into(),
            password_hash: String::new(),
            role,
            first_name: None,
            last_name: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        }
    }

    #[test]
    fn admins_cannot_be_toggled() {
        assert!(matches!(ensure_modifiable(&user(UserRole::Admin)), Err(AppError::CannotModifyAdmin)));
        assert!(ensure_modifiable(&user(UserRole::User)).is_ok());
    }

    #[test]
    fn status_maps_to_activity_action() {
        assert_eq!(status_action(true).as_str(), "USER_ACTIVATED");
        assert_eq!(status_action(false).as_str(), "USER_RESTRICTED");
    }
}
