// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{ActivityRepository, InvitationRepository, UserRepository},
    models::{
        activity::{ActivityAction, ClientMetadata},
        auth::{AuthResponse, Claims, SignupPayload, User, UserRole},
    },
    services::invitation_service::normalize_email,
};

const TOKEN_TTL_DAYS: i64 = 7;

// Chaves HS256 derivadas do JWT_SECRET
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(TOKEN_TTL_DAYS);

        let claims = Claims {
            sub: user.id,
            role: user.role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AppError::InvalidToken)
    }
}

async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password_clone = password.to_owned();
    let hash_clone = password_hash.to_owned();

    // Executa a verificação em um thread separado
    let is_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &hash_clone))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(is_valid)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    invitation_repo: InvitationRepository,
    activity_repo: ActivityRepository,
    keys: JwtKeys,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        invitation_repo: InvitationRepository,
        activity_repo: ActivityRepository,
        keys: JwtKeys,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, invitation_repo, activity_repo, keys, pool }
    }

    pub async fn login_user(
        &self,
        email: &str,
        password: &str,
        client: &ClientMetadata,
    ) -> Result<AuthResponse, AppError> {
        let user = self.user_repo
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        // Só depois de conferir a senha, para não revelar quais contas existem
        if !user.is_active {
            return Err(AppError::AccountDisabled);
        }

        self.user_repo.record_login(user.id).await?;
        self.activity_repo
            .log_best_effort(user.id, ActivityAction::Login, &format!("USER:{}", user.id), client)
            .await;

        let token = self.keys.create_token(&user)?;
        tracing::info!(user_id = user.id, "🔑 Login realizado");
        Ok(AuthResponse { token, user })
    }

    // Cadastro a partir de um convite: cria a conta e consome o convite juntos
    pub async fn signup(
        &self,
        payload: &SignupPayload,
        client: &ClientMetadata,
    ) -> Result<AuthResponse, AppError> {
        // 1. Hashing (fora da transação, não toca no banco)
        let hashed_password = hash_password(&payload.password).await?;

        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        // 2. Convite válido (não usado e não expirado)
        let invitation = self.invitation_repo
            .find_valid_by_token(&mut *tx, &payload.token)
            .await?
            .ok_or(AppError::InvalidInvitation)?;

        // 3. Cria o usuário
        let user = self.user_repo
            .create_user(
                &mut *tx,
                &invitation.email,
                &hashed_password,
                UserRole::User,
                payload.first_name.as_deref(),
                payload.last_name.as_deref(),
            )
            .await?;

        // 4. Consome o convite. Se outro cadastro chegou antes, desfaz tudo.
        if !self.invitation_repo.mark_as_used(&mut *tx, invitation.id).await? {
            return Err(AppError::InvalidInvitation);
        }

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        self.activity_repo
            .log_best_effort(user.id, ActivityAction::AccountCreated, &format!("USER:{}", user.id), client)
            .await;

        let token = self.keys.create_token(&user)?;
        tracing::info!(user_id = user.id, invitation_id = invitation.id, "✅ Conta criada via convite");
        Ok(AuthResponse { token, user })
    }

    // Recarrega o usuário a cada requisição: contas desativadas perdem o acesso na hora
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = self.keys.decode(token)?;

        let user = self.user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if !user.is_active {
            return Err(AppError::AccountDisabled);
        }
        Ok(user)
    }

    /// Cria a conta de administrador inicial se ela ainda não existir.
    pub async fn bootstrap_admin(&self, email: &str, password: &str) -> Result<(), AppError> {
        let email = normalize_email(email);
        if self.user_repo.find_by_email(&email).await?.is_some() {
            tracing::info!("👤 Administrador inicial já existe");
            return Ok(());
        }

        let hashed_password = hash_password(password).await?;
        let admin = self.user_repo
            .create_user(&self.pool, &email, &hashed_password, UserRole::Admin, None, None)
            .await?;

        tracing::info!(user_id = admin.id, "👤 Administrador inicial criado");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> User {
        User {
            id: 42,
            email: "midia@agencia.com".into(),
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
    fn token_round_trip_keeps_subject_and_role() {
        let keys = JwtKeys::new("segredo-de-teste");
        let token = keys.create_token(&user(UserRole::Admin)).unwrap();

        let claims = keys.decode(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, UserRole::Admin);
        assert!(claims.exp > claims.iat);
        assert_eq!(claims.exp - claims.iat, (TOKEN_TTL_DAYS * 24 * 3600) as usize);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = JwtKeys::new("outro").create_token(&user(UserRole::User)).unwrap();
        let err = JwtKeys::new("segredo-de-teste").decode(&token).unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let keys = JwtKeys::new("segredo-de-teste");
        let mut token = keys.create_token(&user(UserRole::User)).unwrap();
        token.push('x');
        assert!(matches!(keys.decode(&token), Err(AppError::InvalidToken)));
        assert!(matches!(keys.decode("nem-um-jwt"), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn password_hash_verifies() {
        let hashed = hash_password("segredo123").await.unwrap();
        assert!(verify_password("segredo123", &hashed).await.unwrap());
        assert!(!verify_password("errada", &hashed).await.unwrap());
    }
}
