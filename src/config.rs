// src/config.rs

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{ActivityRepository, InvitationRepository, PricingRepository, UserRepository},
    services::{
        auth::{AuthService, JwtKeys},
        invitation_service::InvitationService,
        listing_service::ListingService,
        pricing_service::PricingService,
        rule_store::RuleStore,
        user_service::UserService,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_APP_URL: &str = "http://localhost:3000";

// Conta de admin criada na primeira subida
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub data_dir: PathBuf,
    pub app_url: String,
    pub admin: Option<AdminBootstrap>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let admin = match (var("ADMIN_EMAIL"), var("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminBootstrap { email, password }),
            _ => None,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            data_dir: var("DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()).into(),
            app_url: var("APP_URL").unwrap_or_else(|| DEFAULT_APP_URL.to_string()),
            admin,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub settings: Arc<Settings>,
    pub i18n_store: Arc<I18nStore>,
    pub auth_service: AuthService,
    pub pricing_service: PricingService,
    pub listing_service: ListingService,
    pub invitation_service: InvitationService,
    pub user_service: UserService,
    pub rule_store: RuleStore,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let settings = Settings::from_env()?;

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await
            .context("Falha ao conectar no banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let i18n_store = I18nStore::load()?;

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let pricing_repo = PricingRepository::new(db_pool.clone());
        let invitation_repo = InvitationRepository::new(db_pool.clone());
        let activity_repo = ActivityRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo.clone(),
            invitation_repo.clone(),
            activity_repo.clone(),
            JwtKeys::new(&settings.jwt_secret),
            db_pool.clone(),
        );
        let pricing_service = PricingService::new(pricing_repo.clone(), activity_repo.clone(), db_pool.clone());
        let listing_service = ListingService::new(settings.data_dir.clone());
        let invitation_service =
            InvitationService::new(invitation_repo, user_repo.clone(), settings.app_url.clone());
        let user_service = UserService::new(user_repo, activity_repo);
        let rule_store = RuleStore::new(Arc::new(pricing_repo));

        Ok(Self {
            db_pool,
            settings: Arc::new(settings),
            i18n_store: Arc::new(i18n_store),
            auth_service,
            pricing_service,
            listing_service,
            invitation_service,
            user_service,
            rule_store,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> anyhow::Result<Settings> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn applies_defaults() {
        let s = settings(&[("DATABASE_URL", "postgres://localhost/media"), ("JWT_SECRET", "x")]).unwrap();
        assert_eq!(s.bind_addr, "0.0.0.0:3000");
        assert_eq!(s.data_dir, PathBuf::from("data"));
        assert_eq!(s.app_url, "http://localhost:3000");
        assert!(s.admin.is_none());
    }

    #[test]
    fn requires_database_url_and_secret() {
        assert!(settings(&[("JWT_SECRET", "x")]).is_err());
        assert!(settings(&[("DATABASE_URL", "postgres://localhost/media"), ("JWT_SECRET", " ")]).is_err());
    }

    #[test]
    fn admin_bootstrap_needs_both_values() {
        let base = [("DATABASE_URL", "postgres://localhost/media"), ("JWT_SECRET", "x")];

        let only_email = settings(&[base[0], base[1], ("ADMIN_EMAIL", "admin@agencia.com")]).unwrap();
        assert!(only_email.admin.is_none());

        let both = settings(&[
            base[0],
            base[1],
            ("ADMIN_EMAIL", "admin@agencia.com"),
            ("ADMIN_PASSWORD", "segredo"),
        ])
        .unwrap();
        assert_eq!(both.admin.unwrap().email, "admin@agencia.com");
    }
}
