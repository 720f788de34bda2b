//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::{auth_guard, optional_auth};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG manda; sem ele, nível info
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new().await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    if let Some(admin) = &app_state.settings.admin {
        app_state.auth_service
            .bootstrap_admin(&admin.email, &admin.password)
            .await
            .map_err(|e| anyhow::anyhow!("Falha ao criar o administrador inicial: {}", e))?;
    }

    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/verify-invitation", post(handlers::auth::verify_invitation))
        .route("/signup", post(handlers::auth::signup));

    // Rotas do usuário logado
    let me_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Listagens: anônimo ou logado (o preço muda conforme o fator do usuário)
    let listing_routes = Router::new()
        .route("/publications", get(handlers::listings::publications))
        .route("/listicles", get(handlers::listings::listicles))
        .route("/television", get(handlers::listings::television))
        .route("/broadcast-television", get(handlers::listings::broadcast_television))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            optional_auth,
        ));

    // Administração: o extrator AdminUser confere o papel em cada handler
    let admin_routes = Router::new()
        .route("/pricing-factors"
               ,get(handlers::pricing_factors::list_factors)
               .post(handlers::pricing_factors::create_factor)
        )
        .route("/pricing-factors/{id}"
               ,get(handlers::pricing_factors::get_factor)
               .put(handlers::pricing_factors::update_factor)
               .delete(handlers::pricing_factors::delete_factor)
        )
        .route("/user-factors"
               ,get(handlers::user_factors::list_user_factors)
               .post(handlers::user_factors::assign_factor)
               .delete(handlers::user_factors::remove_factor)
        )
        .route("/users", get(handlers::users::list_users))
        .route("/users/toggle-status", post(handlers::users::toggle_status))
        .route("/invitations", post(handlers::invitations::create_invitation))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let bind_addr = app_state.settings.bind_addr.clone();

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes.merge(me_routes))
        .nest("/api/listings", listing_routes)
        .nest("/api/admin", admin_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    tracing::info!("📚 Documentação em http://{}/swagger-ui", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
