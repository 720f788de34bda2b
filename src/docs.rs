// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::verify_invitation,
        handlers::auth::signup,
        handlers::auth::get_me,

        // --- Listings ---
        handlers::listings::publications,
        handlers::listings::listicles,
        handlers::listings::television,
        handlers::listings::broadcast_television,

        // --- Pricing Factors ---
        handlers::pricing_factors::list_factors,
        handlers::pricing_factors::get_factor,
        handlers::pricing_factors::create_factor,
        handlers::pricing_factors::update_factor,
        handlers::pricing_factors::delete_factor,

        // --- User Factors ---
        handlers::user_factors::list_user_factors,
        handlers::user_factors::assign_factor,
        handlers::user_factors::remove_factor,

        // --- Admin ---
        handlers::users::list_users,
        handlers::users::toggle_status,
        handlers::invitations::create_invitation,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::LoginUserPayload,
            models::auth::SignupPayload,
            models::auth::VerifyInvitationPayload,
            models::auth::VerifyInvitationResponse,
            models::auth::AuthResponse,
            models::auth::ToggleUserStatusPayload,
            models::auth::MessageResponse,

            // --- Invitations ---
            models::invitation::UserInvitation,
            models::invitation::CreateInvitationPayload,

            // --- Pricing ---
            models::pricing::AdditionType,
            models::pricing::PricingRule,
            models::pricing::PricingFactor,
            models::pricing::PricingFactorRule,
            models::pricing::PricingFactorSummary,
            models::pricing::PricingFactorDetail,
            models::pricing::UserWithFactor,
            models::pricing::PricingRulePayload,
            models::pricing::PricingFactorPayload,
            models::pricing::AssignFactorPayload,
            models::pricing::RemoveFactorPayload,

            // --- Listings ---
            models::listing::PublicationRow,
            models::listing::ListicleRow,
            models::listing::TelevisionRow,
            models::listing::BroadcastRow,
        )
    ),
    tags(
        (name = "Auth", description = "Login, convites e cadastro"),
        (name = "Listings", description = "Listagens de mídia com preço final"),
        (name = "Pricing Factors", description = "Fatores e faixas de preço (admin)"),
        (name = "User Factors", description = "Atribuição de fatores a usuários (admin)"),
        (name = "Users", description = "Gestão de usuários (admin)"),
        (name = "Invitations", description = "Convites de acesso (admin)")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
