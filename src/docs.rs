// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::update_user,
        handlers::auth::resend_verification,

        // --- Session ---
        handlers::session::get_session,
        handlers::session::get_guard,

        // --- Dashboard ---
        handlers::dashboard::get_menu,
        handlers::dashboard::render_page,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserIdentity,
            models::auth::Session,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::UpdateUserPayload,
            models::auth::ResendVerificationPayload,
            models::auth::AuthResponse,

            // --- Perfil e papéis ---
            models::role::Role,
            models::profile::Profile,

            // --- Session ---
            services::session_store::AuthSnapshot,
            services::guard::GuardState,
            handlers::session::GuardDecision,

            // --- Dashboard ---
            models::menu::Icon,
            models::menu::MenuItem,
            handlers::dashboard::MenuResponse,
            handlers::dashboard::DashboardShell,
        )
    ),
    tags(
        (name = "Auth", description = "Cadastro, login e sessão"),
        (name = "Session", description = "Estado de autenticação e decisão do guard"),
        (name = "Dashboard", description = "Shell do dashboard e menu por papel")
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
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
