//src/lib.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use crate::config::AppState;
use crate::middleware::guard::route_guard;

/// Monta o router completo da aplicação.
pub fn router(app_state: AppState) -> Router {
    // Rotas de autenticação (públicas; só exigem x-client-id)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route("/user", patch(handlers::auth::update_user))
        .route("/resend-verification", post(handlers::auth::resend_verification));

    // Páginas do dashboard, todas atrás do guard de rota
    let dashboard_pages = Router::new()
        .route("/dashboard", get(handlers::dashboard::render_page))
        .route("/dashboard/{*page}", get(handlers::dashboard::render_page))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            route_guard,
        ));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .route("/api/session", get(handlers::session::get_session))
        .route("/api/guard", get(handlers::session::get_guard))
        .route("/api/dashboard/menu", get(handlers::dashboard::get_menu))
        .merge(dashboard_pages)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
