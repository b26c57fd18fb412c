// src/handlers/session.rs

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    config::AppState,
    middleware::{auth::BearerToken, client::ClientContext},
    models::route::{allowed_roles, canonical_path, DASHBOARD_HOME},
    services::{
        guard::{decide, GuardState},
        session_store::AuthSnapshot,
    },
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PathQuery {
    /// Rota do frontend (padrão: /dashboard)
    pub path: Option<String>,
}

impl PathQuery {
    pub fn path(&self) -> String {
        canonical_path(self.path.as_deref().unwrap_or(DASHBOARD_HOME))
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GuardDecision {
    #[schema(example = "/dashboard/equipment")]
    pub path: String,
    pub state: GuardState,
    #[schema(example = "/dashboard")]
    pub redirect: Option<String>,
}

// GET /api/session
#[utoipa::path(
    get,
    path = "/api/session",
    tag = "Session",
    params(
        ("x-client-id" = Uuid, Header, description = "Instância de aplicação (navegador)")
    ),
    responses(
        (status = 200, description = "Estado atual do store (pode estar carregando); sem o token da sessão aparece deslogado", body = AuthSnapshot)
    ),
    security((), ("api_jwt" = []))
)]
pub async fn get_session(
    State(app_state): State<AppState>,
    client: ClientContext,
    bearer: BearerToken,
) -> Json<AuthSnapshot> {
    let store = app_state.registry.get_or_start(client.0).await;
    Json(store.snapshot().presented_with(bearer.as_deref()))
}

// GET /api/guard?path=/dashboard/equipment
#[utoipa::path(
    get,
    path = "/api/guard",
    tag = "Session",
    params(
        PathQuery,
        ("x-client-id" = Uuid, Header, description = "Instância de aplicação (navegador)")
    ),
    responses(
        (status = 200, description = "Decisão do guard para a rota", body = GuardDecision)
    ),
    security((), ("api_jwt" = []))
)]
pub async fn get_guard(
    State(app_state): State<AppState>,
    client: ClientContext,
    bearer: BearerToken,
    Query(query): Query<PathQuery>,
) -> Json<GuardDecision> {
    let path = query.path();
    let store = app_state.registry.get_or_start(client.0).await;
    let state = decide(&store, allowed_roles(&path), bearer.as_deref()).await;

    Json(GuardDecision {
        path,
        state,
        redirect: state.redirect().map(str::to_string),
    })
}
