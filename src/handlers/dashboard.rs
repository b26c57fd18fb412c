// src/handlers/dashboard.rs

use axum::{
    extract::{Query, State},
    http::Uri,
    Extension, Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    config::AppState,
    handlers::session::PathQuery,
    middleware::{auth::BearerToken, client::ClientContext},
    models::{
        menu::{menu_for, MenuItem, BASELINE_ROLE},
        profile::Profile,
        role::Role,
        route::canonical_path,
    },
    services::session_store::AuthSnapshot,
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuResponse {
    /// Papel efetivo usado para escolher o menu
    pub role: Role,
    pub items: Vec<MenuItem>,
}

/// O que o shell renderiza em volta da página.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardShell {
    #[schema(example = "/dashboard/equipment")]
    pub path: String,
    pub role: Role,
    pub profile: Option<Profile>,
    pub menu: Vec<MenuItem>,
}

pub fn build_shell(snapshot: &AuthSnapshot, path: &str) -> DashboardShell {
    let path = canonical_path(path);
    DashboardShell {
        menu: menu_for(snapshot.role(), &path),
        path,
        role: snapshot.role().unwrap_or(BASELINE_ROLE),
        profile: snapshot.profile.clone(),
    }
}

// GET /api/dashboard/menu?path=/dashboard/rentals
#[utoipa::path(
    get,
    path = "/api/dashboard/menu",
    tag = "Dashboard",
    params(
        PathQuery,
        ("x-client-id" = Uuid, Header, description = "Instância de aplicação (navegador)")
    ),
    responses(
        (status = 200, description = "Menu lateral do papel atual", body = MenuResponse)
    ),
    security((), ("api_jwt" = []))
)]
pub async fn get_menu(
    State(app_state): State<AppState>,
    client: ClientContext,
    bearer: BearerToken,
    Query(query): Query<PathQuery>,
) -> Json<MenuResponse> {
    let store = app_state.registry.get_or_start(client.0).await;
    let snapshot = store.settled().await.presented_with(bearer.as_deref());

    Json(MenuResponse {
        role: snapshot.role().unwrap_or(BASELINE_ROLE),
        items: menu_for(snapshot.role(), &query.path()),
    })
}

// GET /dashboard/*  (atrás do route_guard)
#[utoipa::path(
    get,
    path = "/dashboard/{page}",
    tag = "Dashboard",
    params(
        ("page" = String, Path, description = "Página do dashboard"),
        ("x-client-id" = Uuid, Header, description = "Instância de aplicação (navegador)")
    ),
    responses(
        (status = 200, description = "Shell do dashboard", body = DashboardShell),
        (status = 303, description = "Redireciona para /login ou /dashboard")
    ),
    security(("api_jwt" = []))
)]
pub async fn render_page(Extension(snapshot): Extension<AuthSnapshot>, uri: Uri) -> Json<DashboardShell> {
    Json(build_shell(&snapshot, uri.path()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::{Session, UserIdentity};
    use chrono::Utc;
    use serde_json::Map;

    fn snapshot(role: Option<Role>) -> AuthSnapshot {
        let user = UserIdentity { id: Uuid::new_v4(), email: "a@b.c".into(), metadata: Map::new(), email_confirmed_at: None };
        AuthSnapshot {
            session: Some(Session { access_token: "t".into(), expires_at: Utc::now(), user: user.clone() }),
            profile: role.map(|role| Profile {
                id: user.id,
                full_name: None,
                role: Some(role),
                phone: None,
                email: None,
                company: None,
                degraded: false,
            }),
            user: Some(user),
            loading: false,
        }
    }

    #[test]
    fn shell_highlights_current_page() {
        let shell = build_shell(&snapshot(Some(Role::StockManager)), "/dashboard/inventory/");
        assert_eq!(shell.path, "/dashboard/inventory");
        assert_eq!(shell.role, Role::StockManager);
        let active: Vec<_> = shell.menu.iter().filter(|i| i.active).map(|i| i.path.as_str()).collect();
        assert_eq!(active, vec!["/dashboard/inventory"]);
    }

    #[test]
    fn shell_without_role_uses_baseline_menu() {
        let shell = build_shell(&snapshot(None), "/dashboard");
        assert_eq!(shell.role, BASELINE_ROLE);
        assert_eq!(shell.menu, menu_for(Some(Role::Client), "/dashboard"));
    }

    #[test]
    fn shell_echoes_the_canonical_path() {
        let shell = build_shell(&snapshot(Some(Role::Admin)), "/Dashboard/%55sers");
        assert_eq!(shell.path, "/dashboard/users");
        assert!(shell.menu.iter().any(|i| i.active && i.path == "/dashboard/users"));
    }
}
