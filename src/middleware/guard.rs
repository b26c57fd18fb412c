// src/middleware/guard.rs

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    config::AppState,
    middleware::{auth::BearerToken, client::ClientContext},
    models::route::allowed_roles,
    services::guard::{evaluate, GuardState},
};

/// Redirecionamento correspondente ao estado do guard (`None` = renderizar a página).
pub fn guard_redirect(state: GuardState) -> Option<Redirect> {
    state.redirect().map(Redirect::to)
}

// Guard das páginas do dashboard: espera o store do cliente assentar,
// consulta a tabela de rotas e redireciona ou segue adiante.
pub async fn route_guard(
    State(app_state): State<AppState>,
    client: ClientContext,
    bearer: BearerToken,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();

    let store = app_state.registry.get_or_start(client.0).await;
    let snapshot = store.settled().await.presented_with(bearer.as_deref());
    let state = evaluate(&snapshot, allowed_roles(&path));

    if let Some(redirect) = guard_redirect(state) {
        tracing::info!(client_id = %client.0, %path, ?state, "Acesso à página negado");
        return redirect.into_response();
    }

    // A página recebe o estado que foi usado na decisão
    request.extensions_mut().insert(snapshot);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::LOCATION, StatusCode};

    fn location(state: GuardState) -> (StatusCode, String) {
        let response = guard_redirect(state).expect("redirect").into_response();
        let location = response.headers()[LOCATION].to_str().unwrap().to_string();
        (response.status(), location)
    }

    #[test]
    fn unauthenticated_goes_to_login() {
        assert_eq!(location(GuardState::Unauthenticated), (StatusCode::SEE_OTHER, "/login".to_string()));
    }

    #[test]
    fn unauthorized_goes_to_dashboard_home() {
        assert_eq!(location(GuardState::Unauthorized), (StatusCode::SEE_OTHER, "/dashboard".to_string()));
    }

    #[test]
    fn authorized_renders_content() {
        assert!(guard_redirect(GuardState::Authorized).is_none());
    }
}
