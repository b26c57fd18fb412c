// src/services/guard.rs

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    models::{
        role::Role,
        route::{DASHBOARD_HOME, LOGIN_ROUTE},
    },
    services::session_store::{AuthSnapshot, SessionStore},
};

/// Resultado do guard de rota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GuardState {
    Pending,
    Unauthenticated,
    Unauthorized,
    Authorized,
}

impl GuardState {
    /// Destino do redirecionamento, quando o conteúdo não deve ser renderizado.
    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            GuardState::Unauthenticated => Some(LOGIN_ROUTE),
            GuardState::Unauthorized => Some(DASHBOARD_HOME),
            GuardState::Pending | GuardState::Authorized => None,
        }
    }
}

/// Decide a partir do estado do store. Função pura: mesma entrada, mesma saída.
///
/// `allowed` ausente ou vazio significa "qualquer usuário autenticado".
/// `super_admin` passa por qualquer lista.
pub fn evaluate(snapshot: &AuthSnapshot, allowed: Option<&[Role]>) -> GuardState {
    if snapshot.loading {
        return GuardState::Pending;
    }
    if !snapshot.is_authenticated() {
        return GuardState::Unauthenticated;
    }

    let Some(allowed) = allowed.filter(|roles| !roles.is_empty()) else {
        return GuardState::Authorized;
    };

    match snapshot.role() {
        // Fail-open: sessão válida sem papel resolvível passa pela rota restrita.
        // TODO: levar ao produto/segurança a decisão de negar (fail-closed) este caso.
        None => GuardState::Authorized,
        Some(Role::SuperAdmin) => GuardState::Authorized,
        Some(role) if role.is_allowed_by(allowed) => GuardState::Authorized,
        Some(_) => GuardState::Unauthorized,
    }
}

/// Espera o store terminar de carregar e decide pelo estado visto com `token`.
pub async fn decide(store: &SessionStore, allowed: Option<&[Role]>, token: Option<&str>) -> GuardState {
    evaluate(&store.settled().await.presented_with(token), allowed)
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
