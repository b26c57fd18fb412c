// src/models/route.rs

use crate::models::role::Role;

pub const LOGIN_ROUTE: &str = "/login";
pub const DASHBOARD_HOME: &str = "/dashboard";

/// Rota protegida e a sua lista de papéis permitidos (`None` = qualquer usuário autenticado).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtectedRoute {
    pub path: &'static str,
    pub allowed: Option<&'static [Role]>,
}

const fn route(path: &'static str, allowed: Option<&'static [Role]>) -> ProtectedRoute {
    ProtectedRoute { path, allowed }
}

const CLIENT_ONLY: &[Role] = &[Role::Client];

const ROUTES: &[ProtectedRoute] = &[
    route(DASHBOARD_HOME, None),
    route("/dashboard/profile", None),
    route("/dashboard/users", Some(&[Role::Admin, Role::SuperAdmin])),
    route("/dashboard/cooperatives", Some(&[Role::SuperAdmin])),
    route("/dashboard/settings", Some(&[Role::SuperAdmin])),
    route("/dashboard/equipment", Some(&[Role::StockManager, Role::Admin, Role::SuperAdmin])),
    route("/dashboard/inventory", Some(&[Role::StockManager, Role::Admin])),
    route("/dashboard/rentals", Some(&[Role::StockManager, Role::Admin, Role::Accountant])),
    route("/dashboard/interventions", Some(&[Role::Technician, Role::StockManager, Role::Admin])),
    route("/dashboard/maintenance", Some(&[Role::Technician])),
    route("/dashboard/payments", Some(&[Role::Accountant, Role::Admin])),
    route("/dashboard/invoices", Some(&[Role::Accountant])),
    route("/dashboard/credits", Some(&[Role::Accountant, Role::Admin])),
    route("/dashboard/reports", Some(&[Role::Accountant, Role::Admin])),
    route("/dashboard/catalog", Some(CLIENT_ONLY)),
    route("/dashboard/bookings", Some(CLIENT_ONLY)),
    route("/dashboard/my-rentals", Some(CLIENT_ONLY)),
    route("/dashboard/properties", Some(CLIENT_ONLY)),
    route("/dashboard/harvests", Some(CLIENT_ONLY)),
    route("/dashboard/my-payments", Some(CLIENT_ONLY)),
];

/// Forma canônica do caminho usada na busca de rotas e no destaque do menu.
///
/// Remove query string e fragmento, decodifica percent-encoding, passa para
/// minúsculas e resolve segmentos vazios, `.` e `..`:
/// "/Dashboard/%75sers/?x=1" -> "/dashboard/users".
pub fn canonical_path(path: &str) -> String {
    let raw = path.split(['?', '#']).next().unwrap_or(path);
    // Sequência inválida (UTF-8 quebrado) segue sem decodificar
    let decoded = urlencoding::decode(raw).map(|d| d.into_owned()).unwrap_or_else(|_| raw.to_string());
    let lowered = decoded.to_lowercase();

    let mut segments: Vec<&str> = Vec::new();
    for segment in lowered.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    format!("/{}", segments.join("/"))
}

/// Rota mais específica (prefixo mais longo, respeitando segmentos) que cobre o caminho.
pub fn find_route(path: &str) -> Option<&'static ProtectedRoute> {
    let path = canonical_path(path);
    let path = path.as_str();
    ROUTES
        .iter()
        .filter(|r| {
            path == r.path
                || path
                    .strip_prefix(r.path)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
        .max_by_key(|r| r.path.len())
}

/// Lista de papéis exigida pelo caminho; caminhos sem entrada exigem só autenticação.
pub fn allowed_roles(path: &str) -> Option<&'static [Role]> {
    find_route(path).and_then(|r| r.allowed)
}

#[cfg(test)]
#[path = "route_test.rs"]
mod tests;
