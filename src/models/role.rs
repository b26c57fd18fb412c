// src/models/role.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use utoipa::ToSchema;

/// Papéis canônicos da plataforma.
///
/// `Cooperative` e `Provider` são aliases voltados ao tenant e herdam o acesso de `Client`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    StockManager,
    Technician,
    Client,
    Accountant,
    Cooperative,
    Provider,
}

// Tabela finita de grafias aceitas, já canonicalizadas (minúsculas, separador '_').
const ROLE_LABELS: &[(&str, Role)] = &[
    ("super_admin", Role::SuperAdmin),
    ("superadmin", Role::SuperAdmin),
    ("admin", Role::Admin),
    ("administrator", Role::Admin),
    ("stock_manager", Role::StockManager),
    ("stockmanager", Role::StockManager),
    ("technician", Role::Technician),
    ("client", Role::Client),
    ("accountant", Role::Accountant),
    ("cooperative", Role::Cooperative),
    ("provider", Role::Provider),
];

impl Role {
    pub const ALL: [Role; 8] = [
        Role::SuperAdmin,
        Role::Admin,
        Role::StockManager,
        Role::Technician,
        Role::Client,
        Role::Accountant,
        Role::Cooperative,
        Role::Provider,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::StockManager => "stock_manager",
            Role::Technician => "technician",
            Role::Client => "client",
            Role::Accountant => "accountant",
            Role::Cooperative => "cooperative",
            Role::Provider => "provider",
        }
    }

    /// Normaliza um rótulo livre ("Super Admin", "SUPER_ADMIN", "super-admin"...).
    /// Rótulos desconhecidos retornam `None`, nunca um papel "adivinhado".
    pub fn from_label(label: &str) -> Option<Role> {
        let canonical: String = label
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                other => other.to_ascii_lowercase(),
            })
            .collect();

        ROLE_LABELS
            .iter()
            .find(|(known, _)| *known == canonical)
            .map(|(_, role)| *role)
    }

    /// Função total sobre valores vindos de um bag de metadados (JSON dinâmico).
    pub fn normalize(value: Option<&Value>) -> Option<Role> {
        match value {
            Some(Value::String(label)) => Role::from_label(label),
            _ => None,
        }
    }

    /// Nível de acesso efetivo: aliases de tenant contam como `Client`.
    pub fn access_tier(&self) -> Role {
        match self {
            Role::Cooperative | Role::Provider => Role::Client,
            other => *other,
        }
    }

    /// Verdadeiro se o papel (ou o seu nível de acesso) está na lista permitida.
    pub fn is_allowed_by(&self, allowed: &[Role]) -> bool {
        allowed.contains(self) || allowed.contains(&self.access_tier())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "role_test.rs"]
mod tests;
