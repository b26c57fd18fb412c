// src/models/profile.rs

use serde::Serialize;
use uuid::Uuid;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::{auth::UserIdentity, role::Role};

// O que sai do banco (Tabela profiles). O papel ainda é texto livre aqui.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRecord {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
}

/// Perfil publicado pelo store: o papel já está normalizado.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,

    #[schema(example = "João Silva")]
    pub full_name: Option<String>,

    pub role: Option<Role>,

    #[schema(example = "+55 11 99999-8888")]
    pub phone: Option<String>,

    #[schema(example = "joao@fazenda.com")]
    pub email: Option<String>,

    #[schema(example = "Cooperativa Vale Verde")]
    pub company: Option<String>,

    /// Verdadeiro quando o perfil foi sintetizado a partir dos metadados do usuário.
    pub degraded: bool,
}

impl From<ProfileRecord> for Profile {
    fn from(record: ProfileRecord) -> Self {
        Self {
            id: record.id,
            full_name: record.full_name,
            role: record.role.as_deref().and_then(Role::from_label),
            phone: record.phone,
            email: record.email,
            company: record.company,
            degraded: false,
        }
    }
}

impl Profile {
    /// Perfil mínimo derivado dos metadados. Sem nenhum sinal de papel não há perfil.
    pub fn from_metadata(user: &UserIdentity) -> Option<Self> {
        let role = Role::normalize(user.metadata.get("role"))?;

        Some(Self {
            id: user.id,
            full_name: user
                .metadata_str("full_name")
                .or_else(|| user.metadata_str("name"))
                .map(str::to_owned),
            role: Some(role),
            phone: user.metadata_str("phone").map(str::to_owned),
            email: Some(user.email.clone()),
            company: user.metadata_str("company").map(str::to_owned),
            degraded: true,
        })
    }
}
