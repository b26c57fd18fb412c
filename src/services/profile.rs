// src/services/profile.rs

use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::UserIdentity,
        profile::{Profile, ProfileRecord},
    },
};

/// Limite padrão de espera pela busca do perfil.
pub const DEFAULT_PROFILE_TIMEOUT: Duration = Duration::from_secs(10);

/// Colaborador externo: registro de perfis consultável pelo id do usuário.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<ProfileRecord>, AppError>;
}

/// Busca o perfil com tempo limite. Falha, ausência ou timeout caem para o perfil
/// sintetizado dos metadados; sem sinal de papel o resultado é `None`. Nunca falha.
pub async fn resolve_profile(
    store: &dyn ProfileStore,
    user: &UserIdentity,
    limit: Duration,
) -> Option<Profile> {
    match tokio::time::timeout(limit, store.find_by_user_id(user.id)).await {
        Ok(Ok(Some(record))) => return Some(Profile::from(record)),
        Ok(Ok(None)) => {
            tracing::warn!(user_id = %user.id, "Perfil não encontrado; usando metadados do usuário");
        }
        Ok(Err(e)) => {
            tracing::warn!(user_id = %user.id, error = %e, "Falha ao buscar perfil; usando metadados do usuário");
        }
        Err(_) => {
            tracing::warn!(
                user_id = %user.id,
                timeout_ms = limit.as_millis() as u64,
                "Busca de perfil excedeu o tempo limite; usando metadados do usuário"
            );
        }
    }

    let fallback = Profile::from_metadata(user);
    if fallback.is_none() {
        tracing::warn!(user_id = %user.id, "Nenhum papel nos metadados; perfil ausente");
    }
    fallback
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
