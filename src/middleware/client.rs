// src/middleware/client.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    middleware::i18n::Locale,
};

// Cabeçalho que identifica a instância de aplicação (o navegador)
pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// Instância de aplicação que faz a requisição. Cada uma tem o seu próprio store de sessão.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientContext(pub Uuid);

impl ClientContext {
    pub fn parse(value: Option<&str>) -> Result<Self, AppError> {
        let value = value.ok_or(AppError::MissingClientId)?;
        Uuid::parse_str(value.trim())
            .map(ClientContext)
            .map_err(|_| AppError::InvalidClientId)
    }
}

impl<S> FromRequestParts<S> for ClientContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let locale = Locale::from_request_parts(parts, state)
            .await
            .unwrap_or_else(|never| match never {});

        let raw = parts.headers.get(CLIENT_ID_HEADER).map(|v| v.to_str().ok());

        match raw {
            // Cabeçalho presente mas com caracteres inválidos
            Some(None) => Err(AppError::InvalidClientId.to_api_error(&locale)),
            Some(Some(value)) => ClientContext::parse(Some(value)).map_err(|e| e.to_api_error(&locale)),
            None => Err(AppError::MissingClientId.to_api_error(&locale)),
        }
    }
}
