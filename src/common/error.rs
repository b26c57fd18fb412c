use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::middleware::i18n::Locale;

// Erros de domínio e de infraestrutura. Viram `ApiError` na borda HTTP.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Cabeçalho x-client-id ausente")]
    MissingClientId,

    #[error("Cabeçalho x-client-id inválido")]
    InvalidClientId,

    #[error("Papel não pode ser escolhido no cadastro: {0}")]
    RoleNotSelfAssignable(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

/// Erros de configuração detectados no boot. Não são recuperáveis pelo núcleo.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("variável de ambiente obrigatória ausente: {0}")]
    Missing(&'static str),

    #[error("valor inválido para {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Resposta de erro já localizada.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::EmailAlreadyExists => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::MissingClientId | AppError::InvalidClientId => StatusCode::BAD_REQUEST,
            AppError::RoleNotSelfAssignable(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Mensagem para o usuário final no idioma pedido (pt ou en).
    fn message(&self, lang: &str) -> String {
        let pt = lang == "pt";
        let text = match self {
            AppError::ValidationError(_) if pt => "Um ou mais campos são inválidos.",
            AppError::ValidationError(_) => "One or more fields are invalid.",
            AppError::EmailAlreadyExists if pt => "Este e-mail já está em uso.",
            AppError::EmailAlreadyExists => "This e-mail is already in use.",
            AppError::InvalidCredentials if pt => "E-mail ou senha inválidos.",
            AppError::InvalidCredentials => "Invalid e-mail or password.",
            AppError::InvalidToken if pt => "Sessão inválida ou ausente.",
            AppError::InvalidToken => "Missing or invalid session.",
            AppError::UserNotFound if pt => "Usuário não encontrado.",
            AppError::UserNotFound => "User not found.",
            AppError::MissingClientId if pt => "O cabeçalho x-client-id é obrigatório.",
            AppError::MissingClientId => "The x-client-id header is required.",
            AppError::InvalidClientId if pt => "Cabeçalho x-client-id inválido (não é um UUID).",
            AppError::InvalidClientId => "Invalid x-client-id header (not a UUID).",
            AppError::RoleNotSelfAssignable(role) if pt => {
                return format!("O papel '{role}' não pode ser escolhido no cadastro.");
            }
            AppError::RoleNotSelfAssignable(role) => {
                return format!("The role '{role}' cannot be chosen at sign-up.");
            }
            _ if pt => "Ocorreu um erro inesperado.",
            _ => "An unexpected error occurred.",
        };
        text.to_string()
    }

    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let codes: Vec<Value> = field_errors
                        .iter()
                        .map(|e| {
                            let code = e.message.as_deref().unwrap_or(&e.code);
                            Value::String(code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), Value::Array(codes));
                }
                Some(Value::Object(details))
            }
            _ => None,
        };

        ApiError { status, error: self.message(&locale.0), details }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
