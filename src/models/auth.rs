// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::types::Json;
use uuid::Uuid;
use utoipa::ToSchema;
use validator::Validate;

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    // Bag de metadados livre (full_name, phone, role legado...)
    pub metadata: Json<Map<String, Value>>,
    pub email_confirmed_at: Option<DateTime<Utc>>,
    pub verification_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identidade do usuário como o núcleo a enxerga: somente leitura.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub id: Uuid,

    #[schema(example = "joao@fazenda.com")]
    pub email: String,

    #[schema(value_type = Object)]
    pub metadata: Map<String, Value>,

    pub email_confirmed_at: Option<DateTime<Utc>>,
}

impl UserIdentity {
    /// Lê um campo textual do bag de metadados, ignorando valores vazios.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

impl From<User> for UserIdentity {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            metadata: user.metadata.0,
            email_confirmed_at: user.email_confirmed_at,
        }
    }
}

/// Handle de autenticação. Opaco para o núcleo: só importa que existe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    // Só sai na resposta de login (AuthResponse)
    #[serde(skip_serializing)]
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserIdentity,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,       // Subject (ID do usuário)
    pub client: Uuid,    // Instância de aplicação (navegador) dona da sessão
    pub exp: usize,      // Expiration time
    pub iat: usize,      // Issued At
}

/// Tipos de evento entregues pela assinatura de mudança de estado de autenticação.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEventKind {
    SignedIn,
    SignedOut,
    UserUpdated,
    InitialSession,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthEvent {
    pub client_id: Uuid,
    pub kind: AuthEventKind,
    pub session: Option<Session>,
    // Atribuída na publicação, crescente por cliente
    #[serde(default)]
    pub seq: u64,
}

impl AuthEvent {
    pub fn new(client_id: Uuid, kind: AuthEventKind, session: Option<Session>) -> Self {
        Self { client_id, kind, session, seq: 0 }
    }
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(email(message = "invalid_email"))]
    #[schema(example = "joao@fazenda.com")]
    pub email: String,

    #[validate(length(min = 6, message = "password_too_short"))]
    #[schema(example = "segredo123")]
    pub password: String,

    #[validate(length(min = 1, message = "full_name_required"))]
    #[schema(example = "João Silva")]
    pub full_name: String,

    #[schema(example = "+55 11 99999-8888")]
    pub phone: Option<String>,

    /// Somente papéis do nível cliente podem ser escolhidos no cadastro.
    #[schema(example = "cooperative")]
    pub role: Option<String>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "invalid_email"))]
    #[schema(example = "joao@fazenda.com")]
    pub email: String,

    #[validate(length(min = 6, message = "password_too_short"))]
    pub password: String,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(length(min = 1, message = "full_name_required"))]
    pub full_name: Option<String>,

    pub phone: Option<String>,

    #[validate(length(min = 6, message = "password_too_short"))]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResendVerificationPayload {
    #[validate(email(message = "invalid_email"))]
    pub email: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserIdentity,
}

impl From<Session> for AuthResponse {
    fn from(session: Session) -> Self {
        Self {
            token: session.access_token,
            expires_at: session.expires_at,
            user: session.user,
        }
    }
}
