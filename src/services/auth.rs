// src/services/auth.rs

use async_trait::async_trait;
use bcrypt::{hash, verify};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ProfileRepository, SessionRepository, UserRepository},
    models::{
        auth::{AuthEvent, AuthEventKind, Claims, Session, UpdateUserPayload, User, UserIdentity},
        profile::ProfileRecord,
        role::Role,
    },
    services::events::{AuthEventHub, AuthSubscription},
};

/// Colaborador de autenticação visto pelo store de sessão.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Sessão atual da instância de aplicação, se houver.
    async fn get_session(&self, client_id: Uuid) -> Result<Option<Session>, AppError>;

    /// Assinatura de mudanças de estado de autenticação do cliente.
    fn subscribe(&self, client_id: Uuid) -> AuthSubscription;

    /// Sequência do último evento publicado para o cliente.
    fn published(&self, client_id: Uuid) -> u64;
}

/// Dados do cadastro já validados.
pub struct SignUp<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub full_name: &'a str,
    pub phone: Option<&'a str>,
    pub role: Option<&'a str>,
}

/// Papel escolhido no cadastro: só o nível cliente pode se autoatribuir.
pub fn self_assignable_role(requested: Option<&str>) -> Result<Role, AppError> {
    let Some(raw) = requested.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(Role::Client);
    };

    match Role::from_label(raw) {
        Some(role) if role.access_tier() == Role::Client => Ok(role),
        _ => Err(AppError::RoleNotSelfAssignable(raw.to_string())),
    }
}

/// Aplica as mudanças do payload sobre o bag de metadados.
pub fn merge_metadata(mut metadata: Map<String, Value>, changes: &UpdateUserPayload) -> Map<String, Value> {
    if let Some(full_name) = &changes.full_name {
        metadata.insert("full_name".into(), Value::String(full_name.trim().to_string()));
    }
    if let Some(phone) = &changes.phone {
        let phone = phone.trim();
        if phone.is_empty() {
            metadata.remove("phone");
        } else {
            metadata.insert("phone".into(), Value::String(phone.to_string()));
        }
    }
    metadata
}

fn clean_phone(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|p| !p.is_empty())
}

/// Metadados gravados no cadastro: nome, papel e telefone (se informado).
pub fn sign_up_metadata(input: &SignUp<'_>, role: Role) -> Map<String, Value> {
    let mut metadata = Map::new();
    metadata.insert("full_name".into(), Value::String(input.full_name.trim().to_string()));
    metadata.insert("role".into(), Value::String(role.as_str().to_string()));
    if let Some(phone) = clean_phone(input.phone) {
        metadata.insert("phone".into(), Value::String(phone.to_string()));
    }
    metadata
}

/// Perfil criado junto com o usuário, com os mesmos valores dos metadados.
pub fn sign_up_profile(user_id: Uuid, email: &str, input: &SignUp<'_>, role: Role) -> ProfileRecord {
    ProfileRecord {
        id: user_id,
        full_name: Some(input.full_name.trim().to_string()),
        role: Some(role.as_str().to_string()),
        phone: clean_phone(input.phone).map(str::to_owned),
        email: Some(email.to_string()),
        company: None,
    }
}

/// O token apresentado (`Authorization: Bearer`) precisa ser o da sessão do cliente.
pub fn bearer_matches(session: &Session, token: Option<&str>) -> Result<(), AppError> {
    match token {
        Some(token) if token == session.access_token => Ok(()),
        _ => Err(AppError::InvalidToken),
    }
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    profile_repo: ProfileRepository,
    session_repo: SessionRepository,
    jwt_secret: String,
    session_ttl: chrono::Duration,
    pool: PgPool,
    events: AuthEventHub,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        profile_repo: ProfileRepository,
        session_repo: SessionRepository,
        jwt_secret: String,
        session_ttl: chrono::Duration,
        pool: PgPool,
    ) -> Self {
        Self {
            user_repo,
            profile_repo,
            session_repo,
            jwt_secret,
            session_ttl,
            pool,
            events: AuthEventHub::new(),
        }
    }

    pub async fn sign_up(&self, client_id: Uuid, input: SignUp<'_>) -> Result<Session, AppError> {
        let role = self_assignable_role(input.role)?;

        let password = input.password.to_owned();
        let hashed_password = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let metadata = sign_up_metadata(&input, role);

        // --- INÍCIO DA TRANSAÇÃO --- usuário e perfil nascem juntos
        let mut tx = self.pool.begin().await?;

        let user = self.user_repo
            .create_user(&mut *tx, input.email.trim(), &hashed_password, metadata)
            .await?;

        let profile = sign_up_profile(user.id, &user.email, &input, role);
        self.profile_repo.create_profile(&mut *tx, &profile).await?;

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        tracing::info!(user_id = %user.id, role = %role, "Novo usuário cadastrado");
        self.start_session(client_id, user).await
    }

    pub async fn sign_in(&self, client_id: Uuid, email: &str, password: &str) -> Result<Session, AppError> {
        let user = self.user_repo
            .find_by_email(email.trim())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.start_session(client_id, user).await
    }

    /// Encerra a sessão do cliente. Sem sessão ativa é um no-op; com sessão,
    /// o token apresentado precisa ser o dela.
    pub async fn sign_out(&self, client_id: Uuid, token: Option<&str>) -> Result<(), AppError> {
        if let Some(current) = self.get_session(client_id).await? {
            bearer_matches(&current, token)?;
        }

        let existed = self.session_repo.delete(client_id).await?;
        tracing::info!(%client_id, existed, "Sessão encerrada");
        self.events.publish(AuthEvent::new(client_id, AuthEventKind::SignedOut, None));
        Ok(())
    }

    pub async fn update_user(
        &self,
        client_id: Uuid,
        token: Option<&str>,
        changes: &UpdateUserPayload,
    ) -> Result<Session, AppError> {
        let current = self.get_session(client_id).await?.ok_or(AppError::InvalidToken)?;
        bearer_matches(&current, token)?;

        let new_hash = match &changes.password {
            Some(password) => {
                let password = password.clone();
                let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
                    .await
                    .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
                Some(hashed)
            }
            None => None,
        };

        let metadata = merge_metadata(current.user.metadata.clone(), changes);
        let user = self.user_repo
            .update_user(current.user.id, metadata, new_hash.as_deref())
            .await?;

        let session = Session { user: UserIdentity::from(user), ..current };
        self.events.publish(AuthEvent::new(client_id, AuthEventKind::UserUpdated, Some(session.clone())));
        Ok(session)
    }

    /// Marca o reenvio da verificação. O envio do e-mail em si fica fora deste serviço.
    pub async fn resend_verification(&self, email: &str) -> Result<(), AppError> {
        match self.user_repo.find_by_email(email.trim()).await? {
            Some(user) if user.email_confirmed_at.is_none() => {
                self.user_repo.mark_verification_sent(user.id).await?;
                tracing::info!(user_id = %user.id, "Reenvio de verificação solicitado");
            }
            // Não revela se o e-mail existe ou já foi confirmado
            _ => tracing::debug!("Reenvio de verificação ignorado"),
        }
        Ok(())
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;
        Ok(token_data.claims)
    }

    fn create_token(&self, user_id: Uuid, client_id: Uuid) -> Result<(String, DateTime<Utc>), AppError> {
        let now = Utc::now();
        let expires_at = now + self.session_ttl;

        let claims = Claims {
            sub: user_id,
            client: client_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?;
        Ok((token, expires_at))
    }

    async fn start_session(&self, client_id: Uuid, user: User) -> Result<Session, AppError> {
        let (access_token, expires_at) = self.create_token(user.id, client_id)?;
        self.session_repo.upsert(client_id, user.id, &access_token, expires_at).await?;

        let session = Session { access_token, expires_at, user: UserIdentity::from(user) };
        tracing::info!(%client_id, user_id = %session.user.id, "Sessão iniciada");
        self.events.publish(AuthEvent::new(client_id, AuthEventKind::SignedIn, Some(session.clone())));
        Ok(session)
    }
}

#[async_trait]
impl AuthProvider for AuthService {
    async fn get_session(&self, client_id: Uuid) -> Result<Option<Session>, AppError> {
        let Some(row) = self.session_repo.find(client_id).await? else {
            return Ok(None);
        };

        let token_ok = row.expires_at > Utc::now()
            && self
                .validate_token(&row.access_token)
                .is_ok_and(|claims| claims.sub == row.user_id && claims.client == client_id);

        if !token_ok {
            tracing::debug!(%client_id, "Sessão persistida expirada ou inválida");
            self.session_repo.delete(client_id).await?;
            return Ok(None);
        }

        let Some(user) = self.user_repo.find_by_id(row.user_id).await? else {
            self.session_repo.delete(client_id).await?;
            return Ok(None);
        };

        Ok(Some(Session {
            access_token: row.access_token,
            expires_at: row.expires_at,
            user: UserIdentity::from(user),
        }))
    }

    fn subscribe(&self, client_id: Uuid) -> AuthSubscription {
        self.events.subscribe(client_id)
    }

    fn published(&self, client_id: Uuid) -> u64 {
        self.events.published(client_id)
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
