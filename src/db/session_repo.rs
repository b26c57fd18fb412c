// src/db/session_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::common::error::AppError;

// Sessão persistida de uma instância de aplicação (tabela client_sessions)
#[derive(Debug, Clone, FromRow)]
pub struct ClientSessionRow {
    pub client_id: Uuid,
    pub user_id: Uuid,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, client_id: Uuid) -> Result<Option<ClientSessionRow>, AppError> {
        let row = sqlx::query_as::<_, ClientSessionRow>(
            "SELECT client_id, user_id, access_token, expires_at FROM client_sessions WHERE client_id = $1",
        )
            .bind(client_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    // Um cliente tem no máximo uma sessão: um novo login substitui a anterior
    pub async fn upsert(
        &self,
        client_id: Uuid,
        user_id: Uuid,
        access_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO client_sessions (client_id, user_id, access_token, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (client_id)
            DO UPDATE SET
                user_id = EXCLUDED.user_id,
                access_token = EXCLUDED.access_token,
                expires_at = EXCLUDED.expires_at,
                created_at = NOW()
            "#,
        )
            .bind(client_id)
            .bind(user_id)
            .bind(access_token)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, client_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM client_sessions WHERE client_id = $1")
            .bind(client_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
