// src/db/profile_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::profile::ProfileRecord,
    services::profile::ProfileStore,
};

#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_profile<'e, E>(&self, executor: E, profile: &ProfileRecord) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, full_name, role, phone, email, company)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
            .bind(profile.id)
            .bind(&profile.full_name)
            .bind(&profile.role)
            .bind(&profile.phone)
            .bind(&profile.email)
            .bind(&profile.company)
            .execute(executor)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl ProfileStore for ProfileRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<ProfileRecord>, AppError> {
        let profile = sqlx::query_as::<_, ProfileRecord>(
            "SELECT id, full_name, role, phone, email, company FROM profiles WHERE id = $1",
        )
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }
}
