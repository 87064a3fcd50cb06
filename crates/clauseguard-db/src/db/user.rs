use chrono::{DateTime, Utc};
use clauseguard_core::models::{GoogleProfile, User};
use clauseguard_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Create the account for a Google identity, or refresh its profile fields.
    async fn upsert_google_user(&self, profile: &GoogleProfile) -> Result<User, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Flag the account as premium. Returns the updated user, or `None` if it does not exist.
    async fn set_premium(&self, id: Uuid) -> Result<Option<User>, AppError>;
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    google_id: String,
    email: String,
    display_name: String,
    profile_picture: Option<String>,
    is_premium: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            google_id: row.google_id,
            email: row.email,
            display_name: row.display_name,
            profile_picture: row.profile_picture,
            is_premium: row.is_premium,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserStore for UserRepository {
    #[tracing::instrument(skip(self, profile), fields(db.table = "users", db.operation = "upsert"))]
    async fn upsert_google_user(&self, profile: &GoogleProfile) -> Result<User, AppError> {
        let row = sqlx::query_as::<Postgres, UserRow>(
            r#"
            INSERT INTO users (google_id, email, display_name, profile_picture)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (google_id) DO UPDATE
                SET email = EXCLUDED.email,
                    display_name = EXCLUDED.display_name,
                    profile_picture = EXCLUDED.profile_picture,
                    updated_at = NOW()
            RETURNING id, google_id, email, display_name, profile_picture, is_premium, created_at, updated_at
            "#,
        )
        .bind(&profile.google_id)
        .bind(&profile.email)
        .bind(&profile.display_name)
        .bind(&profile.profile_picture)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to upsert user: {}", e);
            AppError::Database(e)
        })?;

        Ok(row.into())
    }

    async fn get(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<Postgres, UserRow>(
            r#"
            SELECT id, google_id, email, display_name, profile_picture, is_premium, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch user by ID: {}", e);
            AppError::Database(e)
        })?;

        Ok(row.map(User::from))
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "update"))]
    async fn set_premium(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<Postgres, UserRow>(
            r#"
            UPDATE users
            SET is_premium = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING id, google_id, email, display_name, profile_picture, is_premium, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        if row.is_some() {
            tracing::info!(user_id = %id, "User upgraded to premium");
        }
        Ok(row.map(User::from))
    }
}
