//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `AnalysisStore` and `AccountStore` ports from the `core` crate. It handles
//! all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use livestock_core::domain::{
    AnalysisRecord, BreedCandidate, NewAnalysis, ReportData, User, UserCredentials,
};
use livestock_core::ports::{AccountStore, AnalysisStore, PortError, PortResult};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the storage ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

const ANALYSIS_COLUMNS: &str =
    "id, owner_id, image, location, report_data, yolo_data, created_at, updated_at";

#[derive(FromRow)]
struct AnalysisRow {
    id: Uuid,
    owner_id: Uuid,
    image: String,
    location: String,
    report_data: Json<ReportData>,
    yolo_data: Json<Vec<BreedCandidate>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl AnalysisRow {
    fn to_domain(self) -> AnalysisRecord {
        AnalysisRecord {
            id: self.id,
            owner_id: self.owner_id,
            image: self.image,
            location: self.location,
            report_data: self.report_data.0,
            yolo_data: self.yolo_data.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    hashed_password: String,
}
impl UserRow {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user: User {
                user_id: self.id,
                name: self.name,
                email: self.email,
            },
            hashed_password: self.hashed_password,
        }
    }
}

//=========================================================================================
// `AnalysisStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl AnalysisStore for DbAdapter {
    async fn create_analysis(&self, analysis: NewAnalysis) -> PortResult<AnalysisRecord> {
        let sql = format!(
            "INSERT INTO analyses (id, owner_id, image, location, report_data, yolo_data) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            ANALYSIS_COLUMNS
        );
        let row = sqlx::query_as::<_, AnalysisRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(analysis.owner_id)
            .bind(&analysis.image)
            .bind(&analysis.location)
            .bind(Json(&analysis.report_data))
            .bind(Json(&analysis.yolo_data))
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(row.to_domain())
    }

    async fn list_analyses_by_owner(&self, owner_id: Uuid) -> PortResult<Vec<AnalysisRecord>> {
        let sql = format!(
            "SELECT {} FROM analyses WHERE owner_id = $1 ORDER BY created_at DESC, seq DESC",
            ANALYSIS_COLUMNS
        );
        let rows = sqlx::query_as::<_, AnalysisRow>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(rows.into_iter().map(AnalysisRow::to_domain).collect())
    }

    async fn fetch_analysis(&self, analysis_id: Uuid) -> PortResult<AnalysisRecord> {
        let sql = format!("SELECT {} FROM analyses WHERE id = $1", ANALYSIS_COLUMNS);
        sqlx::query_as::<_, AnalysisRow>(&sql)
            .bind(analysis_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?
            .map(AnalysisRow::to_domain)
            .ok_or_else(|| PortError::NotFound(format!("Analysis {} not found", analysis_id)))
    }
}

//=========================================================================================
// `AccountStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl AccountStore for DbAdapter {
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (id, name, email, hashed_password) VALUES ($1, $2, $3, $4) \
             RETURNING id, name, email, hashed_password",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                PortError::Conflict(format!("User {} already exists", email))
            }
            other => unexpected(other),
        })?;
        Ok(row.to_domain().user)
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .map(UserRow::to_domain)
        .ok_or_else(|| PortError::NotFound(format!("User {} not found", email)))
    }

    async fn create_auth_session(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(token)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, token: &str) -> PortResult<Uuid> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > now()",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, token: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}
