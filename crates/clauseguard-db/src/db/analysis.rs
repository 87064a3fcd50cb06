use chrono::{DateTime, Utc};
use clauseguard_core::models::{ContractAnalysis, NewContractAnalysis, OpportunityItem, RiskItem};
use clauseguard_core::AppError;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Persistence for contract analyses.
///
/// Every read is filtered by owner; there is no update operation.
#[async_trait::async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Validate and insert one record, returning it with its assigned id and timestamp.
    async fn insert(&self, new: NewContractAnalysis) -> Result<ContractAnalysis, AppError>;

    /// All analyses owned by `user_id`, newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ContractAnalysis>, AppError>;

    /// The analysis `id` if it exists and belongs to `user_id`.
    async fn get_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ContractAnalysis>, AppError>;

    /// Delete the analysis `id` owned by `user_id`. Returns whether a row was removed.
    async fn delete_for_user(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError>;

    /// Connectivity probe for health checks.
    async fn ping(&self) -> Result<(), AppError>;
}

/// Row type for the contract_analyses table.
#[derive(Debug, sqlx::FromRow)]
struct AnalysisRow {
    id: Uuid,
    user_id: Uuid,
    contract_text: String,
    contract_type: String,
    overall_score: i32,
    risks: Json<Vec<RiskItem>>,
    opportunities: Json<Vec<OpportunityItem>>,
    summary: String,
    key_clauses: Vec<String>,
    recommendations: Vec<String>,
    negotiation_points: Vec<String>,
    contract_duration: String,
    termination_conditions: String,
    legal_compliance: String,
    ai_model: String,
    language: String,
    created_at: DateTime<Utc>,
}

impl From<AnalysisRow> for ContractAnalysis {
    fn from(row: AnalysisRow) -> Self {
        ContractAnalysis {
            id: row.id,
            user_id: row.user_id,
            contract_text: row.contract_text,
            contract_type: row.contract_type,
            overall_score: row.overall_score,
            risks: row.risks.0,
            opportunities: row.opportunities.0,
            summary: row.summary,
            key_clauses: row.key_clauses,
            recommendations: row.recommendations,
            negotiation_points: row.negotiation_points,
            contract_duration: row.contract_duration,
            termination_conditions: row.termination_conditions,
            legal_compliance: row.legal_compliance,
            ai_model: row.ai_model,
            language: row.language,
            created_at: row.created_at,
        }
    }
}

const ANALYSIS_COLUMNS: &str = "id, user_id, contract_text, contract_type, overall_score, \
     risks, opportunities, summary, key_clauses, recommendations, negotiation_points, \
     contract_duration, termination_conditions, legal_compliance, ai_model, language, created_at";

#[derive(Clone)]
pub struct AnalysisRepository {
    pool: PgPool,
}

impl AnalysisRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AnalysisStore for AnalysisRepository {
    #[tracing::instrument(skip(self, new), fields(
        db.system = "postgresql",
        db.table = "contract_analyses",
        db.operation = "insert",
        user_id = %new.user_id
    ))]
    async fn insert(&self, new: NewContractAnalysis) -> Result<ContractAnalysis, AppError> {
        new.validate()?;

        let outcome = &new.outcome;
        let row = sqlx::query_as::<Postgres, AnalysisRow>(&format!(
            r#"
            INSERT INTO contract_analyses (
                user_id, contract_text, contract_type, overall_score, risks, opportunities,
                summary, key_clauses, recommendations, negotiation_points,
                contract_duration, termination_conditions, legal_compliance, ai_model, language
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {}
            "#,
            ANALYSIS_COLUMNS
        ))
        .bind(new.user_id)
        .bind(&new.contract_text)
        .bind(&new.contract_type)
        .bind(outcome.overall_score)
        .bind(Json(&outcome.risks))
        .bind(Json(&outcome.opportunities))
        .bind(&outcome.summary)
        .bind(&outcome.key_clauses)
        .bind(&outcome.recommendations)
        .bind(&outcome.negotiation_points)
        .bind(&outcome.contract_duration)
        .bind(&outcome.termination_conditions)
        .bind(&outcome.legal_compliance)
        .bind(&new.ai_model)
        .bind(&new.language)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %new.user_id, "Failed to insert contract analysis");
            AppError::Database(e)
        })?;

        tracing::info!(analysis_id = %row.id, contract_type = %row.contract_type, "Stored contract analysis");
        Ok(row.into())
    }

    #[tracing::instrument(skip(self), fields(db.table = "contract_analyses", db.operation = "select"))]
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ContractAnalysis>, AppError> {
        let rows = sqlx::query_as::<Postgres, AnalysisRow>(&format!(
            "SELECT {} FROM contract_analyses WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
            ANALYSIS_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %user_id, "Failed to list contract analyses");
            AppError::Database(e)
        })?;

        Ok(rows.into_iter().map(ContractAnalysis::from).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "contract_analyses", db.operation = "select"))]
    async fn get_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ContractAnalysis>, AppError> {
        let row = sqlx::query_as::<Postgres, AnalysisRow>(&format!(
            "SELECT {} FROM contract_analyses WHERE id = $1 AND user_id = $2",
            ANALYSIS_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ContractAnalysis::from))
    }

    #[tracing::instrument(skip(self), fields(db.table = "contract_analyses", db.operation = "delete"))]
    async fn delete_for_user(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM contract_analyses WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
