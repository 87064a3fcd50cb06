//! In-memory stores with the same contracts as the PostgreSQL repositories.

use chrono::Utc;
use clauseguard_core::models::{ContractAnalysis, GoogleProfile, NewContractAnalysis, User};
use clauseguard_core::AppError;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::analysis::AnalysisStore;
use super::user::UserStore;

#[derive(Debug, Default)]
pub struct InMemoryAnalysisStore {
    // Insertion order breaks ties between equal timestamps.
    rows: RwLock<Vec<ContractAnalysis>>,
}

impl InMemoryAnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl AnalysisStore for InMemoryAnalysisStore {
    async fn insert(&self, new: NewContractAnalysis) -> Result<ContractAnalysis, AppError> {
        new.validate()?;
        let analysis = ContractAnalysis::from_new(Uuid::new_v4(), Utc::now(), new);
        self.rows.write().await.push(analysis.clone());
        Ok(analysis)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ContractAnalysis>, AppError> {
        let rows = self.rows.read().await;
        let mut owned: Vec<ContractAnalysis> = rows
            .iter()
            .rev()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        // stable sort keeps later inserts first among equal timestamps
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn get_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ContractAnalysis>, AppError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|a| a.id == id && a.user_id == user_id)
            .cloned())
    }

    async fn delete_for_user(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|a| !(a.id == id && a.user_id == user_id));
        Ok(rows.len() < before)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    async fn upsert_google_user(&self, profile: &GoogleProfile) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        let now = Utc::now();

        if let Some(existing) = users
            .values_mut()
            .find(|u| u.google_id == profile.google_id)
        {
            existing.email = profile.email.clone();
            existing.display_name = profile.display_name.clone();
            existing.profile_picture = profile.profile_picture.clone();
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let user = User {
            id: Uuid::new_v4(),
            google_id: profile.google_id.clone(),
            email: profile.email.clone(),
            display_name: profile.display_name.clone(),
            profile_picture: profile.profile_picture.clone(),
            is_premium: false,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn set_premium(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|u| {
            u.is_premium = true;
            u.updated_at = Utc::now();
            u.clone()
        }))
    }
}
