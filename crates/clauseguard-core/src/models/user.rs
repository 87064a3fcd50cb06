use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A signed-in account. Created on first Google sign-in.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub google_id: String,
    pub email: String,
    pub display_name: String,
    pub profile_picture: Option<String>,
    pub is_premium: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn membership_status(&self) -> MembershipStatus {
        if self.is_premium {
            MembershipStatus::Active
        } else {
            MembershipStatus::Inactive
        }
    }
}

/// Identity returned by Google after a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleProfile {
    pub google_id: String,
    pub email: String,
    pub display_name: String,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Active,
    Inactive,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MembershipStatusResponse {
    pub status: MembershipStatus,
}
