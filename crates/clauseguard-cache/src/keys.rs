//! Shared key generation for cache backends.

use chrono::Utc;
use uuid::Uuid;

/// Key for a freshly uploaded contract.
///
/// Unique per request: two uploads by the same user in the same millisecond
/// still get distinct keys.
pub fn upload_key(user_id: Uuid) -> String {
    format!(
        "file:{}:{}:{}",
        user_id,
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    )
}

/// Key for the serialized form of an analysis, scoped to its owner.
pub fn contract_key(user_id: Uuid, analysis_id: Uuid) -> String {
    format!("contract:{}:{}", user_id, analysis_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_keys_are_unique_and_user_scoped() {
        let user = Uuid::new_v4();
        let a = upload_key(user);
        let b = upload_key(user);
        assert_ne!(a, b);
        assert!(a.starts_with(&format!("file:{}:", user)));
    }

    #[test]
    fn contract_key_depends_on_owner() {
        let id = Uuid::new_v4();
        assert_ne!(
            contract_key(Uuid::new_v4(), id),
            contract_key(Uuid::new_v4(), id)
        );
    }
}
