/// In-memory `UserStore`.
///
/// Test double and development store. A single mutex serializes all access,
/// which makes `update_refresh_tokens` trivially atomic: remove-if-present
/// and insert happen under one guard, so a raced rotation observes either
/// the old set or the new one, never a partial write. The guard is never
/// held across an await point.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::store::{StoreError, UserStore};
use crate::user::{NewUser, User};

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, User>>, StoreError> {
        self.users
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.lock()?;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.lock()?;

        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict);
        }

        let now = Utc::now();
        let record = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            refresh_tokens: HashSet::new(),
            created_at: now,
            updated_at: now,
        };
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_refresh_tokens(
        &self,
        user_id: Uuid,
        remove: Option<&str>,
        add: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut users = self.lock()?;

        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::Unavailable("unknown user id".to_string()))?;

        if let Some(fingerprint) = remove {
            // Remove-if-present: a fingerprint that is already gone means the
            // token was rotated by a concurrent call.
            if !user.refresh_tokens.remove(fingerprint) {
                return Err(StoreError::Conflict);
            }
        }
        if let Some(fingerprint) = add {
            user.refresh_tokens.insert(fingerprint.to_string());
        }
        user.updated_at = Utc::now();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "$2b$10$irrelevant".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = MemoryStore::new();
        let created = store.insert(new_user("a@x.com")).await.expect("insert failed");

        let found = store
            .find_by_email("a@x.com")
            .await
            .expect("find failed")
            .expect("user missing");
        assert_eq!(found.id, created.id);
        assert!(found.refresh_tokens.is_empty());
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_sensitive() {
        let store = MemoryStore::new();
        store.insert(new_user("a@x.com")).await.expect("insert failed");

        let found = store.find_by_email("A@X.COM").await.expect("find failed");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_insert_conflicts() {
        let store = MemoryStore::new();
        store.insert(new_user("a@x.com")).await.expect("insert failed");

        let second = store.insert(new_user("a@x.com")).await;
        match second {
            Err(StoreError::Conflict) => (),
            _ => panic!("Expected Conflict"),
        }
    }

    #[tokio::test]
    async fn test_conditional_update_add_and_remove() {
        let store = MemoryStore::new();
        let user = store.insert(new_user("a@x.com")).await.expect("insert failed");

        store
            .update_refresh_tokens(user.id, None, Some("fp-1"))
            .await
            .expect("add failed");
        store
            .update_refresh_tokens(user.id, Some("fp-1"), Some("fp-2"))
            .await
            .expect("rotate failed");

        let found = store
            .find_by_email("a@x.com")
            .await
            .expect("find failed")
            .expect("user missing");
        assert!(!found.refresh_tokens.contains("fp-1"));
        assert!(found.refresh_tokens.contains("fp-2"));
    }

    #[tokio::test]
    async fn test_removing_absent_fingerprint_conflicts_and_adds_nothing() {
        let store = MemoryStore::new();
        let user = store.insert(new_user("a@x.com")).await.expect("insert failed");

        let result = store
            .update_refresh_tokens(user.id, Some("never-issued"), Some("fp-new"))
            .await;
        match result {
            Err(StoreError::Conflict) => (),
            _ => panic!("Expected Conflict"),
        }

        let found = store
            .find_by_email("a@x.com")
            .await
            .expect("find failed")
            .expect("user missing");
        assert!(found.refresh_tokens.is_empty());
    }
}
