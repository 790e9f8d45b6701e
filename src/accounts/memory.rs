use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::accounts::errors::{AccountError, AccountResult};
use crate::accounts::repo::UserStore;
use crate::accounts::repo_types::{NewUser, User};

#[derive(Default)]
struct Inner {
    next_id: i64,
    users: BTreeMap<i64, User>,
}

/// Process-local [`UserStore`]. Email uniqueness is checked and the row
/// inserted under one lock, so concurrent duplicates are rejected.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: Mutex<Inner>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only means another caller panicked mid-read.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: NewUser) -> AccountResult<User> {
        let mut inner = self.lock();
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(AccountError::EmailTaken(user.email));
        }
        inner.next_id += 1;
        let id = inner.next_id;
        let user = user.into_user(id);
        inner.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> AccountResult<Option<User>> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AccountResult<Option<User>> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update_password(&self, id: i64, password: &str) -> AccountResult<bool> {
        match self.lock().users.get_mut(&id) {
            Some(u) => {
                u.password = password.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn touch_last_login(&self, id: i64, at: OffsetDateTime) -> AccountResult<()> {
        if let Some(u) = self.lock().users.get_mut(&id) {
            u.last_login = Some(at);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::repo_types::Role;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            first_name: String::new(),
            last_name: String::new(),
            email: email.into(),
            password: "!unusable".into(),
            role: Role::Patient,
            profile_picture: None,
            bio: None,
            is_active: true,
            is_staff: false,
            is_superuser: false,
        }
    }

    #[tokio::test]
    async fn assigns_increasing_ids() {
        let store = MemoryUserStore::new();
        let a = store.insert(new_user("a@clinic.test")).await.unwrap();
        let b = store.insert(new_user("b@clinic.test")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn rejects_duplicate_email() {
        let store = MemoryUserStore::new();
        store.insert(new_user("a@clinic.test")).await.unwrap();
        let err = store.insert(new_user("a@clinic.test")).await.unwrap_err();
        assert!(matches!(err, AccountError::EmailTaken(e) if e == "a@clinic.test"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn update_password_reports_missing_account() {
        let store = MemoryUserStore::new();
        assert!(!store.update_password(42, "x").await.unwrap());
    }
}
