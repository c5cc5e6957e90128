//! # In-Memory User Directory
//!
//! In-memory implementation of [`UserDirectory`] for tests and local
//! development. Accounts are seeded up front; the marketplace only reads.

use crate::domain::entities::User;
use crate::domain::value_objects::{EmailAddress, UserId};
use crate::infrastructure::persistence::traits::{StoreResult, UserDirectory};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of [`UserDirectory`].
///
/// # Thread Safety
///
/// Accounts live behind an `Arc<RwLock<..>>`; clones see the same data.
///
/// # Examples
///
/// ```
/// use boxoffice::infrastructure::persistence::in_memory::InMemoryUserDirectory;
///
/// let directory = InMemoryUserDirectory::new();
/// assert!(directory.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserDirectory {
    /// Creates a new empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Adds or replaces an account.
    pub async fn insert(&self, user: &User) {
        let mut users = self.users.write().await;
        users.insert(user.id(), user.clone());
    }

    /// Returns the number of seeded accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.try_read().map(|users| users.len()).unwrap_or(0)
    }

    /// Returns true if no accounts are seeded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.email() == email).cloned())
    }
}
