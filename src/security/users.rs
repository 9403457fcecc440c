//! User credential store.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::RwLock;

use thiserror::Error;

/// Stored credentials for one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDetails {
    pub username: String,
    /// Encoded (hashed) password.
    pub password_hash: String,
    pub authorities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserStoreError {
    #[error("username {0:?} is already taken")]
    UsernameTaken(String),
}

/// Looks up and creates accounts.
pub trait UserDetailsService: Send + Sync + Debug {
    fn load_user(&self, username: &str) -> Option<UserDetails>;

    fn create_user(&self, user: UserDetails) -> Result<(), UserStoreError>;

    fn list_usernames(&self) -> Vec<String>;
}

/// Process-local store, suitable for development and tests.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, UserDetails>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserDetailsService for InMemoryUserStore {
    fn load_user(&self, username: &str) -> Option<UserDetails> {
        let users = self.users.read().expect("user store lock poisoned");
        users.get(username).cloned()
    }

    fn create_user(&self, user: UserDetails) -> Result<(), UserStoreError> {
        let mut users = self.users.write().expect("user store lock poisoned");
        if users.contains_key(&user.username) {
            return Err(UserStoreError::UsernameTaken(user.username));
        }
        users.insert(user.username.clone(), user);
        Ok(())
    }

    fn list_usernames(&self) -> Vec<String> {
        let users = self.users.read().expect("user store lock poisoned");
        let mut names: Vec<String> = users.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> UserDetails {
        UserDetails {
            username: name.to_string(),
            password_hash: "$2b$04$hash".to_string(),
            authorities: vec!["ROLE_CLIENT".to_string()],
        }
    }

    #[test]
    fn test_create_and_load() {
        let store = InMemoryUserStore::new();
        store.create_user(user("bob")).unwrap();
        store.create_user(user("alice")).unwrap();

        assert_eq!(store.load_user("bob"), Some(user("bob")));
        assert_eq!(store.load_user("carol"), None);
        assert_eq!(store.list_usernames(), vec!["alice", "bob"]);
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let store = InMemoryUserStore::new();
        store.create_user(user("bob")).unwrap();
        assert_eq!(
            store.create_user(user("bob")),
            Err(UserStoreError::UsernameTaken("bob".into()))
        );
    }
}
