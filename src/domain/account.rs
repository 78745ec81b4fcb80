//! User registry and session state
//!
//! Anonymous -> Authenticated on login/signup, back to Anonymous on logout.
//! No expiry is modeled; the session reference persists until explicit
//! logout.
//!
//! Passwords are stored as salted Argon2 hashes. The source this replaces
//! compared plaintext, which is unacceptable for production; accept/reject
//! behavior is unchanged.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{Result, StorefrontError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Customer,
    Seller,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub member_since: String,
    #[serde(default)]
    pub role: Option<UserRole>,
}

/// Profile edit; only the name is mutable in the current storefront.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProfilePatch {
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AccountStore {
    users: Vec<User>,
    current: Option<u64>,
}

impl AccountStore {
    pub fn new(users: Vec<User>, current: Option<u64>) -> Self {
        // A stale session reference to a deleted user falls back to anonymous.
        let current = current.filter(|id| users.iter().any(|u| u.id == *id));
        Self { users, current }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn current(&self) -> Option<&User> {
        self.current.and_then(|id| self.users.iter().find(|u| u.id == id))
    }

    pub fn current_id(&self) -> Option<u64> {
        self.current
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// Creates a user and authenticates immediately.
    pub fn sign_up(&mut self, name: &str, email: &str, password: &str) -> Result<User> {
        if self
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(email))
        {
            return Err(StorefrontError::DuplicateEmail);
        }
        let id = self.users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let user = User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password)?,
            member_since: Utc::now().format("%B %Y").to_string(),
            role: None,
        };
        self.users.push(user.clone());
        self.current = Some(id);
        Ok(user)
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<User> {
        let user = self
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .ok_or(StorefrontError::InvalidCredentials)?
            .clone();
        verify_password(password, &user.password_hash)?;
        self.current = Some(user.id);
        Ok(user)
    }

    /// Clears the session reference only; the cart survives logout.
    pub fn logout(&mut self) {
        self.current = None;
    }

    pub fn update_profile(&mut self, user_id: u64, patch: ProfilePatch) -> Result<&User> {
        let user = self
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(StorefrontError::NotFound)?;
        if let Some(name) = patch.name {
            user.name = name;
        }
        Ok(&*user)
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StorefrontError::Storage(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> Result<()> {
    let parsed = PasswordHash::new(hash).map_err(|_| StorefrontError::InvalidCredentials)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| StorefrontError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_up_authenticates() {
        let mut accounts = AccountStore::default();
        let id = accounts.sign_up("Alex", "alex@example.com", "secret123").unwrap().id;
        assert_eq!(accounts.current_id(), Some(id));
    }

    #[test]
    fn test_duplicate_email_is_case_insensitive() {
        let mut accounts = AccountStore::default();
        accounts.sign_up("Alex", "alex@example.com", "secret123").unwrap();
        assert!(matches!(
            accounts.sign_up("Other", "ALEX@Example.COM", "pw123456"),
            Err(StorefrontError::DuplicateEmail)
        ));
    }

    #[test]
    fn test_login_round_trip() {
        let mut accounts = AccountStore::default();
        accounts.sign_up("Alex", "alex@example.com", "secret123").unwrap();
        accounts.logout();
        assert!(!accounts.is_authenticated());

        assert!(accounts.login("ALEX@example.com", "wrong").is_err());
        let user = accounts.login("ALEX@example.com", "secret123").unwrap();
        assert_eq!(user.name, "Alex");
    }

    #[test]
    fn test_update_profile_patches_name_only() {
        let mut accounts = AccountStore::default();
        let id = accounts.sign_up("Alex", "alex@example.com", "secret123").unwrap().id;
        accounts
            .update_profile(id, ProfilePatch { name: Some("Alex M".into()) })
            .unwrap();
        assert_eq!(accounts.current().unwrap().name, "Alex M");
        assert_eq!(accounts.current().unwrap().email, "alex@example.com");
    }

    #[test]
    fn test_stale_session_reference_falls_back_to_anonymous() {
        let accounts = AccountStore::new(vec![], Some(42));
        assert!(!accounts.is_authenticated());
    }
}
