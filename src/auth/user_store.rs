//! User Storage
//! Mission: Persist user accounts and enforce username/email uniqueness

use crate::auth::models::User;
use crate::auth::password::hash_password;
use crate::db::Db;
use anyhow::{Context, Result};
use rusqlite::{params, ErrorCode};
use tracing::{info, warn};

/// Errors from user creation.
///
/// Duplicates are detected by a pre-check for friendlier messages, but the
/// UNIQUE constraints in the schema are authoritative: a concurrent signup
/// that slips past the pre-check still maps back to the same variants.
#[derive(Debug)]
pub enum UserStoreError {
    DuplicateUsername(String),
    DuplicateEmail(String),
    Database(anyhow::Error),
}

impl std::fmt::Display for UserStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserStoreError::DuplicateUsername(name) => {
                write!(f, "Username: {}, already registered", name)
            }
            UserStoreError::DuplicateEmail(email) => {
                write!(f, "Email ID: {}, already registered", email)
            }
            UserStoreError::Database(err) => write!(f, "Database error: {}", err),
        }
    }
}

impl std::error::Error for UserStoreError {}

/// User storage over the shared SQLite handle.
pub struct UserStore {
    db: Db,
}

impl UserStore {
    /// Create the store and seed the default staff account if none exists.
    pub fn new(db: Db) -> Result<Self> {
        let store = Self { db };
        store.create_default_staff()?;
        Ok(store)
    }

    /// Seed a staff account for initial setup. Orders can only move out of
    /// "pending" through a staff user, so one must exist from the start.
    fn create_default_staff(&self) -> Result<()> {
        let conn = self.db.lock();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM users WHERE is_staff = 1",
                [],
                |row| row.get(0),
            )
            .context("Failed to check for staff users")?;

        if count == 0 {
            let password = std::env::var("STAFF_PASSWORD").unwrap_or_else(|_| "admin123".to_string());
            let password_hash = hash_password(&password)?;

            conn.execute(
                "INSERT INTO users (username, email, password_hash, is_active, is_staff)
                 VALUES (?1, ?2, ?3, 1, 1)",
                params!["admin", "admin@pizzeria.local", password_hash],
            )
            .context("Failed to insert staff user")?;

            info!("🔐 Default staff user created (username: admin)");
            warn!("⚠️  CHANGE DEFAULT STAFF PASSWORD IN PRODUCTION!");
        }

        Ok(())
    }

    /// Create a new user from an already-hashed password.
    pub fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, UserStoreError> {
        let conn = self.db.lock();

        // Pre-checks give distinct error messages for each field
        let username_taken: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM users WHERE username = ?1",
                params![username],
                |row| row.get(0),
            )
            .map_err(|e| UserStoreError::Database(e.into()))?;
        if username_taken > 0 {
            return Err(UserStoreError::DuplicateUsername(username.to_string()));
        }

        let email_taken: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM users WHERE email = ?1",
                params![email],
                |row| row.get(0),
            )
            .map_err(|e| UserStoreError::Database(e.into()))?;
        if email_taken > 0 {
            return Err(UserStoreError::DuplicateEmail(email.to_string()));
        }

        let inserted = conn.execute(
            "INSERT INTO users (username, email, password_hash, is_active, is_staff)
             VALUES (?1, ?2, ?3, 1, 0)",
            params![username, email, password_hash],
        );

        // The UNIQUE constraint catches races the pre-check missed
        if let Err(err) = inserted {
            if let rusqlite::Error::SqliteFailure(e, Some(ref msg)) = err {
                if e.code == ErrorCode::ConstraintViolation {
                    if msg.contains("users.username") {
                        return Err(UserStoreError::DuplicateUsername(username.to_string()));
                    }
                    if msg.contains("users.email") {
                        return Err(UserStoreError::DuplicateEmail(email.to_string()));
                    }
                }
            }
            return Err(UserStoreError::Database(
                anyhow::Error::new(err).context("Failed to insert user"),
            ));
        }

        let user = User {
            id: conn.last_insert_rowid(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            is_active: true,
            is_staff: false,
        };

        info!("✅ Created user: {} ({})", user.username, user.email);

        Ok(user)
    }

    /// Get user by username
    pub fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.db.lock();

        let mut stmt = conn.prepare(
            "SELECT id, username, email, password_hash, is_active, is_staff
             FROM users WHERE username = ?1",
        )?;

        let user_result = stmt.query_row(params![username], |row| {
            Ok(User {
                id: row.get(0)?,
                username: row.get(1)?,
                email: row.get(2)?,
                password_hash: row.get(3)?,
                is_active: row.get::<_, i64>(4)? == 1,
                is_staff: row.get::<_, i64>(5)? == 1,
            })
        });

        match user_result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get user by email
    pub fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.db.lock();

        let mut stmt = conn.prepare(
            "SELECT id, username, email, password_hash, is_active, is_staff
             FROM users WHERE email = ?1",
        )?;

        let user_result = stmt.query_row(params![email], |row| {
            Ok(User {
                id: row.get(0)?,
                username: row.get(1)?,
                email: row.get(2)?,
                password_hash: row.get(3)?,
                is_active: row.get::<_, i64>(4)? == 1,
                is_staff: row.get::<_, i64>(5)? == 1,
            })
        });

        match user_result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Mark a user as staff. Used by operators and tests; there is no HTTP
    /// surface for role promotion.
    pub fn set_staff(&self, username: &str, is_staff: bool) -> Result<()> {
        let conn = self.db.lock();

        let updated = conn.execute(
            "UPDATE users SET is_staff = ?1 WHERE username = ?2",
            params![is_staff as i64, username],
        )?;

        if updated == 0 {
            anyhow::bail!("User not found: {}", username);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (UserStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let handle = db::open(temp_file.path().to_str().unwrap()).unwrap();
        let store = UserStore::new(handle).unwrap();
        (store, temp_file)
    }

    #[test]
    fn test_default_staff_created() {
        let (store, _temp) = create_test_store();

        let admin = store.find_by_username("admin").unwrap();
        assert!(admin.is_some());

        let admin = admin.unwrap();
        assert!(admin.is_staff);
        assert!(admin.is_active);
    }

    #[test]
    fn test_create_and_retrieve_user() {
        let (store, _temp) = create_test_store();

        let created = store.create("alice", "a@x.com", "hashed").unwrap();
        assert_eq!(created.username, "alice");
        assert!(!created.is_staff);
        assert!(created.is_active);

        let by_name = store.find_by_username("alice").unwrap().unwrap();
        assert_eq!(by_name.id, created.id);
        assert_eq!(by_name.email, "a@x.com");

        let by_email = store.find_by_email("a@x.com").unwrap().unwrap();
        assert_eq!(by_email.username, "alice");
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let (store, _temp) = create_test_store();

        store.create("alice", "a@x.com", "h1").unwrap();
        let err = store.create("alice", "b@x.com", "h2").unwrap_err();

        match err {
            UserStoreError::DuplicateUsername(name) => assert_eq!(name, "alice"),
            other => panic!("Expected DuplicateUsername, got {:?}", other),
        }

        // The rejected signup wrote nothing
        assert!(store.find_by_email("b@x.com").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let (store, _temp) = create_test_store();

        store.create("alice", "a@x.com", "h1").unwrap();
        let err = store.create("bob", "a@x.com", "h2").unwrap_err();

        match err {
            UserStoreError::DuplicateEmail(email) => assert_eq!(email, "a@x.com"),
            other => panic!("Expected DuplicateEmail, got {:?}", other),
        }

        assert!(store.find_by_username("bob").unwrap().is_none());
    }

    #[test]
    fn test_missing_user_is_none() {
        let (store, _temp) = create_test_store();
        assert!(store.find_by_username("nobody").unwrap().is_none());
        assert!(store.find_by_email("nobody@x.com").unwrap().is_none());
    }

    #[test]
    fn test_set_staff() {
        let (store, _temp) = create_test_store();

        store.create("carol", "c@x.com", "h").unwrap();
        store.set_staff("carol", true).unwrap();

        let carol = store.find_by_username("carol").unwrap().unwrap();
        assert!(carol.is_staff);

        assert!(store.set_staff("nobody", true).is_err());
    }
}
