//! # User Repository
//!
//! Staff accounts. Passwords are stored as argon2 PHC strings and never
//! leave this module in clear text.

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use cafe_core::{Role, User};

const SELECT_USER: &str =
    "SELECT id, username, password_hash, display_name, role, created_at FROM users";

/// Hashes a password for storage.
pub fn hash_password(password: &str) -> DbResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;

    Ok(hash.to_string())
}

/// Checks a password against a stored hash. A malformed hash never matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Repository for staff accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    pub async fn list_all(&self) -> DbResult<Vec<User>> {
        let sql = format!("{SELECT_USER} ORDER BY username");
        let users = sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let sql = format!("{SELECT_USER} WHERE username = ?1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Creates an account.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Username already taken
    pub async fn insert(
        &self,
        username: &str,
        password: &str,
        display_name: &str,
        role: Role,
    ) -> DbResult<User> {
        let username = username.trim();
        debug!(username = %username, role = %role, "Creating user");

        if self.get_by_username(username).await?.is_some() {
            return Err(DbError::duplicate("username", username));
        }

        let hash = hash_password(password)?;
        sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, display_name, role, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(username)
        .bind(hash)
        .bind(display_name.trim())
        .bind(role.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        info!(username = %username, role = %role, "User created");
        self.get_by_username(username)
            .await?
            .ok_or_else(|| DbError::not_found("User", username))
    }

    /// Returns the account when the username exists and the password matches.
    ///
    /// An unknown user and a wrong password look the same to the caller.
    pub async fn authenticate(&self, username: &str, password: &str) -> DbResult<Option<User>> {
        let Some(user) = self.get_by_username(username).await? else {
            warn!(username = %username.trim(), "Login for unknown user");
            return Ok(None);
        };

        if verify_password(password, &user.password_hash) {
            debug!(username = %user.username, "Login accepted");
            Ok(Some(user))
        } else {
            warn!(username = %user.username, "Login rejected");
            Ok(None)
        }
    }

    pub async fn set_password(&self, username: &str, password: &str) -> DbResult<()> {
        let hash = hash_password(password)?;
        let result = sqlx::query("UPDATE users SET password_hash = ?2 WHERE username = ?1")
            .bind(username.trim())
            .bind(hash)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", username.trim()));
        }

        Ok(())
    }

    /// Deletes an account. Sales it made keep their rows with no user.
    pub async fn delete(&self, username: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE username = ?1")
            .bind(username.trim())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", username.trim()));
        }

        Ok(())
    }

    /// Number of accounts holding `role`.
    pub async fn count_with_role(&self, role: Role) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?1")
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("espresso").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("espresso", &hash));
        assert!(!verify_password("latte", &hash));
        assert!(!verify_password("espresso", "not-a-hash"));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let users = db.users();

        let maria = users
            .insert("maria", "secret1", "Maria", Role::Salesperson)
            .await
            .unwrap();
        assert_eq!(maria.role(), Some(Role::Salesperson));

        assert!(users.authenticate("maria", "secret1").await.unwrap().is_some());
        assert!(users.authenticate("maria", "wrong").await.unwrap().is_none());
        assert!(users.authenticate("nobody", "secret1").await.unwrap().is_none());

        users.set_password("maria", "secret2").await.unwrap();
        assert!(users.authenticate("maria", "secret1").await.unwrap().is_none());
        assert!(users.authenticate("maria", "secret2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_and_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let users = db.users();

        users.insert("juan", "secret1", "Juan", Role::InventoryClerk).await.unwrap();
        assert!(matches!(
            users.insert("juan", "other1", "Juan 2", Role::Admin).await,
            Err(DbError::UniqueViolation { .. })
        ));
        assert_eq!(users.count_with_role(Role::InventoryClerk).await.unwrap(), 1);

        users.delete("juan").await.unwrap();
        assert!(matches!(
            users.delete("juan").await,
            Err(DbError::NotFound { .. })
        ));
    }
}
