//! Database operations for user authentication.
//!
//! This module provides database layer functions for credential
//! verification and access-token issuance. It abstracts database
//! operations to support both production and testing environments.

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString, rand_core::OsRng},
};
use diesel::prelude::*;
use rocket::http::Status;

use crate::DbConn;
use crate::auth::JwtKeys;
use crate::models::User;
use crate::orm::testing::FakeDbConn;
use crate::schema::users;

/// Trait for abstracting database operations to support both production
/// and testing.
///
/// This trait allows the same functions to work with both `DbConn`
/// (production) and `FakeDbConn` (testing) by providing a unified
/// interface for database operations.
pub trait DbRunner {
    /// Executes a database operation with a connection.
    fn run<F, R>(&self, f: F) -> impl std::future::Future<Output = R>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static;
}

impl DbRunner for DbConn {
    fn run<F, R>(&self, f: F) -> impl std::future::Future<Output = R>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        DbConn::run(self, f)
    }
}

impl<'a> DbRunner for FakeDbConn<'a> {
    fn run<F, R>(&self, f: F) -> impl std::future::Future<Output = R>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        FakeDbConn::run(self, f)
    }
}

/// Finds a user by their email address.
///
/// # Returns
/// * `Ok(Some(User))` - User found with matching email
/// * `Ok(None)` - No user found with that email
/// * `Err(Status::InternalServerError)` - Database query failed
pub async fn find_user_by_email<D: DbRunner>(db: &D, email: &str) -> Result<Option<User>, Status> {
    let email = email.to_owned();
    db.run(move |conn| {
        users::table
            .filter(users::email.eq(email))
            .first::<User>(conn)
            .optional()
    })
    .await
    .map_err(|_| Status::InternalServerError)
}

/// Verifies a password against a stored Argon2 hash.
///
/// Returns `false` both for a mismatch and for a hash the database holds
/// in an invalid format.
fn verify_password(password: &str, stored_hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(stored_hash) {
        Ok(hash) => hash,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Processes a complete login: validates input, finds the user, verifies
/// the password, and issues a signed access token.
///
/// # Returns
/// * `Ok((User, String))` - Login successful; the user and their token
/// * `Err(Status::BadRequest)` - Empty email or password provided
/// * `Err(Status::Unauthorized)` - Invalid credentials or user not found
/// * `Err(Status::InternalServerError)` - Database or signing failure
///
/// # Security Notes
/// - Returns generic "Unauthorized" for both unknown users and wrong
///   passwords
/// - Uses Argon2 for password verification
pub async fn process_login<D: DbRunner>(
    db: &D,
    keys: &JwtKeys,
    login: &crate::api::login::LoginRequest,
) -> Result<(User, String), Status> {
    // Check for empty fields
    if login.email.trim().is_empty() || login.password.trim().is_empty() {
        return Err(Status::BadRequest);
    }

    let user = match find_user_by_email(db, &login.email).await? {
        Some(user) => user,
        None => return Err(Status::Unauthorized),
    };

    if !verify_password(&login.password, &user.password_hash) {
        return Err(Status::Unauthorized);
    }

    let token = keys.issue(&user).map_err(|_| Status::InternalServerError)?;

    Ok((user, token))
}

/// Hashes a password using Argon2 with a random salt.
///
/// # Panics
/// Panics if hashing fails (should not happen in normal operation)
pub fn hash_password(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .expect("Hashing should succeed")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::login::LoginRequest;
    use crate::models::UserInput;
    use crate::orm::testing::{setup_test_db, setup_test_dbconn};
    use crate::orm::user::insert_user;
    use rocket::tokio;

    fn test_keys() -> JwtKeys {
        JwtKeys::new(b"unit-test-secret", 3600)
    }

    /// Inserts a dummy user with a known password, returning it.
    fn insert_dummy_user(conn: &mut diesel::SqliteConnection) -> User {
        let hash = hash_password("dummy password");
        let dummy_user = UserInput {
            name: "Karl".to_string(),
            email: "karl@example.com".to_string(),
            password_hash: hash,
            gender: None,
            weight: None,
            age: None,
            height: None,
            rfid: None,
        };
        insert_user(conn, dummy_user).expect("insert dummy user")
    }

    #[test]
    fn test_verify_password() {
        let password = "correct_password";
        let wrong_password = "wrong_password";
        let hash = hash_password(password);

        // Correct password should verify
        assert!(verify_password(password, &hash));

        // Wrong password should fail
        assert!(!verify_password(wrong_password, &hash));

        // Garbage stored hash must not verify anything
        assert!(!verify_password(password, "not-an-argon2-hash"));
    }

    #[tokio::test]
    async fn test_find_user_by_email() {
        let mut conn = setup_test_db();
        let inserted_user = insert_dummy_user(&mut conn);

        let fake_db = setup_test_dbconn(&mut conn);

        let found = find_user_by_email(&fake_db, "karl@example.com")
            .await
            .expect("db query should succeed");

        assert!(found.is_some());
        let found_user = found.unwrap();
        assert_eq!(found_user.email, inserted_user.email);
        assert_eq!(found_user.password_hash, inserted_user.password_hash);
    }

    #[tokio::test]
    async fn test_process_login_issues_valid_token() {
        let mut conn = setup_test_db();
        let inserted_user = insert_dummy_user(&mut conn);

        let fake_db = setup_test_dbconn(&mut conn);
        let keys = test_keys();

        let login = LoginRequest {
            email: "karl@example.com".to_string(),
            password: "dummy password".to_string(),
        };

        let (user, token) = process_login(&fake_db, &keys, &login)
            .await
            .expect("login should succeed");
        assert_eq!(user.id, inserted_user.id);

        let claims = keys.validate(&token).expect("token should verify");
        assert_eq!(claims.user_id, inserted_user.id);
        assert_eq!(claims.email, "karl@example.com");
    }

    #[tokio::test]
    async fn test_process_login_rejects_bad_credentials() {
        let mut conn = setup_test_db();
        insert_dummy_user(&mut conn);

        let fake_db = setup_test_dbconn(&mut conn);
        let keys = test_keys();

        let wrong_password = LoginRequest {
            email: "karl@example.com".to_string(),
            password: "nope".to_string(),
        };
        assert_eq!(
            process_login(&fake_db, &keys, &wrong_password).await.unwrap_err(),
            Status::Unauthorized
        );

        let unknown_user = LoginRequest {
            email: "ghost@example.com".to_string(),
            password: "dummy password".to_string(),
        };
        assert_eq!(
            process_login(&fake_db, &keys, &unknown_user).await.unwrap_err(),
            Status::Unauthorized
        );

        let empty = LoginRequest {
            email: "".to_string(),
            password: "dummy password".to_string(),
        };
        assert_eq!(
            process_login(&fake_db, &keys, &empty).await.unwrap_err(),
            Status::BadRequest
        );
    }
}
