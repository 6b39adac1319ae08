//! Authentication manager
//!
//! Registration, login, access-token refresh and logout, composed from the
//! credential store, the token signer and the refresh token ledger.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::OnceCell;
use uuid::Uuid;

use super::claims::AuthenticatedUser;
use super::jwt::{IssuedToken, TokenSigner};
use super::password::{hash_password_blocking, validate_password, verify_password_blocking};
use super::refresh_token::RefreshTokenLedger;
use crate::domain::User;
use crate::error::{AppError, DatabaseError, ValidationError};
use crate::repository::UserRepository;
use crate::validators::is_valid_email;

/// Result of a successful login
#[derive(Debug, Clone, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

pub struct AuthManager {
    users: Arc<dyn UserRepository>,
    signer: TokenSigner,
    ledger: Arc<RefreshTokenLedger>,
    password_hash_cost: u32,
    /// Hash checked when the email is unknown, so both login failures cost one
    /// bcrypt verification at the configured cost.
    dummy_hash: OnceCell<String>,
}

const DUMMY_PASSWORD: &str = "qa-service-dummy-password";

impl AuthManager {
    pub fn new(
        users: Arc<dyn UserRepository>,
        signer: TokenSigner,
        ledger: Arc<RefreshTokenLedger>,
        password_hash_cost: u32,
    ) -> Self {
        Self {
            users,
            signer,
            ledger,
            password_hash_cost,
            dummy_hash: OnceCell::new(),
        }
    }

    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    /// Create an account.
    ///
    /// # Errors
    /// - `InvalidInput` for a malformed email, a short password or a taken email
    /// - `Internal` if hashing or the insert fails
    pub async fn register(&self, email: &str, password: &str) -> Result<User, AppError> {
        let email = is_valid_email(email)?.to_lowercase();
        validate_password(password)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(ValidationError::DuplicateEmail.into());
        }

        let password_hash =
            hash_password_blocking(password.to_string(), self.password_hash_cost).await?;
        let user = User::new(Uuid::new_v4().to_string(), email, password_hash);

        match self.users.insert(&user).await {
            Ok(()) => {}
            // Lost a race with a concurrent registration of the same email.
            Err(DatabaseError::UniqueConstraintViolation(constraint)) => {
                return Err(AppError::Internal(format!(
                    "failed to create user: {}",
                    constraint
                )));
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(user_id = %user.id, "User registered successfully");
        Ok(user)
    }

    /// Exchange credentials for an access token and a refresh token.
    ///
    /// Unknown email and wrong password fail with the same message.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthTokens, AppError> {
        let email = email.trim().to_lowercase();

        let user = match self.users.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                self.burn_password_check(password).await?;
                tracing::warn!("Login attempt for unknown account");
                return Err(ValidationError::InvalidCredentials.into());
            }
        };

        let password_valid =
            verify_password_blocking(password.to_string(), user.password_hash.clone()).await?;
        if !password_valid {
            tracing::warn!(user_id = %user.id, "Login attempt with wrong password");
            return Err(ValidationError::InvalidCredentials.into());
        }

        let access_token = self.signer.issue_access_token(&user.id, &user.email)?;
        let refresh_token = self.signer.issue_refresh_token(&user.id)?;

        self.ledger
            .save(&refresh_token.token, &user.id, refresh_token.expires_at);

        tracing::info!(user_id = %user.id, "User logged in successfully");

        Ok(AuthTokens {
            access_token: access_token.token,
            refresh_token: refresh_token.token,
            user,
        })
    }

    /// Mint a new access token from a live refresh token.
    ///
    /// The refresh token is not rotated; it stays usable until it expires or
    /// is logged out.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<IssuedToken, AppError> {
        let user_id = self
            .ledger
            .lookup(refresh_token)
            .ok_or(ValidationError::InvalidRefreshToken)?;

        let user = self.users.find_by_id(&user_id).await?.ok_or_else(|| {
            tracing::error!(
                user_id = %user_id,
                "Refresh token belongs to a user that no longer exists"
            );
            AppError::Internal(format!("user {} referenced by refresh token not found", user_id))
        })?;

        let access_token = self.signer.issue_access_token(&user.id, &user.email)?;

        tracing::info!(user_id = %user.id, "Access token refreshed");
        Ok(access_token)
    }

    /// Verify `password` against the dummy hash and discard the result.
    async fn burn_password_check(&self, password: &str) -> Result<(), AppError> {
        let dummy_hash = self
            .dummy_hash
            .get_or_try_init(|| {
                hash_password_blocking(DUMMY_PASSWORD.to_string(), self.password_hash_cost)
            })
            .await?;

        verify_password_blocking(password.to_string(), dummy_hash.clone()).await?;
        Ok(())
    }

    /// Forget a refresh token. Unknown tokens are ignored.
    pub fn logout(&self, refresh_token: &str) {
        if self.ledger.delete(refresh_token) {
            tracing::info!("Refresh token revoked");
        }
    }

    /// Gate check for protected operations.
    pub fn verify_access_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let claims = self.signer.verify_access_token(token)?;
        Ok(claims.into())
    }
}
