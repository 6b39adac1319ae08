/// Authentication module
///
/// Handles JWT issuing/verification, password hashing,
/// the refresh token ledger and the authentication manager.

mod claims;
mod jwt;
mod manager;
mod password;
mod refresh_token;

pub use claims::AuthenticatedUser;
pub use claims::Claims;
pub use jwt::IssuedToken;
pub use jwt::TokenSigner;
pub use manager::AuthManager;
pub use manager::AuthTokens;
pub use password::{hash_password, verify_password};
pub use password::{MAX_HASH_COST, MAX_PASSWORD_BYTES, MIN_HASH_COST, MIN_PASSWORD_LENGTH};
pub use refresh_token::spawn_refresh_token_sweeper;
pub use refresh_token::RefreshTokenLedger;
