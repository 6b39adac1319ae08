/// Authentication Routes
///
/// Registration, login, access-token refresh, logout and the current user.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthManager, AuthenticatedUser};
use crate::domain::User;
use crate::error::AppError;

const TOKEN_TYPE: &str = "Bearer";

/// Registration and login request
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Refresh and logout request
#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: User,
}

#[derive(Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// POST /auth/register
///
/// # Errors
/// - 400: invalid email, short password, or email already registered
/// - 500: internal server error
pub async fn register(
    form: web::Json<CredentialsRequest>,
    auth: web::Data<AuthManager>,
) -> Result<HttpResponse, AppError> {
    let user = auth.register(&form.email, &form.password).await?;
    Ok(HttpResponse::Created().json(user))
}

/// POST /auth/login
///
/// Unknown email and wrong password produce the same 400 response.
pub async fn login(
    form: web::Json<CredentialsRequest>,
    auth: web::Data<AuthManager>,
) -> Result<HttpResponse, AppError> {
    let tokens = auth.login(&form.email, &form.password).await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        token_type: TOKEN_TYPE,
        expires_in: auth.signer().access_ttl().num_seconds(),
        user: tokens.user,
    }))
}

/// POST /auth/refresh
///
/// Issues a new access token. The refresh token itself is not rotated.
pub async fn refresh(
    form: web::Json<RefreshRequest>,
    auth: web::Data<AuthManager>,
) -> Result<HttpResponse, AppError> {
    let access_token = auth.refresh_access_token(&form.refresh_token).await?;

    Ok(HttpResponse::Ok().json(AccessTokenResponse {
        access_token: access_token.token,
        token_type: TOKEN_TYPE,
        expires_in: auth.signer().access_ttl().num_seconds(),
    }))
}

/// POST /auth/logout
pub async fn logout(
    form: web::Json<RefreshRequest>,
    auth: web::Data<AuthManager>,
) -> HttpResponse {
    auth.logout(&form.refresh_token);
    HttpResponse::NoContent().finish()
}

/// GET /auth/me
///
/// **Requires a valid access token**; the identity is bound by `JwtMiddleware`.
pub async fn get_current_user(user: web::ReqData<AuthenticatedUser>) -> HttpResponse {
    let user = user.into_inner();
    HttpResponse::Ok().json(serde_json::json!({
        "id": user.user_id,
        "email": user.email,
    }))
}
