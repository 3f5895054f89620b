/// Authentication Routes
///
/// Login, logout, token refresh and the current administrator's profile.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::audit::{AuditLog, AuditStatus};
use crate::auth::{verify_password, TokenService};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, ErrorContext, TokenError};
use crate::middleware::{extract_token, AuthenticatedUser};
use crate::user::UserRepository;
use crate::validators::is_valid_username;

/// Login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Issued (or refreshed) token
#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
    /// Scheme the client must put before the token, e.g. `Bearer`
    pub token_head: String,
    pub expires_in: i64,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn token_response(token: String, tokens: &TokenService, jwt_config: &JwtSettings) -> TokenResponse {
    TokenResponse {
        token,
        token_head: jwt_config.token_head.clone(),
        expires_in: tokens.expires_in(),
    }
}

/// POST /login
///
/// Authenticate an administrator and issue a signed token.
///
/// # Errors
/// - 400: Username fails validation
/// - 401: Unknown username or wrong password (same response for both)
/// - 403: Account is disabled
pub async fn login(
    form: web::Json<LoginRequest>,
    users: web::Data<dyn UserRepository>,
    tokens: web::Data<TokenService>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("login");

    let username = is_valid_username(&form.username)?;

    let result = authenticate_credentials(users.get_ref(), &username, &form.password).await;
    let user = match result {
        Ok(user) => user,
        Err(e) => {
            AuditLog::new("LOGIN", "token", AuditStatus::Failure, e.to_string())
                .with_username(username)
                .record();
            return Err(e);
        }
    };

    let token = tokens.issue(&user.username)?;

    AuditLog::new("LOGIN", "token", AuditStatus::Success, "Login succeeded")
        .with_resource_id(user.id)
        .with_username(user.username.as_str())
        .record();

    tracing::info!(
        request_id = %context.request_id,
        operation = %context.operation,
        username = %user.username,
        "Administrator logged in"
    );

    Ok(HttpResponse::Ok().json(token_response(token, &tokens, &jwt_config)))
}

async fn authenticate_credentials(
    users: &dyn UserRepository,
    username: &str,
    password: &str,
) -> Result<crate::user::User, AppError> {
    let user = users
        .find_by_username(username)
        .await?
        .ok_or(AppError::Auth(AuthError::InvalidCredentials))?;

    if !verify_password(password, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials.into());
    }

    if !user.enabled {
        return Err(AuthError::AccountDisabled.into());
    }

    Ok(user)
}

/// POST /logout
///
/// Tokens are stateless, so the client just forgets its token.
pub async fn logout() -> HttpResponse {
    HttpResponse::Ok().json(MessageResponse {
        message: "Logged out".to_string(),
    })
}

/// POST /auth/refresh
///
/// Re-issue the token carried in the configured header with a fresh
/// issue time and expiration.
///
/// # Errors
/// - 401 `MISSING_TOKEN`: no token in the header
/// - 401 `TOKEN_EXPIRED`: the token can no longer be refreshed
/// - 401 other token codes: malformed or tampered token
pub async fn refresh(
    req: HttpRequest,
    tokens: web::Data<TokenService>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("token_refresh");

    let token = req
        .headers()
        .get(jwt_config.token_header.as_str())
        .and_then(|h| h.to_str().ok())
        .and_then(|h| extract_token(h, &jwt_config.token_head))
        .ok_or(AppError::Auth(AuthError::MissingToken))?;

    let refreshed = match tokens.can_refresh(token) {
        Ok(true) => tokens.refresh(token),
        Ok(false) => Err(TokenError::Expired.into()),
        Err(e) => Err(e.into()),
    };

    let refreshed = match refreshed {
        Ok(token) => token,
        Err(e) => {
            AuditLog::new("REFRESH_TOKEN", "token", AuditStatus::Failure, e.to_string()).record();
            return Err(e);
        }
    };

    let username = tokens.verify(&refreshed)?;
    tracing::info!(
        request_id = %context.request_id,
        operation = %context.operation,
        username = %username,
        "Token refreshed"
    );
    AuditLog::new("REFRESH_TOKEN", "token", AuditStatus::Success, "Token refreshed")
        .with_username(username)
        .record();

    Ok(HttpResponse::Ok().json(token_response(refreshed, &tokens, &jwt_config)))
}

/// GET /api/admin/info
///
/// Profile of the administrator the request's token belongs to.
/// **Requires a valid token**; the user is injected by `JwtMiddleware`.
pub async fn admin_info(user: web::ReqData<AuthenticatedUser>) -> HttpResponse {
    HttpResponse::Ok().json(&user.profile)
}
