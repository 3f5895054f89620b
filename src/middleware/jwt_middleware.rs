/// JWT Authentication Middleware
///
/// Reads `<token_header>: <token_head> <token>`, verifies the token,
/// loads the named user and checks the token still belongs to them and
/// has not expired. On success an [`AuthenticatedUser`] is placed in the
/// request extensions for handlers to pick up with `web::ReqData`.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use std::sync::Arc;

use crate::auth::TokenService;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, TokenError};
use crate::user::{UserProfile, UserRepository};

/// Identity attached to a request that passed the JWT guard.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub profile: UserProfile,
}

impl AuthenticatedUser {
    pub fn username(&self) -> &str {
        &self.profile.username
    }
}

/// Strip the configured scheme (`Bearer`) from a header value.
pub fn extract_token<'a>(header_value: &'a str, token_head: &str) -> Option<&'a str> {
    let token = if token_head.is_empty() {
        header_value
    } else {
        header_value.strip_prefix(token_head)?.strip_prefix(' ')?
    };
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Resolve a raw token to an enabled user it is still valid for.
pub async fn authenticate(
    tokens: &TokenService,
    users: &dyn UserRepository,
    token: &str,
) -> Result<AuthenticatedUser, AppError> {
    let username = tokens.verify(token)?;

    let user = users
        .find_by_username(&username)
        .await?
        .ok_or(AppError::Auth(AuthError::UnknownSubject))?;

    if !user.enabled {
        return Err(AuthError::AccountDisabled.into());
    }

    // subject already matches, so false here means expired
    if !tokens.validate(token, &user.username)? {
        return Err(TokenError::Expired.into());
    }

    Ok(AuthenticatedUser {
        profile: UserProfile::from(&user),
    })
}

/// Guard for routes that require a logged-in administrator.
pub struct JwtMiddleware {
    tokens: TokenService,
    users: Arc<dyn UserRepository>,
    token_header: String,
    token_head: String,
}

impl JwtMiddleware {
    pub fn new(tokens: TokenService, users: Arc<dyn UserRepository>, settings: &JwtSettings) -> Self {
        Self {
            tokens,
            users,
            token_header: settings.token_header.clone(),
            token_head: settings.token_head.clone(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(JwtMiddlewareService {
            service: Rc::new(service),
            tokens: self.tokens.clone(),
            users: self.users.clone(),
            token_header: self.token_header.clone(),
            token_head: self.token_head.clone(),
        }))
    }
}

pub struct JwtMiddlewareService<S> {
    service: Rc<S>,
    tokens: TokenService,
    users: Arc<dyn UserRepository>,
    token_header: String,
    token_head: String,
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = req
            .headers()
            .get(self.token_header.as_str())
            .and_then(|h| h.to_str().ok())
            .and_then(|h| extract_token(h, &self.token_head))
            .map(str::to_string);

        let service = self.service.clone();
        let tokens = self.tokens.clone();
        let users = self.users.clone();

        Box::pin(async move {
            let token = token.ok_or(AppError::Auth(AuthError::MissingToken))?;
            let user = authenticate(&tokens, users.as_ref(), &token).await?;

            tracing::debug!(username = %user.username(), "JWT validated successfully");

            req.extensions_mut().insert(user);
            service.call(req).await
        })
    }
}
