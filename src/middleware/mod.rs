/// Middleware module
///
/// JWT guard for the `/api` scope.

mod jwt_middleware;

pub use jwt_middleware::{authenticate, extract_token, AuthenticatedUser, JwtMiddleware};
