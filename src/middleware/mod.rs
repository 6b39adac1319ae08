/// Middleware module
///
/// Request-pipeline filters; currently the authentication gate.

mod jwt_middleware;

pub use jwt_middleware::JwtMiddleware;
