pub mod capability;
pub mod context;
pub mod middleware;
pub mod password;
pub mod rate_limit;
pub mod validate;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;

pub use capability::Capability;
pub use context::AuthContext;

/// Cookie session key holding the server session token.
pub const SESSION_TOKEN_KEY: &str = "session_token";

/// Login route for the area a path belongs to.
pub fn login_path_for(path: &str) -> &'static str {
    if path.starts_with("/student") {
        "/student-login"
    } else if path.starts_with("/trainee") || path.starts_with("/exam") {
        "/trainee-login"
    } else {
        "/login"
    }
}

/// Signed and encrypted cookie session carrying only the session token.
pub fn session_middleware(key: Key, secure: bool) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_secure(secure)
        .cookie_http_only(true)
        .build()
}
