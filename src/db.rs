use std::time::Duration;

use chrono::Utc;

use crate::auth::password;
use crate::auth::rate_limit::RateLimiter;
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::session;
use crate::models::user::{self, NewStaffUser, Role};
use crate::store::{Store, StoreError};

const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(600);

/// Connect to Postgres when `DATABASE_URL` is set, otherwise fall back to
/// the in-memory store.
pub async fn init_store(config: &AppConfig) -> Result<Store, StoreError> {
    match &config.database_url {
        Some(url) => {
            let store = Store::connect(url, config.database_max_connections).await?;
            log::info!("Connected to document store");
            Ok(store)
        }
        None => {
            log::warn!("No DATABASE_URL set, using in-memory store (data lost on restart)");
            Ok(Store::memory())
        }
    }
}

/// Create the administrator account if no account with that username
/// exists yet. Returns true when an account was created.
pub async fn seed_admin(store: &Store, config: &AppConfig) -> Result<bool, AppError> {
    if user::find_by_username(store, &config.admin_username).await?.is_some() {
        log::info!("Admin account '{}' present, skipping seed", config.admin_username);
        return Ok(false);
    }
    let plain = match &config.admin_password {
        Some(p) => p.as_str(),
        None => {
            log::warn!("No ADMIN_PASSWORD set, seeding '{}' with the default password", config.admin_username);
            DEFAULT_ADMIN_PASSWORD
        }
    };
    let admin = NewStaffUser {
        name: "Administrator".to_string(),
        username: config.admin_username.clone(),
        password_hash: password::hash_password(plain)?,
        role: Role::Admin,
        organization: None,
        meeting_link: None,
    };
    user::create(store, &admin).await?;
    log::info!("Seeded admin account '{}'", config.admin_username);
    Ok(true)
}

/// Periodically delete expired server sessions and forget login failures
/// that have aged out of the rate-limit window.
pub fn spawn_session_sweeper(store: Store, limiter: RateLimiter) {
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            match session::purge_expired(&store, Utc::now()).await {
                Ok(0) => {}
                Ok(n) => log::info!("Session sweeper removed {n} expired sessions"),
                Err(e) => log::error!("Session sweeper failed: {e}"),
            }
            let forgotten = limiter.purge_stale();
            if forgotten > 0 {
                log::debug!("Rate limiter forgot {forgotten} idle addresses");
            }
        }
    });
}
