//! Shared test infrastructure.
//!
//! Most tests run against a fresh in-memory store, so no database is
//! needed. `postgres_test.rs` uses `#[sqlx::test]` and needs
//! `DATABASE_URL`. HTTP tests build the full app with `init_app!`.

#![allow(dead_code, unused_macros)]

use eventlink::auth::password;
use eventlink::config::AppConfig;
use eventlink::models::batch;
use eventlink::models::course::{self, CourseForm, Subject};
use eventlink::models::registration::{self, NewRegistration};
use eventlink::models::user::{self, NewStaffUser, Role};
use eventlink::store::{PgStore, Store};
use sqlx::postgres::PgPoolOptions;

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const STAFF_PASS: &str = "Password1!";

pub const TE_SHIRWAL: &str = "TE Connectivity, Shirwal";
pub const BSA_CHAKAN: &str = "BSA Plant, Chakan";

// ============================================================================
// SETUP
// ============================================================================

/// Configuration with every variable unset.
pub fn test_config() -> AppConfig {
    AppConfig::from_lookup(|_| None).expect("default config")
}

pub fn setup_store() -> Store {
    Store::memory()
}

/// A Postgres store whose pool is already closed, so every call fails.
pub async fn failing_store() -> Store {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://eventlink@127.0.0.1:1/eventlink")
        .expect("lazy pool");
    pool.close().await;
    Store::Postgres(PgStore::from_pool(pool))
}

/// Build the whole application around `$store`, with a fresh rate limiter
/// and a fresh cookie key unless one is given. Apps sharing a key accept
/// each other's session cookies.
macro_rules! init_app {
    ($store:expr) => {
        init_app!($store, actix_web::cookie::Key::generate())
    };
    ($store:expr, $key:expr) => {{
        let config = common::test_config();
        let limiter = eventlink::auth::rate_limit::RateLimiter::new(config.login_limits);
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(eventlink::auth::session_middleware($key, false))
                .app_data(actix_web::web::Data::new($store.clone()))
                .app_data(actix_web::web::Data::new(config))
                .app_data(actix_web::web::Data::new(limiter))
                .configure(eventlink::routes::configure)
                .default_service(actix_web::web::to(eventlink::routes::not_found)),
        )
        .await
    }};
}

// ============================================================================
// SEEDING
// ============================================================================

pub async fn seed_batch(store: &Store, name: &str, active: bool) -> String {
    batch::create(store, name, active).await.expect("create batch")
}

pub async fn seed_registration(
    store: &Store,
    batch_id: &str,
    name: &str,
    iitp_no: &str,
    organization: &str,
) -> String {
    let new = NewRegistration {
        name: name.to_string(),
        iitp_no: iitp_no.to_string(),
        organization: organization.to_string(),
    };
    registration::create(store, batch_id, &new)
        .await
        .expect("create registration")
}

pub async fn seed_staff(
    store: &Store,
    username: &str,
    plain_password: &str,
    role: Role,
    organization: Option<&str>,
) -> String {
    let new = NewStaffUser {
        name: format!("{username} name"),
        username: username.to_string(),
        password_hash: password::hash_password(plain_password).expect("hash"),
        role,
        organization: organization.map(str::to_string),
        meeting_link: None,
    };
    user::create(store, &new).await.expect("create staff")
}

/// A course with one subject and one exam. Returns `(course_id, exam_id)`.
pub async fn seed_course_with_exam(store: &Store, title: &str, exam_title: &str) -> (String, String) {
    let form = CourseForm {
        title: title.to_string(),
        description: format!("{title} description"),
        subjects: vec![Subject {
            title: "Basics".to_string(),
            description: String::new(),
        }],
    };
    let course_id = course::create(store, &form).await.expect("create course");
    let exam_id = course::add_exam(store, &course_id, exam_title, 45)
        .await
        .expect("add exam")
        .expect("course exists");
    (course_id, exam_id)
}
