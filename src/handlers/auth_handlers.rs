use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;

use super::client_ip;
use crate::auth::rate_limit::RateLimiter;
use crate::auth::validate::{self, FieldErrors};
use crate::auth::{SESSION_TOKEN_KEY, password};
use crate::config::AppConfig;
use crate::errors::{ApiErrorResponse, AppError};
use crate::models::session::{self, Principal};
use crate::models::user::Role;
use crate::models::{course, registration, user};
use crate::store::Store;

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ParticipantLoginForm {
    #[serde(alias = "iitpNo")]
    pub iitp_no: String,
}

fn too_many_attempts() -> HttpResponse {
    HttpResponse::TooManyRequests().json(ApiErrorResponse::new(
        "Too many failed login attempts. Please try again later.",
    ))
}

/// Record the principal server-side, put the token in the (renewed) cookie
/// session and send the user to their role's landing page.
async fn start_session(
    store: &Store,
    config: &AppConfig,
    session: &Session,
    principal: Principal,
) -> Result<HttpResponse, AppError> {
    let token = session::create(store, &principal, config.session_ttl).await?;
    session.renew();
    session
        .insert(SESSION_TOKEN_KEY, &token)
        .map_err(|e| AppError::Session(e.to_string()))?;
    log::info!("{} logged in as {}", principal.name, principal.role);
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", principal.role.home_path(principal.iitp_no.as_deref())))
        .finish())
}

/// POST /login: Staff username/password login.
pub async fn login_submit(
    req: HttpRequest,
    store: web::Data<Store>,
    config: web::Data<AppConfig>,
    session: Session,
    form: web::Form<LoginForm>,
    limiter: web::Data<RateLimiter>,
) -> Result<HttpResponse, AppError> {
    // Rate-limit check BEFORE any store access
    let ip = client_ip(&req);
    if limiter.is_blocked(ip) {
        return Ok(too_many_attempts());
    }

    let found = user::find_by_username(&store, form.username.trim()).await?;
    let verified = match &found {
        Some(u) => password::verify_password(&form.password, &u.password_hash),
        None => {
            password::verify_against_dummy(&form.password);
            false
        }
    };

    match found.filter(|_| verified) {
        Some(u) => {
            limiter.clear(ip);
            let principal = Principal {
                role: u.role,
                name: u.name,
                user_id: Some(u.id),
                iitp_no: None,
                organization: u.organization,
            };
            start_session(&store, &config, &session, principal).await
        }
        None => {
            limiter.record_failure(ip);
            log::warn!("Failed staff login for '{}' from {ip}", form.username.trim());
            Ok(HttpResponse::Unauthorized().json(ApiErrorResponse::new("Invalid username or password")))
        }
    }
}

/// Participants log in with their IITP number alone. It must appear on at
/// least one registration or course enrollment.
async fn participant_login(
    req: &HttpRequest,
    store: &Store,
    config: &AppConfig,
    session: &Session,
    limiter: &RateLimiter,
    iitp_no: &str,
    role: Role,
) -> Result<HttpResponse, AppError> {
    let ip = client_ip(req);
    if limiter.is_blocked(ip) {
        return Ok(too_many_attempts());
    }

    let iitp_no = iitp_no.trim();
    if let Some(err) = validate::validate_iitp_no(iitp_no) {
        return Err(AppError::Validation(FieldErrors::from([("iitpNo", err)])));
    }

    let registrations = registration::find_by_iitp(store, iitp_no).await?;
    let courses = course::find_by_enrollment(store, iitp_no).await?;
    if registrations.is_empty() && courses.is_empty() {
        limiter.record_failure(ip);
        log::warn!("Failed {role} login for IITP No. {iitp_no} from {ip}");
        return Ok(HttpResponse::Unauthorized().json(ApiErrorResponse::new(format!(
            "No registration or enrollment found for IITP No. {iitp_no}"
        ))));
    }

    limiter.clear(ip);
    let (name, organization) = registrations
        .first()
        .map(|r| (r.name.clone(), Some(r.organization.clone())))
        .unwrap_or_else(|| (iitp_no.to_string(), None));
    let principal = Principal {
        role,
        name,
        user_id: None,
        iitp_no: Some(iitp_no.to_string()),
        organization,
    };
    start_session(store, config, session, principal).await
}

/// POST /student-login
pub async fn student_login_submit(
    req: HttpRequest,
    store: web::Data<Store>,
    config: web::Data<AppConfig>,
    session: Session,
    form: web::Form<ParticipantLoginForm>,
    limiter: web::Data<RateLimiter>,
) -> Result<HttpResponse, AppError> {
    participant_login(&req, &store, &config, &session, &limiter, &form.iitp_no, Role::Student).await
}

/// POST /trainee-login
pub async fn trainee_login_submit(
    req: HttpRequest,
    store: web::Data<Store>,
    config: web::Data<AppConfig>,
    session: Session,
    form: web::Form<ParticipantLoginForm>,
    limiter: web::Data<RateLimiter>,
) -> Result<HttpResponse, AppError> {
    participant_login(&req, &store, &config, &session, &limiter, &form.iitp_no, Role::Trainee).await
}

/// POST /logout: Revoke the server session and clear the cookie.
pub async fn logout(store: web::Data<Store>, session: Session) -> Result<HttpResponse, AppError> {
    if let Some(token) = session.get::<String>(SESSION_TOKEN_KEY).unwrap_or(None) {
        session::revoke(&store, &token).await?;
    }
    session.purge();
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/login"))
        .finish())
}
