use actix_web::{HttpResponse, web};

use crate::auth::{AuthContext, Capability, password, validate};
use crate::errors::{AppError, check_fields};
use crate::models::user::{self, NewStaffUser, StaffDisplay, StaffForm};
use crate::store::Store;

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// GET /admin/staff
pub async fn list(auth: AuthContext, store: web::Data<Store>) -> Result<HttpResponse, AppError> {
    auth.require(Capability::ManageStaff)?;
    let staff: Vec<StaffDisplay> = user::find_all(&store)
        .await?
        .into_iter()
        .map(StaffDisplay::from)
        .collect();
    Ok(HttpResponse::Ok().json(staff))
}

/// POST /admin/staff
pub async fn create(
    auth: AuthContext,
    store: web::Data<Store>,
    body: web::Json<StaffForm>,
) -> Result<HttpResponse, AppError> {
    auth.require(Capability::ManageStaff)?;
    let form = body.into_inner();
    check_fields(validate::validate_staff(&form))?;

    let username = form.username.trim();
    if user::find_by_username(&store, username).await?.is_some() {
        return Err(AppError::Conflict(format!("Username '{username}' is already taken")));
    }

    let new = NewStaffUser {
        name: form.name.trim().to_string(),
        username: username.to_string(),
        password_hash: password::hash_password(&form.password)?,
        role: form.role,
        organization: non_empty(&form.organization),
        meeting_link: non_empty(&form.meeting_link),
    };
    let id = user::create(&store, &new).await?;
    log::info!("{} created {} account '{}'", auth.principal.name, new.role, new.username);

    let created = user::find_by_id(&store, &id).await?.ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Created().json(StaffDisplay::from(created)))
}
