use std::collections::BTreeMap;

use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::auth::{AuthContext, Capability};
use crate::errors::AppError;
use crate::models::{batch, course, registration};
use crate::store::Store;

/// GET /supervisor/trainees/{iitpNo}: Supervisors share the admin profile page.
pub async fn supervisor_trainee(auth: AuthContext, path: web::Path<String>) -> Result<HttpResponse, AppError> {
    auth.require(Capability::ViewParticipants)?;
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", format!("/admin/users/{}", path.trim())))
        .finish())
}

/// GET /admin/users/{iitpNo}
///
/// Registrations outside the viewer's organization are hidden. A
/// participant with no visible registration is a 404 for non-admins, even
/// when enrolled in courses.
pub async fn participant_profile(
    auth: AuthContext,
    store: web::Data<Store>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    auth.require(Capability::ViewParticipants)?;
    let iitp_no = path.trim();

    let mut registrations = registration::find_by_iitp(&store, iitp_no).await?;
    if !auth.sees_participant(&registrations) {
        return Err(AppError::NotFound);
    }
    registrations.retain(|r| auth.sees_organization(&r.organization));
    let courses = course::find_by_enrollment(&store, iitp_no).await?;
    if registrations.is_empty() && courses.is_empty() {
        return Err(AppError::NotFound);
    }

    let mut batch_names = BTreeMap::new();
    for r in &registrations {
        if batch_names.contains_key(&r.batch_id) {
            continue;
        }
        if let Some(b) = batch::find_by_id(&store, &r.batch_id).await? {
            batch_names.insert(r.batch_id.clone(), b.name);
        }
    }

    let name = registrations.first().map(|r| r.name.clone());
    Ok(HttpResponse::Ok().json(json!({
        "iitpNo": iitp_no,
        "name": name,
        "registrations": registrations,
        "batchNames": batch_names,
        "courses": courses,
    })))
}
