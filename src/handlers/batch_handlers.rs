use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde_json::json;

use crate::auth::validate::{self, FieldErrors};
use crate::auth::{AuthContext, Capability};
use crate::errors::{AppError, check_fields};
use crate::export;
use crate::models::batch::{self, ActiveForm, BatchForm};
use crate::models::registration::{self, Registration};
use crate::store::Store;

/// GET /admin: Every batch with its registrations.
pub async fn admin_index(auth: AuthContext, store: web::Data<Store>) -> Result<HttpResponse, AppError> {
    auth.require(Capability::ManageBatches)?;
    let batches = batch::find_all_with_registrations(&store).await?;
    Ok(HttpResponse::Ok().json(batches))
}

/// POST /admin/batches
pub async fn create(
    auth: AuthContext,
    store: web::Data<Store>,
    body: web::Json<BatchForm>,
) -> Result<HttpResponse, AppError> {
    auth.require(Capability::ManageBatches)?;
    let name = body.name.trim();
    let mut errors = FieldErrors::new();
    if let Some(e) = validate::validate_required(name, "Name", 200) {
        errors.insert("name", e);
    }
    check_fields(errors)?;

    let id = batch::create(&store, name, body.active).await?;
    log::info!("{} created batch '{name}' ({id})", auth.principal.name);
    Ok(HttpResponse::Created().json(json!({ "id": id })))
}

/// PUT /admin/batches/{id}/active
pub async fn set_active(
    auth: AuthContext,
    store: web::Data<Store>,
    path: web::Path<String>,
    body: web::Json<ActiveForm>,
) -> Result<HttpResponse, AppError> {
    auth.require(Capability::ManageBatches)?;
    let id = path.into_inner();
    if !batch::set_active(&store, &id, body.active).await? {
        return Err(AppError::NotFound);
    }
    log::info!("Batch {id} active={}", body.active);
    Ok(HttpResponse::Ok().json(json!({ "id": id, "active": body.active })))
}

/// DELETE /admin/batches/{id}: Removes the batch and its registrations.
pub async fn delete(
    auth: AuthContext,
    store: web::Data<Store>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    auth.require(Capability::ManageBatches)?;
    let id = path.into_inner();
    let removed = batch::delete(&store, &id).await?.ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(json!({ "id": id, "registrationsRemoved": removed })))
}

/// Build the download response, or 204 when nothing is visible.
fn csv_response(auth: &AuthContext, mut rows: Vec<Registration>, label: &str) -> HttpResponse {
    rows.retain(|r| auth.sees_organization(&r.organization));
    match export::registrations_to_csv(&rows) {
        Some(csv) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", export::csv_filename(label)),
            ))
            .body(csv),
        None => HttpResponse::NoContent().finish(),
    }
}

/// GET /admin/batches/{id}/registrations.csv
pub async fn export_batch(
    auth: AuthContext,
    store: web::Data<Store>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    auth.require(Capability::ExportRegistrations)?;
    let batch = batch::find_by_id(&store, &path.into_inner())
        .await?
        .ok_or(AppError::NotFound)?;
    let rows = registration::find_by_batch(&store, &batch.id).await?;
    Ok(csv_response(&auth, rows, &batch.name))
}

/// GET /admin/registrations.csv: Every batch in one file.
pub async fn export_all(auth: AuthContext, store: web::Data<Store>) -> Result<HttpResponse, AppError> {
    auth.require(Capability::ExportRegistrations)?;
    let rows: Vec<Registration> = batch::find_all_with_registrations(&store)
        .await?
        .into_iter()
        .flat_map(|b| b.registrations)
        .collect();
    let label = format!("registrations {}", Utc::now().format("%Y-%m-%d"));
    Ok(csv_response(&auth, rows, &label))
}
