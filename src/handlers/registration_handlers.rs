use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::auth::validate;
use crate::errors::{AppError, check_fields};
use crate::models::batch;
use crate::models::registration::{self, NewRegistration, RegistrationForm};
use crate::store::{Guarded, Store};

/// GET /api/batches/active: Batches currently open for intake.
pub async fn active_batches(store: web::Data<Store>) -> Result<HttpResponse, AppError> {
    let batches = batch::find_active(&store).await?;
    Ok(HttpResponse::Ok().json(batches))
}

/// POST /api/batches/{batchId}/registrations
pub async fn register(
    store: web::Data<Store>,
    path: web::Path<String>,
    body: web::Json<RegistrationForm>,
) -> Result<HttpResponse, AppError> {
    let batch_id = path.into_inner();
    let form = body.into_inner();

    check_fields(validate::validate_registration(&form))?;

    let new = NewRegistration::from_form(&form);
    let id = match registration::submit(&store, &batch_id, &new).await? {
        Guarded::Written(id) => id,
        Guarded::Missing => return Err(AppError::NotFound),
        Guarded::Refused(batch) => {
            return Err(AppError::Conflict(format!(
                "{} is not accepting registrations",
                batch.str_field("name").unwrap_or("This batch")
            )));
        }
    };
    log::info!("Registered IITP No. {} in batch {batch_id}", new.iitp_no);

    Ok(HttpResponse::Created().json(json!({ "id": id, "batchId": batch_id })))
}
