use actix_web::{HttpResponse, web};
use chrono::{Local, Timelike};
use serde_json::json;

use crate::auth::{AuthContext, Capability};
use crate::errors::AppError;
use crate::models::user;
use crate::models::{batch, course, registration};
use crate::store::Store;

fn time_greeting(name: &str) -> String {
    let period = match Local::now().hour() {
        5..=11 => "Good morning",
        12..=16 => "Good afternoon",
        _ => "Good evening",
    };
    format!("{period}, {name}")
}

/// GET /dashboard: Summary for the caller's role.
pub async fn index(auth: AuthContext, store: web::Data<Store>) -> Result<HttpResponse, AppError> {
    let principal = &auth.principal;
    let mut body = json!({
        "greeting": time_greeting(&principal.name),
        "role": principal.role,
        "homePath": principal.role.home_path(principal.iitp_no.as_deref()),
    });

    if auth.role().can(Capability::ManageBatches) {
        let batches = batch::find_all_with_registrations(&store).await?;
        let registrations: usize = batches.iter().map(|b| b.registrations.len()).sum();
        body["batchCount"] = json!(batches.len());
        body["activeBatchCount"] = json!(batches.iter().filter(|b| b.batch.active).count());
        body["registrationCount"] = json!(registrations);
        body["courseCount"] = json!(course::find_all(&store).await?.len());
        body["staffCount"] = json!(user::find_all(&store).await?.len());
    } else if auth.role().can(Capability::ViewParticipants) {
        let participants: Vec<_> = batch::find_all_with_registrations(&store)
            .await?
            .into_iter()
            .flat_map(|b| b.registrations)
            .filter(|r| auth.sees_organization(&r.organization))
            .collect();
        body["organization"] = json!(principal.organization);
        body["participants"] = json!(participants);
    } else if let Some(iitp_no) = auth.iitp_no() {
        body["iitpNo"] = json!(iitp_no);
        body["registrations"] = json!(registration::find_by_iitp(&store, iitp_no).await?);
        body["courses"] = json!(course::find_by_enrollment(&store, iitp_no).await?);
    }

    Ok(HttpResponse::Ok().json(body))
}
