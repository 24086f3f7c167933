use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::access::links::{self, LinkRequest, LinkResponse};
use crate::access::{self, AccessRequest};
use crate::auth::{AuthContext, Capability};
use crate::errors::AppError;
use crate::models::course;
use crate::store::Store;

/// POST /api/meetings/{batchId}/join
pub async fn join_meeting(
    store: web::Data<Store>,
    path: web::Path<String>,
    body: web::Json<AccessRequest>,
) -> Result<HttpResponse, AppError> {
    let batch_id = path.into_inner();
    let result = access::verify_meeting_access(&store, &body.iitp_no, &batch_id).await?;
    if !result.is_granted() {
        log::info!("Meeting join refused for batch {batch_id}");
    }
    Ok(HttpResponse::Ok().json(result))
}

/// POST /api/links/resolve
pub async fn resolve_link(body: web::Json<LinkRequest>) -> HttpResponse {
    let url = links::resolve_meeting_link(&body.organization);
    HttpResponse::Ok().json(LinkResponse { url })
}

/// POST /api/exams/{examId}/access
pub async fn exam_access(
    store: web::Data<Store>,
    path: web::Path<String>,
    body: web::Json<AccessRequest>,
) -> Result<HttpResponse, AppError> {
    let result = access::verify_exam_access(&store, &body.iitp_no, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// GET /exam/{examId}
///
/// Course managers get a preview of any exam. Participants are checked
/// against their own enrollment and refused with the verification body.
pub async fn exam_page(
    auth: AuthContext,
    store: web::Data<Store>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let exam_id = path.into_inner();

    if auth.role().can(Capability::ManageCourses) {
        let (course, exam) = course::find_exam(&store, &exam_id)
            .await?
            .ok_or(AppError::NotFound)?;
        return Ok(HttpResponse::Ok().json(json!({
            "preview": true,
            "courseId": course.id,
            "courseTitle": course.title,
            "exam": exam,
        })));
    }

    auth.require(Capability::TakeExams)?;
    let iitp_no = auth.iitp_no().unwrap_or_default();
    let result = access::verify_exam_access(&store, iitp_no, &exam_id).await?;
    if result.is_granted() {
        Ok(HttpResponse::Ok().json(result))
    } else {
        log::warn!("{} refused exam {exam_id}", auth.principal.name);
        Ok(HttpResponse::Forbidden().json(result))
    }
}
