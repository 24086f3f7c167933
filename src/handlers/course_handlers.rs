use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::auth::validate::{self, FieldErrors};
use crate::auth::{AuthContext, Capability};
use crate::errors::{AppError, check_fields};
use crate::models::course::{self, CourseForm, EnrollmentForm, ExamForm};
use crate::models::registration;
use crate::models::user::Role;
use crate::store::Store;

/// GET /admin/courses
pub async fn list(auth: AuthContext, store: web::Data<Store>) -> Result<HttpResponse, AppError> {
    auth.require(Capability::ManageCourses)?;
    let courses = course::find_all(&store).await?;
    Ok(HttpResponse::Ok().json(courses))
}

/// POST /admin/courses
pub async fn create(
    auth: AuthContext,
    store: web::Data<Store>,
    body: web::Json<CourseForm>,
) -> Result<HttpResponse, AppError> {
    auth.require(Capability::ManageCourses)?;
    check_fields(validate::validate_course(&body))?;
    let id = course::create(&store, &body).await?;
    log::info!("{} created course '{}' ({id})", auth.principal.name, body.title.trim());
    Ok(HttpResponse::Created().json(json!({ "id": id })))
}

/// POST /admin/courses/{id}/exams
pub async fn add_exam(
    auth: AuthContext,
    store: web::Data<Store>,
    path: web::Path<String>,
    body: web::Json<ExamForm>,
) -> Result<HttpResponse, AppError> {
    auth.require(Capability::ManageCourses)?;
    check_fields(validate::validate_exam(&body))?;
    let course_id = path.into_inner();
    let exam_id = course::add_exam(&store, &course_id, &body.title, body.duration_minutes)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Created().json(json!({ "id": exam_id, "courseId": course_id })))
}

/// POST /admin/courses/{id}/enrollments
pub async fn enroll(
    auth: AuthContext,
    store: web::Data<Store>,
    path: web::Path<String>,
    body: web::Json<EnrollmentForm>,
) -> Result<HttpResponse, AppError> {
    auth.require(Capability::ManageCourses)?;
    let iitp_no = body.iitp_no.trim();
    let mut errors = FieldErrors::new();
    if let Some(e) = validate::validate_iitp_no(iitp_no) {
        errors.insert("iitpNo", e);
    }
    check_fields(errors)?;

    let course_id = path.into_inner();
    if course::find_by_id(&store, &course_id).await?.is_none() {
        return Err(AppError::NotFound);
    }
    course::enroll(&store, &course_id, iitp_no).await?;
    log::info!("Enrolled IITP No. {iitp_no} in course {course_id}");
    Ok(HttpResponse::Ok().json(json!({ "courseId": course_id, "iitpNo": iitp_no })))
}

async fn own_courses(
    auth: &AuthContext,
    store: &Store,
    route_role: Role,
    iitp_no: &str,
) -> Result<HttpResponse, AppError> {
    let iitp_no = iitp_no.trim();
    let registrations = registration::find_by_iitp(store, iitp_no).await?;
    auth.require_participant_access(route_role, iitp_no, &registrations)?;
    let courses = course::find_by_enrollment(store, iitp_no).await?;
    Ok(HttpResponse::Ok().json(json!({ "iitpNo": iitp_no, "courses": courses })))
}

/// GET /student/courses/{iitpNo}
pub async fn student_courses(
    auth: AuthContext,
    store: web::Data<Store>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    own_courses(&auth, &store, Role::Student, path.as_str()).await
}

/// GET /trainee/courses/{iitpNo}
pub async fn trainee_courses(
    auth: AuthContext,
    store: web::Data<Store>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    own_courses(&auth, &store, Role::Trainee, path.as_str()).await
}
