use actix_web::{HttpResponse, middleware::from_fn, web};

use crate::auth::middleware::require_auth;
use crate::errors::ApiErrorResponse;
use crate::handlers::{
    access_handlers, auth_handlers, batch_handlers, course_handlers, dashboard, health,
    participant_handlers, registration_handlers, require_json_content_type, staff_handlers,
};

/// JSON 404 for anything no route matched.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiErrorResponse::new("Not found"))
}

/// Every route of the portal. Shared by `main` and the HTTP tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Public routes
        .route("/health", web::get().to(health))
        .route("/login", web::post().to(auth_handlers::login_submit))
        .route("/student-login", web::post().to(auth_handlers::student_login_submit))
        .route("/trainee-login", web::post().to(auth_handlers::trainee_login_submit))
        .route("/logout", web::post().to(auth_handlers::logout))
        .route("/", web::get().to(|| async {
            HttpResponse::SeeOther()
                .insert_header(("Location", "/dashboard"))
                .finish()
        }))
        // Public JSON API
        .service(
            web::scope("/api")
                .wrap(from_fn(require_json_content_type))
                .route("/batches/active", web::get().to(registration_handlers::active_batches))
                .route("/batches/{batch_id}/registrations", web::post().to(registration_handlers::register))
                .route("/meetings/{batch_id}/join", web::post().to(access_handlers::join_meeting))
                .route("/links/resolve", web::post().to(access_handlers::resolve_link))
                .route("/exams/{exam_id}/access", web::post().to(access_handlers::exam_access)),
        )
        // Protected routes
        .service(
            web::scope("")
                .wrap(from_fn(require_auth))
                .route("/dashboard", web::get().to(dashboard::index))
                .route("/exam/{exam_id}", web::get().to(access_handlers::exam_page))
                .route("/student/courses/{iitp_no}", web::get().to(course_handlers::student_courses))
                .route("/trainee/courses/{iitp_no}", web::get().to(course_handlers::trainee_courses))
                .route("/supervisor/trainees/{iitp_no}", web::get().to(participant_handlers::supervisor_trainee))
                .service(
                    web::scope("/admin")
                        .wrap(from_fn(require_json_content_type))
                        .route("", web::get().to(batch_handlers::admin_index))
                        .route("/users/{iitp_no}", web::get().to(participant_handlers::participant_profile))
                        .route("/batches", web::post().to(batch_handlers::create))
                        .route("/batches/{id}/active", web::put().to(batch_handlers::set_active))
                        .route("/batches/{id}", web::delete().to(batch_handlers::delete))
                        .route("/batches/{id}/registrations.csv", web::get().to(batch_handlers::export_batch))
                        .route("/registrations.csv", web::get().to(batch_handlers::export_all))
                        .route("/courses", web::get().to(course_handlers::list))
                        .route("/courses", web::post().to(course_handlers::create))
                        .route("/courses/{id}/exams", web::post().to(course_handlers::add_exam))
                        .route("/courses/{id}/enrollments", web::post().to(course_handlers::enroll))
                        .route("/staff", web::get().to(staff_handlers::list))
                        .route("/staff", web::post().to(staff_handlers::create)),
                ),
        );
}
