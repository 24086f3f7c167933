//! End-to-end HTTP tests against the full route table and the memory store.

#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::*;
use eventlink::models::user::Role;
use eventlink::models::{batch, course, registration};
use serde_json::{Value, json};

/// Send a login request, expect a redirect, and return the session cookie
/// with the redirect target.
macro_rules! login {
    ($app:expr, $req:expr) => {{
        let resp = test::call_service(&$app, $req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "login should redirect");
        let location = header(&resp, "location");
        let cookie = resp
            .response()
            .cookies()
            .next()
            .expect("session cookie")
            .into_owned();
        (cookie, location)
    }};
}

fn header<B>(resp: &actix_web::dev::ServiceResponse<B>, name: &str) -> String {
    resp.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn staff_login(username: &str, password: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/login")
        .set_form([("username", username), ("password", password)])
}

fn participant_login(uri: &str, iitp_no: &str) -> test::TestRequest {
    test::TestRequest::post().uri(uri).set_form([("iitp_no", iitp_no)])
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

#[actix_rt::test]
async fn test_health() {
    let store = setup_store();
    let app = init_app!(store);
    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "memory");
}

#[actix_rt::test]
async fn test_registration_intake() {
    let store = setup_store();
    let batch_id = seed_batch(&store, "July", true).await;
    let app = init_app!(store);

    let req = test::TestRequest::post()
        .uri(&format!("/api/batches/{batch_id}/registrations"))
        .set_json(json!({ "name": " Anita ", "iitpNo": "H1", "organization": "Belden India" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["batchId"], batch_id.as_str());

    let regs = registration::find_by_batch(&store, &batch_id).await.expect("list");
    assert_eq!(regs.len(), 1);
    assert_eq!(regs[0].name, "Anita");

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/batches/active").to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["name"], "July");
}

#[actix_rt::test]
async fn test_registration_rejections() {
    let store = setup_store();
    let closed = seed_batch(&store, "Closed", false).await;
    let open = seed_batch(&store, "Open", true).await;
    let app = init_app!(store);
    let valid = json!({ "name": "Anita", "iitpNo": "H2", "organization": "Acme" });

    let req = test::TestRequest::post()
        .uri(&format!("/api/batches/{closed}/registrations"))
        .set_json(&valid)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::post()
        .uri("/api/batches/missing/registrations")
        .set_json(&valid)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri(&format!("/api/batches/{open}/registrations"))
        .set_json(json!({ "name": "", "iitpNo": "H2", "organization": "Acme" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["fields"]["name"].is_string());

    let req = test::TestRequest::post()
        .uri(&format!("/api/batches/{open}/registrations"))
        .set_form([("name", "Anita"), ("iitpNo", "H2"), ("organization", "Acme")])
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNSUPPORTED_MEDIA_TYPE
    );
}

#[actix_rt::test]
async fn test_meeting_join_and_link_resolve() {
    let store = setup_store();
    let batch_id = seed_batch(&store, "August", true).await;
    seed_registration(&store, &batch_id, "Ravi", "J1", TE_SHIRWAL).await;
    let app = init_app!(store);

    let req = test::TestRequest::post()
        .uri(&format!("/api/meetings/{batch_id}/join"))
        .set_json(json!({ "iitpNo": "J1" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["name"], "Ravi");

    let req = test::TestRequest::post()
        .uri(&format!("/api/meetings/{batch_id}/join"))
        .set_json(json!({ "iitpNo": "J2" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let denied: Value = test::read_body_json(resp).await;
    assert_eq!(denied["success"], false);
    assert!(denied["error"].is_string());

    let req = test::TestRequest::post()
        .uri("/api/links/resolve")
        .set_json(json!({ "name": "Ravi", "iitpNo": "J1", "organization": TE_SHIRWAL }))
        .to_request();
    let link: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(link["url"], body["meetingLink"]);
}

#[actix_rt::test]
async fn test_exam_access_api() {
    let store = setup_store();
    let (course_id, exam_id) = seed_course_with_exam(&store, "Harness", "Final").await;
    course::enroll(&store, &course_id, "X1").await.expect("enroll");
    let app = init_app!(store);

    let req = test::TestRequest::post()
        .uri(&format!("/api/exams/{exam_id}/access"))
        .set_json(json!({ "iitpNo": "X1" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "success": true, "courseId": course_id, "examId": exam_id, "examTitle": "Final" }));
}

#[actix_rt::test]
async fn test_unknown_api_route_is_json_404() {
    let store = setup_store();
    let app = init_app!(store);
    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/nope").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Not found");
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[actix_rt::test]
async fn test_unauthenticated_requests_redirect_to_area_login() {
    let store = setup_store();
    let app = init_app!(store);

    for (path, login) in [
        ("/admin", "/login"),
        ("/dashboard", "/login"),
        ("/student/courses/S1", "/student-login"),
        ("/trainee/courses/T1", "/trainee-login"),
        ("/exam/e1", "/trainee-login"),
    ] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(header(&resp, "location"), login, "{path}");
    }
}

#[actix_rt::test]
async fn test_failed_logins_are_rate_limited() {
    let store = setup_store();
    seed_staff(&store, "admin", STAFF_PASS, Role::Admin, None).await;
    let app = init_app!(store);

    for _ in 0..5 {
        let resp = test::call_service(&app, staff_login("admin", "wrong-password").to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
    let resp = test::call_service(&app, staff_login("admin", STAFF_PASS).to_request()).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[actix_rt::test]
async fn test_logout_revokes_server_session() {
    let store = setup_store();
    seed_staff(&store, "admin", STAFF_PASS, Role::Admin, None).await;
    let app = init_app!(store);

    let (cookie, location) = login!(app, staff_login("admin", STAFF_PASS));
    assert_eq!(location, "/admin");

    let req = test::TestRequest::get().uri("/dashboard").cookie(cookie.clone()).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post().uri("/logout").cookie(cookie.clone()).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::SEE_OTHER);

    // The old cookie still carries the token, but the server no longer knows it.
    let req = test::TestRequest::get().uri("/dashboard").cookie(cookie).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(header(&resp, "location"), "/login");
}

#[actix_rt::test]
async fn test_unknown_participant_cannot_log_in() {
    let store = setup_store();
    let app = init_app!(store);
    let resp = test::call_service(&app, participant_login("/student-login", "NOBODY").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

#[actix_rt::test]
async fn test_admin_batch_lifecycle() {
    let store = setup_store();
    seed_staff(&store, "admin", STAFF_PASS, Role::Admin, None).await;
    let app = init_app!(store);
    let (cookie, _) = login!(app, staff_login("admin", STAFF_PASS));

    let req = test::TestRequest::post()
        .uri("/admin/batches")
        .cookie(cookie.clone())
        .set_json(json!({ "name": "September" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_str().expect("id").to_string();
    seed_registration(&store, &id, "Anita", "K1", TE_SHIRWAL).await;

    let req = test::TestRequest::get().uri("/admin").cookie(cookie.clone()).to_request();
    let listing: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listing[0]["name"], "September");
    assert_eq!(listing[0]["active"], true);
    assert_eq!(listing[0]["registrations"][0]["iitpNo"], "K1");

    let req = test::TestRequest::put()
        .uri(&format!("/admin/batches/{id}/active"))
        .cookie(cookie.clone())
        .set_json(json!({ "active": false }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    assert!(!batch::find_by_id(&store, &id).await.expect("get").expect("present").active);

    let req = test::TestRequest::delete()
        .uri(&format!("/admin/batches/{id}"))
        .cookie(cookie.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["registrationsRemoved"], 1);

    let req = test::TestRequest::delete()
        .uri(&format!("/admin/batches/{id}"))
        .cookie(cookie)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_batch_csv_export() {
    let store = setup_store();
    seed_staff(&store, "admin", STAFF_PASS, Role::Admin, None).await;
    let full = seed_batch(&store, "Batch 7 / March", true).await;
    let empty = seed_batch(&store, "Empty", true).await;
    seed_registration(&store, &full, "Anita", "C1", TE_SHIRWAL).await;
    let app = init_app!(store);
    let (cookie, _) = login!(app, staff_login("admin", STAFF_PASS));

    let req = test::TestRequest::get()
        .uri(&format!("/admin/batches/{full}/registrations.csv"))
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header(&resp, "content-type"), "text/csv; charset=utf-8");
    assert_eq!(
        header(&resp, "content-disposition"),
        "attachment; filename=\"batch-7-march.csv\""
    );
    let body = test::read_body(resp).await;
    let text = std::str::from_utf8(&body).expect("utf8");
    assert!(text.starts_with("Name,IITP No,Organization,Submission Time\r\nAnita,C1,"));

    let req = test::TestRequest::get()
        .uri(&format!("/admin/batches/{empty}/registrations.csv"))
        .cookie(cookie)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
}

#[actix_rt::test]
async fn test_organization_admin_exports_own_organization_only() {
    let store = setup_store();
    seed_staff(&store, "te-admin", STAFF_PASS, Role::OrganizationAdmin, Some(TE_SHIRWAL)).await;
    let batch_id = seed_batch(&store, "Mixed", true).await;
    seed_registration(&store, &batch_id, "Anita", "O1", TE_SHIRWAL).await;
    seed_registration(&store, &batch_id, "Ravi", "O2", BSA_CHAKAN).await;
    let app = init_app!(store);
    let (cookie, location) = login!(app, staff_login("te-admin", STAFF_PASS));
    assert_eq!(location, "/dashboard");

    let req = test::TestRequest::get().uri("/admin/registrations.csv").cookie(cookie.clone()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let text = std::str::from_utf8(&body).expect("utf8");
    assert!(text.contains("O1"));
    assert!(!text.contains("O2"));

    let req = test::TestRequest::get().uri("/admin").cookie(cookie).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn test_staff_creation_and_duplicate_username() {
    let store = setup_store();
    seed_staff(&store, "admin", STAFF_PASS, Role::Admin, None).await;
    let app = init_app!(store);
    let (cookie, _) = login!(app, staff_login("admin", STAFF_PASS));
    let form = json!({
        "name": "Sunita",
        "username": "sunita",
        "password": "Password2!",
        "role": "supervisor",
        "organization": TE_SHIRWAL,
    });

    let req = test::TestRequest::post().uri("/admin/staff").cookie(cookie.clone()).set_json(&form).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["role"], "supervisor");
    assert!(created.get("passwordHash").is_none());

    let req = test::TestRequest::post().uri("/admin/staff").cookie(cookie.clone()).set_json(&form).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let participant_role = json!({
        "name": "Nope", "username": "nope", "password": "Password3!", "role": "student"
    });
    let req = test::TestRequest::post()
        .uri("/admin/staff")
        .cookie(cookie.clone())
        .set_json(&participant_role)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get().uri("/admin/staff").cookie(cookie).to_request();
    let staff: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(staff.as_array().map(Vec::len), Some(2));
}

#[actix_rt::test]
async fn test_course_management() {
    let store = setup_store();
    seed_staff(&store, "admin", STAFF_PASS, Role::Admin, None).await;
    let app = init_app!(store);
    let (cookie, _) = login!(app, staff_login("admin", STAFF_PASS));

    let req = test::TestRequest::post()
        .uri("/admin/courses")
        .cookie(cookie.clone())
        .set_json(json!({ "title": "Connectors", "subjects": [{ "title": "Pins" }] }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let course_id = created["id"].as_str().expect("id").to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/admin/courses/{course_id}/exams"))
        .cookie(cookie.clone())
        .set_json(json!({ "title": "Final", "durationMinutes": 0 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri(&format!("/admin/courses/{course_id}/exams"))
        .cookie(cookie.clone())
        .set_json(json!({ "title": "Final", "durationMinutes": 30 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri(&format!("/admin/courses/{course_id}/enrollments"))
        .cookie(cookie.clone())
        .set_json(json!({ "iitpNo": "N1" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    assert!(course::is_enrolled(&store, &course_id, "N1").await.expect("check"));

    let req = test::TestRequest::get().uri("/admin/courses").cookie(cookie).to_request();
    let courses: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(courses[0]["title"], "Connectors");
    assert_eq!(courses[0]["exams"][0]["durationMinutes"], 30);
}

// ---------------------------------------------------------------------------
// Participants and supervisors
// ---------------------------------------------------------------------------

#[actix_rt::test]
async fn test_student_sees_only_own_courses() {
    let store = setup_store();
    let (course_id, _) = seed_course_with_exam(&store, "Basics", "Quiz").await;
    course::enroll(&store, &course_id, "S1").await.expect("enroll");
    course::enroll(&store, &course_id, "S2").await.expect("enroll");
    let app = init_app!(store);

    let (cookie, location) = login!(app, participant_login("/student-login", "S1"));
    assert_eq!(location, "/student/courses/S1");

    let req = test::TestRequest::get().uri(&location).cookie(cookie.clone()).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["courses"][0]["title"], "Basics");

    let req = test::TestRequest::get().uri("/student/courses/S2").cookie(cookie.clone()).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get().uri("/trainee/courses/S1").cookie(cookie.clone()).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get().uri("/admin").cookie(cookie).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn test_trainee_exam_page() {
    let store = setup_store();
    let (course_id, exam_id) = seed_course_with_exam(&store, "Harness", "Final").await;
    let (_, other_exam) = seed_course_with_exam(&store, "Other", "Other Final").await;
    course::enroll(&store, &course_id, "T1").await.expect("enroll");
    let app = init_app!(store);

    let (cookie, location) = login!(app, participant_login("/trainee-login", "T1"));
    assert_eq!(location, "/trainee/courses/T1");

    let req = test::TestRequest::get().uri(&format!("/exam/{exam_id}")).cookie(cookie.clone()).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["examTitle"], "Final");

    let req = test::TestRequest::get().uri(&format!("/exam/{other_exam}")).cookie(cookie).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}

#[actix_rt::test]
async fn test_supervisor_trainee_redirect_and_profile() {
    let store = setup_store();
    seed_staff(&store, "sup", STAFF_PASS, Role::Supervisor, Some(TE_SHIRWAL)).await;
    let batch_id = seed_batch(&store, "October", true).await;
    seed_registration(&store, &batch_id, "Anita", "P1", TE_SHIRWAL).await;
    seed_registration(&store, &batch_id, "Ravi", "P2", BSA_CHAKAN).await;
    let app = init_app!(store);
    let (cookie, _) = login!(app, staff_login("sup", STAFF_PASS));

    let req = test::TestRequest::get().uri("/supervisor/trainees/P1").cookie(cookie.clone()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(header(&resp, "location"), "/admin/users/P1");

    let req = test::TestRequest::get().uri("/admin/users/P1").cookie(cookie.clone()).to_request();
    let profile: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(profile["name"], "Anita");
    assert_eq!(profile["batchNames"][batch_id.as_str()], "October");

    // Registered only with another organization.
    let req = test::TestRequest::get().uri("/admin/users/P2").cookie(cookie).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_enrollment_does_not_widen_supervisor_view() {
    let store = setup_store();
    seed_staff(&store, "sup", STAFF_PASS, Role::Supervisor, Some(TE_SHIRWAL)).await;
    seed_staff(&store, "root", STAFF_PASS, Role::Admin, None).await;
    let batch_id = seed_batch(&store, "November", true).await;
    seed_registration(&store, &batch_id, "Anita", "P1", TE_SHIRWAL).await;
    seed_registration(&store, &batch_id, "Ravi", "P2", BSA_CHAKAN).await;
    let (course_id, _) = seed_course_with_exam(&store, "Harness", "Final").await;
    for iitp_no in ["P1", "P2", "P3"] {
        course::enroll(&store, &course_id, iitp_no).await.expect("enroll");
    }
    let app = init_app!(store);
    let (cookie, _) = login!(app, staff_login("sup", STAFF_PASS));

    let req = test::TestRequest::get().uri("/trainee/courses/P1").cookie(cookie.clone()).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["courses"][0]["title"], "Harness");

    // P2 is enrolled but registered only with another organization; P3 has
    // no registration at all.
    for iitp_no in ["P2", "P3"] {
        let req = test::TestRequest::get()
            .uri(&format!("/admin/users/{iitp_no}"))
            .cookie(cookie.clone())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
        for area in ["trainee", "student"] {
            let req = test::TestRequest::get()
                .uri(&format!("/{area}/courses/{iitp_no}"))
                .cookie(cookie.clone())
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
        }
    }

    let (admin, _) = login!(app, staff_login("root", STAFF_PASS));
    let req = test::TestRequest::get().uri("/admin/users/P3").cookie(admin.clone()).to_request();
    let profile: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(profile["courses"][0]["title"], "Harness");
    assert_eq!(profile["registrations"], json!([]));

    let req = test::TestRequest::get().uri("/student/courses/P2").cookie(admin).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_intake_into_deleted_batch_is_not_found() {
    let store = setup_store();
    seed_staff(&store, "root", STAFF_PASS, Role::Admin, None).await;
    let batch_id = seed_batch(&store, "December", true).await;
    let app = init_app!(store);
    let (admin, _) = login!(app, staff_login("root", STAFF_PASS));

    let req = test::TestRequest::delete()
        .uri(&format!("/admin/batches/{batch_id}"))
        .cookie(admin)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri(&format!("/api/batches/{batch_id}/registrations"))
        .set_json(json!({ "name": "Late", "iitpNo": "L1", "organization": "Acme" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    assert!(registration::find_by_iitp(&store, "L1").await.expect("group").is_empty());
}

#[actix_rt::test]
async fn test_store_failure_is_500_not_empty() {
    let key = actix_web::cookie::Key::generate();
    let store = setup_store();
    seed_staff(&store, "root", STAFF_PASS, Role::Admin, None).await;
    let healthy = init_app!(store, key.clone());
    let (admin, _) = login!(healthy, staff_login("root", STAFF_PASS));

    let broken = failing_store().await;
    assert!(batch::find_all_with_registrations(&broken).await.is_err());
    let app = init_app!(broken, key);

    let req = test::TestRequest::get().uri("/admin").cookie(admin).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Storage unavailable" }));

    let req = test::TestRequest::get().uri("/api/batches/active").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Storage unavailable");

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["store"], "postgres");
}
