//! Collection names and subcollection paths.

pub const BATCHES: &str = "batches";
pub const REGISTRATIONS: &str = "registrations";
pub const COURSES: &str = "courses";
pub const ENROLLMENTS: &str = "enrollments";
pub const STAFF: &str = "staff";
pub const SESSIONS: &str = "sessions";

/// `batches/{batch_id}/registrations`
pub fn registrations(batch_id: &str) -> String {
    format!("{BATCHES}/{batch_id}/{REGISTRATIONS}")
}

/// `courses/{course_id}/enrollments`
pub fn enrollments(course_id: &str) -> String {
    format!("{COURSES}/{course_id}/{ENROLLMENTS}")
}
