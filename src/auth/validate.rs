use std::collections::BTreeMap;

use crate::models::course::{CourseForm, ExamForm};
use crate::models::registration::RegistrationForm;
use crate::models::user::StaffForm;

/// Per-field validation messages, keyed by the JSON field name.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Validate a required text field with a max length (in characters).
pub fn validate_required(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(format!("{field_name} is required"));
    }
    if trimmed.chars().count() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

/// Participant or staff display name: 2-100 characters of letters, spaces,
/// and `.`, `'`, `-`.
pub fn validate_name(name: &str) -> Option<String> {
    if let Some(err) = validate_required(name, "Name", 100) {
        return Some(err);
    }
    let trimmed = name.trim();
    if trimmed.chars().count() < 2 {
        return Some("Name must be at least 2 characters".to_string());
    }
    if !trimmed
        .chars()
        .all(|c| c.is_alphabetic() || c == ' ' || c == '.' || c == '\'' || c == '-')
    {
        return Some("Name may only contain letters, spaces, periods, apostrophes and hyphens".to_string());
    }
    None
}

/// IITP number: up to 32 ASCII letters, digits, `-` or `_`.
pub fn validate_iitp_no(iitp_no: &str) -> Option<String> {
    if let Some(err) = validate_required(iitp_no, "IITP No.", 32) {
        return Some(err);
    }
    if !iitp_no
        .trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Some("IITP No. may only contain letters, digits, '-' and '_'".to_string());
    }
    None
}

pub fn validate_organization(organization: &str) -> Option<String> {
    validate_required(organization, "Organization", 200)
}

/// Username: 2-50 chars, alphanumeric and underscore only.
pub fn validate_username(username: &str) -> Option<String> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Some("Username is required".to_string());
    }
    if trimmed.len() < 2 {
        return Some("Username must be at least 2 characters".to_string());
    }
    if trimmed.len() > 50 {
        return Some("Username must be at most 50 characters".to_string());
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Some("Username may only contain letters, numbers, and underscores".to_string());
    }
    None
}

pub fn validate_password(password: &str) -> Option<String> {
    if password.is_empty() {
        return Some("Password is required".to_string());
    }
    if password.chars().count() < 8 {
        return Some("Password must be at least 8 characters".to_string());
    }
    None
}

/// Optional meeting link; when given it must be an https URL.
pub fn validate_meeting_link(link: &str) -> Option<String> {
    let trimmed = link.trim();
    if trimmed.is_empty() {
        return None;
    }
    if !trimmed.starts_with("https://") || trimmed.len() <= "https://".len() || trimmed.contains(' ') {
        return Some("Meeting link must be an https:// URL".to_string());
    }
    None
}

fn collect(checks: impl IntoIterator<Item = (&'static str, Option<String>)>) -> FieldErrors {
    checks
        .into_iter()
        .filter_map(|(field, err)| err.map(|e| (field, e)))
        .collect()
}

pub fn validate_registration(form: &RegistrationForm) -> FieldErrors {
    collect([
        ("name", validate_name(&form.name)),
        ("iitpNo", validate_iitp_no(&form.iitp_no)),
        ("organization", validate_organization(&form.organization)),
    ])
}

pub fn validate_staff(form: &StaffForm) -> FieldErrors {
    let role_error = (!form.role.is_staff())
        .then(|| "Role must be admin, trainer, supervisor or organization_admin".to_string());
    collect([
        ("name", validate_name(&form.name)),
        ("username", validate_username(&form.username)),
        ("password", validate_password(&form.password)),
        ("role", role_error),
        ("organization", validate_optional(&form.organization, "Organization", 200)),
        ("meetingLink", validate_meeting_link(&form.meeting_link)),
    ])
}

pub fn validate_course(form: &CourseForm) -> FieldErrors {
    let subject_error = form
        .subjects
        .iter()
        .find_map(|s| validate_required(&s.title, "Subject title", 200));
    collect([
        ("title", validate_required(&form.title, "Title", 200)),
        ("description", validate_optional(&form.description, "Description", 2000)),
        ("subjects", subject_error),
    ])
}

pub fn validate_exam(form: &ExamForm) -> FieldErrors {
    let duration_error = (form.duration_minutes == 0 || form.duration_minutes > 600)
        .then(|| "Duration must be between 1 and 600 minutes".to_string());
    collect([
        ("title", validate_required(&form.title, "Title", 200)),
        ("durationMinutes", duration_error),
    ])
}

/// Validate an optional text field with a max length (empty is OK).
pub fn validate_optional(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if !trimmed.is_empty() && trimmed.chars().count() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}
