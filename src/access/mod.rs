//! Exam and meeting access verification.
//!
//! Both checks report business-rule failures as [`AccessResult::Denied`]
//! with a message meant for the participant. `Err` is reserved for the
//! store being unreachable.

pub mod links;

use serde::{Serialize, Serializer};

use crate::models::{batch, course, registration};
use crate::store::{Store, StoreError};

/// Outcome of an access check. Serializes as `{"success": true, ...grant}`
/// or `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessResult<T> {
    Granted(T),
    Denied(String),
}

impl<T> AccessResult<T> {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessResult::Granted(_))
    }

    pub fn denied(message: impl Into<String>) -> Self {
        AccessResult::Denied(message.into())
    }
}

impl<T: Serialize> Serialize for AccessResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Granted<'a, T> {
            success: bool,
            #[serde(flatten)]
            grant: &'a T,
        }

        #[derive(Serialize)]
        struct Denied<'a> {
            success: bool,
            error: &'a str,
        }

        match self {
            AccessResult::Granted(grant) => Granted { success: true, grant }.serialize(serializer),
            AccessResult::Denied(error) => Denied { success: false, error }.serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamGrant {
    pub course_id: String,
    pub exam_id: String,
    pub exam_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingGrant {
    pub batch_id: String,
    pub name: String,
    pub organization: String,
    pub meeting_link: String,
}

/// Body shared by the exam-access and meeting-join endpoints.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRequest {
    #[serde(default)]
    pub iitp_no: String,
}

/// Check that `iitp_no` is enrolled in the course that owns `exam_id`.
///
/// The identifier is trimmed; otherwise it must match the enrollment exactly.
pub async fn verify_exam_access(
    store: &Store,
    iitp_no: &str,
    exam_id: &str,
) -> Result<AccessResult<ExamGrant>, StoreError> {
    let iitp_no = iitp_no.trim();
    if iitp_no.is_empty() {
        return Ok(AccessResult::denied("IITP No. is required"));
    }
    let Some((course, exam)) = course::find_exam(store, exam_id).await? else {
        return Ok(AccessResult::denied("Exam not found"));
    };
    if !course::is_enrolled(store, &course.id, iitp_no).await? {
        return Ok(AccessResult::denied(format!(
            "IITP No. {iitp_no} is not enrolled in {}",
            course.title
        )));
    }
    Ok(AccessResult::Granted(ExamGrant {
        course_id: course.id,
        exam_id: exam.id,
        exam_title: exam.title,
    }))
}

/// Check that `iitp_no` registered in an active batch, and hand back the
/// meeting link for the organization given at registration.
pub async fn verify_meeting_access(
    store: &Store,
    iitp_no: &str,
    batch_id: &str,
) -> Result<AccessResult<MeetingGrant>, StoreError> {
    let iitp_no = iitp_no.trim();
    if iitp_no.is_empty() {
        return Ok(AccessResult::denied("IITP No. is required"));
    }
    let Some(batch) = batch::find_by_id(store, batch_id).await? else {
        return Ok(AccessResult::denied("Batch not found"));
    };
    if !batch.active {
        return Ok(AccessResult::denied(format!(
            "{} is not accepting participants right now",
            batch.name
        )));
    }
    let registrations = registration::find_in_batch_by_iitp(store, &batch.id, iitp_no).await?;
    let Some(reg) = registrations.into_iter().next() else {
        return Ok(AccessResult::denied(format!(
            "No registration found for IITP No. {iitp_no} in {}",
            batch.name
        )));
    };
    let meeting_link = links::resolve_meeting_link(&reg.organization).to_string();
    Ok(AccessResult::Granted(MeetingGrant {
        batch_id: batch.id,
        name: reg.name,
        organization: reg.organization,
        meeting_link,
    }))
}
