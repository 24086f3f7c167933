use std::collections::BTreeSet;

use serde_json::{Value, json};

use super::types::{Course, CourseForm, Exam, Subject};
use crate::store::timestamp::{self, Timestamp};
use crate::store::{Document, Fields, Store, StoreError, new_id, paths};

fn from_document(doc: &Document) -> Result<Course, StoreError> {
    let subjects: Vec<Subject> = match doc.fields.get("subjects") {
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|e| doc.malformed(format!("subjects: {e}")))?,
        None => Vec::new(),
    };
    let exams: Vec<Exam> = match doc.fields.get("exams") {
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|e| doc.malformed(format!("exams: {e}")))?,
        None => Vec::new(),
    };
    Ok(Course {
        id: doc.id.clone(),
        title: doc.require_str("title")?,
        description: doc.str_field("description").unwrap_or_default().to_string(),
        subjects,
        exams,
        created_at: timestamp::to_iso(doc.timestamp_field("createdAt")?),
    })
}

fn collect(docs: &[Document]) -> Vec<Course> {
    let mut courses: Vec<Course> = docs
        .iter()
        .filter_map(|doc| match from_document(doc) {
            Ok(c) => Some(c),
            Err(e) => {
                log::warn!("Skipping course: {e}");
                None
            }
        })
        .collect();
    courses.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));
    courses
}

pub async fn create(store: &Store, form: &CourseForm) -> Result<String, StoreError> {
    let subjects: Vec<Subject> = form
        .subjects
        .iter()
        .map(|s| Subject {
            title: s.title.trim().to_string(),
            description: s.description.trim().to_string(),
        })
        .collect();
    let mut fields = Fields::new();
    fields.insert("title".into(), json!(form.title.trim()));
    fields.insert("description".into(), json!(form.description.trim()));
    fields.insert("subjects".into(), json!(subjects));
    fields.insert("exams".into(), json!([]));
    fields.insert("createdAt".into(), Timestamp::now().to_value());
    store.add(paths::COURSES, fields).await
}

/// All courses, ordered by title.
pub async fn find_all(store: &Store) -> Result<Vec<Course>, StoreError> {
    let docs = store.list(paths::COURSES).await?;
    Ok(collect(&docs))
}

pub async fn find_by_id(store: &Store, id: &str) -> Result<Option<Course>, StoreError> {
    match store.get(paths::COURSES, id).await? {
        Some(doc) => from_document(&doc).map(Some),
        None => Ok(None),
    }
}

/// Append an exam to a course. Returns the new exam's id, or `None` if the
/// course does not exist.
pub async fn add_exam(
    store: &Store,
    course_id: &str,
    title: &str,
    duration_minutes: u32,
) -> Result<Option<String>, StoreError> {
    let exam = Exam {
        id: new_id(),
        title: title.trim().to_string(),
        duration_minutes,
    };
    store
        .modify(paths::COURSES, course_id, move |doc| {
            let mut exams: Vec<Exam> = match doc.fields.get("exams") {
                Some(v) => serde_json::from_value(v.clone())
                    .map_err(|e| doc.malformed(format!("exams: {e}")))?,
                None => Vec::new(),
            };
            let exam_id = exam.id.clone();
            exams.push(exam);
            doc.fields.insert("exams".into(), serde_json::to_value(exams)?);
            Ok(exam_id)
        })
        .await
}

/// The course that owns `exam_id`, with the exam itself.
pub async fn find_exam(store: &Store, exam_id: &str) -> Result<Option<(Course, Exam)>, StoreError> {
    let courses = find_all(store).await?;
    Ok(courses.into_iter().find_map(|course| {
        let exam = course.exam(exam_id)?.clone();
        Some((course, exam))
    }))
}

/// Enroll a participant. Enrolling twice is a no-op that keeps the first date.
pub async fn enroll(store: &Store, course_id: &str, iitp_no: &str) -> Result<(), StoreError> {
    let collection = paths::enrollments(course_id);
    if store.get(&collection, iitp_no).await?.is_some() {
        return Ok(());
    }
    let mut fields = Fields::new();
    fields.insert("iitpNo".into(), json!(iitp_no));
    fields.insert("enrolledAt".into(), Timestamp::now().to_value());
    store.set(&collection, iitp_no, fields).await
}

pub async fn is_enrolled(store: &Store, course_id: &str, iitp_no: &str) -> Result<bool, StoreError> {
    Ok(store
        .get(&paths::enrollments(course_id), iitp_no)
        .await?
        .is_some())
}

/// Courses the participant is enrolled in, ordered by title.
pub async fn find_by_enrollment(store: &Store, iitp_no: &str) -> Result<Vec<Course>, StoreError> {
    let enrollments = store
        .query_group_eq(paths::ENROLLMENTS, "iitpNo", &Value::from(iitp_no))
        .await?;
    let course_ids: BTreeSet<&str> = enrollments.iter().filter_map(Document::parent_id).collect();
    let mut courses = Vec::with_capacity(course_ids.len());
    for id in course_ids {
        if let Some(course) = find_by_id(store, id).await? {
            courses.push(course);
        }
    }
    courses.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));
    Ok(courses)
}
