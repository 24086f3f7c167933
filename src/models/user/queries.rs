use serde_json::{Value, json};

use super::types::{NewStaffUser, Role, StaffUser};
use crate::store::timestamp::{self, Timestamp};
use crate::store::{Document, Fields, Store, StoreError, paths};

fn from_document(doc: &Document) -> Result<StaffUser, StoreError> {
    let role_name = doc.require_str("role")?;
    let role = Role::parse(&role_name)
        .filter(|r| r.is_staff())
        .ok_or_else(|| doc.malformed(format!("unknown staff role `{role_name}`")))?;
    Ok(StaffUser {
        id: doc.id.clone(),
        name: doc.require_str("name")?,
        username: doc.require_str("username")?,
        password_hash: doc.require_str("passwordHash")?,
        role,
        organization: doc.optional_str("organization"),
        meeting_link: doc.optional_str("meetingLink"),
        created_at: timestamp::to_iso(doc.timestamp_field("createdAt")?),
    })
}

pub async fn create(store: &Store, new: &NewStaffUser) -> Result<String, StoreError> {
    let mut fields = Fields::new();
    fields.insert("name".into(), json!(new.name));
    fields.insert("username".into(), json!(new.username));
    fields.insert("passwordHash".into(), json!(new.password_hash));
    fields.insert("role".into(), json!(new.role.as_str()));
    if let Some(org) = &new.organization {
        fields.insert("organization".into(), json!(org));
    }
    if let Some(link) = &new.meeting_link {
        fields.insert("meetingLink".into(), json!(link));
    }
    fields.insert("createdAt".into(), Timestamp::now().to_value());
    store.add(paths::STAFF, fields).await
}

/// Look up a staff account for login. Usernames are matched exactly.
pub async fn find_by_username(store: &Store, username: &str) -> Result<Option<StaffUser>, StoreError> {
    let docs = store
        .query_eq(paths::STAFF, "username", &Value::from(username))
        .await?;
    docs.first().map(from_document).transpose()
}

pub async fn find_by_id(store: &Store, id: &str) -> Result<Option<StaffUser>, StoreError> {
    match store.get(paths::STAFF, id).await? {
        Some(doc) => from_document(&doc).map(Some),
        None => Ok(None),
    }
}

/// All staff accounts, ordered by username.
pub async fn find_all(store: &Store) -> Result<Vec<StaffUser>, StoreError> {
    let docs = store.list(paths::STAFF).await?;
    let mut users: Vec<StaffUser> = docs
        .iter()
        .filter_map(|doc| match from_document(doc) {
            Ok(u) => Some(u),
            Err(e) => {
                log::warn!("Skipping staff record: {e}");
                None
            }
        })
        .collect();
    users.sort_by(|a, b| a.username.cmp(&b.username));
    Ok(users)
}
