//! Server-held session table.
//!
//! The browser cookie only carries an opaque token; who the caller is and
//! which role they hold is looked up here on every authenticated request.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::user::Role;
use crate::store::timestamp::Timestamp;
use crate::store::{Document, Fields, Store, StoreError, paths};

/// Identity attached to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub role: Role,
    pub name: String,
    /// Staff record id; `None` for participants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Participant identifier; `None` for staff.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iitp_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

/// 32 random bytes, hex encoded.
fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    hex::encode(bytes)
}

fn principal_fields(principal: &Principal) -> Result<Fields, StoreError> {
    match serde_json::to_value(principal)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Invalid(format!("principal encoded as {other}"))),
    }
}

fn expires_at(doc: &Document) -> Result<DateTime<Utc>, StoreError> {
    doc.timestamp_field("expiresAt")
}

/// Open a session for `principal`. Returns the token to hand to the client.
pub async fn create(store: &Store, principal: &Principal, ttl: Duration) -> Result<String, StoreError> {
    let token = generate_token();
    let now = Utc::now();
    let expires = now
        .checked_add_signed(ttl)
        .ok_or_else(|| StoreError::Invalid(format!("session lifetime {ttl} overflows")))?;
    let mut fields = principal_fields(principal)?;
    fields.insert("createdAt".into(), Timestamp::from_datetime(now).to_value());
    fields.insert("expiresAt".into(), Timestamp::from_datetime(expires).to_value());
    store.set(paths::SESSIONS, &token, fields).await?;
    Ok(token)
}

/// Resolve a token to its principal. Expired sessions are deleted and
/// treated as absent.
pub async fn find_valid(
    store: &Store,
    token: &str,
    now: DateTime<Utc>,
) -> Result<Option<Principal>, StoreError> {
    let Some(doc) = store.get(paths::SESSIONS, token).await? else {
        return Ok(None);
    };
    if expires_at(&doc)? <= now {
        store.delete(paths::SESSIONS, token).await?;
        return Ok(None);
    }
    let principal = serde_json::from_value(Value::Object(doc.fields.clone()))
        .map_err(|e| doc.malformed(format!("session principal: {e}")))?;
    Ok(Some(principal))
}

pub async fn revoke(store: &Store, token: &str) -> Result<bool, StoreError> {
    store.delete(paths::SESSIONS, token).await
}

/// Delete every session that has expired by `now`. Unreadable sessions are
/// removed as well. Returns how many were deleted.
pub async fn purge_expired(store: &Store, now: DateTime<Utc>) -> Result<usize, StoreError> {
    let docs = store.list(paths::SESSIONS).await?;
    let mut purged = 0;
    for doc in docs {
        let expired = expires_at(&doc).map(|at| at <= now).unwrap_or(true);
        if expired && store.delete(paths::SESSIONS, &doc.id).await? {
            purged += 1;
        }
    }
    Ok(purged)
}

/// Whether a token looks like one we issued; lets the middleware skip
/// the lookup for garbage cookies.
pub fn is_well_formed(token: &str) -> bool {
    token.len() == 64 && token.chars().all(|c| c.is_ascii_hexdigit())
}
