use serde::{Deserialize, Serialize};

use crate::models::registration::Registration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub active: bool,
}

/// A batch with its registrations nested, as shown on the admin page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchWithRegistrations {
    #[serde(flatten)]
    pub batch: Batch,
    pub registrations: Vec<Registration>,
}

fn default_active() -> bool {
    true
}

/// Body of `POST /admin/batches`.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchForm {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

/// Body of `PUT /admin/batches/{id}/active`.
#[derive(Debug, Clone, Deserialize)]
pub struct ActiveForm {
    pub active: bool,
}
