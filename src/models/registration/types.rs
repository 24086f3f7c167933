use serde::{Deserialize, Serialize};

/// A participant's sign-up within one batch. Dates are ISO-8601 strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: String,
    pub batch_id: String,
    pub name: String,
    pub iitp_no: String,
    pub organization: String,
    pub submission_time: String,
}

/// Intake form body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub iitp_no: String,
    #[serde(default)]
    pub organization: String,
}

/// Validated, trimmed intake data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRegistration {
    pub name: String,
    pub iitp_no: String,
    pub organization: String,
}

impl NewRegistration {
    pub fn from_form(form: &RegistrationForm) -> Self {
        Self {
            name: form.name.trim().to_string(),
            iitp_no: form.iitp_no.trim().to_string(),
            organization: form.organization.trim().to_string(),
        }
    }
}
