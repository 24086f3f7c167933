use std::fmt;

use serde::{Deserialize, Serialize};

/// Every role the portal knows about. Staff roles are stored on user
/// records; participant roles come from the login route used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Trainer,
    Supervisor,
    OrganizationAdmin,
    Trainee,
    Student,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Trainer => "trainer",
            Role::Supervisor => "supervisor",
            Role::OrganizationAdmin => "organization_admin",
            Role::Trainee => "trainee",
            Role::Student => "student",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "trainer" => Some(Role::Trainer),
            "supervisor" => Some(Role::Supervisor),
            "organization_admin" => Some(Role::OrganizationAdmin),
            "trainee" => Some(Role::Trainee),
            "student" => Some(Role::Student),
            _ => None,
        }
    }

    pub fn is_staff(self) -> bool {
        !matches!(self, Role::Trainee | Role::Student)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Staff account including the password hash. Never serialized whole.
#[derive(Debug, Clone)]
pub struct StaffUser {
    pub id: String,
    pub name: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub organization: Option<String>,
    pub meeting_link: Option<String>,
    pub created_at: String,
}

/// Safe view for listings and API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffDisplay {
    pub id: String,
    pub name: String,
    pub username: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_link: Option<String>,
    pub created_at: String,
}

impl From<StaffUser> for StaffDisplay {
    fn from(u: StaffUser) -> Self {
        StaffDisplay {
            id: u.id,
            name: u.name,
            username: u.username,
            role: u.role,
            organization: u.organization,
            meeting_link: u.meeting_link,
            created_at: u.created_at,
        }
    }
}

/// New staff data for creation; `password_hash` is already hashed.
#[derive(Debug, Clone)]
pub struct NewStaffUser {
    pub name: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub organization: Option<String>,
    pub meeting_link: Option<String>,
}

/// Body of `POST /admin/staff`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub meeting_link: String,
}
