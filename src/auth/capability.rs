//! Role capability table.
//!
//! Every authorization decision in the handlers goes through
//! [`Role::can`]; there is no other role branching.

use crate::models::user::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Create, open/close and delete batches; see every registration.
    ManageBatches,
    /// Download registration CSVs (organization-scoped for non-admins).
    ExportRegistrations,
    /// Create courses and exams, enroll participants.
    ManageCourses,
    /// Create staff accounts.
    ManageStaff,
    /// Look up participant profiles (organization-scoped for non-admins).
    ViewParticipants,
    /// See one's own enrolled courses.
    ViewOwnCourses,
    /// Open exams one is enrolled for.
    TakeExams,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::ManageBatches => "batches.manage",
            Capability::ExportRegistrations => "registrations.export",
            Capability::ManageCourses => "courses.manage",
            Capability::ManageStaff => "staff.manage",
            Capability::ViewParticipants => "participants.view",
            Capability::ViewOwnCourses => "courses.view_own",
            Capability::TakeExams => "exams.take",
        }
    }
}

impl Role {
    pub fn can(self, capability: Capability) -> bool {
        use Capability::*;
        match self {
            Role::Admin => !matches!(capability, ViewOwnCourses | TakeExams),
            Role::OrganizationAdmin => matches!(capability, ExportRegistrations | ViewParticipants),
            Role::Supervisor | Role::Trainer => matches!(capability, ViewParticipants),
            Role::Trainee | Role::Student => matches!(capability, ViewOwnCourses | TakeExams),
        }
    }

    /// Where a freshly logged-in user lands.
    pub fn home_path(self, iitp_no: Option<&str>) -> String {
        match (self, iitp_no) {
            (Role::Admin, _) => "/admin".to_string(),
            (Role::Student, Some(iitp)) => format!("/student/courses/{iitp}"),
            (Role::Trainee, Some(iitp)) => format!("/trainee/courses/{iitp}"),
            _ => "/dashboard".to_string(),
        }
    }
}
