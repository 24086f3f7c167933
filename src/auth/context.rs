use std::future::Future;
use std::pin::Pin;

use actix_session::SessionExt;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use chrono::Utc;

use super::capability::Capability;
use super::{SESSION_TOKEN_KEY, login_path_for};
use crate::errors::AppError;
use crate::models::registration::Registration;
use crate::models::session::{self, Principal};
use crate::models::user::Role;
use crate::store::Store;

/// The authenticated caller of one request, resolved from the cookie token
/// against the server session table. Handlers take it as an argument.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub token: String,
    pub principal: Principal,
}

impl AuthContext {
    pub fn role(&self) -> Role {
        self.principal.role
    }

    pub fn iitp_no(&self) -> Option<&str> {
        self.principal.iitp_no.as_deref()
    }

    pub fn require(&self, capability: Capability) -> Result<(), AppError> {
        if self.role().can(capability) {
            Ok(())
        } else {
            log::warn!(
                "{} ({}) denied {}",
                self.principal.name,
                self.role(),
                capability.as_str()
            );
            Err(AppError::PermissionDenied(capability.as_str().to_string()))
        }
    }

    /// Admins see every organization; other staff only their own.
    pub fn sees_organization(&self, organization: &str) -> bool {
        self.role() == Role::Admin || self.principal.organization.as_deref() == Some(organization)
    }

    /// Staff other than admins see a participant only through a
    /// registration in their own organization. Enrollments carry no
    /// organization and never grant visibility.
    pub fn sees_participant(&self, registrations: &[Registration]) -> bool {
        self.role() == Role::Admin
            || registrations
                .iter()
                .any(|r| self.sees_organization(&r.organization))
    }

    /// A participant may only look at their own record under their own
    /// role's routes; staff need [`Capability::ViewParticipants`] and a
    /// visible registration among `registrations` (the participant's).
    pub fn require_participant_access(
        &self,
        route_role: Role,
        iitp_no: &str,
        registrations: &[Registration],
    ) -> Result<(), AppError> {
        let own = self.role() == route_role && self.iitp_no() == Some(iitp_no.trim());
        if own || (self.role().can(Capability::ViewParticipants) && self.sees_participant(registrations)) {
            Ok(())
        } else {
            Err(AppError::PermissionDenied(Capability::ViewParticipants.as_str().to_string()))
        }
    }
}

impl FromRequest for AuthContext {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let session = req.get_session();
        let store = req.app_data::<web::Data<Store>>().cloned();
        let login_path = login_path_for(req.path());

        Box::pin(async move {
            let store = store.ok_or_else(|| AppError::Session("store is not configured".into()))?;
            let token = session
                .get::<String>(SESSION_TOKEN_KEY)
                .unwrap_or(None)
                .filter(|t| session::is_well_formed(t))
                .ok_or(AppError::Unauthenticated(login_path))?;
            match session::find_valid(&store, &token, Utc::now()).await? {
                Some(principal) => Ok(AuthContext { token, principal }),
                None => {
                    session.purge();
                    Err(AppError::Unauthenticated(login_path))
                }
            }
        })
    }
}
