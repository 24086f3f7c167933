use actix_session::SessionExt;
use actix_web::{
    Error, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
};

use super::{SESSION_TOKEN_KEY, login_path_for};
use crate::models::session::is_well_formed;

/// Gate for the authenticated scope: without a plausible session token the
/// caller is sent to the login route of the area they asked for. Whether the
/// token is still live is decided by the `AuthContext` extractor.
pub async fn require_auth(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let session = req.get_session();
    let token = session.get::<String>(SESSION_TOKEN_KEY).unwrap_or(None);

    match token {
        Some(t) if is_well_formed(&t) => next.call(req).await.map(|res| res.map_into_left_body()),
        other => {
            if other.is_some() {
                log::warn!("Discarding malformed session token on {}", req.path());
                session.purge();
            }
            let response = HttpResponse::SeeOther()
                .insert_header(("Location", login_path_for(req.path())))
                .finish();
            Ok(req.into_response(response).map_into_right_body())
        }
    }
}
