pub mod access_handlers;
pub mod auth_handlers;
pub mod batch_handlers;
pub mod course_handlers;
pub mod dashboard;
pub mod participant_handlers;
pub mod registration_handlers;
pub mod staff_handlers;

use std::net::{IpAddr, Ipv4Addr};

use actix_web::{
    Error, HttpRequest, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    http::Method,
    middleware::Next,
    web,
};

use crate::errors::ApiErrorResponse;
use crate::store::Store;

/// CSRF protection for JSON mutation endpoints.
///
/// POST/PUT/PATCH requests must be `Content-Type: application/json`; a
/// browser cannot send that cross-origin with cookies from a plain form.
/// GET and DELETE carry no body and pass through.
pub async fn require_json_content_type(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let needs_json = matches!(*req.method(), Method::POST | Method::PUT | Method::PATCH);

    if needs_json {
        let content_type = req
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !content_type.starts_with("application/json") {
            let response = HttpResponse::UnsupportedMediaType().json(ApiErrorResponse::new(
                "Content-Type must be application/json for mutation requests",
            ));
            return Ok(req.into_response(response).map_into_right_body());
        }
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}

/// Peer address of the request, or `0.0.0.0` when unknown (e.g. in tests).
pub fn client_ip(req: &HttpRequest) -> IpAddr {
    req.peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// GET /health
pub async fn health(store: web::Data<Store>) -> HttpResponse {
    let backend = match store.get_ref() {
        Store::Postgres(_) => "postgres",
        Store::Memory(_) => "memory",
    };
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "store": backend,
    }))
}
