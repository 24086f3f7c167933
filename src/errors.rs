use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

use crate::auth::password::PasswordError;
use crate::auth::validate::FieldErrors;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("{0}")]
    Password(#[from] PasswordError),
    #[error("session error: {0}")]
    Session(String),
    #[error("not authenticated")]
    Unauthenticated(&'static str),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("validation failed")]
    Validation(FieldErrors),
    #[error("{0}")]
    Conflict(String),
    #[error("not found")]
    NotFound,
}

/// JSON error body.
#[derive(Serialize, Debug)]
pub struct ApiErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

impl ApiErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            fields: None,
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthenticated(login_path) => HttpResponse::SeeOther()
                .insert_header(("Location", *login_path))
                .finish(),
            AppError::PermissionDenied(capability) => HttpResponse::Forbidden().json(ApiErrorResponse {
                details: Some(format!("missing capability {capability}")),
                ..ApiErrorResponse::new("Permission denied")
            }),
            AppError::Validation(fields) => HttpResponse::BadRequest().json(ApiErrorResponse {
                fields: Some(fields.clone()),
                ..ApiErrorResponse::new("Validation failed")
            }),
            AppError::Conflict(message) => HttpResponse::Conflict().json(ApiErrorResponse::new(message.as_str())),
            AppError::NotFound => HttpResponse::NotFound().json(ApiErrorResponse::new("Not found")),
            AppError::Store(_) => {
                log::error!("{self}");
                HttpResponse::InternalServerError().json(ApiErrorResponse::new("Storage unavailable"))
            }
            AppError::Password(_) | AppError::Session(_) => {
                log::error!("{self}");
                HttpResponse::InternalServerError().json(ApiErrorResponse::new("Internal server error"))
            }
        }
    }
}

/// Turn non-empty field errors into `AppError::Validation`.
pub fn check_fields(errors: FieldErrors) -> Result<(), AppError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}
