use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::{services::coupon_service::CouponError, store::StoreError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Coupon(#[from] CouponError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("{0}")]
    BadRequest(String),
    #[error("Server error: {0}")]
    Server(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Coupon(err) => match err {
                CouponError::Validation(_) => StatusCode::BAD_REQUEST,
                CouponError::NotFound(_) => StatusCode::NOT_FOUND,
                CouponError::DuplicateCode(_)
                | CouponError::AlreadyUsed(_)
                | CouponError::Expired(_)
                | CouponError::Inactive(_) => StatusCode::CONFLICT,
                CouponError::Creation { .. } | CouponError::Store(_) => StatusCode::BAD_GATEWAY,
            },
            AppError::Store(_) => StatusCode::BAD_GATEWAY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_) | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        #[derive(Serialize)]
        struct ErrorResponse<'a> {
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            fields: Option<&'a [FieldError]>,
        }

        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let fields = match &self {
            AppError::Coupon(CouponError::Validation(errors)) => Some(errors.errors.as_slice()),
            _ => None,
        };
        let body = Json(ErrorResponse {
            error: self.to_string(),
            fields,
        });

        (status, body).into_response()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

// Collection of validation errors
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        ValidationErrors { errors: Vec::new() }
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", messages.join("; "))
    }
}
