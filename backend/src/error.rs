use actix_web::{http::StatusCode, HttpResponse, ResponseError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Empty cart: {0}")]
    EmptyCart(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Machine-readable kind sent alongside the message.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::Authentication(_) => "authentication_error",
            AppError::Authorization(_) => "authorization_error",
            AppError::NotFound(_) => "not_found",
            AppError::InsufficientStock(_) => "insufficient_stock",
            AppError::Duplicate(_) => "duplicate",
            AppError::EmptyCart(_) => "empty_cart",
            AppError::InvalidState(_) => "invalid_state",
            _ => "internal_server_error",
        }
    }

    fn public_message(&self) -> String {
        match self {
            AppError::Validation(msg)
            | AppError::Authentication(msg)
            | AppError::Authorization(msg)
            | AppError::NotFound(msg)
            | AppError::InsufficientStock(msg)
            | AppError::Duplicate(msg)
            | AppError::EmptyCart(msg)
            | AppError::InvalidState(msg) => msg.clone(),
            _ => "An internal server error occurred".to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| match &err.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();
        // Nested structs (variation) report under their own key.
        for (field, kind) in errors.errors() {
            if let validator::ValidationErrorsKind::Struct(inner) = kind {
                for (inner_field, errs) in inner.field_errors() {
                    for err in errs {
                        messages.push(match &err.message {
                            Some(message) => message.to_string(),
                            None => format!("{}.{} is invalid", field, inner_field),
                        });
                    }
                }
            }
        }
        messages.sort();
        AppError::Validation(messages.join(", "))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::InsufficientStock(_)
            | AppError::Duplicate(_)
            | AppError::EmptyCart(_)
            | AppError::InvalidState(_) => StatusCode::BAD_REQUEST,
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.kind().to_string(),
            message: self.public_message(),
        })
    }
}

#[derive(serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketplace_shared::{AddToCartRequest, Variation};
    use validator::Validate;

    #[test]
    fn business_rule_errors_are_bad_requests() {
        for err in [
            AppError::InsufficientStock("x".into()),
            AppError::Duplicate("x".into()),
            AppError::EmptyCart("x".into()),
            AppError::InvalidState("x".into()),
            AppError::Validation("x".into()),
        ] {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
        assert_eq!(AppError::Authorization("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = AppError::Internal("connection string leaked".into());
        assert_eq!(err.public_message(), "An internal server error occurred");
    }

    #[test]
    fn validation_errors_collect_nested_messages() {
        let request = AddToCartRequest {
            item_id: uuid::Uuid::new_v4(),
            quantity: 0,
            variation: Variation::new("", "M"),
        };
        let err: AppError = request.validate().unwrap_err().into();
        match err {
            AppError::Validation(message) => {
                assert!(message.contains("quantity must be between 1 and 1000000"));
                assert!(message.contains("variation.color is required"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
