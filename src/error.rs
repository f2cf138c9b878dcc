use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::chain::ChainError;
use crate::models::api_error::ApiError;

/// Every failure answers 500 with a JSON array of `ApiError`, including
/// client mistakes; existing clients depend on that shape.
pub enum AppError {
    Validation(Vec<ApiError>),
    AccountNameTaken(String),
    NoFreeAccountName,
    AvailabilityCheck(ChainError),
    Creation(ChainError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(errors) => write!(f, "validation failed: {} error(s)", errors.len()),
            AppError::AccountNameTaken(name) => write!(f, "account name taken: {name}"),
            AppError::NoFreeAccountName => write!(f, "could not find a free account name"),
            AppError::AvailabilityCheck(e) => write!(f, "availability check failed: {e}"),
            AppError::Creation(e) => write!(f, "account creation failed: {e}"),
        }
    }
}

fn creation_failure() -> ApiError {
    ApiError::new(
        "AccountCreationFailure",
        "Something went wrong while creating the account.",
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let errors = match self {
            AppError::Validation(errors) => {
                tracing::warn!(
                    error_type = "validation",
                    codes = ?errors.iter().map(|e| e.error_code.as_str()).collect::<Vec<_>>(),
                    "Responding with 500"
                );
                errors
            }
            AppError::AccountNameTaken(name) => {
                tracing::warn!(error_type = "account_name_taken", account_name = %name, "Responding with 500");
                vec![ApiError::new(
                    "InvalidAccountName",
                    format!("The requested account name '{name}' already exists."),
                )]
            }
            AppError::NoFreeAccountName => {
                tracing::error!(error_type = "no_free_account_name", "Responding with 500");
                vec![creation_failure()]
            }
            AppError::AvailabilityCheck(e) => {
                tracing::error!(
                    error_type = "availability_check",
                    error = %e,
                    "Unexpected error while fetching account; responding with 500"
                );
                vec![ApiError::new(
                    "AccountCreationFailure",
                    "Something went wrong while checking account name availability.",
                )]
            }
            AppError::Creation(e) => {
                tracing::error!(
                    error_type = "creation",
                    error = %e,
                    "Unexpected error while creating account; responding with 500"
                );
                vec![creation_failure()]
            }
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(errors)).into_response()
    }
}

impl From<Vec<ApiError>> for AppError {
    fn from(errors: Vec<ApiError>) -> Self {
        AppError::Validation(errors)
    }
}
