//! # Request Body Extraction
//!
//! JSON bodies and path parameters are taken as `Result<_, Rejection>` so a
//! malformed body or id becomes an [`AppError::BadRequest`] with the standard
//! error body instead of Axum's plain-text rejection.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::Path;
use axum::Json;

use crate::error::AppError;

/// Business rules a request must satisfy beyond deserializing.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// [`extract_json`], then [`Validate::validate`] (422 on failure).
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}

pub fn extract_path<T>(result: Result<Path<T>, PathRejection>) -> Result<T, AppError> {
    result
        .map(|Path(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}
