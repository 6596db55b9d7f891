use axum::extract::{FromRequest, FromRequestParts};
use validator::ValidationError;

use crate::error::Error;
use crate::utils::time::{parse_date, parse_date_time};

/// `Json` whose rejections surface as our 400 error payload.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);

/// `Path` with the same JSON rejection.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct ApiPath<T>(pub T);

pub fn validate_date_time(value: &str) -> Result<(), ValidationError> {
    match parse_date_time(value) {
        Some(_) => Ok(()),
        None => {
            let mut err = ValidationError::new("date_time");
            err.message = Some("expected an ISO 8601 date-time".into());
            Err(err)
        }
    }
}

pub fn validate_date(value: &str) -> Result<(), ValidationError> {
    match parse_date(value) {
        Some(_) => Ok(()),
        None => {
            let mut err = ValidationError::new("date");
            err.message = Some("expected a YYYY-MM-DD date".into());
            Err(err)
        }
    }
}
