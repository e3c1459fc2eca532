use axum::http::{header::AUTHORIZATION, HeaderMap};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::db::{Access, StoreError};
use crate::error::ApiError;

pub mod health;
pub mod league;
pub mod live;
pub mod matches;

/// Parses a JSON request body. Bodies are taken as raw bytes so clients
/// that omit `content-type` still work. Valid JSON that is not an object
/// carries no fields, so it reads as an empty request.
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ApiError::InvalidBody(e.to_string()))?;
    let fields = match value {
        Value::Object(_) => value,
        _ => Value::Object(Map::new()),
    };
    serde_json::from_value(fields).map_err(|e| ApiError::InvalidBody(e.to_string()))
}

/// Read access as the caller, forwarding their `Authorization` header.
fn caller_access(headers: &HeaderMap) -> Access {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    Access::Caller(authorization)
}

/// Folds one result of a fan-out into its response field.
///
/// A query the store rejected leaves the field empty; transport and decode
/// failures fail the whole request.
fn settle<T: Default>(result: Result<T, StoreError>, field: &str) -> Result<T, ApiError> {
    match result {
        Ok(value) => Ok(value),
        Err(err) if err.is_rejection() => {
            tracing::warn!("{} query rejected, returning empty: {}", field, err);
            Ok(T::default())
        }
        Err(err) => Err(err.into()),
    }
}
