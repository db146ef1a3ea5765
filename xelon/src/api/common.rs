//! Common types and utilities for the Xelon API

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub message: Option<String>,
    pub errors: Option<HashMap<String, Vec<String>>>,
}

#[derive(Debug, thiserror::Error)]
#[error("API error details: message={message:?}, field_errors={field_errors:?}")]
pub struct ApiErrorDetails {
    pub message: Option<String>,
    pub field_errors: Option<HashMap<String, Vec<String>>>,
}

/// Nested object reference, e.g. `"tenant": {"id": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Integer state codes arrive as numbers or numeric strings depending on the endpoint
pub fn deserialize_state_code<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrI64 {
        String(String),
        I64(i64),
    }

    match StringOrI64::deserialize(deserializer)? {
        StringOrI64::String(s) => s.trim().parse::<i64>().map_err(serde::de::Error::custom),
        StringOrI64::I64(i) => Ok(i),
    }
}

/// `null` and missing strings both become empty
pub fn deserialize_null_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
