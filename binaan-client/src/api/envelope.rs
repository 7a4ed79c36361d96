//! Response envelope and pagination DTOs
//!
//! Every endpoint answers `{ success, message?, data?, pagination? }`.
//! List endpoints either page at the envelope level (`pagination`) or wrap a
//! Laravel paginator inside `data`; both shapes reduce to [`PageInfo`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ApiError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub pagination: Option<PageInfo>,
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Decode a raw response body.
    ///
    /// `success: false` is checked before `data` is decoded, so a rejected
    /// response with an unexpected `data` shape still reports the server's
    /// message.
    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        if value.get("success").and_then(Value::as_bool) == Some(false) {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default();
            return Err(ApiError::Rejected(message.to_string()));
        }
        Ok(serde_json::from_value(value)?)
    }
}

impl<T> Envelope<T> {
    fn check(&self) -> Result<(), ApiError> {
        if self.success {
            Ok(())
        } else {
            Err(ApiError::Rejected(self.message.clone().unwrap_or_default()))
        }
    }

    /// The payload of a successful response
    pub fn into_data(self) -> Result<T, ApiError> {
        self.check()?;
        self.data.ok_or(ApiError::MissingData)
    }

    /// The payload plus envelope-level pagination
    pub fn into_page(self) -> Result<(T, Option<PageInfo>), ApiError> {
        self.check()?;
        let pagination = self.pagination;
        let data = self.data.ok_or(ApiError::MissingData)?;
        Ok((data, pagination))
    }

    /// For endpoints whose `data` is irrelevant (deletes): the server message
    pub fn into_message(self) -> Result<Option<String>, ApiError> {
        self.check()?;
        Ok(self.message)
    }
}

/// Page position of a list response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub current_page: u32,
    pub last_page: u32,
    #[serde(default)]
    pub per_page: Option<u32>,
    pub total: u64,
}

impl PageInfo {
    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }
}

/// Laravel paginator: `{ data: [..], current_page, last_page, total, .. }`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    #[serde(flatten)]
    pub page: PageInfo,
}
