//! REST response envelope types.
//!
//! Every collaborator endpoint answers with the same envelope shape:
//! `{statusCode, data, message, error}`. The envelope is decoded as-is and
//! converted into an [`crate::AppResult`] at the client boundary.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Standard response envelope returned by all REST collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    /// HTTP-like status code as reported in the body.
    pub status_code: u16,
    /// Response payload; absent on failure.
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable success message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Backend error description; surfaced to the user verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Whether the envelope reports success.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Convert the envelope into a result, surfacing the backend's error
    /// text verbatim on failure.
    pub fn into_result(self) -> Result<T, AppError> {
        if self.is_success() {
            self.data.ok_or_else(|| {
                AppError::request("Response envelope reported success without data")
            })
        } else {
            let detail = self
                .error
                .or(self.message)
                .unwrap_or_else(|| format!("Request failed with status {}", self.status_code));
            Err(AppError::request(detail))
        }
    }

    /// Convert an ack-style envelope into a result, ignoring any payload.
    /// Some ack endpoints answer success with a null `data`.
    pub fn into_ack(self) -> Result<(), AppError> {
        if self.is_success() {
            Ok(())
        } else {
            let detail = self
                .error
                .or(self.message)
                .unwrap_or_else(|| format!("Request failed with status {}", self.status_code));
            Err(AppError::request(detail))
        }
    }
}

/// Paginated list payload: `{result, meta?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResult<T> {
    /// The items in this page (or the full list for unpaged endpoints).
    pub result: Vec<T>,
    /// Pagination metadata; absent for unpaged endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
    /// Whether more pages follow (paged endpoints only).
    #[serde(default, rename = "hasMore")]
    pub has_more: bool,
}

/// Pagination metadata.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageMeta {
    /// Current page number (1-based).
    pub page: u32,
    /// Page size.
    #[serde(rename = "pageSize")]
    pub page_size: u32,
    /// Total item count.
    pub total: u64,
}
