//! Wire types shared between the back office server and its clients.
//!
//! Every record and request serializes with camelCase field names, which is
//! what the admin single-page app sends and expects.

pub mod auth;
pub mod dashboard;
pub mod jiu_jitsu;
pub mod members;
pub mod mens_group;
pub mod music_school;
pub mod presentations;

pub use auth::*;
pub use dashboard::*;
pub use jiu_jitsu::*;
pub use members::*;
pub use mens_group::*;
pub use music_school::*;
pub use presentations::*;

use serde::{Deserialize, Serialize};

/// Body of every non-2xx JSON response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldErrorResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrorResponse {
    pub field: String,
    pub message: String,
}

/// Plain acknowledgement returned by action endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Query string accepted by list endpoints that can show soft-deleted rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

pub(crate) fn default_true() -> bool {
    true
}
