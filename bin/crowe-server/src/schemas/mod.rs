//! Request and response bodies of the `/api` routes.

pub mod analysis;
pub mod chat;
pub mod farm;
pub mod task;

use serde::{Deserialize, Serialize};

/// `{"success": true}` acknowledgement for updates.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub success: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

/// A required text field: present and not blank.
pub(crate) fn required(value: Option<String>, field: &str) -> Result<String, crate::error::ServerError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| crate::error::ServerError::BadRequest(format!("{field} is required")))
}
