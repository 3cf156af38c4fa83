use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::BillStatus;

/// Error body returned by the backend on a non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("bill status cannot move from {from} to {to}")]
pub struct TransitionError {
    pub from: BillStatus,
    pub to: BillStatus,
}
