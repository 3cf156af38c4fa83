use shared::{domain::BillId, error::TransitionError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend answered with a non-success status. `message` is shown to
    /// the user verbatim.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid store url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("malformed store response: {0}")]
    Decode(String),
    #[error("bill has no store identifier")]
    Unassigned,
}

impl StoreError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no user in session storage")]
    MissingUser,
    #[error("malformed session user record: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("required field `{0}` is empty")]
    MissingField(&'static str),
    #[error("amount `{0}` is not an integer")]
    InvalidAmount(String),
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("bill {0} is not on the dashboard")]
    UnknownBill(BillId),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("bill has no store identifier")]
    MissingId,
}
