use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::TransitionError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(BillId);

impl BillId {
    /// Identifier of a bill whose receipt upload never produced a record.
    pub fn unassigned() -> Self {
        Self(String::new())
    }

    pub fn is_unassigned(&self) -> bool {
        self.0.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserType {
    Employee,
    Admin,
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "employee" => Ok(UserType::Employee),
            "admin" => Ok(UserType::Admin),
            other => Err(format!("unknown user type {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    #[default]
    Pending,
    Accepted,
    Refused,
}

impl BillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Pending => "pending",
            BillStatus::Accepted => "accepted",
            BillStatus::Refused => "refused",
        }
    }

    /// Applies an administrator decision. Only `pending` bills may move, and
    /// only once.
    pub fn transition(self, decision: ReviewDecision) -> Result<BillStatus, TransitionError> {
        match self {
            BillStatus::Pending => Ok(decision.target_status()),
            current => Err(TransitionError {
                from: current,
                to: decision.target_status(),
            }),
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Accept,
    Refuse,
}

impl ReviewDecision {
    pub fn target_status(self) -> BillStatus {
        match self {
            ReviewDecision::Accept => BillStatus::Accepted,
            ReviewDecision::Refuse => BillStatus::Refused,
        }
    }
}

/// An expense report as stored by the backend.
///
/// `id` is absent until the store has assigned one. `file_url` and
/// `file_name` are either both set or both absent. A record created by a
/// receipt upload but never completed carries `null` form fields; those
/// decode to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BillId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub expense_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub amount: i64,
    #[serde(default, deserialize_with = "text_or_number")]
    pub vat: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pct: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub commentary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_admin: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: BillStatus,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Integer(i64),
    Float(f64),
}

fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<TextOrNumber>::deserialize(deserializer)? {
        Some(TextOrNumber::Text(text)) => text,
        Some(TextOrNumber::Integer(value)) => value.to_string(),
        Some(TextOrNumber::Float(value)) => value.to_string(),
        None => String::new(),
    })
}

impl Bill {
    /// Returns a copy carrying the administrator's decision and comment.
    /// Every other field is preserved.
    pub fn reviewed(
        &self,
        decision: ReviewDecision,
        comment: impl Into<String>,
    ) -> Result<Bill, TransitionError> {
        let status = self.status.transition(decision)?;
        Ok(Bill {
            status,
            comment_admin: Some(comment.into()),
            ..self.clone()
        })
    }
}
