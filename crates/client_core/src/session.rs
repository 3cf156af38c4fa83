use std::{collections::HashMap, sync::Mutex};

use shared::protocol::UserRecord;

use crate::error::SessionError;

pub const USER_KEY: &str = "user";

/// Read access to the key-value session storage holding the signed-in user.
pub trait SessionStore: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
}

#[derive(Default)]
pub struct MemorySessionStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(user: &UserRecord) -> Result<Self, SessionError> {
        let store = Self::new();
        store.set_item(USER_KEY, serde_json::to_string(user)?);
        Ok(store)
    }

    pub fn set_item(&self, key: impl Into<String>, value: impl Into<String>) {
        if let Ok(mut items) = self.items.lock() {
            items.insert(key.into(), value.into());
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().ok()?.get(key).cloned()
    }
}

pub fn current_user(session: &dyn SessionStore) -> Result<UserRecord, SessionError> {
    let raw = session.get_item(USER_KEY).ok_or(SessionError::MissingUser)?;
    Ok(serde_json::from_str(&raw)?)
}
