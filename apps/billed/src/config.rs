use std::{fs, path::Path};

use anyhow::Context;
use client_core::{NavigationPolicy, ReviewFilter};
use serde::Deserialize;
use shared::{domain::UserType, protocol::UserRecord};

pub const CONFIG_FILE: &str = "billed.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_url: String,
    pub jwt: Option<String>,
    pub user_email: String,
    pub user_type: UserType,
    /// Accounts whose bills never appear on the admin dashboard.
    pub test_accounts: Vec<String>,
    pub test_harness: bool,
    pub navigate_on_failed_update: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5678".into(),
            jwt: None,
            user_email: String::new(),
            user_type: UserType::Employee,
            test_accounts: vec!["employee@test.tld".into(), "admin@test.tld".into()],
            test_harness: false,
            navigate_on_failed_update: true,
        }
    }
}

impl Settings {
    pub fn user(&self) -> anyhow::Result<UserRecord> {
        let email = self.user_email.trim();
        if email.is_empty() {
            anyhow::bail!("no signed-in user; set user_email in {CONFIG_FILE} or BILLED_USER_EMAIL");
        }
        Ok(UserRecord {
            user_type: self.user_type,
            email: email.to_string(),
        })
    }

    pub fn review_filter(&self) -> ReviewFilter {
        if self.test_harness {
            ReviewFilter::unrestricted()
        } else {
            ReviewFilter::excluding(self.user_email.trim(), self.test_accounts.iter())
        }
    }

    pub fn navigation_policy(&self) -> NavigationPolicy {
        if self.navigate_on_failed_update {
            NavigationPolicy::AfterSettle
        } else {
            NavigationPolicy::OnSuccess
        }
    }
}

pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let path = path.unwrap_or_else(|| Path::new(CONFIG_FILE));
    let settings = read_settings_file(path)?;
    Ok(apply_env_overrides(settings, |key| std::env::var(key).ok()))
}

fn read_settings_file(path: &Path) -> anyhow::Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("invalid settings in {}", path.display()))
}

fn apply_env_overrides<F>(mut settings: Settings, env: F) -> Settings
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = env("BILLED_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = env("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = env("BILLED_JWT") {
        settings.jwt = Some(v);
    }

    if let Some(v) = env("BILLED_USER_EMAIL") {
        settings.user_email = v;
    }

    if let Some(v) = env("BILLED_USER_TYPE") {
        if let Ok(parsed) = v.parse::<UserType>() {
            settings.user_type = parsed;
        }
    }

    if let Some(v) = env("APP__TEST_HARNESS") {
        if let Some(parsed) = parse_flag(&v) {
            settings.test_harness = parsed;
        }
    }

    if let Some(v) = env("APP__NAVIGATE_ON_FAILED_UPDATE") {
        if let Some(parsed) = parse_flag(&v) {
            settings.navigate_on_failed_update = parsed;
        }
    }

    settings
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
