use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::model::UserData;

/// Local key-value flags kept between runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub logged_in: bool,
    pub username: String,
    pub email: String,
    /// `None` until the user has answered a camera prompt
    pub camera_permission: Option<bool>,
}

impl Settings {
    /// Load settings, falling back to defaults when the file does not exist yet
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Could not read settings: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Malformed settings file: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw)
            .with_context(|| format!("Could not write settings: {}", path.display()))
    }

    pub fn record_login(&mut self, user: &UserData) {
        self.logged_in = true;
        self.username = user.name.clone();
        self.email = user.email.clone();
    }

    pub fn record_logout(&mut self) {
        self.logged_in = false;
        self.username.clear();
        self.email.clear();
    }
}
