use std::io::{BufRead, Write};
use std::path::PathBuf;

use tracing::warn;

use crate::repository::Settings;

use super::{PermissionPlatform, PermissionStatus};

/// How a permission request is answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// Ask on the controlling terminal
    Interactive,
    /// Pre-authorized on the command line
    AlwaysGrant,
    AlwaysDeny,
}

/// Camera permission remembered in the settings file
pub struct SettingsPermission {
    settings_path: PathBuf,
    mode: PromptMode,
}

impl SettingsPermission {
    pub fn new(settings_path: impl Into<PathBuf>, mode: PromptMode) -> Self {
        Self { settings_path: settings_path.into(), mode }
    }

    fn remember(&self, granted: bool) {
        let result = Settings::load(&self.settings_path).and_then(|mut settings| {
            settings.camera_permission = Some(granted);
            settings.save(&self.settings_path)
        });
        if let Err(e) = result {
            warn!(error = %e, "could not persist camera permission");
        }
    }
}

fn ask_on_terminal() -> bool {
    let mut stderr = std::io::stderr();
    let _ = write!(stderr, "Allow qrpocket to use the camera? [y/N] ");
    let _ = stderr.flush();

    let mut answer = String::new();
    match std::io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

impl PermissionPlatform for SettingsPermission {
    fn check(&self) -> PermissionStatus {
        match Settings::load(&self.settings_path) {
            Ok(settings) if settings.camera_permission == Some(true) => PermissionStatus::Granted,
            _ => PermissionStatus::Denied,
        }
    }

    async fn request(&mut self) -> PermissionStatus {
        let granted = match self.mode {
            PromptMode::AlwaysGrant => true,
            PromptMode::AlwaysDeny => false,
            PromptMode::Interactive => tokio::task::spawn_blocking(ask_on_terminal)
                .await
                .unwrap_or(false),
        };
        self.remember(granted);

        if granted {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_request_is_remembered() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        let mut permission = SettingsPermission::new(&path, PromptMode::AlwaysGrant);
        assert_eq!(permission.check(), PermissionStatus::Denied);

        assert_eq!(permission.request().await, PermissionStatus::Granted);
        assert_eq!(permission.check(), PermissionStatus::Granted);

        let stored = Settings::load(&path).unwrap();
        assert_eq!(stored.camera_permission, Some(true));
    }

    #[tokio::test]
    async fn test_denial_is_remembered() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        let mut permission = SettingsPermission::new(&path, PromptMode::AlwaysDeny);
        assert_eq!(permission.request().await, PermissionStatus::Denied);
        assert_eq!(Settings::load(&path).unwrap().camera_permission, Some(false));
        assert_eq!(permission.check(), PermissionStatus::Denied);
    }
}
