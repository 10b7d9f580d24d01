use std::io;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use tracing::debug;

use super::{PlatformError, UrlOpener};

/// How long `open` waits for the launcher to report back
const LAUNCH_GRACE: Duration = Duration::from_secs(3);

/// Opens links with the desktop's default handler.
///
/// The launcher runs on a helper thread that waits for its exit status, so a
/// handler that fails is reported as an error and the child is always reaped.
/// A launcher still running after the grace period is treated as having taken
/// the link.
#[derive(Debug, Clone)]
pub struct SystemBrowser {
    launcher: Option<String>,
    grace: Duration,
}

impl Default for SystemBrowser {
    fn default() -> Self {
        Self { launcher: None, grace: LAUNCH_GRACE }
    }
}

impl SystemBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open links with `program` instead of the desktop default
    pub fn with_launcher(program: impl Into<String>) -> Self {
        Self { launcher: Some(program.into()), ..Self::default() }
    }
}

fn launch(url: &str, launcher: Option<&str>) -> io::Result<()> {
    match launcher {
        Some(program) => open::with(url, program),
        None => open::that(url),
    }
}

impl UrlOpener for SystemBrowser {
    fn open(&mut self, url: &str) -> Result<(), PlatformError> {
        let failed = |reason: String| PlatformError::Open { url: url.to_string(), reason };

        let (done, outcome) = mpsc::channel();
        let target = url.to_string();
        let launcher = self.launcher.clone();
        std::thread::Builder::new()
            .name("qrpocket-open".to_string())
            .spawn(move || {
                let _ = done.send(launch(&target, launcher.as_deref()));
            })
            .map_err(|e| failed(e.to_string()))?;

        match outcome.recv_timeout(self.grace) {
            Ok(result) => result.map_err(|e| failed(e.to_string())),
            Err(RecvTimeoutError::Timeout) => {
                debug!(url, "launcher still running, assuming it took the link");
                Ok(())
            }
            Err(RecvTimeoutError::Disconnected) => Err(failed("launcher thread exited".to_string())),
        }
    }
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;

    #[test]
    fn test_failing_launcher_is_an_error() {
        let mut browser = SystemBrowser::with_launcher("false");
        let result = browser.open("https://example.com/x");
        assert!(matches!(result, Err(PlatformError::Open { ref url, .. }) if url == "https://example.com/x"));
    }

    #[test]
    fn test_missing_launcher_is_an_error() {
        let mut browser = SystemBrowser::with_launcher("/definitely/not/a/launcher");
        assert!(browser.open("https://example.com/x").is_err());
    }

    #[test]
    fn test_successful_launcher() {
        let mut browser = SystemBrowser::with_launcher("true");
        assert!(browser.open("https://example.com/?a=1&calc").is_ok());
    }
}
