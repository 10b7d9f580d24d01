use tracing::{info, warn};

use crate::model::{PresentationState, ScanResult};
use crate::platform::{Clipboard, Notice, Notifier, UrlOpener};
use crate::util::{is_link_like, parse_link};

pub const COPIED: &str = "Copied to clipboard!";
pub const COPY_FAILED: &str = "Could not copy to clipboard";
pub const OPEN_FAILED: &str = "Could not open link";
pub const NOT_A_LINK: &str = "Content is not a link";

/// What `open_as_link` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Opened,
    /// The opener failed; the presentation was cleared anyway
    OpenFailed,
    /// Nothing opened and the result stays on screen
    NotALink,
    NothingShown,
}

/// Owns the decoded payload currently shown to the user and the actions on it.
///
/// `copy` and a link-like `open_as_link` always clear the presentation, even
/// when the platform call fails. Every action is a no-op when nothing is shown.
#[derive(Debug, Default)]
pub struct PresentationGate {
    state: PresentationState,
}

impl PresentationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PresentationState {
        &self.state
    }

    pub fn current(&self) -> Option<&ScanResult> {
        self.state.current()
    }

    pub fn is_visible(&self) -> bool {
        self.state.visible()
    }

    pub fn can_open_link(&self) -> bool {
        self.current().is_some_and(|result| is_link_like(&result.payload))
    }

    /// Show a result, replacing whatever was shown before
    pub fn show(&mut self, result: ScanResult) {
        self.state.set(result);
    }

    /// Returns true if something was shown
    pub fn dismiss(&mut self) -> bool {
        self.state.clear().is_some()
    }

    /// Returns true if something was shown
    pub fn copy(&mut self, clipboard: &mut dyn Clipboard, notices: &mut dyn Notifier) -> bool {
        let Some(result) = self.state.clear() else {
            return false;
        };

        match clipboard.set_text(&result.payload) {
            Ok(()) => {
                info!("payload copied to clipboard");
                notices.notify(Notice::short(COPIED));
            }
            Err(e) => {
                warn!(error = %e, "copy failed");
                notices.notify(Notice::short(COPY_FAILED));
            }
        }
        true
    }

    pub fn open_as_link(&mut self, opener: &mut dyn UrlOpener, notices: &mut dyn Notifier) -> LinkOutcome {
        let Some(result) = self.state.current() else {
            return LinkOutcome::NothingShown;
        };
        let Some(link) = parse_link(&result.payload) else {
            notices.notify(Notice::short(NOT_A_LINK));
            return LinkOutcome::NotALink;
        };

        self.state.clear();
        // The opener gets the serialized URL, never the raw payload
        let url = link.as_str();
        match opener.open(url) {
            Ok(()) => {
                info!(url, "opened link");
                LinkOutcome::Opened
            }
            Err(e) => {
                warn!(error = %e, "could not open link");
                notices.notify(Notice::short(OPEN_FAILED));
                LinkOutcome::OpenFailed
            }
        }
    }
}
