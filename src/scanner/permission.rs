use tracing::{info, warn};

use crate::platform::{Notice, Notifier, PermissionPlatform, PermissionStatus};

pub const PERMISSION_REQUIRED: &str = "Camera permission is required to scan QR codes.";

/// Tracks camera authorization and decides whether capture may start.
///
/// A denied request posts a persistent notice and never re-prompts on its
/// own; the user has to ask again.
pub struct PermissionGate<P> {
    platform: P,
    status: PermissionStatus,
    prompts: u32,
}

impl<P: PermissionPlatform> PermissionGate<P> {
    pub fn new(platform: P) -> Self {
        let status = platform.check();
        Self { platform, status, prompts: 0 }
    }

    /// Refresh the status from the platform
    pub fn query(&mut self) -> PermissionStatus {
        self.status = self.platform.check();
        self.status
    }

    pub fn status(&self) -> PermissionStatus {
        self.status
    }

    pub fn is_granted(&self) -> bool {
        self.status.is_granted()
    }

    /// Number of prompts shown so far
    pub fn prompts(&self) -> u32 {
        self.prompts
    }

    /// Show exactly one prompt
    pub async fn request(&mut self, notices: &mut dyn Notifier) -> PermissionStatus {
        self.prompts += 1;
        self.status = self.platform.request().await;

        match self.status {
            PermissionStatus::Granted => {
                info!("camera permission granted");
                notices.withdraw_persistent();
            }
            PermissionStatus::Denied => {
                warn!("camera permission denied");
                notices.notify(Notice::persistent(PERMISSION_REQUIRED));
            }
        }
        self.status
    }

    /// Query, and prompt only if access is not already granted
    pub async fn ensure(&mut self, notices: &mut dyn Notifier) -> PermissionStatus {
        if self.query().is_granted() {
            return self.status;
        }
        self.request(notices).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct Scripted {
        granted: bool,
        answers: VecDeque<PermissionStatus>,
    }

    impl PermissionPlatform for Scripted {
        fn check(&self) -> PermissionStatus {
            if self.granted { PermissionStatus::Granted } else { PermissionStatus::Denied }
        }

        async fn request(&mut self) -> PermissionStatus {
            let answer = self.answers.pop_front().unwrap_or(PermissionStatus::Denied);
            self.granted = answer.is_granted();
            answer
        }
    }

    #[derive(Default)]
    struct Recorded {
        notices: Vec<Notice>,
        withdrawn: usize,
    }

    impl Notifier for Recorded {
        fn notify(&mut self, notice: Notice) {
            self.notices.push(notice);
        }

        fn withdraw_persistent(&mut self) {
            self.withdrawn += 1;
        }
    }

    fn gate(granted: bool, answers: &[PermissionStatus]) -> PermissionGate<Scripted> {
        PermissionGate::new(Scripted { granted, answers: answers.iter().copied().collect() })
    }

    #[tokio::test]
    async fn test_already_granted_skips_prompt() {
        let mut gate = gate(true, &[]);
        let mut notices = Recorded::default();

        assert_eq!(gate.ensure(&mut notices).await, PermissionStatus::Granted);
        assert_eq!(gate.prompts(), 0);
        assert!(notices.notices.is_empty());
    }

    #[tokio::test]
    async fn test_denial_posts_persistent_notice() {
        let mut gate = gate(false, &[PermissionStatus::Denied]);
        let mut notices = Recorded::default();

        assert_eq!(gate.ensure(&mut notices).await, PermissionStatus::Denied);
        assert_eq!(gate.prompts(), 1);
        assert_eq!(notices.notices, vec![Notice::persistent(PERMISSION_REQUIRED)]);
        assert!(!gate.is_granted());
    }

    #[tokio::test]
    async fn test_manual_retry_after_denial() {
        let mut gate = gate(false, &[PermissionStatus::Denied, PermissionStatus::Granted]);
        let mut notices = Recorded::default();

        gate.request(&mut notices).await;
        assert_eq!(gate.request(&mut notices).await, PermissionStatus::Granted);
        assert_eq!(gate.prompts(), 2);
        assert_eq!(notices.withdrawn, 1);
        assert!(gate.is_granted());
    }
}
