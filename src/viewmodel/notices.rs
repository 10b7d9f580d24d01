use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::platform::{Notice, NoticeDuration, Notifier};

const SHORT: Duration = Duration::from_secs(4);
const LONG: Duration = Duration::from_secs(10);
const MAX_NOTICES: usize = 5;

/// On-screen notices with expiry, newest last
#[derive(Debug, Default)]
pub struct NoticeBoard {
    notices: VecDeque<(Notice, Instant)>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    fn expired(notice: &Notice, posted: Instant, now: Instant) -> bool {
        let lifetime = match notice.duration {
            NoticeDuration::Short => SHORT,
            NoticeDuration::Long => LONG,
            NoticeDuration::Persistent => return false,
        };
        now.saturating_duration_since(posted) >= lifetime
    }

    /// Notices still on screen at `now`
    pub fn active(&self, now: Instant) -> impl Iterator<Item = &Notice> {
        self.notices
            .iter()
            .filter(move |(notice, posted)| !Self::expired(notice, *posted, now))
            .map(|(notice, _)| notice)
    }

    pub fn prune(&mut self, now: Instant) {
        self.notices.retain(|(notice, posted)| !Self::expired(notice, *posted, now));
    }

    /// Remove and return everything posted so far, oldest first
    pub fn take_all(&mut self) -> Vec<Notice> {
        self.notices.drain(..).map(|(notice, _)| notice).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    fn post(&mut self, notice: Notice, at: Instant) {
        // The same persistent notice is shown once
        if notice.duration == NoticeDuration::Persistent
            && self.notices.iter().any(|(existing, _)| *existing == notice)
        {
            return;
        }
        if self.notices.len() == MAX_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back((notice, at));
    }
}

impl Notifier for NoticeBoard {
    fn notify(&mut self, notice: Notice) {
        self.post(notice, Instant::now());
    }

    fn withdraw_persistent(&mut self) {
        self.notices.retain(|(notice, _)| notice.duration != NoticeDuration::Persistent);
    }
}
