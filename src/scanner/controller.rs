use tracing::{debug, info};

use crate::model::ScanResult;

use super::{BarcodeDecoder, DecodeOutcome, Frame};

/// Identifies one decode attempt. The epoch changes on teardown, which turns
/// every ticket handed out before it into a stale one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttemptTicket {
    epoch: u64,
    id: u64,
}

impl AttemptTicket {
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// A frame admitted for decoding, together with its ticket
#[derive(Debug)]
pub struct DecodeAttempt {
    ticket: AttemptTicket,
    frame: Frame,
}

impl DecodeAttempt {
    pub fn ticket(&self) -> AttemptTicket {
        self.ticket
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Run the decoder and release the frame before reporting the outcome
    pub fn run<D: BarcodeDecoder + ?Sized>(self, decoder: &D) -> DecodeOutcome {
        let outcome = decoder.decode(&self.frame);
        drop(self.frame);
        outcome
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Decoding(AttemptTicket),
}

/// Result of offering a frame
#[derive(Debug)]
pub enum Admission {
    Admitted(DecodeAttempt),
    /// Busy or torn down; the frame has been released
    Dropped,
}

/// How a finished attempt was applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    NewResult(ScanResult),
    /// Same payload as the last accepted one
    Duplicate,
    NoResult,
    /// Arrived after teardown; nothing changed
    Stale,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub frames_offered: u64,
    pub frames_admitted: u64,
    pub frames_dropped: u64,
    pub payloads: u64,
    pub new_results: u64,
    pub duplicates: u64,
    pub no_symbol: u64,
    pub decode_errors: u64,
    pub stale_completions: u64,
}

/// Admission control and duplicate suppression for decode attempts.
///
/// At most one attempt is in flight at a time. Frames offered while an attempt
/// is running are dropped, not queued. A decoded payload only becomes a new
/// result when it differs from the last accepted one.
#[derive(Debug)]
pub struct ScanController {
    state: ControllerState,
    epoch: u64,
    next_id: u64,
    last_accepted: Option<String>,
    torn_down: bool,
    stats: ScanStats,
}

impl Default for ScanController {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanController {
    pub fn new() -> Self {
        Self {
            state: ControllerState::Idle,
            epoch: 0,
            next_id: 0,
            last_accepted: None,
            torn_down: false,
            stats: ScanStats::default(),
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == ControllerState::Idle
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    pub fn last_accepted(&self) -> Option<&str> {
        self.last_accepted.as_deref()
    }

    pub fn offer(&mut self, frame: Frame) -> Admission {
        self.stats.frames_offered += 1;

        if self.torn_down || !self.is_idle() {
            self.stats.frames_dropped += 1;
            debug!(seq = frame.seq(), "frame dropped, decoder busy");
            return Admission::Dropped;
        }

        self.next_id += 1;
        let ticket = AttemptTicket { epoch: self.epoch, id: self.next_id };
        self.state = ControllerState::Decoding(ticket);
        self.stats.frames_admitted += 1;
        debug!(seq = frame.seq(), attempt = ticket.id, "frame admitted");

        Admission::Admitted(DecodeAttempt { ticket, frame })
    }

    pub fn complete(&mut self, ticket: AttemptTicket, outcome: DecodeOutcome) -> Completion {
        if self.torn_down || ticket.epoch != self.epoch {
            self.stats.stale_completions += 1;
            debug!(attempt = ticket.id, "ignoring completion after teardown");
            return Completion::Stale;
        }

        match self.state {
            ControllerState::Decoding(current) if current == ticket => {}
            _ => {
                debug_assert!(false, "completion for attempt {} which is not in flight", ticket.id);
                self.stats.stale_completions += 1;
                return Completion::Stale;
            }
        }
        self.state = ControllerState::Idle;

        match outcome {
            DecodeOutcome::Payload(payload) if !payload.is_empty() => self.accept(payload),
            DecodeOutcome::Payload(_) | DecodeOutcome::NoSymbol => {
                self.stats.no_symbol += 1;
                Completion::NoResult
            }
            DecodeOutcome::Error(e) => {
                self.stats.decode_errors += 1;
                debug!(attempt = ticket.id, error = %e, "decode failed");
                Completion::NoResult
            }
        }
    }

    fn accept(&mut self, payload: String) -> Completion {
        self.stats.payloads += 1;
        if self.last_accepted.as_deref() == Some(payload.as_str()) {
            self.stats.duplicates += 1;
            return Completion::Duplicate;
        }

        info!(len = payload.len(), "new scan result");
        self.stats.new_results += 1;
        self.last_accepted = Some(payload.clone());
        Completion::NewResult(ScanResult::new(payload))
    }

    /// The next payload is treated as new even if it repeats the last one
    pub fn forget_last_accepted(&mut self) {
        self.last_accepted = None;
    }

    /// Ignore every attempt handed out so far and refuse new frames
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.epoch += 1;
        self.state = ControllerState::Idle;
        self.last_accepted = None;
    }
}
