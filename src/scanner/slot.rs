use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

use super::Frame;

#[derive(Default)]
struct SlotState {
    frame: Option<Frame>,
    closed: bool,
    superseded: u64,
}

/// Single-frame mailbox with keep-only-latest semantics.
///
/// A frame offered while an earlier one is still waiting replaces it; the
/// replaced frame is released immediately and never reaches the consumer.
#[derive(Default)]
pub struct LatestSlot {
    state: Mutex<SlotState>,
    notify: Notify,
}

impl LatestSlot {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Put a frame in the slot, returns true if an unconsumed frame was replaced.
    /// Frames offered after `close` are released on the spot.
    pub fn offer(&self, frame: Frame) -> bool {
        let replaced = {
            let mut state = self.state.lock();
            if state.closed {
                return false;
            }
            let replaced = state.frame.replace(frame);
            if replaced.is_some() {
                state.superseded += 1;
            }
            replaced
        };
        self.notify.notify_one();
        // Released outside the lock
        replaced.is_some()
    }

    #[cfg(test)]
    fn try_take(&self) -> Option<Frame> {
        self.state.lock().frame.take()
    }

    /// Wait for the next frame. Returns `None` once the slot is closed and empty.
    ///
    /// Cancel-safe: a frame is only removed from the slot when it is returned.
    pub async fn recv(&self) -> Option<Frame> {
        loop {
            let notified = self.notify.notified();
            {
                let mut state = self.state.lock();
                if let Some(frame) = state.frame.take() {
                    return Some(frame);
                }
                if state.closed {
                    return None;
                }
            }
            notified.await;
        }
    }

    /// Stop accepting frames. A frame still waiting can be received, after
    /// which `recv` returns `None`.
    pub fn close(&self) {
        self.state.lock().closed = true;
        self.notify.notify_one();
    }

    /// Close and release the frame still waiting, if any
    pub fn shutdown(&self) {
        let pending = {
            let mut state = self.state.lock();
            state.closed = true;
            state.frame.take()
        };
        drop(pending);
        self.notify.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Frames that were replaced before the consumer picked them up
    pub fn superseded(&self) -> u64 {
        self.state.lock().superseded
    }
}

/// Consumer side of a [`LatestSlot`]
#[derive(Clone)]
pub struct FrameReceiver {
    slot: Arc<LatestSlot>,
}

impl FrameReceiver {
    pub fn new(slot: Arc<LatestSlot>) -> Self {
        Self { slot }
    }

    pub async fn recv(&self) -> Option<Frame> {
        self.slot.recv().await
    }

    pub fn superseded(&self) -> u64 {
        self.slot.superseded()
    }
}
