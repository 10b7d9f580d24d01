use time::OffsetDateTime;

/// A decoded payload accepted as distinct from the one before it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub payload: String,
    pub detected_at: OffsetDateTime,
}

impl ScanResult {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            detected_at: OffsetDateTime::now_utc(),
        }
    }
}

/// Whether a result is currently shown to the user.
///
/// Visibility is derived from the presence of a result, so a visible
/// state without a result cannot be represented.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresentationState {
    current: Option<ScanResult>,
}

impl PresentationState {
    pub fn visible(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&ScanResult> {
        self.current.as_ref()
    }

    pub(crate) fn set(&mut self, result: ScanResult) {
        self.current = Some(result);
    }

    pub(crate) fn clear(&mut self) -> Option<ScanResult> {
        self.current.take()
    }
}
