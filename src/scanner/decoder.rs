use qrism::reader::detect_qr;
use tracing::trace;

use super::{DecodeError, Frame};

/// What one decode attempt produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    Payload(String),
    NoSymbol,
    Error(DecodeError),
}

/// Finds and decodes a QR symbol in a frame.
///
/// Implementations are called from a blocking worker thread and must not
/// hold on to the frame beyond the call.
pub trait BarcodeDecoder: Send + Sync + 'static {
    fn decode(&self, frame: &Frame) -> DecodeOutcome;
}

/// Decoder backed by the qrism reader
#[derive(Debug, Default, Clone, Copy)]
pub struct QrismDecoder;

impl QrismDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl BarcodeDecoder for QrismDecoder {
    fn decode(&self, frame: &Frame) -> DecodeOutcome {
        let image = frame.upright();
        let mut detected = detect_qr(&image);

        let mut last_error = None;
        for symbol in detected.symbols().iter_mut() {
            match symbol.decode() {
                Ok((_, message)) if !message.is_empty() => return DecodeOutcome::Payload(message),
                Ok(_) => {}
                Err(e) => {
                    trace!(seq = frame.seq(), error = %e, "symbol rejected");
                    last_error = Some(e.to_string());
                }
            }
        }

        match last_error {
            Some(reason) => DecodeOutcome::Error(DecodeError::Malformed(reason)),
            None => DecodeOutcome::NoSymbol,
        }
    }
}
