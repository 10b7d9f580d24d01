// Shared benchmark helpers
// Functions here are used across different benchmark files
#![allow(dead_code)]

use image::DynamicImage;
use qrpocket::model::NewQrCode;
use qrpocket::repository::Database;
use qrpocket::scanner::{DecodeOutcome, Frame, FrameLedger, Rotation};
use std::sync::Arc;

/// Create an in-memory database with schema
pub async fn setup_bench_db() -> Database {
    let db = Database::new(":memory:").await.unwrap();
    db.init_schema().await.unwrap();
    db
}

/// Generate saved-code rows for database benchmarks
pub fn generate_codes(count: usize) -> Vec<NewQrCode> {
    (0..count)
        .map(|i| NewQrCode {
            content: format!("https://example.com/item/{}", i),
            kind: if i % 3 == 0 { "Text".to_string() } else { "URL".to_string() },
            image: vec![(i % 251) as u8; 512],
        })
        .collect()
}

/// Small frame for controller benchmarks
pub fn tiny_frame(seq: u64, ledger: &Arc<FrameLedger>) -> Frame {
    Frame::new(seq, DynamicImage::new_luma8(1, 1), Rotation::Deg0, ledger)
}

/// Decode outcomes as a steady code in front of the camera produces them:
/// mostly repeats, with occasional misses and a new payload now and then
pub fn generate_outcomes(count: usize) -> Vec<DecodeOutcome> {
    (0..count)
        .map(|i| match i % 10 {
            0 => DecodeOutcome::NoSymbol,
            _ => DecodeOutcome::Payload(format!("payload-{}", i / 50)),
        })
        .collect()
}
