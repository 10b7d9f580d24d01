// Scan controller and decoder benchmarks

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use image::DynamicImage;
use qrpocket::codec;
use qrpocket::scanner::{
    Admission, BarcodeDecoder, Frame, FrameLedger, LatestSlot, QrismDecoder, Rotation, ScanController,
};
use std::hint::black_box;

mod common;

fn bench_offer_complete(c: &mut Criterion) {
    let mut group = c.benchmark_group("controller_offer_complete");
    for size in [1_000, 10_000] {
        let outcomes = common::generate_outcomes(size);

        group.bench_with_input(BenchmarkId::new("attempts", size), &outcomes, |b, outcomes| {
            b.iter(|| {
                let ledger = FrameLedger::new();
                let mut controller = ScanController::new();
                for (seq, outcome) in outcomes.iter().enumerate() {
                    if let Admission::Admitted(attempt) = controller.offer(common::tiny_frame(seq as u64, &ledger)) {
                        let ticket = attempt.ticket();
                        drop(attempt);
                        black_box(controller.complete(ticket, outcome.clone()));
                    }
                }
                black_box(controller.stats())
            });
        });
    }
    group.finish();
}

fn bench_busy_drops(c: &mut Criterion) {
    c.bench_function("controller_drop_while_busy", |b| {
        let ledger = FrameLedger::new();
        let mut controller = ScanController::new();
        let _attempt = match controller.offer(common::tiny_frame(0, &ledger)) {
            Admission::Admitted(attempt) => attempt,
            Admission::Dropped => unreachable!(),
        };
        let mut seq = 1;
        b.iter(|| {
            seq += 1;
            black_box(controller.offer(common::tiny_frame(seq, &ledger)))
        });
    });
}

fn bench_slot_offer(c: &mut Criterion) {
    c.bench_function("slot_replace_latest", |b| {
        let ledger = FrameLedger::new();
        let slot = LatestSlot::new();
        let mut seq = 0;
        b.iter(|| {
            seq += 1;
            black_box(slot.offer(common::tiny_frame(seq, &ledger)))
        });
    });
}

fn bench_qrism_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("qrism_decode");
    group.sample_size(20);

    let ledger = FrameLedger::new();
    let decoder = QrismDecoder::new();
    for scale in [2u32, 4, 8] {
        let png = codec::render_png("https://example.com/bench", scale).unwrap();
        let image = image::load_from_memory(&png).unwrap();
        let frame = Frame::new(0, image, Rotation::Deg0, &ledger);

        group.bench_with_input(BenchmarkId::new("scale", scale), &frame, |b, frame| {
            b.iter(|| black_box(decoder.decode(frame)));
        });
    }

    let blank = Frame::new(0, DynamicImage::new_luma8(640, 480), Rotation::Deg0, &ledger);
    group.bench_function("blank_640x480", |b| b.iter(|| black_box(decoder.decode(&blank))));
    group.finish();
}

criterion_group!(benches, bench_offer_complete, bench_busy_drops, bench_slot_offer, bench_qrism_decode);
criterion_main!(benches);
