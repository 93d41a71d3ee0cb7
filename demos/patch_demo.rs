//! Offline render of a small patch
//!
//! Run with: cargo run --example patch_demo
//!
//! Loads the bundled audio matrix, patches a few pins one after the other
//! and prints the level reaching the master bus for each step.

use patchmatrix::nodes::RtrbSink;
use patchmatrix::{Blueprint, GainTable, MatrixKind, SynthConfig, Waveform, BLOCK_LEN};
use rtrb::RingBuffer;

fn main() {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let blueprint = Blueprint::from_json(include_str!("audio_matrix.json")).expect("bundled blueprint");
    let gains = GainTable::default().with_pin(3, 1, 0.5);

    let mut synth = SynthConfig::new(48_000)
        .with_output_buses(2)
        .build()
        .expect("engine");
    let (producer, mut consumer) = RingBuffer::new(BLOCK_LEN * 8);
    synth.attach_output(RtrbSink::mono(producer)).expect("output");

    let matrix = synth.load(MatrixKind::Audio, &blueprint);
    println!(
        "matrix: {} visible rows, {} visible cols, hidden rows {:?}, {} entries dropped",
        matrix.visible_rows(),
        matrix.visible_cols(),
        matrix.hidden_row_labels(),
        matrix.dropped().len()
    );
    synth.set_gains(MatrixKind::Audio, gains);

    synth.set_frequency(0, 220.0).expect("frequency");
    synth.set_level(0, Waveform::Sine, 0.4).expect("level");
    synth.set_level(0, Waveform::Pulse, 0.3).expect("level");
    synth.set_noise_level(0, 0.2).expect("level");
    synth.resume();

    let steps = [
        ("sine/saw tap → bus 0", 0, 0, true),
        ("pulse/tri tap → bus 0", 1, 0, true),
        ("noise → bus 0 at half gain", 2, 0, true),
        ("sine/saw tap off", 0, 0, false),
        ("unmapped pin", 3, 3, true),
        ("noise → bus 1", 2, 2, true),
    ];

    for (label, row, col, on) in steps {
        let ok = synth.set_toggle(MatrixKind::Audio, row, col, on);

        let mut peak = 0.0f32;
        for _ in 0..(48_000 / 4 / BLOCK_LEN) {
            synth.process();
            while let Ok(sample) = consumer.pop() {
                peak = peak.max(sample.abs());
            }
        }
        println!(
            "{label:<28} ok={ok:<5} pins={} peak={peak:.3}",
            synth.ledger(MatrixKind::Audio).len()
        );
    }

    synth.reset();
    println!("after reset: {} nodes", synth.graph().node_count());
}
