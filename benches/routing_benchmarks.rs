use criterion::{black_box, criterion_group, criterion_main, Criterion};
use patchmatrix::{
    compile, Blueprint, DestinationDescriptor, GainTable, MatrixKind, SourceDescriptor, SynthConfig,
    Waveform,
};

fn large_blueprint() -> Blueprint {
    let mut bp = Blueprint::with_grid(128, 64);
    bp.ui.hidden_rows0 = Some((0..128).step_by(9).collect());
    for row in 1..=128u32 {
        bp = bp.source(
            row,
            SourceDescriptor::Generator {
                generator_index: row as usize / 2,
                channel_id: Some(row as usize % 2),
            },
        );
    }
    for col in 1..=64u32 {
        bp = bp.destination(col, DestinationDescriptor::OutputBus { bus_index: col as usize % 8 });
    }
    bp
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let bp = large_blueprint();
    c.bench_function("compile(128x64)", |b| b.iter(|| compile(black_box(&bp))));

    let matrix = compile(&bp);
    let gains = GainTable::default().with_row(5, 0.5).with_pin(7, 3, 0.25);
    c.bench_function("resolve_gain", |b| {
        b.iter(|| patchmatrix::resolve_gain(black_box(40), black_box(12), &matrix, &gains))
    });

    c.bench_function("Synth toggle pin on/off", |b| {
        let mut synth = SynthConfig::new(48_000).build().unwrap();
        synth.load(MatrixKind::Audio, &bp);
        synth.resume();
        // first activation builds the voice; measure pin wiring only
        synth.set_toggle(MatrixKind::Audio, 10, 4, true);
        b.iter(|| {
            synth.set_toggle(MatrixKind::Audio, 10, 4, false);
            synth.set_toggle(MatrixKind::Audio, 10, 4, true)
        })
    });

    c.bench_function("Synth.process() with 16 pins", |b| {
        let mut synth = SynthConfig::new(48_000).build().unwrap();
        synth.load(MatrixKind::Audio, &bp);
        synth.resume();
        for row in 0..16 {
            synth.set_level(row / 2, Waveform::Sine, 0.5).unwrap();
            synth.set_toggle(MatrixKind::Audio, row, row % 8, true);
        }
        b.iter(|| synth.process())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
