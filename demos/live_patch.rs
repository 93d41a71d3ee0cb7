//! Play a patch on the default output device
//!
//! Run with: cargo run --example live_patch --features cpal_sink
//!
//! Every two seconds the next pin in a short sequence is toggled, while the
//! oscillator's pulse width sweeps slowly.

use std::thread::sleep;
use std::time::{Duration, Instant};

use patchmatrix::nodes::CpalSink;
use patchmatrix::{Blueprint, MatrixKind, SynthConfig, Waveform, BLOCK_LEN};

fn main() {
    tracing_subscriber::fmt().init();

    let Some(sink) = CpalSink::default_output() else {
        eprintln!("No audio output device found!");
        return;
    };
    let sample_rate = sink.sample_rate();
    println!("Playing at {sample_rate}Hz, press Ctrl+C to stop\n");

    let blueprint = Blueprint::from_json(include_str!("audio_matrix.json")).expect("bundled blueprint");
    let mut synth = SynthConfig::new(sample_rate).build().expect("engine");
    synth.attach_output(sink).expect("output");
    synth.load(MatrixKind::Audio, &blueprint);

    synth.set_frequency(0, 110.0).expect("frequency");
    synth.set_level(0, Waveform::Sawtooth, 0.2).expect("level");
    synth.set_level(0, Waveform::Pulse, 0.2).expect("level");
    synth.set_noise_level(0, 0.05).expect("level");
    synth.set_noise_colour(0, 0.8).expect("colour");
    synth.set_output_level(0, -6.0).expect("bus level");
    synth.resume();

    let sequence = [(0, 0), (1, 0), (2, 0)];
    let mut active = [false; 3];
    let mut step = 0;
    let mut next_toggle = Instant::now();

    let mut frames_generated: u64 = 0;
    let audio_start = Instant::now();

    loop {
        let elapsed = audio_start.elapsed().as_secs_f64();
        let frames_due = (elapsed * sample_rate as f64) as u64;

        if frames_generated < frames_due + 1024 {
            let width = 0.5 + 0.4 * (elapsed as f32 * 0.3 * std::f32::consts::PI).sin();
            let _ = synth.set_pulse_width(0, width);
            synth.process();
            frames_generated += BLOCK_LEN as u64;
        } else {
            sleep(Duration::from_micros(500));
        }

        if Instant::now() >= next_toggle {
            let i = step % sequence.len();
            let (row, col) = sequence[i];
            active[i] = !active[i];
            if !synth.set_toggle(MatrixKind::Audio, row, col, active[i]) {
                active[i] = !active[i];
            }
            println!("pin ({row}, {col}) {}", if active[i] { "on" } else { "off" });
            step += 1;
            next_toggle += Duration::from_secs(2);
        }
    }
}
