//! Live playback on a CPAL device

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample, StreamConfig};
use dasp_graph::{Buffer, Input};
use rtrb::{Consumer, RingBuffer};

use super::RtrbSink;
use crate::node::{AudioNode, ProcessContext};

/// Plays the master bus on an output device.
///
/// Blocks go through an [`RtrbSink`] to a stream that lives on its own
/// thread; the mono master is copied to every device channel.
pub struct CpalSink {
    feed: RtrbSink,
    sample_rate: u32,
    underruns: Arc<AtomicU64>,
}

impl CpalSink {
    /// The host's default output device, or `None` if it can't be opened
    pub fn default_output() -> Option<Self> {
        let device = cpal::default_host().default_output_device()?;
        match Self::open(&device) {
            Ok(sink) => Some(sink),
            Err(err) => {
                tracing::warn!(%err, "no usable output config");
                None
            }
        }
    }

    pub fn open(device: &cpal::Device) -> Result<Self, cpal::DefaultStreamConfigError> {
        let supported = device.default_output_config()?;
        let format = supported.sample_format();
        let config = supported.config();
        let channels = usize::from(config.channels);
        let sample_rate = config.sample_rate.0;

        // roughly 100ms of interleaved audio
        let capacity = (sample_rate as usize / 10 * channels).next_power_of_two().max(8192);
        let (producer, consumer) = RingBuffer::new(capacity);
        let underruns = Arc::new(AtomicU64::new(0));

        let device = device.clone();
        let counter = Arc::clone(&underruns);
        std::thread::spawn(move || {
            let stream = match format {
                SampleFormat::F32 => build_stream::<f32>(&device, &config, consumer, counter),
                SampleFormat::I16 => build_stream::<i16>(&device, &config, consumer, counter),
                SampleFormat::U16 => build_stream::<u16>(&device, &config, consumer, counter),
                other => {
                    tracing::error!(?other, "unsupported device sample format");
                    return;
                }
            };
            let stream = match stream {
                Ok(stream) => stream,
                Err(err) => {
                    tracing::error!(%err, "failed to build output stream");
                    return;
                }
            };
            if let Err(err) = stream.play() {
                tracing::error!(%err, "failed to start output stream");
                return;
            }
            tracing::debug!(sample_rate, channels, "output stream running");
            loop {
                std::thread::park();
            }
        });

        Ok(Self {
            feed: RtrbSink::new(producer, channels),
            sample_rate,
            underruns,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Device callbacks that ran out of samples so far
    pub fn underruns(&self) -> u64 {
        self.underruns.load(Ordering::Relaxed)
    }

    /// Blocks rendered faster than the device could take them
    pub fn dropped_blocks(&self) -> u64 {
        self.feed.dropped_blocks()
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    mut consumer: Consumer<f32>,
    underruns: Arc<AtomicU64>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample + FromSample<f32>,
{
    device.build_output_stream(
        config,
        move |data: &mut [T], _| {
            let mut starved = false;
            for out in data.iter_mut() {
                let sample = consumer.pop().unwrap_or_else(|_| {
                    starved = true;
                    0.0
                });
                *out = T::from_sample(sample.clamp(-1.0, 1.0));
            }
            if starved {
                underruns.fetch_add(1, Ordering::Relaxed);
            }
        },
        |err| tracing::warn!(%err, "output stream error"),
        None,
    )
}

impl AudioNode for CpalSink {
    type Message = ();

    fn process(
        &mut self,
        ctx: &ProcessContext,
        messages: impl Iterator<Item = ()>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        self.feed.process(ctx, messages, inputs, outputs);
    }

    #[inline]
    fn num_inputs(&self) -> usize { 1 }

    #[inline]
    fn num_outputs(&self) -> usize { 0 }
}
