use anyhow::{Context, Result};
use hound::{WavSpec, WavWriter};
use std::path::Path;

use crate::format::SampleFormat;
use crate::source::{PcmSource, ReadOutcome, SamplesMut};

/// How many PCM frames we pull per read while draining.
const CHUNK_FRAMES: usize = 1024;

/// Drain a pull source into a WAV file and return the number of frames written.
///
/// What we write:
/// - 16-bit integer WAV when the source produces `S16`
/// - 32-bit float WAV when the source produces `F32`
///
/// Format requirements:
/// - The source must already know its stream layout (channels and sample rate),
///   which is the case for any source that opened successfully
pub fn write_wav_from_source(source: &mut dyn PcmSource, path: &Path) -> Result<u64> {
    let format = source.data_format();
    if format.channels == 0 || format.sample_rate == 0 {
        anyhow::bail!("cannot write WAV before the stream layout is known");
    }

    let spec = WavSpec {
        channels: format.channels,
        sample_rate: format.sample_rate,
        bits_per_sample: match format.format {
            SampleFormat::S16 => 16,
            SampleFormat::F32 => 32,
        },
        sample_format: match format.format {
            SampleFormat::S16 => hound::SampleFormat::Int,
            SampleFormat::F32 => hound::SampleFormat::Float,
        },
    };

    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("failed to create WAV file at {}", path.display()))?;

    let channels = usize::from(format.channels);
    let mut total_frames = 0u64;

    match format.format {
        SampleFormat::S16 => {
            let mut chunk = vec![0i16; CHUNK_FRAMES * channels];
            loop {
                match source.read_pcm_frames(SamplesMut::S16(&mut chunk))? {
                    ReadOutcome::Frames(frames) => {
                        for &sample in &chunk[..frames as usize * channels] {
                            writer
                                .write_sample(sample)
                                .context("failed to write WAV sample")?;
                        }
                        total_frames += frames;
                    }
                    ReadOutcome::EndOfStream => break,
                }
            }
        }
        SampleFormat::F32 => {
            let mut chunk = vec![0f32; CHUNK_FRAMES * channels];
            loop {
                match source.read_pcm_frames(SamplesMut::F32(&mut chunk))? {
                    ReadOutcome::Frames(frames) => {
                        for &sample in &chunk[..frames as usize * channels] {
                            writer
                                .write_sample(sample)
                                .context("failed to write WAV sample")?;
                        }
                        total_frames += frames;
                    }
                    ReadOutcome::EndOfStream => break,
                }
            }
        }
    }

    writer.finalize().context("failed to finalize WAV file")?;
    tracing::debug!(total_frames, path = %path.display(), "WAV export complete");

    Ok(total_frames)
}
