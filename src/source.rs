//! The generic pull-source contract audio hosts consume.
//!
//! This is the five-method read/seek/format/cursor/length interface the decode
//! engine is mounted into. It is object-safe on purpose: hosts hold a
//! `Box<dyn PcmSource>` and neither know nor care what codec sits behind it.

use crate::Result;
use crate::format::FormatInfo;

/// A mutable, caller-supplied destination for interleaved PCM frames.
///
/// The variant must match the source's configured [`crate::format::SampleFormat`];
/// a mismatch is rejected with `InvalidArgument` rather than converted silently.
#[derive(Debug)]
pub enum SamplesMut<'a> {
    S16(&'a mut [i16]),
    F32(&'a mut [f32]),
}

impl SamplesMut<'_> {
    /// Total interleaved sample slots in the buffer.
    pub fn len(&self) -> usize {
        match self {
            SamplesMut::S16(buf) => buf.len(),
            SamplesMut::F32(buf) => buf.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The outcome of a successful `read_pcm_frames` call.
///
/// End-of-stream is a value here, not an error: a partial read near the end of the
/// stream still reports `Frames(n)`, and the *next* read reports `EndOfStream`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// `frames` complete PCM frames were written. Always nonzero.
    Frames(u64),

    /// No frames were written because the stream is exhausted.
    EndOfStream,
}

impl ReadOutcome {
    /// Frames written, treating end-of-stream as zero.
    pub fn frames(&self) -> u64 {
        match self {
            ReadOutcome::Frames(n) => *n,
            ReadOutcome::EndOfStream => 0,
        }
    }
}

/// A pull-based stream of interleaved PCM frames with position/length queries.
pub trait PcmSource {
    /// Fill `out` with as many complete PCM frames as it can hold.
    ///
    /// May return fewer frames than requested only when the stream is about to end
    /// or a fatal error will surface on the next call. Never returns
    /// `ReadOutcome::Frames(0)`.
    fn read_pcm_frames(&mut self, out: SamplesMut<'_>) -> Result<ReadOutcome>;

    /// Reposition the stream to `frame`.
    ///
    /// Sources that report `supports_seeking() == false` fail with
    /// [`crate::Error::SeekNotSupported`].
    fn seek_to_pcm_frame(&mut self, frame: u64) -> Result<()>;

    /// Whether `seek_to_pcm_frame` can actually reposition this source.
    fn supports_seeking(&self) -> bool;

    /// The output format, plus stream metadata when known (zero-valued before the
    /// first successful decode).
    fn data_format(&self) -> FormatInfo;

    /// Current playback position: total PCM frames delivered since open. Monotonic.
    fn cursor_in_pcm_frames(&self) -> u64;

    /// Estimated total PCM frame count of the stream.
    ///
    /// An estimate derived from container metadata, not authoritative. Fails with
    /// [`crate::Error::InvalidOperation`] before stream info is known.
    fn length_in_pcm_frames(&self) -> Result<u64>;
}
