//! The decoder-core collaborator contract.
//!
//! Models a stateful AAC decoder with a two-phase drive cycle, the shape native
//! AAC decoders expose: feed one compressed access unit (`fill`), then ask for one
//! decoded PCM frame (`decode_frame`). A decoder may legitimately need several
//! access units before it can emit its first frame, which is the
//! [`DecodeStep::NeedMoreInput`] signal; the engine responds by feeding the next
//! packet rather than treating it as a failure.

use crate::Result;
use crate::format::StreamInfo;

/// The outcome of one decode attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStep {
    /// One PCM frame was written to the output buffer, starting at index 0,
    /// interleaved s16, `samples` values long (`channels * frame_size`).
    Frame {
        /// Total interleaved samples written.
        samples: usize,
    },

    /// The decoder has not accumulated enough compressed input to produce a frame.
    /// Feed another access unit and try again.
    NeedMoreInput,
}

/// A stateful one-frame-at-a-time AAC decoder.
///
/// Lifecycle: `configure` once with the stream's AudioSpecificConfig, then
/// interleave `fill`/`decode_frame` calls. `stream_info` is `None` until the
/// first successful decode.
pub trait AccessUnitDecoder {
    /// Apply the out-of-band AudioSpecificConfig.
    ///
    /// Fails with [`crate::Error::BadCodecConfig`] if the decoder rejects the blob.
    fn configure(&mut self, asc: &[u8]) -> Result<()>;

    /// Feed one compressed access unit into the decoder's input stage.
    ///
    /// A rejection here is fatal ([`crate::Error::DecodeFailed`]); there is no
    /// partial-acceptance mode.
    fn fill(&mut self, access_unit: &[u8]) -> Result<()>;

    /// Decode exactly one PCM frame into `out`.
    ///
    /// Writes interleaved s16 samples from `out[0]`. Fails with
    /// [`crate::Error::FrameTooLarge`] rather than truncating if `out` cannot hold
    /// the frame.
    fn decode_frame(&mut self, out: &mut [i16]) -> Result<DecodeStep>;

    /// Stream metadata, available once the first frame has decoded.
    fn stream_info(&self) -> Option<StreamInfo>;
}
