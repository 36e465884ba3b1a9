//! PCM output formats and stream metadata.
//!
//! The engine's output encoding is fixed at construction to one of two PCM formats.
//! Everything else here (`StreamInfo`, channel maps) only becomes known after the
//! priming decode, so callers must tolerate the zero-valued defaults in
//! [`FormatInfo`] until the first successful read.

use serde::Serialize;

/// The two PCM sample encodings a source can emit.
///
/// Making this a two-variant enum (rather than accepting an open-ended format id and
/// silently falling back) means an unsupported output format is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleFormat {
    /// Signed 16-bit interleaved PCM. The decoder's native output.
    #[default]
    S16,

    /// 32-bit float interleaved PCM in `[-1.0, 1.0]`, converted at the drain boundary.
    F32,
}

/// Stream metadata reported by the decoder core after its first successful decode.
///
/// These values can in principle be refreshed by later decodes, but for a given
/// stream they are expected to stay fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreamInfo {
    /// Number of interleaved channels per PCM frame.
    pub channels: u16,

    /// Output sample rate in Hz.
    pub sample_rate: u32,

    /// Decoded PCM frames per AAC access unit (1024 for AAC-LC, up to 2048 for HE-AAC).
    pub frame_size: u32,
}

/// A speaker position in the fixed standard channel ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Mono,
    FrontLeft,
    FrontRight,
    FrontCenter,
    LowFrequency,
    BackLeft,
    BackRight,
    BackCenter,
    SideLeft,
    SideRight,
}

/// Everything a host needs to interpret the PCM a source produces.
///
/// `channels` and `sample_rate` are zero (and `channel_map` empty) until stream info
/// is known; the output `format` is always known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatInfo {
    pub format: SampleFormat,
    pub channels: u16,
    pub sample_rate: u32,
    pub channel_map: Vec<Channel>,
}

impl FormatInfo {
    /// Format info for a source whose stream metadata is not known yet.
    pub(crate) fn unknown(format: SampleFormat) -> Self {
        Self {
            format,
            channels: 0,
            sample_rate: 0,
            channel_map: Vec::new(),
        }
    }

    pub(crate) fn known(format: SampleFormat, info: StreamInfo) -> Self {
        Self {
            format,
            channels: info.channels,
            sample_rate: info.sample_rate,
            channel_map: standard_channel_map(info.channels).to_vec(),
        }
    }
}

/// The fixed standard channel ordering table, indexed by channel count.
///
/// Matches the conventional AAC/consumer layouts: mono is a lone center, 6.1 places
/// the odd channel at back-center, 7.1 uses side surrounds.
pub fn standard_channel_map(channels: u16) -> &'static [Channel] {
    use Channel::*;

    match channels {
        1 => &[Mono],
        2 => &[FrontLeft, FrontRight],
        3 => &[FrontLeft, FrontRight, FrontCenter],
        4 => &[FrontLeft, FrontRight, BackLeft, BackRight],
        5 => &[FrontLeft, FrontRight, FrontCenter, BackLeft, BackRight],
        6 => &[FrontLeft, FrontRight, FrontCenter, LowFrequency, BackLeft, BackRight],
        7 => &[
            FrontLeft,
            FrontRight,
            FrontCenter,
            LowFrequency,
            BackLeft,
            BackRight,
            BackCenter,
        ],
        8 => &[
            FrontLeft,
            FrontRight,
            FrontCenter,
            LowFrequency,
            BackLeft,
            BackRight,
            SideLeft,
            SideRight,
        ],
        // Unknown or out-of-envelope counts get no positional assignment.
        _ => &[],
    }
}
