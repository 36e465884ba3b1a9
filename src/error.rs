use thiserror::Error;

/// aacpull's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// aacpull's crate-wide error type.
///
/// End-of-stream is intentionally *not* representable here. Running out of data is an
/// expected terminal condition and is carried by [`crate::source::ReadOutcome`] instead,
/// so callers can't confuse "the stream ended" with "the stream broke".
#[derive(Debug, Error)]
pub enum Error {
    /// A malformed call, e.g. an output buffer too small for a single PCM frame
    /// or a buffer whose sample encoding doesn't match the configured output format.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The container could not be opened or probed.
    #[error("invalid file '{path}': {reason}")]
    InvalidFile { path: String, reason: String },

    /// The container holds no AAC stream.
    #[error("no AAC stream found in container")]
    NoSuchStream,

    /// The selected AAC stream carries no out-of-band AudioSpecificConfig blob.
    #[error("AAC stream is missing its AudioSpecificConfig")]
    MissingCodecConfig,

    /// The decoder rejected the AudioSpecificConfig blob.
    #[error("decoder rejected AudioSpecificConfig: {0}")]
    BadCodecConfig(String),

    /// The demuxer or decoder reported an unrecoverable error mid-stream.
    #[error("decode failed: {0}")]
    DecodeFailed(String),

    /// The decoder produced a frame but never reported valid stream metadata.
    #[error("decoder reported no usable stream info")]
    NoStreamInfo,

    /// The stream contained no decodable frames at all.
    #[error("stream contains no decodable audio frames")]
    EmptyStream,

    /// A decoded frame would overflow the engine's fixed scratch capacity.
    ///
    /// The scratch buffer is a static worst-case bound; overflowing it means the stream
    /// exceeds the channel/frame-size envelope this crate supports.
    #[error("decoded frame needs {needed} samples but scratch capacity is {capacity}")]
    FrameTooLarge { needed: usize, capacity: usize },

    /// The operation requires stream info that is not available yet.
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),

    /// Seeking is not supported by this source.
    #[error("seeking is not supported")]
    SeekNotSupported,
}
