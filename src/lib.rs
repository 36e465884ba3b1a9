//! `aacpull` — pull-based PCM frame streaming for AAC audio.
//!
//! This crate provides:
//! - A streaming decode-buffer engine ([`aac::AacSource`]) that decodes one
//!   access unit at a time and serves interleaved PCM frames on demand
//! - A generic pull-source contract ([`source::PcmSource`]) for mounting the
//!   engine into hosts that read on their own schedule
//! - Default demuxing and decoding collaborators built on Symphonia
//! - WAV export for draining a source to disk
//!
//! The library is designed for hosts that pull audio from a mixer or playback
//! callback, with an emphasis on bounded memory and predictable reads.

// High-level API (most consumers should start here).
pub mod aac;
pub mod opts;

// The pull contract and the shared format vocabulary.
pub mod format;
pub mod source;

// Collaborator contracts the engine drives.
pub mod decode;
pub mod demux;

// Default collaborator implementations.
pub mod backends;

// Draining a source into a WAV file.
pub mod wav;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;

pub mod error;

pub use error::{Error, Result};
