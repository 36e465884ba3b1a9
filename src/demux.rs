//! The demuxer collaborator contract.
//!
//! The engine does not parse containers itself. It drives an external demuxer that:
//! - exposes the container's stream table (codec identity, out-of-band codec config,
//!   declared frame count)
//! - yields packets tagged with the stream they belong to
//!
//! The default implementation is [`crate::backends::symphonia::SymphoniaDemuxer`];
//! tests drive the engine with scripted in-memory demuxers instead.

use crate::Result;

/// One entry in a container's stream table.
#[derive(Debug, Clone)]
pub struct StreamDesc {
    /// Position of this stream in the demuxer's stream table. Packet
    /// [`Packet::stream_index`] values refer back to this.
    pub index: usize,

    /// Whether the stream's codec identifies as AAC. The engine selects the first
    /// stream with this set.
    pub is_aac: bool,

    /// Out-of-band AudioSpecificConfig blob, when the container carries one.
    /// Raw AAC decoding cannot start without it.
    pub codec_config: Option<Box<[u8]>>,

    /// The container's declared total frame (packet) count for this stream, if known.
    /// Combined with the decoded frame size this estimates total PCM length.
    pub frame_count: Option<u64>,
}

/// One compressed container packet.
#[derive(Debug, Clone)]
pub struct Packet {
    /// Index into the demuxer's stream table identifying the owning stream.
    pub stream_index: usize,

    /// The packet payload: for an AAC stream, one access unit.
    pub data: Box<[u8]>,
}

/// The outcome of asking the demuxer for its next packet.
#[derive(Debug, Clone)]
pub enum PacketRead {
    /// A packet was produced. It may belong to any stream; filtering is the caller's job.
    Packet(Packet),

    /// A transient condition: nothing available right now, ask again.
    /// Never surfaced past the engine's refill loop.
    Retry,

    /// The container has no more packets. A status, not an error.
    EndOfStream,
}

/// A container demuxer the engine can pull packets from.
///
/// Implementations own their underlying I/O; all calls are blocking and the engine
/// issues them from a single thread.
pub trait Demuxer {
    /// The container's stream table. Fixed for the lifetime of the demuxer.
    fn streams(&self) -> &[StreamDesc];

    /// Pull the next packet in container order.
    ///
    /// Fatal container errors are `Err`; running out of packets is
    /// [`PacketRead::EndOfStream`].
    fn next_packet(&mut self) -> Result<PacketRead>;
}
