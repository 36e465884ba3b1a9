//! Default collaborators built on Symphonia.
//!
//! Two adapters live here:
//! - [`SymphoniaDemuxer`] probes a container file and surfaces its stream table and
//!   packets through the [`Demuxer`] contract.
//! - [`SymphoniaAacDecoder`] drives Symphonia's AAC codec through the
//!   fill/decode-one-frame [`AccessUnitDecoder`] contract.
//!
//! Error handling policy mirrors the rest of the crate:
//! - I/O errors while pulling packets are treated as end-of-stream
//!   (streaming-friendly; containers without length headers end this way)
//! - decode errors on an access unit are fatal — the engine has no resync
//!   strategy for a corrupt elementary stream

use std::collections::VecDeque;
use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_AAC, CodecParameters, Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet as SymphoniaPacket};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::decode::{AccessUnitDecoder, DecodeStep};
use crate::demux::{Demuxer, Packet, PacketRead, StreamDesc};
use crate::error::{Error, Result};
use crate::format::StreamInfo;

/// A file-backed demuxer using Symphonia's probe and format readers.
pub struct SymphoniaDemuxer {
    format: Box<dyn FormatReader>,
    streams: Vec<StreamDesc>,

    /// Symphonia track ids, positionally aligned with `streams`.
    track_ids: Vec<u32>,
}

impl std::fmt::Debug for SymphoniaDemuxer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymphoniaDemuxer")
            .field("streams", &self.streams)
            .field("track_ids", &self.track_ids)
            .finish_non_exhaustive()
    }
}

impl SymphoniaDemuxer {
    /// Open and probe a container file.
    ///
    /// The stream table is built once here; AAC identification, the ASC blob, and
    /// the declared frame count all come straight from the probed codec parameters.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|err| Error::InvalidFile {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;

        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|err| Error::InvalidFile {
                path: path.display().to_string(),
                reason: err.to_string(),
            })?;

        let format = probed.format;

        let mut streams = Vec::new();
        let mut track_ids = Vec::new();
        for (index, track) in format.tracks().iter().enumerate() {
            streams.push(StreamDesc {
                index,
                is_aac: track.codec_params.codec == CODEC_TYPE_AAC,
                codec_config: track.codec_params.extra_data.clone(),
                frame_count: track.codec_params.n_frames,
            });
            track_ids.push(track.id);
        }

        tracing::debug!(path = %path.display(), streams = streams.len(), "container probed");

        Ok(Self {
            format,
            streams,
            track_ids,
        })
    }
}

impl Demuxer for SymphoniaDemuxer {
    fn streams(&self) -> &[StreamDesc] {
        &self.streams
    }

    fn next_packet(&mut self) -> Result<PacketRead> {
        match self.format.next_packet() {
            Ok(packet) => {
                let track_id = packet.track_id();
                match self.track_ids.iter().position(|id| *id == track_id) {
                    Some(stream_index) => Ok(PacketRead::Packet(Packet {
                        stream_index,
                        data: packet.data,
                    })),
                    None => {
                        // A packet from a track that wasn't in the probed table;
                        // nothing useful to do with it but ask again.
                        tracing::trace!(track_id, "dropping packet from unknown track");
                        Ok(PacketRead::Retry)
                    }
                }
            }

            // Treat I/O errors as graceful end-of-stream.
            Err(SymphoniaError::IoError(_)) => Ok(PacketRead::EndOfStream),

            Err(SymphoniaError::ResetRequired) => Err(Error::DecodeFailed(
                "track list changed mid-stream".to_string(),
            )),

            Err(err) => Err(Error::DecodeFailed(format!("packet read failed: {err}"))),
        }
    }
}

/// An [`AccessUnitDecoder`] over Symphonia's AAC codec.
///
/// `fill` queues access units; `decode_frame` pops one, decodes it, and copies the
/// interleaved s16 output into the caller's buffer. Stream info is captured from
/// the decoded signal spec, with the per-access-unit frame count as `frame_size`.
pub struct SymphoniaAacDecoder {
    decoder: Option<Box<dyn Decoder>>,
    queue: VecDeque<Box<[u8]>>,

    // Scratch used to interleave Symphonia's decoded (possibly planar) buffers.
    sample_buf: Option<SampleBuffer<i16>>,

    info: Option<StreamInfo>,
}

impl SymphoniaAacDecoder {
    /// An unconfigured decoder. `configure` must run before any decode call.
    pub fn new() -> Self {
        Self {
            decoder: None,
            queue: VecDeque::new(),
            sample_buf: None,
            info: None,
        }
    }
}

impl Default for SymphoniaAacDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessUnitDecoder for SymphoniaAacDecoder {
    fn configure(&mut self, asc: &[u8]) -> Result<()> {
        let mut params = CodecParameters::new();
        params
            .for_codec(CODEC_TYPE_AAC)
            .with_extra_data(asc.to_vec().into_boxed_slice());

        let decoder = symphonia::default::get_codecs()
            .make(&params, &DecoderOptions::default())
            .map_err(|err| Error::BadCodecConfig(err.to_string()))?;

        self.decoder = Some(decoder);
        self.queue.clear();
        self.sample_buf = None;
        self.info = None;

        Ok(())
    }

    fn fill(&mut self, access_unit: &[u8]) -> Result<()> {
        if self.decoder.is_none() {
            return Err(Error::DecodeFailed("fill before configure".to_string()));
        }

        self.queue.push_back(access_unit.to_vec().into_boxed_slice());
        Ok(())
    }

    fn decode_frame(&mut self, out: &mut [i16]) -> Result<DecodeStep> {
        let decoder = self
            .decoder
            .as_mut()
            .ok_or_else(|| Error::DecodeFailed("decode before configure".to_string()))?;

        let Some(access_unit) = self.queue.pop_front() else {
            return Ok(DecodeStep::NeedMoreInput);
        };

        let packet = SymphoniaPacket::new_from_boxed_slice(0, 0, 0, access_unit);

        let decoded = decoder
            .decode(&packet)
            .map_err(|err| Error::DecodeFailed(err.to_string()))?;

        let spec = *decoded.spec();
        let frames = decoded.frames();

        if self.sample_buf.is_none() {
            self.sample_buf = Some(SampleBuffer::<i16>::new(decoded.capacity() as u64, spec));
        }

        let buf = self
            .sample_buf
            .as_mut()
            .ok_or_else(|| Error::DecodeFailed("sample buffer not initialized".to_string()))?;

        // Copy decoded PCM into the interleaved scratch, then out to the caller.
        buf.copy_interleaved_ref(decoded);
        let samples = buf.samples();

        if samples.len() > out.len() {
            return Err(Error::FrameTooLarge {
                needed: samples.len(),
                capacity: out.len(),
            });
        }

        out[..samples.len()].copy_from_slice(samples);

        self.info = Some(StreamInfo {
            channels: spec.channels.count() as u16,
            sample_rate: spec.rate,
            frame_size: frames as u32,
        });

        Ok(DecodeStep::Frame {
            samples: samples.len(),
        })
    }

    fn stream_info(&self) -> Option<StreamInfo> {
        self.info
    }
}
