//! The streaming decode-buffer engine.
//!
//! [`AacSource`] turns a compressed AAC/HE-AAC elementary stream into a pull-based
//! stream of interleaved PCM frames. It reconciles three different notions of
//! "frame" — container packet, compressed access unit, decoded PCM frame — behind
//! a single monotonic read cursor:
//!
//! - `demux` supplies container packets tagged by stream index
//! - `decode` turns access units into decoded PCM, one frame per call
//! - this module owns the scratch buffer between the two and drains it into
//!   caller-supplied output in exact frame-count units
//!
//! The engine is synchronous and single-owner: every call runs to completion on the
//! calling thread, and nothing here is safe to share without external locking.

use std::path::Path;

use crate::backends::symphonia::{SymphoniaAacDecoder, SymphoniaDemuxer};
use crate::decode::{AccessUnitDecoder, DecodeStep};
use crate::demux::{Demuxer, PacketRead};
use crate::error::{Error, Result};
use crate::format::{FormatInfo, SampleFormat, StreamInfo};
use crate::opts::Opts;
use crate::source::{PcmSource, ReadOutcome, SamplesMut};

/// Widest channel layout the scratch buffer is sized for (7.1 surround).
pub const MAX_CHANNELS: usize = 8;

/// Largest per-frame PCM sample count an AAC access unit can decode to (HE-AAC).
pub const MAX_FRAME_SIZE: usize = 2048;

/// Fixed scratch capacity in interleaved samples: one worst-case decoded frame.
///
/// This is a documented static upper bound, checked explicitly when stream info is
/// learned; it is never reallocated and output is never silently truncated.
const SCRATCH_CAPACITY: usize = MAX_CHANNELS * MAX_FRAME_SIZE;

// Conservative layout used only if stream info is somehow absent. Should not be
// reachable after a successful open, since the priming decode populates the info.
const FALLBACK_CHANNELS: usize = 2;
const FALLBACK_FRAME_SIZE: usize = 1024;

/// What one refill pass produced.
enum Refill {
    /// One freshly decoded PCM frame sits in the scratch buffer.
    Frame,

    /// The demuxer is out of packets.
    EndOfStream,
}

/// A pull-based PCM source backed by an AAC elementary stream.
///
/// `AacSource` owns its collaborators for its entire lifetime: the demuxer and the
/// decoder core are created in (or injected into) the constructor and released on
/// drop, covering the partial-failure paths of `open` as well.
///
/// Construction performs a *priming decode* — one full refill — so that channel
/// count, sample rate, and frame size are known before the first format query.
pub struct AacSource {
    demuxer: Box<dyn Demuxer>,
    decoder: Box<dyn AccessUnitDecoder>,

    /// Output encoding, fixed at construction.
    format: SampleFormat,

    /// Holds one decoded access unit's worth of interleaved s16 PCM.
    scratch: Vec<i16>,

    /// Index of the first unconsumed interleaved sample in `scratch`;
    /// `None` means no buffered data.
    scratch_cursor: Option<usize>,

    /// PCM frames delivered to callers since open. Only ever advanced by the exact
    /// count a read call copied out.
    pcm_cursor: u64,

    /// Stream metadata cached from the first successful decode.
    info: Option<StreamInfo>,

    /// Index of the selected AAC stream in the demuxer's stream table.
    stream_index: usize,

    /// The container's declared frame count for the selected stream, if any.
    declared_frames: Option<u64>,
}

impl std::fmt::Debug for AacSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AacSource")
            .field("format", &self.format)
            .field("scratch_cursor", &self.scratch_cursor)
            .field("pcm_cursor", &self.pcm_cursor)
            .field("info", &self.info)
            .field("stream_index", &self.stream_index)
            .field("declared_frames", &self.declared_frames)
            .finish_non_exhaustive()
    }
}

impl AacSource {
    /// Open a container file and build a source over its first AAC stream.
    ///
    /// Uses the built-in Symphonia-backed demuxer and decoder. Fails fast: a
    /// container that cannot be probed, a missing AAC stream, a missing or rejected
    /// AudioSpecificConfig, and a stream with no decodable frames are all errors
    /// here rather than surprises during the first read.
    pub fn open(path: impl AsRef<Path>, opts: &Opts) -> Result<Self> {
        let demuxer = SymphoniaDemuxer::open(path.as_ref())?;
        let decoder = SymphoniaAacDecoder::new();
        Self::with_collaborators(Box::new(demuxer), Box::new(decoder), opts)
    }

    /// Build a source from externally constructed collaborators.
    ///
    /// The source takes ownership of both; their lifetime is the source's lifetime.
    /// This is also the seam tests use to drive the engine with scripted
    /// collaborators.
    pub fn with_collaborators(
        demuxer: Box<dyn Demuxer>,
        mut decoder: Box<dyn AccessUnitDecoder>,
        opts: &Opts,
    ) -> Result<Self> {
        let (stream_index, asc, declared_frames) = {
            let desc = demuxer
                .streams()
                .iter()
                .find(|s| s.is_aac)
                .ok_or(Error::NoSuchStream)?;

            let asc = desc
                .codec_config
                .clone()
                .filter(|config| !config.is_empty())
                .ok_or(Error::MissingCodecConfig)?;

            (desc.index, asc, desc.frame_count)
        };

        decoder.configure(&asc)?;

        let mut source = Self {
            demuxer,
            decoder,
            format: opts.format,
            scratch: vec![0; SCRATCH_CAPACITY],
            scratch_cursor: None,
            pcm_cursor: 0,
            info: None,
            stream_index,
            declared_frames,
        };

        // Priming decode: learn the stream layout and load the first frame.
        match source.refill()? {
            Refill::Frame => {}
            Refill::EndOfStream => return Err(Error::EmptyStream),
        }

        let info = source.info;
        tracing::debug!(stream_index, ?info, "aac source opened");

        Ok(source)
    }

    /// Fill `out` with as many complete PCM frames as it can hold.
    ///
    /// The requested frame count is the number of whole frames `out` holds at the
    /// current channel count; trailing sample slots that don't make up a whole
    /// frame are left untouched. A buffer that holds no complete frame, or whose
    /// encoding doesn't match the configured output format, is `InvalidArgument`.
    ///
    /// Partial reads are normal at the end of the stream: the remaining frames are
    /// returned as `Frames(n)` and the next call reports `EndOfStream`.
    pub fn read_pcm_frames(&mut self, out: SamplesMut<'_>) -> Result<ReadOutcome> {
        match out {
            SamplesMut::S16(buf) => self.read_frames_into(buf),
            SamplesMut::F32(buf) => self.read_frames_into(buf),
        }
    }

    /// The output format, plus channel count / sample rate / channel map when known.
    pub fn data_format(&self) -> FormatInfo {
        match self.info {
            Some(info) => FormatInfo::known(self.format, info),
            None => FormatInfo::unknown(self.format),
        }
    }

    /// Total PCM frames delivered since open.
    pub fn cursor_in_pcm_frames(&self) -> u64 {
        self.pcm_cursor
    }

    /// Estimated total PCM frames: the container's declared frame count times the
    /// decoded frame size.
    ///
    /// An estimate, not authoritative — containers count compressed frames, and the
    /// declared count can be absent (treated as zero). Requires stream info.
    pub fn length_in_pcm_frames(&self) -> Result<u64> {
        let info = self
            .info
            .ok_or(Error::InvalidOperation("length requires stream info"))?;

        Ok(self.declared_frames.unwrap_or(0) * u64::from(info.frame_size))
    }

    /// Interleaved channel count and per-frame sample count currently in effect.
    fn layout(&self) -> (usize, usize) {
        match self.info {
            Some(info) => (info.channels as usize, info.frame_size as usize),
            None => (FALLBACK_CHANNELS, FALLBACK_FRAME_SIZE),
        }
    }

    fn read_frames_into<S: OutputSample>(&mut self, out: &mut [S]) -> Result<ReadOutcome> {
        if S::FORMAT != self.format {
            return Err(Error::InvalidArgument(
                "output buffer encoding does not match the configured sample format",
            ));
        }

        let (channels, _) = self.layout();
        let requested = (out.len() / channels) as u64;
        if requested == 0 {
            return Err(Error::InvalidArgument(
                "output buffer holds no complete PCM frame",
            ));
        }

        let mut written: u64 = 0;

        loop {
            // Layout is re-read every pass; a refill may have just populated it.
            let (channels, frame_size) = self.layout();
            let valid_end = channels * frame_size;

            if let Some(start) = self.scratch_cursor {
                let mut cursor = start;

                while cursor < valid_end && written < requested {
                    let base = written as usize * channels;
                    for ch in 0..channels {
                        out[base + ch] = S::from_i16(self.scratch[cursor + ch]);
                    }
                    cursor += channels;
                    written += 1;
                }

                self.scratch_cursor = Some(cursor);

                if written == requested {
                    break;
                }
            }

            // Valid region exhausted (or never filled): decode another frame.
            match self.refill() {
                Ok(Refill::Frame) => {}
                Ok(Refill::EndOfStream) => break,
                Err(err) => {
                    if written == 0 {
                        return Err(err);
                    }
                    // The frames already copied are valid; report them and let the
                    // next call surface the failure.
                    tracing::debug!(error = %err, frames = written, "refill failed after partial read");
                    break;
                }
            }
        }

        self.pcm_cursor += written;

        if written == 0 {
            Ok(ReadOutcome::EndOfStream)
        } else {
            Ok(ReadOutcome::Frames(written))
        }
    }

    /// Decode exactly one PCM frame into the scratch buffer, or report why none is
    /// available.
    ///
    /// Loops over container packets: transient retries and packets belonging to
    /// other streams are skipped without consuming a decode attempt, and a decoder
    /// that needs more compressed input is simply fed the next packet. Only runs
    /// once the previous valid region is fully drained, so resetting the cursor
    /// discards nothing.
    fn refill(&mut self) -> Result<Refill> {
        loop {
            let packet = match self.demuxer.next_packet()? {
                PacketRead::Packet(packet) => packet,
                PacketRead::Retry => continue,
                PacketRead::EndOfStream => {
                    tracing::trace!("demuxer reached end of stream");
                    return Ok(Refill::EndOfStream);
                }
            };

            if packet.stream_index != self.stream_index {
                continue;
            }

            self.decoder.fill(&packet.data)?;

            match self.decoder.decode_frame(&mut self.scratch)? {
                DecodeStep::NeedMoreInput => continue,
                DecodeStep::Frame { samples } => {
                    self.scratch_cursor = Some(0);

                    if self.info.is_none() {
                        let info = self.decoder.stream_info().ok_or(Error::NoStreamInfo)?;
                        if info.sample_rate == 0 || info.channels == 0 {
                            return Err(Error::NoStreamInfo);
                        }

                        let needed = info.channels as usize * info.frame_size as usize;
                        if needed > self.scratch.len() {
                            return Err(Error::FrameTooLarge {
                                needed,
                                capacity: self.scratch.len(),
                            });
                        }

                        tracing::debug!(
                            channels = info.channels,
                            sample_rate = info.sample_rate,
                            frame_size = info.frame_size,
                            "stream info learned from first decoded frame"
                        );
                        self.info = Some(info);
                    }

                    tracing::trace!(samples, "decoded one frame into scratch buffer");
                    return Ok(Refill::Frame);
                }
            }
        }
    }
}

impl PcmSource for AacSource {
    fn read_pcm_frames(&mut self, out: SamplesMut<'_>) -> Result<ReadOutcome> {
        AacSource::read_pcm_frames(self, out)
    }

    /// Seeking is advertised as unsupported rather than silently accepted: the
    /// cursor never goes stale behind the host's back.
    fn seek_to_pcm_frame(&mut self, _frame: u64) -> Result<()> {
        Err(Error::SeekNotSupported)
    }

    fn supports_seeking(&self) -> bool {
        false
    }

    fn data_format(&self) -> FormatInfo {
        AacSource::data_format(self)
    }

    fn cursor_in_pcm_frames(&self) -> u64 {
        AacSource::cursor_in_pcm_frames(self)
    }

    fn length_in_pcm_frames(&self) -> Result<u64> {
        AacSource::length_in_pcm_frames(self)
    }
}

impl Drop for AacSource {
    fn drop(&mut self) {
        // Collaborators and scratch release with the struct; this just records it.
        tracing::debug!(frames_delivered = self.pcm_cursor, "aac source closed");
    }
}

/// A PCM sample encoding the drain loop can emit.
trait OutputSample: Copy {
    const FORMAT: SampleFormat;

    fn from_i16(v: i16) -> Self;
}

impl OutputSample for i16 {
    const FORMAT: SampleFormat = SampleFormat::S16;

    fn from_i16(v: i16) -> Self {
        v
    }
}

impl OutputSample for f32 {
    const FORMAT: SampleFormat = SampleFormat::F32;

    fn from_i16(v: i16) -> Self {
        f32::from(v) / f32::from(i16::MAX)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::demux::Packet;
    use crate::demux::StreamDesc;

    const CHANNELS: u16 = 2;
    const FRAME_SIZE: u32 = 1024;

    /// A demuxer that replays a fixed script of packet events.
    struct ScriptDemuxer {
        streams: Vec<StreamDesc>,
        events: VecDeque<Result<PacketRead>>,
        pulls: Arc<AtomicUsize>,
        fail_when_empty: bool,
    }

    impl Demuxer for ScriptDemuxer {
        fn streams(&self) -> &[StreamDesc] {
            &self.streams
        }

        fn next_packet(&mut self) -> Result<PacketRead> {
            self.pulls.fetch_add(1, Ordering::Relaxed);
            match self.events.pop_front() {
                Some(event) => event,
                None if self.fail_when_empty => {
                    Err(Error::DecodeFailed("container read error".into()))
                }
                None => Ok(PacketRead::EndOfStream),
            }
        }
    }

    /// A decoder that writes a deterministic per-access-unit sample pattern.
    ///
    /// Each decoded sample is `seed * 10_000 + slot`, where `seed` is the first
    /// payload byte of the access unit, so tests can verify which access unit a
    /// sample came from and that interleaving order survived the drain loop.
    struct PatternDecoder {
        info: StreamInfo,
        report_info: bool,
        pending_seed: Option<u8>,
        starve: usize,
        configured: bool,
    }

    impl PatternDecoder {
        fn stereo() -> Self {
            Self {
                info: StreamInfo {
                    channels: CHANNELS,
                    sample_rate: 44_100,
                    frame_size: FRAME_SIZE,
                },
                report_info: true,
                pending_seed: None,
                starve: 0,
                configured: false,
            }
        }
    }

    impl AccessUnitDecoder for PatternDecoder {
        fn configure(&mut self, asc: &[u8]) -> Result<()> {
            assert!(!asc.is_empty());
            self.configured = true;
            Ok(())
        }

        fn fill(&mut self, access_unit: &[u8]) -> Result<()> {
            self.pending_seed = Some(access_unit[0]);
            Ok(())
        }

        fn decode_frame(&mut self, out: &mut [i16]) -> Result<DecodeStep> {
            assert!(self.configured, "decode before configure");

            let seed = self
                .pending_seed
                .take()
                .ok_or(Error::DecodeFailed("decode without fill".into()))?;

            if self.starve > 0 {
                self.starve -= 1;
                return Ok(DecodeStep::NeedMoreInput);
            }

            let samples = self.info.channels as usize * self.info.frame_size as usize;
            if samples > out.len() {
                return Err(Error::FrameTooLarge {
                    needed: samples,
                    capacity: out.len(),
                });
            }

            for (slot, value) in out.iter_mut().take(samples).enumerate() {
                *value = sample_value(seed, slot);
            }

            Ok(DecodeStep::Frame { samples })
        }

        fn stream_info(&self) -> Option<StreamInfo> {
            self.report_info.then_some(self.info)
        }
    }

    fn sample_value(seed: u8, slot: usize) -> i16 {
        i16::from(seed) * 10_000 + slot as i16
    }

    fn aac_stream(frame_count: Option<u64>) -> StreamDesc {
        StreamDesc {
            index: 0,
            is_aac: true,
            codec_config: Some(vec![0x12, 0x10].into_boxed_slice()),
            frame_count,
        }
    }

    fn au(stream_index: usize, seed: u8) -> Result<PacketRead> {
        Ok(PacketRead::Packet(Packet {
            stream_index,
            data: vec![seed].into_boxed_slice(),
        }))
    }

    fn demuxer(
        streams: Vec<StreamDesc>,
        events: Vec<Result<PacketRead>>,
    ) -> (Box<ScriptDemuxer>, Arc<AtomicUsize>) {
        let pulls = Arc::new(AtomicUsize::new(0));
        let demuxer = Box::new(ScriptDemuxer {
            streams,
            events: events.into(),
            pulls: Arc::clone(&pulls),
            fail_when_empty: false,
        });
        (demuxer, pulls)
    }

    /// A stereo source fed `access_units` sequential access units (seeds 0, 1, ...).
    fn stereo_source(access_units: u8) -> (AacSource, Arc<AtomicUsize>) {
        let events = (0..access_units).map(|seed| au(0, seed)).collect();
        let (demuxer, pulls) = demuxer(vec![aac_stream(None)], events);
        let source =
            AacSource::with_collaborators(demuxer, Box::new(PatternDecoder::stereo()), &Opts::default())
                .expect("open stereo source");
        (source, pulls)
    }

    #[test]
    fn cursor_is_zero_after_open() {
        let (source, pulls) = stereo_source(2);
        assert_eq!(source.cursor_in_pcm_frames(), 0);
        // The priming decode consumed exactly one packet.
        assert_eq!(pulls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn open_without_aac_stream_fails() {
        let other = StreamDesc {
            index: 0,
            is_aac: false,
            codec_config: None,
            frame_count: None,
        };
        let (demuxer, _) = demuxer(vec![other], vec![]);
        let err =
            AacSource::with_collaborators(demuxer, Box::new(PatternDecoder::stereo()), &Opts::default())
                .unwrap_err();
        assert!(matches!(err, Error::NoSuchStream));
    }

    #[test]
    fn open_without_codec_config_fails() {
        let mut desc = aac_stream(None);
        desc.codec_config = Some(Box::new([]));
        let (demuxer, _) = demuxer(vec![desc], vec![]);
        let err =
            AacSource::with_collaborators(demuxer, Box::new(PatternDecoder::stereo()), &Opts::default())
                .unwrap_err();
        assert!(matches!(err, Error::MissingCodecConfig));
    }

    #[test]
    fn open_with_zero_frame_file_fails() {
        let (demuxer, _) = demuxer(vec![aac_stream(None)], vec![]);
        let err =
            AacSource::with_collaborators(demuxer, Box::new(PatternDecoder::stereo()), &Opts::default())
                .unwrap_err();
        assert!(matches!(err, Error::EmptyStream));
    }

    #[test]
    fn open_without_stream_info_fails() {
        let mut decoder = PatternDecoder::stereo();
        decoder.report_info = false;
        let (demuxer, _) = demuxer(vec![aac_stream(None)], vec![au(0, 0)]);
        let err = AacSource::with_collaborators(demuxer, Box::new(decoder), &Opts::default())
            .unwrap_err();
        assert!(matches!(err, Error::NoStreamInfo));
    }

    #[test]
    fn oversized_frame_is_rejected_not_truncated() {
        let mut decoder = PatternDecoder::stereo();
        decoder.info.channels = MAX_CHANNELS as u16;
        decoder.info.frame_size = (2 * MAX_FRAME_SIZE) as u32;
        let (demuxer, _) = demuxer(vec![aac_stream(None)], vec![au(0, 0)]);
        let err = AacSource::with_collaborators(demuxer, Box::new(decoder), &Opts::default())
            .unwrap_err();
        assert!(matches!(err, Error::FrameTooLarge { .. }));
    }

    #[test]
    fn priming_skips_retries_and_foreign_streams() {
        let streams = vec![
            StreamDesc {
                index: 0,
                is_aac: false,
                codec_config: None,
                frame_count: None,
            },
            StreamDesc {
                index: 1,
                is_aac: true,
                codec_config: Some(vec![0x12, 0x10].into_boxed_slice()),
                frame_count: None,
            },
        ];
        let events = vec![Ok(PacketRead::Retry), au(0, 9), au(1, 0)];
        let (demuxer, pulls) = demuxer(streams, events);

        let mut source =
            AacSource::with_collaborators(demuxer, Box::new(PatternDecoder::stereo()), &Opts::default())
                .expect("open");
        assert_eq!(pulls.load(Ordering::Relaxed), 3);

        let mut out = vec![0i16; 4];
        let outcome = source.read_pcm_frames(SamplesMut::S16(&mut out)).unwrap();
        assert_eq!(outcome, ReadOutcome::Frames(2));
        assert_eq!(out, vec![0, 1, 2, 3]);
    }

    #[test]
    fn need_more_input_feeds_additional_packets() {
        let mut decoder = PatternDecoder::stereo();
        decoder.starve = 1;
        let (demuxer, pulls) = demuxer(vec![aac_stream(None)], vec![au(0, 0), au(0, 1)]);
        let mut source = AacSource::with_collaborators(demuxer, Box::new(decoder), &Opts::default())
            .expect("open");

        // Both access units were consumed to produce the priming frame.
        assert_eq!(pulls.load(Ordering::Relaxed), 2);

        // The frame that finally decoded carries the second access unit's seed.
        let mut out = vec![0i16; 2];
        source.read_pcm_frames(SamplesMut::S16(&mut out)).unwrap();
        assert_eq!(out, vec![sample_value(1, 0), sample_value(1, 1)]);
    }

    #[test]
    fn partial_read_leaves_remainder_buffered() {
        let (mut source, pulls) = stereo_source(2);

        let mut out = vec![0i16; 1000];
        let outcome = source.read_pcm_frames(SamplesMut::S16(&mut out)).unwrap();
        assert_eq!(outcome, ReadOutcome::Frames(500));
        assert_eq!(source.cursor_in_pcm_frames(), 500);

        // 524 frames remain buffered; no second refill happened.
        assert_eq!(pulls.load(Ordering::Relaxed), 1);

        // Draining exactly the remainder still doesn't trigger a refill.
        let mut rest = vec![0i16; 524 * 2];
        let outcome = source.read_pcm_frames(SamplesMut::S16(&mut rest)).unwrap();
        assert_eq!(outcome, ReadOutcome::Frames(524));
        assert_eq!(pulls.load(Ordering::Relaxed), 1);
        assert_eq!(rest[0], sample_value(0, 1000));
    }

    #[test]
    fn reads_sum_to_stream_total_then_end_of_stream() {
        let (mut source, _) = stereo_source(2);

        let mut total = 0u64;
        loop {
            let mut out = vec![0i16; 1200];
            match source.read_pcm_frames(SamplesMut::S16(&mut out)).unwrap() {
                ReadOutcome::Frames(n) => {
                    assert!(n <= 600);
                    total += n;
                }
                ReadOutcome::EndOfStream => break,
            }
        }

        assert_eq!(total, 2 * u64::from(FRAME_SIZE));
        assert_eq!(source.cursor_in_pcm_frames(), total);

        // Subsequent reads keep reporting end-of-stream.
        let mut out = vec![0i16; 4];
        let outcome = source.read_pcm_frames(SamplesMut::S16(&mut out)).unwrap();
        assert_eq!(outcome, ReadOutcome::EndOfStream);
    }

    #[test]
    fn interleaving_is_channel_consecutive() {
        let (mut source, _) = stereo_source(1);

        let mut out = vec![0i16; 12];
        source.read_pcm_frames(SamplesMut::S16(&mut out)).unwrap();

        for frame in 0..6 {
            let base = frame * CHANNELS as usize;
            assert_eq!(out[base], sample_value(0, base));
            assert_eq!(out[base + 1], sample_value(0, base + 1));
        }
    }

    #[test]
    fn read_spanning_refill_loses_and_duplicates_nothing() {
        let (mut source, _) = stereo_source(2);

        let mut out = vec![0i16; 2 * 2048];
        let outcome = source.read_pcm_frames(SamplesMut::S16(&mut out)).unwrap();
        assert_eq!(outcome, ReadOutcome::Frames(2048));

        // The boundary between the two decoded frames is seamless.
        assert_eq!(out[2047], sample_value(0, 2047));
        assert_eq!(out[2048], sample_value(1, 0));
    }

    #[test]
    fn f32_output_scales_samples() {
        let events = vec![au(0, 0)];
        let (demuxer, _) = demuxer(vec![aac_stream(None)], events);
        let opts = Opts {
            format: SampleFormat::F32,
        };
        let mut source =
            AacSource::with_collaborators(demuxer, Box::new(PatternDecoder::stereo()), &opts)
                .expect("open");

        let mut out = vec![0f32; 4];
        source.read_pcm_frames(SamplesMut::F32(&mut out)).unwrap();

        for (slot, value) in out.iter().enumerate() {
            let expected = f32::from(sample_value(0, slot)) / f32::from(i16::MAX);
            assert!((value - expected).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn mismatched_buffer_encoding_is_rejected() {
        let (mut source, _) = stereo_source(1);
        let mut out = vec![0f32; 4];
        let err = source
            .read_pcm_frames(SamplesMut::F32(&mut out))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(source.cursor_in_pcm_frames(), 0);
    }

    #[test]
    fn undersized_buffer_is_rejected() {
        let (mut source, _) = stereo_source(1);
        let mut out = vec![0i16; 1]; // less than one stereo frame
        let err = source
            .read_pcm_frames(SamplesMut::S16(&mut out))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn partial_frames_are_returned_before_error_surfaces() {
        let pulls = Arc::new(AtomicUsize::new(0));
        let demuxer = Box::new(ScriptDemuxer {
            streams: vec![aac_stream(None)],
            events: VecDeque::from([au(0, 0)]),
            pulls: Arc::clone(&pulls),
            fail_when_empty: true,
        });
        let mut source =
            AacSource::with_collaborators(demuxer, Box::new(PatternDecoder::stereo()), &Opts::default())
                .expect("open");

        // First read: one decoded frame's worth succeeds, then the refill fails.
        let mut out = vec![0i16; 4096];
        let outcome = source.read_pcm_frames(SamplesMut::S16(&mut out)).unwrap();
        assert_eq!(outcome, ReadOutcome::Frames(1024));

        // With nothing buffered, the failure now surfaces.
        let err = source
            .read_pcm_frames(SamplesMut::S16(&mut out))
            .unwrap_err();
        assert!(matches!(err, Error::DecodeFailed(_)));
        assert_eq!(source.cursor_in_pcm_frames(), 1024);
    }

    #[test]
    fn length_is_declared_frames_times_frame_size() {
        let events = vec![au(0, 0)];
        let (demuxer, _) = demuxer(vec![aac_stream(Some(9261))], events);
        let source =
            AacSource::with_collaborators(demuxer, Box::new(PatternDecoder::stereo()), &Opts::default())
                .expect("open");

        assert_eq!(source.length_in_pcm_frames().unwrap(), 9_483_264);
    }

    #[test]
    fn length_without_stream_info_is_invalid_operation() {
        let (mut source, _) = stereo_source(1);
        source.info = None;

        let err = source.length_in_pcm_frames().unwrap_err();
        assert!(matches!(err, Error::InvalidOperation(_)));

        // Format queries stay answerable, just zero-valued.
        let format = source.data_format();
        assert_eq!(format.channels, 0);
        assert_eq!(format.sample_rate, 0);
    }

    #[test]
    fn data_format_reports_stream_layout() {
        let (source, _) = stereo_source(1);
        let format = source.data_format();
        assert_eq!(format.format, SampleFormat::S16);
        assert_eq!(format.channels, CHANNELS);
        assert_eq!(format.sample_rate, 44_100);
        assert_eq!(format.channel_map.len(), CHANNELS as usize);
    }

    #[test]
    fn seeking_is_advertised_as_unsupported() {
        let (mut source, _) = stereo_source(1);
        assert!(!PcmSource::supports_seeking(&source));
        let err = PcmSource::seek_to_pcm_frame(&mut source, 4800).unwrap_err();
        assert!(matches!(err, Error::SeekNotSupported));
        assert_eq!(source.cursor_in_pcm_frames(), 0);
    }
}
