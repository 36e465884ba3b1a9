use crate::format::SampleFormat;

/// Options that control how an AAC source is constructed.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// The CLI is responsible for mapping user input into this type so that:
/// - the library remains reusable outside of a CLI context
/// - other frontends (hosts, tests, batch jobs) can construct options programmatically
#[derive(Debug, Clone, Default)]
pub struct Opts {
    /// The PCM encoding the source emits.
    ///
    /// Fixed for the lifetime of the source. Defaults to [`SampleFormat::S16`],
    /// the decoder's native output; [`SampleFormat::F32`] converts at the drain
    /// boundary.
    pub format: SampleFormat,
}
