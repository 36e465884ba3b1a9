use anyhow::{Context, Result};
use clap::Parser;

use std::path::PathBuf;

use aacpull::aac::AacSource;
use aacpull::format::SampleFormat;
use aacpull::logging;
use aacpull::opts::Opts;
use aacpull::wav::write_wav_from_source;

fn main() -> Result<()> {
    logging::init();
    let params = get_params()?;

    let opts = Opts {
        format: params.format.into(),
    };

    let mut source = AacSource::open(&params.input, &opts)
        .with_context(|| format!("failed to open {}", params.input.display()))?;

    if params.probe {
        let probe = serde_json::json!({
            "format": source.data_format(),
            "length_in_pcm_frames": source.length_in_pcm_frames().ok(),
        });
        println!("{}", serde_json::to_string_pretty(&probe)?);
        return Ok(());
    }

    let output = params
        .output
        .context("an output path is required unless --probe is set")?;

    let frames = write_wav_from_source(&mut source, &output)?;
    println!("wrote {} PCM frames to {}", frames, output.display());

    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "aacpull")]
#[command(about = "Decode an AAC stream to WAV or probe its format")]
struct Params {
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    #[arg(short = 'f', long = "format", value_enum, default_value_t = FormatArg::S16)]
    pub format: FormatArg,

    /// Print the stream layout and estimated length as JSON instead of decoding.
    #[arg(long = "probe", default_value_t = false)]
    pub probe: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    S16,
    F32,
}

impl From<FormatArg> for SampleFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::S16 => SampleFormat::S16,
            FormatArg::F32 => SampleFormat::F32,
        }
    }
}

fn get_params() -> Result<Params> {
    Ok(Params::parse())
}
