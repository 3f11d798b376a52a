//! Encode a WAV file to an AAC ADTS bitstream.

use std::path::PathBuf;
use std::process;

use clap::Parser;

use aacbox::aot::AudioObjectType;
use aacbox::pipeline::{encode_wav_to_adts, EncodeSummary};
use aacbox::EncodeConfig;

#[derive(Debug, Parser)]
#[command(
    name = "aac-adts-enc",
    about = "Encode AAC with ADTS format.\nOnly 1 or 2 channel(s) are supported.",
    version
)]
struct Args {
    /// Input WAV file (16-bit integer PCM)
    input: PathBuf,

    /// Output AAC (ADTS) file
    output: PathBuf,

    /// Audio Object Type (2 = LC, 5 = HE, 29 = HEv2)
    #[arg(short = 'a', long = "aot", value_parser = parse_adts_aot)]
    aot: Option<i32>,

    /// Encode bitrate (bps)
    #[arg(short = 'b', long = "bitrate")]
    bitrate: Option<u32>,

    /// Config file path (TOML format)
    #[arg(short = 'c', long = "config")]
    config_file: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// The ADTS tool only takes the profiles ADTS signalling can carry.
fn parse_adts_aot(value: &str) -> Result<i32, String> {
    let id: i32 = value.parse().map_err(|_| format!("invalid AOT: {}", value))?;
    match id {
        2 | 5 | 29 => Ok(id),
        _ => Err(format!("AOT must be 2 (LC), 5 (HE) or 29 (HEv2), got {}", id)),
    }
}

fn main() {
    let args = Args::parse();
    aacbox::init_logging(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> aacbox::Result<()> {
    println!("{}", aacbox::library_info());

    let config = EncodeConfig::resolve(args.config_file.as_deref(), args.aot, args.bitrate)?;
    let aot = config.audio_object_type();

    let summary = encode_wav_to_adts(&args.input, &args.output, aot, config.bitrate)?;
    print_summary(args, aot, config.bitrate, &summary);
    Ok(())
}

fn print_summary(args: &Args, aot: AudioObjectType, bitrate: u32, summary: &EncodeSummary) {
    let input = &summary.input_info;
    let encoder = &summary.encoder_info;

    println!(
        "Input: '{}', {} Hz, {} ch(s), {} bits/sample",
        args.input.display(),
        input.sample_rate,
        input.channels,
        input.bits_per_sample
    );
    println!("Output: '{}', {}, {} bps", args.output.display(), aot.name(), bitrate);
    println!("Frame length: {} samples/channel", encoder.frame_length);
    println!("Delay: {} samples/channel", encoder.delay);
    println!("Delay core: {} samples/channel", encoder.delay_core);
    let conf: Vec<String> = encoder.conf.iter().map(|b| format!("0x{:02X}", b)).collect();
    println!("Conf: {{{}}}", conf.join(", "));
    println!(
        "Wrote {} ADTS frames, {} bytes",
        summary.frames_written, summary.bytes_written
    );
}
