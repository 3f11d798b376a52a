//! Encode a WAV file to an M4A container.

use std::path::PathBuf;
use std::process;

use clap::Parser;

use aacbox::aot::AudioObjectType;
use aacbox::pipeline::{encode_wav_to_m4a, EncodeSummary};
use aacbox::EncodeConfig;

#[derive(Debug, Parser)]
#[command(
    name = "aac-m4a-enc",
    about = "Encode AAC into an M4A container.\nOnly 1 or 2 channel(s) are supported.",
    version
)]
struct Args {
    /// Input WAV file (16-bit integer PCM)
    input: PathBuf,

    /// Output M4A file
    output: PathBuf,

    /// Audio Object Type (2 = LC, 5 = HE, 29 = HEv2, 23 = LD, 39 = ELD)
    #[arg(short = 'a', long = "aot")]
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

    let summary = encode_wav_to_m4a(&args.input, &args.output, aot, config.bitrate)?;
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
        "Wrote {} samples, {} bytes",
        summary.frames_written, summary.bytes_written
    );
}
