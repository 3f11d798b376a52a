//! Decode an AAC ADTS bitstream to a WAV file.

use std::path::PathBuf;
use std::process;

use clap::Parser;

use aacbox::aot::aot_name;
use aacbox::pipeline::decode_adts_to_wav;

#[derive(Debug, Parser)]
#[command(
    name = "aac-adts-dec",
    about = "Decode AAC with ADTS format to WAV file.\nOnly 1 or 2 channel(s) are supported.",
    version
)]
struct Args {
    /// Input AAC (ADTS) file
    input: PathBuf,

    /// Output WAV file
    output: PathBuf,

    /// Encoder delay (samples/channel) to prune from the decoded output
    #[arg(short = 'd', long = "delay", default_value_t = 0)]
    delay: u32,

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

    let summary = decode_adts_to_wav(&args.input, &args.output, args.delay)?;

    match summary.stream_info {
        Some(info) => {
            println!(
                "Input: '{}', {} Hz, {} ch(s), {} bps, {}",
                args.input.display(),
                info.sample_rate,
                info.channels,
                info.bitrate,
                aot_name(info.aot, info.flags)
            );
            println!("Output: '{}'", args.output.display());
            println!("Frame length: {} samples/channel", info.frame_length);
            println!("Output delay: {} samples/channel", info.output_delay);
            println!(
                "Aac sample rate: {}, aac channels: {}",
                info.aac_sample_rate, info.aac_channels
            );
            println!("Pruned encoder delay: {} samples/channel", args.delay);
            println!(
                "Decoded {} frames, wrote {} bytes of PCM",
                summary.frames_decoded, summary.bytes_written
            );
        }
        None => println!("No frames decoded from '{}'", args.input.display()),
    }

    Ok(())
}
