//! WAV to AAC encode loops

use std::path::Path;

use crate::adts::AdtsWriter;
use crate::aot::{AudioObjectType, ChannelMode};
use crate::codec::{AacEncoder, EncoderConfig, EncoderInfo, TransportFormat};
use crate::error::{AacBoxError, Result};
use crate::m4a::M4aWriter;
use crate::wav::{WavReader, WavStreamInfo};

/// Outcome of a completed encode run.
#[derive(Debug, Clone)]
pub struct EncodeSummary {
    pub input_info: WavStreamInfo,
    pub encoder_info: EncoderInfo,
    /// Access units emitted to the sink
    pub frames_written: u64,
    pub bytes_written: u64,
}

/// Encode a WAV file into an ADTS bitstream.
pub fn encode_wav_to_adts<P: AsRef<Path>>(
    input: P,
    output: P,
    aot: AudioObjectType,
    bitrate: u32,
) -> Result<EncodeSummary> {
    let (mut reader, input_info) = open_input(input.as_ref())?;
    let mut encoder = AacEncoder::new(&EncoderConfig {
        transport: TransportFormat::Adts,
        aot,
        sample_rate: input_info.sample_rate,
        channels: input_info.channels,
        bitrate,
    })?;

    let mut writer = AdtsWriter::create(output.as_ref())?;
    let summary = run_encode_loop(&mut reader, &mut encoder, input_info, |bytes| {
        writer.write_frame(bytes)
    })?;
    writer.finalize()?;
    Ok(summary)
}

/// Encode a WAV file into an M4A container.
pub fn encode_wav_to_m4a<P: AsRef<Path>>(
    input: P,
    output: P,
    aot: AudioObjectType,
    bitrate: u32,
) -> Result<EncodeSummary> {
    let (mut reader, input_info) = open_input(input.as_ref())?;
    let mut encoder = AacEncoder::new(&EncoderConfig {
        transport: TransportFormat::Raw,
        aot,
        sample_rate: input_info.sample_rate,
        channels: input_info.channels,
        bitrate,
    })?;

    let info = encoder.info().clone();
    let mut writer = M4aWriter::create(
        output.as_ref(),
        aot,
        input_info.sample_rate,
        info.frame_length,
        bitrate,
        &info.conf,
    )?;
    let summary = run_encode_loop(&mut reader, &mut encoder, input_info, |bytes| {
        writer.write_sample(bytes)
    })?;
    writer.finalize()?;
    Ok(summary)
}

/// Open the input WAV and check it is something the encoder can take:
/// 16-bit integer PCM, mono or stereo.
fn open_input(path: &Path) -> Result<(WavReader<std::io::BufReader<std::fs::File>>, WavStreamInfo)> {
    let reader = WavReader::open(path)?;
    let info = reader.info()?;

    ChannelMode::from_channels(info.channels)?;
    if info.format != 1 || info.bits_per_sample != 16 {
        return Err(AacBoxError::unsupported(format!(
            "encoder input must be 16-bit integer PCM, got format {} at {} bits",
            info.format, info.bits_per_sample
        )));
    }
    Ok((reader, info))
}

/// Pull fixed one-frame PCM blocks, push encoded access units to `sink`.
///
/// A zero-output encode keeps the loop running (look-ahead still filling);
/// a zero-byte read ends it. The encoder's delay samples stay in the
/// bitstream; they are reported, not trimmed here.
fn run_encode_loop<F>(
    reader: &mut WavReader<std::io::BufReader<std::fs::File>>,
    encoder: &mut AacEncoder,
    input_info: WavStreamInfo,
    mut sink: F,
) -> Result<EncodeSummary>
where
    F: FnMut(&[u8]) -> Result<()>,
{
    let encoder_info = encoder.info().clone();
    let block_bytes = input_info.channels as usize * 2 * encoder_info.frame_length as usize;

    let mut pcm_bytes = vec![0u8; block_bytes];
    let mut pcm = vec![0i16; block_bytes / 2];
    let mut out = vec![0u8; 8192 * input_info.channels as usize];

    let mut summary = EncodeSummary {
        input_info,
        encoder_info,
        frames_written: 0,
        bytes_written: 0,
    };

    loop {
        let read = reader.read(&mut pcm_bytes)?;
        if read == 0 {
            break;
        }

        pcm.clear();
        for chunk in pcm_bytes[..read].chunks_exact(2) {
            pcm.push(i16::from_le_bytes([chunk[0], chunk[1]]));
        }

        let produced = encoder.encode(&pcm, &mut out)?;
        if produced == 0 {
            continue;
        }

        sink(&out[..produced])?;
        summary.frames_written += 1;
        summary.bytes_written += produced as u64;
    }

    log::info!(
        "encoded {} access units, {} bytes",
        summary.frames_written,
        summary.bytes_written
    );
    Ok(summary)
}
