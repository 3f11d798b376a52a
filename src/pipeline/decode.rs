//! ADTS to WAV decode loop

use std::path::Path;

use crate::adts::AdtsReader;
use crate::aot::ChannelMode;
use crate::codec::{AacDecoder, DecoderStreamInfo, TransportFormat};
use crate::error::Result;
use crate::wav::WavWriter;

use super::{ADTS_FRAME_CAPACITY, PCM_BLOCK_CAPACITY};

/// Outcome of a completed decode run.
#[derive(Debug, Clone, Default)]
pub struct DecodeSummary {
    pub frames_decoded: u64,
    /// PCM bytes written after delay pruning
    pub bytes_written: u64,
    /// Bytes discarded by the delay trimmer
    pub bytes_pruned: u64,
    /// Stream parameters discovered from the first decoded frame
    pub stream_info: Option<DecoderStreamInfo>,
}

/// Byte-exact removal of leading priming samples.
///
/// The budget is `delay_samples * channels * 2` bytes; whole blocks are
/// discarded while they fit, then a single partial trim drops the leading
/// remainder, and everything after passes through untouched.
pub(crate) struct DelayTrimmer {
    remaining: usize,
}

impl DelayTrimmer {
    pub(crate) fn new(delay_samples: u32, channels: u16) -> Self {
        Self {
            remaining: delay_samples as usize * channels as usize * 2,
        }
    }

    /// Returns the writable tail of `block`.
    pub(crate) fn trim<'a>(&mut self, block: &'a [u8]) -> &'a [u8] {
        if self.remaining >= block.len() {
            self.remaining -= block.len();
            &[]
        } else if self.remaining > 0 {
            let tail = &block[self.remaining..];
            self.remaining = 0;
            tail
        } else {
            block
        }
    }
}

/// Decode state: stream parameters are unknown until the engine produces
/// its first PCM block, and only then can the output file be opened.
enum DecodeState {
    AwaitingStreamInfo,
    Streaming(StreamingCtx),
}

struct StreamingCtx {
    writer: WavWriter,
    trimmer: DelayTrimmer,
}

/// Decode an ADTS bitstream into a 16-bit WAV file, pruning
/// `encoder_delay` samples per channel from the head of the output.
pub fn decode_adts_to_wav<P: AsRef<Path>>(
    input: P,
    output: P,
    encoder_delay: u32,
) -> Result<DecodeSummary> {
    let mut reader = AdtsReader::open(input.as_ref())?;
    let mut decoder = AacDecoder::new(TransportFormat::Adts);

    let mut frame_buf = vec![0u8; ADTS_FRAME_CAPACITY];
    let mut pcm = vec![0i16; PCM_BLOCK_CAPACITY];
    let mut block = Vec::with_capacity(PCM_BLOCK_CAPACITY * 2);

    let mut state = DecodeState::AwaitingStreamInfo;
    let mut summary = DecodeSummary::default();

    loop {
        let frame_len = match reader.read_frame(&mut frame_buf)? {
            Some(n) => n,
            None => break,
        };

        let samples = decoder.decode(&frame_buf[..frame_len], &mut pcm)?;
        if samples == 0 {
            // engine still buffering, nothing to emit
            continue;
        }
        summary.frames_decoded += 1;

        if let DecodeState::AwaitingStreamInfo = state {
            let info = decoder.stream_info();
            let channels = ChannelMode::from_channels(info.channels as u16)?.channels();
            log::info!(
                "stream: {} Hz, {} ch(s), frame length {}, output delay {}",
                info.sample_rate,
                channels,
                info.frame_length,
                info.output_delay
            );

            let writer = WavWriter::create(output.as_ref(), info.sample_rate as u32, channels, 16)?;
            let trimmer = DelayTrimmer::new(encoder_delay, channels);
            summary.stream_info = Some(info);
            state = DecodeState::Streaming(StreamingCtx { writer, trimmer });
        }

        block.clear();
        for &sample in &pcm[..samples] {
            block.extend_from_slice(&sample.to_le_bytes());
        }

        if let DecodeState::Streaming(ctx) = &mut state {
            let tail = ctx.trimmer.trim(&block);
            summary.bytes_pruned += (block.len() - tail.len()) as u64;
            if !tail.is_empty() {
                ctx.writer.write(tail)?;
                summary.bytes_written += tail.len() as u64;
            }
        }
    }

    if let DecodeState::Streaming(ctx) = state {
        ctx.writer.finalize()?;
    }

    log::info!(
        "decoded {} frames, wrote {} bytes, pruned {} bytes",
        summary.frames_decoded,
        summary.bytes_written,
        summary.bytes_pruned
    );
    Ok(summary)
}
