//! AAC decoding through libfdk-aac

use fdk_aac::dec::{Decoder, Transport};

use super::TransportFormat;
use crate::error::{AacBoxError, Result};

/// Stream parameters reported by the engine.
///
/// Valid only once the first PCM block has been produced; from that point
/// the values are fixed for the rest of the stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecoderStreamInfo {
    pub aot: i32,
    /// Extension flags (SBR/PS presence bits)
    pub flags: u32,
    pub sample_rate: i32,
    pub channels: i32,
    /// Core sample rate before SBR upsampling
    pub aac_sample_rate: i32,
    /// Core channel count before PS upmix
    pub aac_channels: i32,
    /// Samples per channel in one decoded frame
    pub frame_length: i32,
    pub bitrate: i32,
    /// Engine-introduced delay in samples per channel
    pub output_delay: u32,
}

/// Owned decoder handle; the engine instance is released on drop.
pub struct AacDecoder {
    decoder: Decoder,
    produced_output: bool,
}

impl AacDecoder {
    pub fn new(transport: TransportFormat) -> Self {
        let transport = match transport {
            TransportFormat::Adts => Transport::Adts,
            TransportFormat::Raw => Transport::Raw,
        };
        Self {
            decoder: Decoder::new(transport),
            produced_output: false,
        }
    }

    /// Feed one complete access unit and decode it.
    ///
    /// Returns the number of interleaved samples written into `pcm`, or 0
    /// when the engine is still collecting configuration data and has no
    /// output yet. Failures after the first produced block are
    /// stream-terminating.
    pub fn decode(&mut self, frame: &[u8], pcm: &mut [i16]) -> Result<usize> {
        let consumed = self
            .decoder
            .fill(frame)
            .map_err(|e| AacBoxError::codec(format!("decoder fill failed: {}", e)))?;
        if consumed < frame.len() {
            log::debug!(
                "decoder input buffer kept {} of {} bytes pending",
                frame.len() - consumed,
                frame.len()
            );
        }

        match self.decoder.decode_frame(pcm) {
            Ok(()) => {
                self.produced_output = true;
                Ok(self.decoder.decoded_frame_size())
            }
            Err(e) if !self.produced_output => {
                // the engine has not locked onto the stream yet; with whole
                // ADTS frames this is the "not enough bits" condition
                log::debug!("no output yet from decoder: {}", e);
                Ok(0)
            }
            Err(e) => Err(AacBoxError::codec(format!("decode failed: {}", e))),
        }
    }

    /// Snapshot of the engine's stream info.
    pub fn stream_info(&self) -> DecoderStreamInfo {
        let info = self.decoder.stream_info();
        DecoderStreamInfo {
            aot: info.aot as i32,
            flags: info.flags as u32,
            sample_rate: info.sampleRate as i32,
            channels: info.numChannels as i32,
            aac_sample_rate: info.aacSampleRate as i32,
            aac_channels: info.aacNumChannels as i32,
            frame_length: info.frameSize as i32,
            bitrate: info.bitRate as i32,
            output_delay: info.outputDelay as u32,
        }
    }
}
