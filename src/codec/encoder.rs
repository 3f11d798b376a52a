//! AAC encoding through libfdk-aac

use fdk_aac::enc::{
    AudioObjectType as FdkAot, BitRate, ChannelMode as FdkChannelMode, Encoder, EncoderParams,
    Transport,
};

use super::TransportFormat;
use crate::aot::{AudioObjectType, ChannelMode};
use crate::error::{AacBoxError, Result};

/// Parameters fixed at encoder construction.
#[derive(Debug, Clone, Copy)]
pub struct EncoderConfig {
    pub transport: TransportFormat,
    pub aot: AudioObjectType,
    pub sample_rate: u32,
    pub channels: u16,
    /// Constant bitrate in bits per second
    pub bitrate: u32,
}

/// Properties reported by the engine after initialization.
#[derive(Debug, Clone)]
pub struct EncoderInfo {
    /// Samples per channel consumed by one encode call
    pub frame_length: u32,
    /// Total codec delay in samples per channel
    pub delay: u32,
    /// Core codec delay, without SBR resampling stages
    pub delay_core: u32,
    /// Out-of-band AudioSpecificConfig blob for container muxing
    pub conf: Vec<u8>,
}

/// Owned encoder handle; the engine instance is released on drop.
pub struct AacEncoder {
    encoder: Encoder,
    info: EncoderInfo,
}

impl AacEncoder {
    pub fn new(config: &EncoderConfig) -> Result<Self> {
        let channels = match ChannelMode::from_channels(config.channels)? {
            ChannelMode::Mono => FdkChannelMode::Mono,
            ChannelMode::Stereo => FdkChannelMode::Stereo,
        };
        if config.bitrate == 0 {
            return Err(AacBoxError::unsupported("bitrate must be greater than 0"));
        }

        let params = EncoderParams {
            bit_rate: BitRate::Cbr(config.bitrate),
            sample_rate: config.sample_rate,
            transport: match config.transport {
                TransportFormat::Adts => Transport::Adts,
                TransportFormat::Raw => Transport::Raw,
            },
            channels,
            audio_object_type: match config.aot {
                AudioObjectType::Lc => FdkAot::Mpeg4LowComplexity,
                AudioObjectType::He => FdkAot::Mpeg4HeAac,
                AudioObjectType::HeV2 => FdkAot::Mpeg4HeAacV2,
                AudioObjectType::Ld => FdkAot::Mpeg4LowDelay,
                AudioObjectType::Eld => FdkAot::Mpeg4EnhancedLowDelay,
            },
        };

        let encoder = Encoder::new(params)
            .map_err(|e| AacBoxError::codec(format!("cannot initialize encoder: {:?}", e)))?;

        let raw = encoder
            .info()
            .map_err(|e| AacBoxError::codec(format!("cannot query encoder info: {:?}", e)))?;
        let conf_size = raw.confSize as usize;
        let info = EncoderInfo {
            frame_length: raw.frameLength as u32,
            delay: raw.nDelay as u32,
            delay_core: raw.nDelayCore as u32,
            conf: raw.confBuf[..conf_size].to_vec(),
        };

        log::info!(
            "encoder ready: {} @ {} bps, frame length {}, delay {}",
            config.aot.name(),
            config.bitrate,
            info.frame_length,
            info.delay
        );

        Ok(Self { encoder, info })
    }

    pub fn info(&self) -> &EncoderInfo {
        &self.info
    }

    /// Encode one block of interleaved 16-bit PCM.
    ///
    /// Returns the number of bytes written into `out`; 0 while the engine's
    /// look-ahead is still filling.
    pub fn encode(&mut self, pcm: &[i16], out: &mut [u8]) -> Result<usize> {
        let encoded = self
            .encoder
            .encode(pcm, out)
            .map_err(|e| AacBoxError::codec(format!("encode failed: {:?}", e)))?;
        if encoded.input_consumed < pcm.len() {
            log::debug!(
                "encoder consumed {} of {} input samples",
                encoded.input_consumed,
                pcm.len()
            );
        }
        Ok(encoded.output_size)
    }
}
