//! M4A container writing
//!
//! Thin adapter over the `mp4` crate: one audio track whose timescale is
//! the sample rate, fed with raw AAC access units. The encoder's opaque
//! AudioSpecificConfig blob is parsed just enough to recover the channel
//! configuration for the track setup.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use bytes::Bytes;
use mp4::{
    AacConfig, AudioObjectType as Mp4Aot, ChannelConfig, MediaConfig, Mp4Config, Mp4Sample,
    Mp4Writer, SampleFreqIndex, TrackConfig, TrackType,
};

use crate::aot::AudioObjectType;
use crate::error::{AacBoxError, Result};

/// First two bytes of an AudioSpecificConfig:
/// 5 bits object type, 4 bits sampling frequency index, 4 bits channel
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AudioSpecificConfig {
    pub object_type: u8,
    pub freq_index: u8,
    pub channel_config: u8,
}

impl AudioSpecificConfig {
    pub(crate) fn parse(conf: &[u8]) -> Result<Self> {
        if conf.len() < 2 {
            return Err(AacBoxError::format(
                "AudioSpecificConfig shorter than 2 bytes",
            ));
        }
        let b0 = conf[0];
        let b1 = conf[1];
        Ok(Self {
            object_type: b0 >> 3,
            freq_index: ((b0 & 0x07) << 1) | (b1 >> 7),
            channel_config: (b1 >> 3) & 0x0F,
        })
    }
}

fn freq_index_of(sample_rate: u32) -> Result<SampleFreqIndex> {
    match sample_rate {
        96000 => Ok(SampleFreqIndex::Freq96000),
        88200 => Ok(SampleFreqIndex::Freq88200),
        64000 => Ok(SampleFreqIndex::Freq64000),
        48000 => Ok(SampleFreqIndex::Freq48000),
        44100 => Ok(SampleFreqIndex::Freq44100),
        32000 => Ok(SampleFreqIndex::Freq32000),
        24000 => Ok(SampleFreqIndex::Freq24000),
        22050 => Ok(SampleFreqIndex::Freq22050),
        16000 => Ok(SampleFreqIndex::Freq16000),
        12000 => Ok(SampleFreqIndex::Freq12000),
        11025 => Ok(SampleFreqIndex::Freq11025),
        8000 => Ok(SampleFreqIndex::Freq8000),
        other => Err(AacBoxError::unsupported(format!(
            "sample rate {} has no MPEG-4 frequency index",
            other
        ))),
    }
}

fn channel_config_of(channel_config: u8) -> Result<ChannelConfig> {
    match channel_config {
        1 => Ok(ChannelConfig::Mono),
        2 => Ok(ChannelConfig::Stereo),
        other => Err(AacBoxError::unsupported(format!(
            "channel configuration {} not supported for M4A output",
            other
        ))),
    }
}

fn profile_of(aot: AudioObjectType) -> Mp4Aot {
    match aot {
        AudioObjectType::Lc => Mp4Aot::AacLowComplexity,
        AudioObjectType::He => Mp4Aot::SpectralBandReplication,
        AudioObjectType::HeV2 => Mp4Aot::ParametricStereo,
        AudioObjectType::Ld => Mp4Aot::ErrorResilientAacLowDelay,
        AudioObjectType::Eld => Mp4Aot::ErrorResilientAacEnhancedLowDelay,
    }
}

/// Single-track M4A writer.
pub struct M4aWriter {
    writer: Mp4Writer<BufWriter<File>>,
    track_id: u32,
    frame_length: u32,
    start_time: u64,
    finalized: bool,
}

impl M4aWriter {
    /// Open the output file and set up the audio track from the encoder's
    /// parameters and configuration blob.
    pub fn create<P: AsRef<Path>>(
        path: P,
        aot: AudioObjectType,
        sample_rate: u32,
        frame_length: u32,
        bitrate: u32,
        conf: &[u8],
    ) -> Result<Self> {
        let asc = AudioSpecificConfig::parse(conf)?;
        let chan_conf = channel_config_of(asc.channel_config)?;
        let freq_index = freq_index_of(sample_rate)?;

        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            AacBoxError::io(format!("cannot create M4A file {}: {}", path.display(), e))
        })?;

        let config = Mp4Config {
            major_brand: str::parse("M4A ").unwrap(),
            minor_version: 512,
            compatible_brands: vec![
                str::parse("M4A ").unwrap(),
                str::parse("isom").unwrap(),
                str::parse("mp42").unwrap(),
            ],
            timescale: 1000,
        };

        let mut writer = Mp4Writer::write_start(BufWriter::new(file), &config)
            .map_err(|e| AacBoxError::io(format!("cannot start M4A writer: {}", e)))?;

        let track = TrackConfig {
            track_type: TrackType::Audio,
            timescale: sample_rate,
            language: "und".to_string(),
            media_conf: MediaConfig::AacConfig(AacConfig {
                bitrate,
                profile: profile_of(aot),
                freq_index,
                chan_conf,
            }),
        };
        writer
            .add_track(&track)
            .map_err(|e| AacBoxError::io(format!("cannot add audio track: {}", e)))?;

        Ok(Self {
            writer,
            track_id: 1,
            frame_length,
            start_time: 0,
            finalized: false,
        })
    }

    /// Append one raw AAC access unit as a container sample.
    pub fn write_sample(&mut self, data: &[u8]) -> Result<()> {
        let sample = Mp4Sample {
            start_time: self.start_time,
            duration: self.frame_length,
            rendering_offset: 0,
            is_sync: true,
            bytes: Bytes::copy_from_slice(data),
        };
        self.writer
            .write_sample(self.track_id, &sample)
            .map_err(|e| AacBoxError::io(format!("cannot write sample: {}", e)))?;
        self.start_time += u64::from(self.frame_length);
        Ok(())
    }

    /// Write the trailing metadata boxes and close the file.
    pub fn finalize(mut self) -> Result<()> {
        self.finalized = true;
        self.writer
            .write_end()
            .map_err(|e| AacBoxError::io(format!("cannot finalize M4A file: {}", e)))
    }
}

impl Drop for M4aWriter {
    fn drop(&mut self) {
        if !self.finalized {
            if let Err(e) = self.writer.write_end() {
                log::warn!("failed to finalize M4A file: {}", e);
            }
        }
    }
}
