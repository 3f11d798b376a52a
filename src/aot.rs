//! Audio object type and channel mode tables

use crate::error::{AacBoxError, Result};

/// SBR presence bit in the decoder's stream flags (FDK `AC_SBR_PRESENT`).
pub const FLAG_SBR_PRESENT: u32 = 0x008000;
/// PS presence bit in the decoder's stream flags (FDK `AC_PS_PRESENT`).
pub const FLAG_PS_PRESENT: u32 = 0x020000;

/// AAC audio object types supported by the encoder tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioObjectType {
    /// AAC Low Complexity
    Lc = 2,
    /// High Efficiency AAC (SBR)
    He = 5,
    /// High Efficiency AAC v2 (SBR + PS)
    HeV2 = 29,
    /// AAC Low Delay
    Ld = 23,
    /// AAC Enhanced Low Delay
    Eld = 39,
}

impl AudioObjectType {
    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            2 => Some(Self::Lc),
            5 => Some(Self::He),
            29 => Some(Self::HeV2),
            23 => Some(Self::Ld),
            39 => Some(Self::Eld),
            _ => None,
        }
    }

    pub fn id(&self) -> i32 {
        *self as i32
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Lc => "AAC-LC",
            Self::He => "HE-AAC",
            Self::HeV2 => "HE-AACv2",
            Self::Ld => "AAC-LD",
            Self::Eld => "AAC-ELD",
        }
    }
}

/// Friendly name for a decoded stream's object type.
///
/// An LC stream whose flags carry SBR or PS extension data is reported under
/// the corresponding HE profile name. Unknown ids report "NA".
pub fn aot_name(aot: i32, flags: u32) -> &'static str {
    let mut aot = aot;
    if aot == AudioObjectType::Lc.id() {
        if flags & FLAG_PS_PRESENT != 0 {
            aot = AudioObjectType::HeV2.id();
        } else if flags & FLAG_SBR_PRESENT != 0 {
            aot = AudioObjectType::He.id();
        }
    }

    match AudioObjectType::from_id(aot) {
        Some(t) => t.name(),
        None => "NA",
    }
}

/// Channel layouts the whole pipeline accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    Mono,
    Stereo,
}

impl ChannelMode {
    pub fn from_channels(channels: u16) -> Result<Self> {
        match channels {
            1 => Ok(Self::Mono),
            2 => Ok(Self::Stereo),
            n => Err(AacBoxError::unsupported(format!(
                "channel count must be 1 or 2, got {}",
                n
            ))),
        }
    }

    pub fn channels(&self) -> u16 {
        match self {
            Self::Mono => 1,
            Self::Stereo => 2,
        }
    }
}
