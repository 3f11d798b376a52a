//! Streaming orchestration between file I/O and the codec engine

pub mod decode;
pub mod encode;

pub use decode::{decode_adts_to_wav, DecodeSummary};
pub use encode::{encode_wav_to_adts, encode_wav_to_m4a, EncodeSummary};

/// Capacity for one ADTS frame (13-bit length field, so 8191 bytes max).
pub(crate) const ADTS_FRAME_CAPACITY: usize = 8192;

/// Capacity in samples for one decoded PCM block (covers 2048
/// samples/channel at the highest channel count the engine emits).
pub(crate) const PCM_BLOCK_CAPACITY: usize = 8 * 2048;
