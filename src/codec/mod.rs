//! FDK AAC engine wrappers

pub mod decoder;
pub mod encoder;

pub use decoder::{AacDecoder, DecoderStreamInfo};
pub use encoder::{AacEncoder, EncoderConfig, EncoderInfo};

/// Bitstream packaging produced or consumed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFormat {
    /// Self-framing ADTS bitstream
    Adts,
    /// Raw access units (for container muxing)
    Raw,
}
