//! aacbox - WAV/AAC transcoding toolbox
//!
//! Container and bitstream I/O (RIFF/WAVE, ADTS, M4A) plus streaming
//! orchestration around the Fraunhofer FDK AAC codec engine.

pub mod adts;
pub mod aot;
pub mod codec;
pub mod config;
pub mod error;
pub mod m4a;
pub mod pipeline;
pub mod wav;

pub use config::EncodeConfig;
pub use error::{AacBoxError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Name of the codec engine behind the `codec` module.
pub const CODEC_BACKEND: &str = "Fraunhofer FDK AAC (libfdk-aac)";

pub fn init_logging(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .try_init()
        .ok();
}

pub fn library_info() -> LibraryInfo {
    LibraryInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        codec_backend: CODEC_BACKEND.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct LibraryInfo {
    pub name: String,
    pub version: String,
    pub codec_backend: String,
}

impl std::fmt::Display for LibraryInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} v{} - {}", self.name, self.version, self.codec_backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_info_display() {
        let info = library_info();
        assert_eq!(info.name, "aacbox");
        assert!(info.to_string().contains("FDK"));
    }
}
