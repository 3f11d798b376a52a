//! ADTS bitstream framing
//!
//! ADTS frames are self-delimiting: a fixed 7-byte header carrying the sync
//! word and a 13-bit total frame length, followed by the raw AAC payload.
//! There is no resynchronization after a bad sync word; a corrupt header
//! ends the stream.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{AacBoxError, Result};

/// Fixed ADTS header size in bytes.
pub const ADTS_HEADER_SIZE: usize = 7;

/// Validate the sync word and extract the total frame length (header
/// included) from an ADTS header.
///
/// The length field is 13 bits spanning the low 2 bits of byte 3, all of
/// byte 4 and the high 3 bits of byte 5.
pub fn parse_frame_size(header: &[u8]) -> Result<usize> {
    if header.len() < ADTS_HEADER_SIZE {
        return Err(AacBoxError::format("ADTS header shorter than 7 bytes"));
    }
    if header[0] != 0xFF || (header[1] & 0xF0) != 0xF0 {
        return Err(AacBoxError::format(format!(
            "bad ADTS sync word: 0x{:02X}{:02X}",
            header[0], header[1]
        )));
    }

    let frame_size = ((header[3] as usize & 0x03) << 11)
        | ((header[4] as usize) << 3)
        | ((header[5] as usize) >> 5);
    if frame_size < ADTS_HEADER_SIZE {
        return Err(AacBoxError::format(format!(
            "ADTS frame length {} smaller than its header",
            frame_size
        )));
    }
    Ok(frame_size)
}

/// Frame-at-a-time ADTS reader.
pub struct AdtsReader<R: Read> {
    inner: R,
    consumed: u64,
}

impl AdtsReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            AacBoxError::io(format!("cannot open ADTS file {}: {}", path.display(), e))
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read> AdtsReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, consumed: 0 }
    }

    /// Read one complete frame (header plus payload) into `buf`.
    ///
    /// Returns the frame length, or `None` at end of stream. A partial
    /// header at the end of the file also ends the stream; a frame larger
    /// than `buf` fails with `BufferTooSmall` without consuming its payload.
    pub fn read_frame(&mut self, buf: &mut [u8]) -> Result<Option<usize>> {
        if buf.len() < ADTS_HEADER_SIZE {
            return Err(AacBoxError::BufferTooSmall {
                needed: ADTS_HEADER_SIZE,
                capacity: buf.len(),
            });
        }

        let got = self.fill(buf, 0, ADTS_HEADER_SIZE)?;
        if got == 0 {
            return Ok(None);
        }
        if got < ADTS_HEADER_SIZE {
            log::warn!("truncated ADTS header ({} bytes) at end of stream", got);
            return Ok(None);
        }

        let frame_size = parse_frame_size(&buf[..ADTS_HEADER_SIZE])?;
        if frame_size > buf.len() {
            return Err(AacBoxError::BufferTooSmall {
                needed: frame_size,
                capacity: buf.len(),
            });
        }

        let payload = self.fill(buf, ADTS_HEADER_SIZE, frame_size)?;
        if ADTS_HEADER_SIZE + payload < frame_size {
            return Err(AacBoxError::format(format!(
                "truncated ADTS frame: expected {} payload bytes, got {}",
                frame_size - ADTS_HEADER_SIZE,
                payload
            )));
        }

        self.consumed += frame_size as u64;
        Ok(Some(frame_size))
    }

    /// Total bytes consumed from the stream so far.
    pub fn bytes_consumed(&self) -> u64 {
        self.consumed
    }

    fn fill(&mut self, buf: &mut [u8], from: usize, to: usize) -> Result<usize> {
        let mut filled = from;
        while filled < to {
            let n = self.inner.read(&mut buf[filled..to])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled - from)
    }
}

/// Append-only sink for complete ADTS frames.
pub struct AdtsWriter {
    inner: BufWriter<File>,
    frames_written: u64,
}

impl AdtsWriter {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            AacBoxError::io(format!("cannot create ADTS file {}: {}", path.display(), e))
        })?;
        Ok(Self { inner: BufWriter::new(file), frames_written: 0 })
    }

    /// Append one frame, checking its sync word and that the declared
    /// length fits the provided bytes.
    pub fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        let declared = parse_frame_size(frame)?;
        if declared > frame.len() {
            return Err(AacBoxError::format(format!(
                "ADTS header declares {} bytes but only {} were provided",
                declared,
                frame.len()
            )));
        }

        self.inner.write_all(frame)?;
        self.frames_written += 1;
        Ok(())
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn finalize(mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Build a syntactically valid frame with the given payload length.
    fn make_frame(payload_len: usize, fill: u8) -> Vec<u8> {
        let frame_size = ADTS_HEADER_SIZE + payload_len;
        let mut frame = vec![fill; frame_size];
        frame[0] = 0xFF;
        frame[1] = 0xF1;
        frame[2] = 0x50;
        frame[3] = ((frame_size >> 11) & 0x03) as u8;
        frame[4] = ((frame_size >> 3) & 0xFF) as u8;
        frame[5] = ((frame_size & 0x07) << 5) as u8;
        frame[6] = 0xFC;
        frame
    }

    #[test]
    fn test_parse_frame_size_field_layout() {
        // length bits straddle bytes 3, 4 and 5
        for size in [7, 8, 255, 256, 1024, 4095, 8191] {
            let frame = make_frame(size - ADTS_HEADER_SIZE, 0);
            assert_eq!(parse_frame_size(&frame).unwrap(), size, "size {}", size);
        }
    }

    #[test]
    fn test_parse_rejects_bad_sync() {
        let mut frame = make_frame(10, 0);
        frame[0] = 0x00;
        assert!(matches!(parse_frame_size(&frame), Err(AacBoxError::Format { .. })));

        let mut frame = make_frame(10, 0);
        frame[1] = 0x0F;
        assert!(parse_frame_size(&frame).is_err());
    }

    #[test]
    fn test_parse_rejects_undersized_frame() {
        let mut frame = make_frame(10, 0);
        frame[3] = 0;
        frame[4] = 0;
        frame[5] = 3 << 5; // declares 3 bytes total
        assert!(parse_frame_size(&frame).is_err());
    }

    #[test]
    fn test_reader_walks_all_frames_and_accounts_bytes() {
        let mut stream = Vec::new();
        let sizes = [100usize, 7, 512, 2048];
        for (i, payload) in sizes.iter().map(|s| s - ADTS_HEADER_SIZE).enumerate() {
            stream.extend_from_slice(&make_frame(payload, i as u8));
        }
        let total = stream.len() as u64;

        let mut reader = AdtsReader::new(Cursor::new(stream));
        let mut buf = vec![0u8; 8192];
        let mut seen = Vec::new();
        while let Some(n) = reader.read_frame(&mut buf).unwrap() {
            seen.push(n);
        }
        assert_eq!(seen, sizes);
        assert_eq!(reader.bytes_consumed(), total);
        // a second call past the end still reports end of stream
        assert!(reader.read_frame(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_reader_bad_sync_is_not_recoverable() {
        let mut stream = make_frame(50, 1);
        stream[0] = 0x12; // corrupt the very first sync byte
        stream.extend_from_slice(&make_frame(50, 2));

        let mut reader = AdtsReader::new(Cursor::new(stream));
        let mut buf = vec![0u8; 8192];
        assert!(reader.read_frame(&mut buf).is_err());
        // no forward scan for the next sync word: the reader is left mid
        // stream and the following read fails again on misaligned bytes
        assert!(reader.read_frame(&mut buf).is_err());
    }

    #[test]
    fn test_reader_buffer_too_small() {
        let stream = make_frame(500, 0);
        let mut reader = AdtsReader::new(Cursor::new(stream));
        let mut buf = vec![0u8; 64];
        match reader.read_frame(&mut buf) {
            Err(AacBoxError::BufferTooSmall { needed, capacity }) => {
                assert_eq!(needed, 507);
                assert_eq!(capacity, 64);
            }
            other => panic!("expected BufferTooSmall, got {:?}", other),
        }
    }

    #[test]
    fn test_reader_truncated_payload() {
        let mut stream = make_frame(100, 0);
        stream.truncate(50);

        let mut reader = AdtsReader::new(Cursor::new(stream));
        let mut buf = vec![0u8; 8192];
        assert!(matches!(
            reader.read_frame(&mut buf),
            Err(AacBoxError::Format { .. })
        ));
    }

    #[test]
    fn test_reader_partial_header_ends_stream() {
        let stream = vec![0xFF, 0xF1, 0x50];
        let mut reader = AdtsReader::new(Cursor::new(stream));
        let mut buf = vec![0u8; 8192];
        assert!(reader.read_frame(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_writer_validates_frames() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.aac");

        let mut writer = AdtsWriter::create(&path).unwrap();
        let frame = make_frame(20, 9);
        writer.write_frame(&frame).unwrap();
        assert!(writer.write_frame(&[0u8; 16]).is_err());
        assert!(writer.write_frame(&frame[..10]).is_err());
        assert_eq!(writer.frames_written(), 1);
        writer.finalize().unwrap();

        let written = std::fs::read(&path).unwrap();
        assert_eq!(written, frame);
    }
}
