//! RIFF/WAVE container reading and writing
//!
//! The reader scans the file for a `RIFF`/`WAVE` chunk and walks its
//! sub-chunks, tolerating and skipping anything it does not recognize.
//! The writer emits the canonical 44-byte PCM header with a placeholder
//! data length and rewrites it once the final length is known.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{AacBoxError, Result};

/// Canonical PCM header: RIFF + fmt (16 bytes) + data chunk headers.
pub const WAV_HEADER_SIZE: u32 = 44;

/// Header metadata collected while scanning the container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WavStreamInfo {
    /// WAVE format code (1 = integer PCM, 3 = IEEE float)
    pub format: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    /// Size of the `data` sub-chunk in bytes
    pub data_length: u32,
}

fn read_tag<R: Read>(r: &mut R) -> std::io::Result<[u8; 4]> {
    let mut tag = [0u8; 4];
    r.read_exact(&mut tag)?;
    Ok(tag)
}

fn read_u32<R: Read>(r: &mut R) -> std::io::Result<u32> {
    let mut b = [0u8; 4];
    r.read_exact(&mut b)?;
    Ok(u32::from_le_bytes(b))
}

fn read_u16<R: Read>(r: &mut R) -> std::io::Result<u16> {
    let mut b = [0u8; 2];
    r.read_exact(&mut b)?;
    Ok(u16::from_le_bytes(b))
}

fn skip<R: Seek>(r: &mut R, bytes: u32) -> std::io::Result<()> {
    r.seek(SeekFrom::Current(i64::from(bytes))).map(|_| ())
}

/// Scan the whole stream for a `RIFF`/`WAVE` chunk and collect the stream
/// info plus the offset of the PCM payload.
///
/// Chunks that are not a well-formed `RIFF`/`WAVE` are skipped by their
/// declared length and the scan keeps looking; sub-chunks are skipped the
/// same way, so metadata placed after `data` is still found.
fn scan<R: Read + Seek>(r: &mut R) -> Result<(WavStreamInfo, u64)> {
    let mut info = WavStreamInfo::default();
    let mut data_pos = 0u64;

    loop {
        let tag = match read_tag(r) {
            Ok(tag) => tag,
            Err(_) => break,
        };
        let length = match read_u32(r) {
            Ok(length) => length,
            Err(_) => break,
        };

        if &tag != b"RIFF" || length < 4 {
            skip(r, length)?;
            continue;
        }

        let tag2 = match read_tag(r) {
            Ok(tag2) => tag2,
            Err(_) => break,
        };
        let mut remaining = length - 4;
        if &tag2 != b"WAVE" {
            skip(r, remaining)?;
            continue;
        }

        while remaining >= 8 {
            let subtag = match read_tag(r) {
                Ok(subtag) => subtag,
                Err(_) => break,
            };
            let sublength = match read_u32(r) {
                Ok(sublength) => sublength,
                Err(_) => break,
            };
            remaining -= 8;
            if remaining < sublength {
                // declared sub-chunk overruns its parent
                break;
            }

            match &subtag {
                b"fmt " => {
                    if sublength < 16 {
                        // too short to describe the stream
                        break;
                    }
                    info.format = read_u16(r)?;
                    info.channels = read_u16(r)?;
                    info.sample_rate = read_u32(r)?;
                    let _byte_rate = read_u32(r)?;
                    let _block_align = read_u16(r)?;
                    info.bits_per_sample = read_u16(r)?;
                    skip(r, sublength - 16)?;
                }
                b"data" => {
                    data_pos = r.stream_position()?;
                    info.data_length = sublength;
                    skip(r, sublength)?;
                }
                _ => skip(r, sublength)?,
            }

            remaining -= sublength;
        }

        if remaining > 0 {
            skip(r, remaining)?;
        }
    }

    Ok((info, data_pos))
}

/// Streaming WAV reader exposing the PCM payload as a flat byte stream.
pub struct WavReader<R: Read + Seek> {
    inner: R,
    info: WavStreamInfo,
    remaining: u32,
}

impl WavReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            AacBoxError::io(format!("cannot open WAV file {}: {}", path.display(), e))
        })?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> WavReader<R> {
    pub fn new(mut inner: R) -> Result<Self> {
        let (info, data_pos) = scan(&mut inner)?;
        inner.seek(SeekFrom::Start(data_pos))?;
        let remaining = info.data_length;
        Ok(Self { inner, info, remaining })
    }

    /// Header metadata. Fails unless every field needed to interpret the
    /// PCM payload came out of the scan non-zero.
    pub fn info(&self) -> Result<WavStreamInfo> {
        let i = &self.info;
        if i.format == 0 || i.sample_rate == 0 || i.channels == 0 || i.bits_per_sample == 0 {
            return Err(AacBoxError::format("missing or incomplete 'fmt ' chunk"));
        }
        Ok(self.info)
    }

    /// Read up to `buf.len()` bytes of PCM payload. Returns 0 once the
    /// `data` sub-chunk is exhausted.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let want = buf.len().min(self.remaining as usize);
        if want == 0 {
            return Ok(0);
        }

        let mut filled = 0;
        while filled < want {
            let n = self.inner.read(&mut buf[filled..want])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        self.remaining -= filled as u32;
        Ok(filled)
    }
}

/// Streaming WAV writer.
///
/// The data length cannot be known up front, so a placeholder header goes
/// out at creation and `finalize` (or drop) rewrites it in place. This
/// requires a seekable output file.
pub struct WavWriter {
    inner: BufWriter<File>,
    sample_rate: u32,
    channels: u16,
    bits_per_sample: u16,
    data_length: u32,
    finalized: bool,
}

impl WavWriter {
    /// Only 16-bit integer and 32-bit float PCM are supported.
    pub fn create<P: AsRef<Path>>(
        path: P,
        sample_rate: u32,
        channels: u16,
        bits_per_sample: u16,
    ) -> Result<Self> {
        if bits_per_sample != 16 && bits_per_sample != 32 {
            return Err(AacBoxError::unsupported(format!(
                "bits per sample must be 16 or 32, got {}",
                bits_per_sample
            )));
        }

        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            AacBoxError::io(format!("cannot create WAV file {}: {}", path.display(), e))
        })?;

        let mut writer = Self {
            inner: BufWriter::new(file),
            sample_rate,
            channels,
            bits_per_sample,
            data_length: 0,
            finalized: false,
        };
        writer.write_header()?;
        Ok(writer)
    }

    fn write_header(&mut self) -> Result<()> {
        let chunk_size = self.data_length + WAV_HEADER_SIZE - 8;
        let block_align = (self.bits_per_sample / 8) * self.channels;
        let byte_rate = self.sample_rate * u32::from(block_align);
        let format_code: u16 = if self.bits_per_sample == 16 { 1 } else { 3 };

        self.inner.seek(SeekFrom::Start(0))?;
        self.inner.write_all(b"RIFF")?;
        self.inner.write_all(&chunk_size.to_le_bytes())?;
        self.inner.write_all(b"WAVE")?;
        self.inner.write_all(b"fmt ")?;
        self.inner.write_all(&16u32.to_le_bytes())?;
        self.inner.write_all(&format_code.to_le_bytes())?;
        self.inner.write_all(&self.channels.to_le_bytes())?;
        self.inner.write_all(&self.sample_rate.to_le_bytes())?;
        self.inner.write_all(&byte_rate.to_le_bytes())?;
        self.inner.write_all(&block_align.to_le_bytes())?;
        self.inner.write_all(&self.bits_per_sample.to_le_bytes())?;
        self.inner.write_all(b"data")?;
        self.inner.write_all(&self.data_length.to_le_bytes())?;
        Ok(())
    }

    /// Append raw PCM bytes. Returns the number of bytes written.
    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.inner.write_all(data)?;
        self.data_length += data.len() as u32;
        Ok(data.len())
    }

    /// Total PCM bytes written so far.
    pub fn data_length(&self) -> u32 {
        self.data_length
    }

    /// Rewrite the header with the final data length and flush the file.
    pub fn finalize(mut self) -> Result<()> {
        self.finalize_in_place()
    }

    fn finalize_in_place(&mut self) -> Result<()> {
        self.write_header()?;
        self.inner.flush()?;
        self.finalized = true;
        Ok(())
    }
}

impl Drop for WavWriter {
    fn drop(&mut self) {
        if !self.finalized {
            if let Err(e) = self.finalize_in_place() {
                log::warn!("failed to finalize WAV header: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn put_chunk(out: &mut Vec<u8>, tag: &[u8; 4], body: &[u8]) {
        out.extend_from_slice(tag);
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(body);
    }

    fn fmt_body(format: u16, channels: u16, sample_rate: u32, bits: u16) -> Vec<u8> {
        let block_align = channels * (bits / 8);
        let mut body = Vec::new();
        body.extend_from_slice(&format.to_le_bytes());
        body.extend_from_slice(&channels.to_le_bytes());
        body.extend_from_slice(&sample_rate.to_le_bytes());
        body.extend_from_slice(&(sample_rate * u32::from(block_align)).to_le_bytes());
        body.extend_from_slice(&block_align.to_le_bytes());
        body.extend_from_slice(&bits.to_le_bytes());
        body
    }

    fn wave_file(chunks: &[(&[u8; 4], Vec<u8>)]) -> Vec<u8> {
        let mut inner = Vec::new();
        inner.extend_from_slice(b"WAVE");
        for (tag, body) in chunks {
            put_chunk(&mut inner, tag, body);
        }
        let mut file = Vec::new();
        file.extend_from_slice(b"RIFF");
        file.extend_from_slice(&(inner.len() as u32).to_le_bytes());
        file.extend_from_slice(&inner);
        file
    }

    #[test]
    fn test_writer_reader_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.wav");

        let pcm: Vec<u8> = (0..2000u32).map(|i| (i % 251) as u8).collect();

        let mut writer = WavWriter::create(&path, 44100, 1, 16).unwrap();
        assert_eq!(writer.write(&pcm).unwrap(), pcm.len());
        writer.finalize().unwrap();

        let mut reader = WavReader::open(&path).unwrap();
        let info = reader.info().unwrap();
        assert_eq!(info.format, 1);
        assert_eq!(info.sample_rate, 44100);
        assert_eq!(info.channels, 1);
        assert_eq!(info.bits_per_sample, 16);
        assert_eq!(info.data_length, pcm.len() as u32);

        let mut back = Vec::new();
        let mut buf = [0u8; 333];
        loop {
            let n = reader.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            back.extend_from_slice(&buf[..n]);
        }
        assert_eq!(back, pcm);
        // exhausted reads keep returning 0
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_writer_float_format_code() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("float.wav");

        let writer = WavWriter::create(&path, 48000, 2, 32).unwrap();
        writer.finalize().unwrap();

        let reader = WavReader::open(&path).unwrap();
        let info = reader.info().unwrap();
        assert_eq!(info.format, 3);
        assert_eq!(info.bits_per_sample, 32);
        assert_eq!(info.data_length, 0);
    }

    #[test]
    fn test_writer_rejects_odd_bit_depth() {
        let dir = TempDir::new().unwrap();
        let result = WavWriter::create(dir.path().join("bad.wav"), 44100, 1, 24);
        assert!(matches!(result, Err(AacBoxError::Unsupported { .. })));
    }

    #[test]
    fn test_writer_finalizes_on_drop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dropped.wav");

        {
            let mut writer = WavWriter::create(&path, 8000, 1, 16).unwrap();
            writer.write(&[0u8; 100]).unwrap();
            // dropped without an explicit finalize
        }

        let reader = WavReader::open(&path).unwrap();
        assert_eq!(reader.info().unwrap().data_length, 100);
    }

    #[test]
    fn test_truncated_fmt_chunk_fails_info() {
        let file = wave_file(&[
            (b"fmt ", fmt_body(1, 1, 16000, 16)[..14].to_vec()),
            (b"data", vec![0u8; 8]),
        ]);
        let reader = WavReader::new(Cursor::new(file)).unwrap();
        assert!(reader.info().is_err());
    }

    #[test]
    fn test_missing_data_chunk_reports_zero_length() {
        let file = wave_file(&[(b"fmt ", fmt_body(1, 2, 44100, 16))]);
        let mut reader = WavReader::new(Cursor::new(file)).unwrap();
        let info = reader.info().unwrap();
        assert_eq!(info.data_length, 0);
        let mut buf = [0u8; 16];
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_scan_skips_leading_junk_chunk() {
        let mut file = Vec::new();
        put_chunk(&mut file, b"JUNK", &[0xAA; 12]);
        file.extend_from_slice(&wave_file(&[
            (b"fmt ", fmt_body(1, 1, 8000, 16)),
            (b"data", vec![1, 2, 3, 4]),
        ]));

        let mut reader = WavReader::new(Cursor::new(file)).unwrap();
        let info = reader.info().unwrap();
        assert_eq!(info.sample_rate, 8000);
        assert_eq!(info.data_length, 4);
        let mut buf = [0u8; 4];
        assert_eq!(reader.read(&mut buf).unwrap(), 4);
        assert_eq!(buf, [1, 2, 3, 4]);
    }

    #[test]
    fn test_scan_finds_fmt_after_data() {
        // metadata chunks after `data` must still be picked up, and the
        // cursor must come back to the payload
        let file = wave_file(&[
            (b"LIST", vec![0u8; 10]),
            (b"data", vec![9, 8, 7, 6, 5]),
            (b"fmt ", fmt_body(1, 1, 22050, 16)),
        ]);

        let mut reader = WavReader::new(Cursor::new(file)).unwrap();
        let info = reader.info().unwrap();
        assert_eq!(info.sample_rate, 22050);
        assert_eq!(info.data_length, 5);
        let mut buf = [0u8; 8];
        assert_eq!(reader.read(&mut buf).unwrap(), 5);
        assert_eq!(&buf[..5], &[9, 8, 7, 6, 5]);
    }

    #[test]
    fn test_non_riff_file_has_no_info() {
        let reader = WavReader::new(Cursor::new(vec![0u8; 64])).unwrap();
        assert!(reader.info().is_err());
    }
}
