//! 16-bit PCM quantization and the WAV (RIFF) container.

use std::path::Path;

use crate::error::WavError;
use crate::track::MultiTrack;

/// Map a sample in [-1, 1] to a signed 16-bit value.
///
/// Linear scaling with saturation: exactly ±1 lands on the extreme
/// representable values rather than overflowing.
pub fn sample_to_int(x: f64) -> i16 {
    let scaled = (x * (1 << 15) as f64) as i32;
    scaled.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Map a signed 16-bit value back into [-1, 1].
pub fn int_to_sample(x: i16) -> f64 {
    x as f64 / (1 << 15) as f64
}

/// Decoded or to-be-encoded PCM audio.
///
/// `samples` is interleaved: one i16 per channel per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioData {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub samples: Vec<i16>,
}

impl AudioData {
    pub fn new(samples: Vec<i16>, channels: u16, sample_rate: u32) -> Self {
        AudioData {
            channels,
            sample_rate,
            bits_per_sample: 16,
            samples,
        }
    }

    /// Drain a multi-channel track into a container-ready block sequence.
    pub fn from_multi(
        multi: &mut MultiTrack,
        max_frames: Option<usize>,
    ) -> Result<Self, crate::error::RenderError> {
        let samples = multi.render_blocks(max_frames)?;
        Ok(AudioData::new(
            samples,
            multi.channels() as u16,
            multi.sample_rate(),
        ))
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Encode to a WAV byte buffer (PCM, 16-bit, little-endian).
    pub fn encode(&self) -> Vec<u8> {
        let bits_per_sample: u16 = 16;
        let byte_rate = self.sample_rate * self.channels as u32 * (bits_per_sample as u32 / 8);
        let block_align = self.channels * (bits_per_sample / 8);
        let data_size = (self.samples.len() * 2) as u32;
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        // RIFF header
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        // fmt chunk
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM format
        buf.extend_from_slice(&self.channels.to_le_bytes());
        buf.extend_from_slice(&self.sample_rate.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &sample in &self.samples {
            buf.extend_from_slice(&sample.to_le_bytes());
        }

        buf
    }

    /// Decode a WAV byte buffer. Integer PCM, 16 bits per sample only; a
    /// LIST chunk between `fmt ` and `data` is skipped (some encoders write
    /// one for metadata).
    pub fn decode(bytes: &[u8]) -> Result<Self, WavError> {
        let mut cur = Cursor { bytes, pos: 0 };

        cur.expect_tag(b"RIFF")?;
        let _file_size = cur.read_u32()?;
        cur.expect_tag(b"WAVE")?;

        cur.expect_tag(b"fmt ")?;
        let fmt_size = cur.read_u32()?;
        let audio_format = cur.read_u16()?;
        if audio_format != 1 {
            return Err(WavError::UnsupportedFormat { audio_format });
        }
        let channels = cur.read_u16()?;
        let sample_rate = cur.read_u32()?;
        let _byte_rate = cur.read_u32()?;
        let block_align = cur.read_u16()?;
        let bits_per_sample = cur.read_u16()?;
        if bits_per_sample != 16 {
            return Err(WavError::UnsupportedBitDepth {
                bits: bits_per_sample,
            });
        }
        if channels == 0 {
            return Err(WavError::BadHeader {
                detail: "zero channels",
            });
        }
        if block_align as u32 != channels as u32 * (bits_per_sample as u32 / 8) {
            return Err(WavError::BadHeader {
                detail: "block align disagrees with channels and bit depth",
            });
        }
        // Skip any fmt extension bytes.
        if fmt_size > 16 {
            cur.skip((fmt_size - 16) as usize)?;
        }

        // Optional LIST chunk before the data chunk.
        let tag = cur.read_tag()?;
        if &tag == b"LIST" {
            let list_size = cur.read_u32()?;
            cur.skip(list_size as usize)?;
            cur.expect_tag(b"data")?;
        } else if &tag != b"data" {
            return Err(WavError::BadMagic { expected: "data" });
        }

        let data_size = cur.read_u32()? as usize;
        let frame_count = data_size / block_align as usize;
        let sample_count = frame_count * channels as usize;

        let mut samples = Vec::with_capacity(sample_count);
        for _ in 0..sample_count {
            samples.push(cur.read_i16()?);
        }

        Ok(AudioData {
            channels,
            sample_rate,
            bits_per_sample,
            samples,
        })
    }

    /// Write the encoded container to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), WavError> {
        std::fs::write(path, self.encode())?;
        Ok(())
    }

    /// Read and decode a container file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, WavError> {
        let bytes = std::fs::read(path)?;
        Self::decode(&bytes)
    }
}

/// Byte-slice reader for header parsing.
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Cursor<'_> {
    fn take(&mut self, n: usize) -> Result<&[u8], WavError> {
        let end = self.pos + n;
        if end > self.bytes.len() {
            return Err(WavError::Truncated { at: self.pos });
        }
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn skip(&mut self, n: usize) -> Result<(), WavError> {
        self.take(n).map(|_| ())
    }

    fn read_tag(&mut self) -> Result<[u8; 4], WavError> {
        Ok(self.take(4)?.try_into().expect("length checked"))
    }

    fn expect_tag(&mut self, expected: &'static [u8; 4]) -> Result<(), WavError> {
        if &self.read_tag()? != expected {
            // The tags are all printable ASCII.
            return Err(WavError::BadMagic {
                expected: std::str::from_utf8(expected).expect("ascii tag"),
            });
        }
        Ok(())
    }

    fn read_u16(&mut self) -> Result<u16, WavError> {
        Ok(u16::from_le_bytes(
            self.take(2)?.try_into().expect("length checked"),
        ))
    }

    fn read_u32(&mut self) -> Result<u32, WavError> {
        Ok(u32::from_le_bytes(
            self.take(4)?.try_into().expect("length checked"),
        ))
    }

    fn read_i16(&mut self) -> Result<i16, WavError> {
        Ok(i16::from_le_bytes(
            self.take(2)?.try_into().expect("length checked"),
        ))
    }
}
