//! Minimal RIFF/WAVE reader for uploaded voice notes.
//!
//! Supports the formats phone recorders actually produce when exporting
//! WAV: integer PCM (16-bit) and IEEE float (32-bit), mono or multi-channel
//! (channels are averaged down to mono).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WavError {
    #[error("not a RIFF/WAVE file")]
    NotWave,
    #[error("truncated chunk at offset {0}")]
    Truncated(usize),
    #[error("missing fmt chunk")]
    MissingFmt,
    #[error("missing data chunk")]
    MissingData,
    #[error("unsupported audio format tag {0}")]
    UnsupportedFormat(u16),
    #[error("unsupported bit depth {0}")]
    UnsupportedBitDepth(u16),
    #[error("invalid channel count 0")]
    NoChannels,
}

pub struct Waveform {
    /// Mono samples in [-1.0, 1.0].
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

const FORMAT_PCM: u16 = 1;
const FORMAT_IEEE_FLOAT: u16 = 3;

/// Decode a WAV byte buffer into mono f32 samples.
pub fn decode(bytes: &[u8]) -> Result<Waveform, WavError> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(WavError::NotWave);
    }

    let mut fmt: Option<(u16, u16, u32, u16)> = None; // (format, channels, rate, bits)
    let mut data: Option<&[u8]> = None;

    let mut pos = 12;
    while pos + 8 <= bytes.len() {
        let id = &bytes[pos..pos + 4];
        let size = u32::from_le_bytes([
            bytes[pos + 4],
            bytes[pos + 5],
            bytes[pos + 6],
            bytes[pos + 7],
        ]) as usize;
        let body_start = pos + 8;
        let body_end = body_start
            .checked_add(size)
            .filter(|&end| end <= bytes.len())
            .ok_or(WavError::Truncated(pos))?;
        let body = &bytes[body_start..body_end];

        match id {
            b"fmt " => {
                if body.len() < 16 {
                    return Err(WavError::Truncated(pos));
                }
                let format = u16::from_le_bytes([body[0], body[1]]);
                let channels = u16::from_le_bytes([body[2], body[3]]);
                let rate = u32::from_le_bytes([body[4], body[5], body[6], body[7]]);
                let bits = u16::from_le_bytes([body[14], body[15]]);
                fmt = Some((format, channels, rate, bits));
            }
            b"data" => data = Some(body),
            _ => {}
        }

        // Chunks are word-aligned
        pos = body_end + (size & 1);
    }

    let (format, channels, sample_rate, bits) = fmt.ok_or(WavError::MissingFmt)?;
    let data = data.ok_or(WavError::MissingData)?;
    if channels == 0 {
        return Err(WavError::NoChannels);
    }

    let per_channel: Vec<f32> = match (format, bits) {
        (FORMAT_PCM, 16) => data
            .chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]) as f32 / i16::MAX as f32)
            .collect(),
        (FORMAT_IEEE_FLOAT, 32) => data
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
        (FORMAT_PCM, other) | (FORMAT_IEEE_FLOAT, other) => {
            return Err(WavError::UnsupportedBitDepth(other));
        }
        (other, _) => return Err(WavError::UnsupportedFormat(other)),
    };

    // Mix down to mono
    let channels = channels as usize;
    let samples = if channels == 1 {
        per_channel
    } else {
        per_channel
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    Ok(Waveform {
        samples,
        sample_rate,
    })
}

#[cfg(test)]
pub(crate) fn encode_pcm16(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    let data_len = (samples.len() * 2) as u32;
    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&1u16.to_le_bytes()); // mono
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * 2).to_le_bytes()); // byte rate
    out.extend_from_slice(&2u16.to_le_bytes()); // block align
    out.extend_from_slice(&16u16.to_le_bytes()); // bits
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_wave_bytes() {
        assert!(matches!(decode(b"not audio at all"), Err(WavError::NotWave)));
    }

    #[test]
    fn pcm16_round_trip() {
        let samples = vec![0.0, 0.5, -0.5, 1.0, -1.0];
        let bytes = encode_pcm16(&samples, 16_000);
        let wave = decode(&bytes).unwrap();
        assert_eq!(wave.sample_rate, 16_000);
        assert_eq!(wave.samples.len(), samples.len());
        for (got, want) in wave.samples.iter().zip(&samples) {
            assert!((got - want).abs() < 1e-3, "{} vs {}", got, want);
        }
    }

    #[test]
    fn truncated_data_chunk_is_an_error() {
        let mut bytes = encode_pcm16(&[0.1; 100], 8_000);
        bytes.truncate(60);
        assert!(decode(&bytes).is_err());
    }
}
