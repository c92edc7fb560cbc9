//! Voice-note stress analysis.
//!
//! Computes short-term energy (RMS amplitude) and a fundamental-frequency
//! estimate over a decoded waveform, then maps the pair to a coarse
//! three-level stress label with fixed empirical thresholds.

pub mod wav;

pub use wav::{WavError, Waveform, decode};

use tracing::debug;

/// Coarse stress classification derived from acoustic energy and pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StressLevel {
    High,
    Moderate,
    LowOrNone,
}

impl StressLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StressLevel::High => "High Stress",
            StressLevel::Moderate => "Moderate Stress",
            StressLevel::LowOrNone => "Low/No Stress",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VoiceAnalysis {
    /// RMS amplitude of the whole clip, in [0, 1].
    pub energy: f32,
    /// Estimated fundamental frequency in Hz; 0.0 when no voiced pitch found.
    pub pitch_hz: f32,
    pub level: StressLevel,
}

// Empirical thresholds, uncalibrated. Raised voices on phone microphones
// land above ~0.03 RMS, and a strained voice pushes the fundamental
// past ~200 Hz.
const HIGH_ENERGY: f32 = 0.03;
const HIGH_PITCH_HZ: f32 = 200.0;
const MODERATE_ENERGY: f32 = 0.02;

// Plausible speech fundamentals. Outside this band autocorrelation peaks
// are noise or harmonics.
const MIN_PITCH_HZ: f32 = 50.0;
const MAX_PITCH_HZ: f32 = 500.0;

// Below this normalized autocorrelation the frame is treated as unvoiced.
const VOICING_THRESHOLD: f32 = 0.5;

// Speech pitch is near-stationary over a stretch this short, and
// autocorrelating a whole multi-minute upload would cost samples x lags.
// A fixed centered window keeps the cost flat regardless of clip length.
const PITCH_WINDOW: usize = 8192;

/// Map an (energy, pitch) pair to a stress label.
pub fn classify(energy: f32, pitch_hz: f32) -> StressLevel {
    if energy > HIGH_ENERGY && pitch_hz > HIGH_PITCH_HZ {
        StressLevel::High
    } else if energy > MODERATE_ENERGY {
        StressLevel::Moderate
    } else {
        StressLevel::LowOrNone
    }
}

/// Root-mean-square amplitude of the clip.
pub fn rms_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Fundamental-frequency estimate via normalized autocorrelation over a
/// centered window of at most `PITCH_WINDOW` samples.
///
/// Searches lags corresponding to 50-500 Hz and returns the frequency of
/// the shortest lag within 1% of the best peak (picking the shortest lag
/// avoids locking onto the octave below). Returns 0.0 for unvoiced or
/// too-short input.
pub fn estimate_pitch(samples: &[f32], sample_rate: u32) -> f32 {
    if sample_rate == 0 {
        return 0.0;
    }

    let samples = if samples.len() > PITCH_WINDOW {
        let start = (samples.len() - PITCH_WINDOW) / 2;
        &samples[start..start + PITCH_WINDOW]
    } else {
        samples
    };

    let min_lag = (sample_rate as f32 / MAX_PITCH_HZ) as usize;
    let max_lag = ((sample_rate as f32 / MIN_PITCH_HZ) as usize).min(samples.len() / 2);
    if min_lag == 0 || max_lag <= min_lag {
        return 0.0;
    }

    let norm: f32 = samples.iter().map(|s| s * s).sum();
    if norm <= f32::EPSILON {
        return 0.0;
    }

    let mut scores = Vec::with_capacity(max_lag - min_lag + 1);
    let mut best = 0.0f32;
    for lag in min_lag..=max_lag {
        let mut acc = 0.0f32;
        for i in 0..samples.len() - lag {
            acc += samples[i] * samples[i + lag];
        }
        let score = acc / norm;
        scores.push((lag, score));
        if score > best {
            best = score;
        }
    }

    if best < VOICING_THRESHOLD {
        return 0.0;
    }

    // Shortest lag close to the best peak wins
    let lag = scores
        .iter()
        .find(|(_, s)| *s >= best * 0.99)
        .map(|(lag, _)| *lag)
        .unwrap_or(min_lag);

    sample_rate as f32 / lag as f32
}

/// Analyze an already-decoded waveform.
pub fn analyze(waveform: &Waveform) -> VoiceAnalysis {
    let energy = rms_energy(&waveform.samples);
    let pitch_hz = estimate_pitch(&waveform.samples, waveform.sample_rate);
    let level = classify(energy, pitch_hz);

    debug!(energy, pitch_hz, level = level.as_str(), "voice note analyzed");

    VoiceAnalysis {
        energy,
        pitch_hz,
        level,
    }
}

/// Decode a WAV upload and analyze it in one step.
pub fn analyze_wav(bytes: &[u8]) -> Result<VoiceAnalysis, WavError> {
    let waveform = decode(bytes)?;
    Ok(analyze(&waveform))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, amplitude: f32, sample_rate: u32, seconds: f32) -> Vec<f32> {
        let n = (sample_rate as f32 * seconds) as usize;
        (0..n)
            .map(|i| {
                amplitude * (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin()
            })
            .collect()
    }

    #[test]
    fn classify_matches_fixed_thresholds() {
        assert_eq!(classify(0.05, 250.0), StressLevel::High);
        assert_eq!(classify(0.025, 100.0), StressLevel::Moderate);
        assert_eq!(classify(0.01, 0.0), StressLevel::LowOrNone);
        // Loud but low-pitched stays Moderate
        assert_eq!(classify(0.05, 150.0), StressLevel::Moderate);
    }

    #[test]
    fn stress_labels_are_stable_strings() {
        assert_eq!(StressLevel::High.as_str(), "High Stress");
        assert_eq!(StressLevel::Moderate.as_str(), "Moderate Stress");
        assert_eq!(StressLevel::LowOrNone.as_str(), "Low/No Stress");
    }

    #[test]
    fn rms_of_constant_signal() {
        let samples = vec![0.5f32; 1000];
        assert!((rms_energy(&samples) - 0.5).abs() < 1e-6);
        assert_eq!(rms_energy(&[]), 0.0);
    }

    #[test]
    fn pitch_of_pure_tone() {
        // 250 Hz at 16 kHz: period is exactly 64 samples.
        let samples = sine(250.0, 0.5, 16_000, 0.5);
        let pitch = estimate_pitch(&samples, 16_000);
        assert!((pitch - 250.0).abs() < 10.0, "got {} Hz", pitch);
    }

    #[test]
    fn pitch_is_steady_on_long_clips() {
        // A long note gets the same estimate as a short one: the
        // autocorrelation only ever sees the centered window.
        let long = sine(250.0, 0.5, 16_000, 10.0);
        assert!(long.len() > PITCH_WINDOW);
        let pitch = estimate_pitch(&long, 16_000);
        assert!((pitch - 250.0).abs() < 10.0, "got {} Hz", pitch);
    }

    #[test]
    fn silence_has_no_pitch() {
        let samples = vec![0.0f32; 16_000];
        assert_eq!(estimate_pitch(&samples, 16_000), 0.0);
    }

    #[test]
    fn loud_high_pitched_clip_is_high_stress() {
        // RMS of a sine is amplitude / sqrt(2): 0.1 -> ~0.071
        let samples = sine(250.0, 0.1, 16_000, 0.5);
        let bytes = wav::encode_pcm16(&samples, 16_000);
        let analysis = analyze_wav(&bytes).unwrap();
        assert_eq!(analysis.level, StressLevel::High);
        assert!(analysis.energy > 0.03);
        assert!(analysis.pitch_hz > 200.0);
    }

    #[test]
    fn low_pitched_mid_energy_clip_is_moderate() {
        // amplitude 0.035 -> RMS ~0.0247, pitch 100 Hz
        let samples = sine(100.0, 0.035, 16_000, 0.5);
        let bytes = wav::encode_pcm16(&samples, 16_000);
        let analysis = analyze_wav(&bytes).unwrap();
        assert_eq!(analysis.level, StressLevel::Moderate);
    }

    #[test]
    fn quiet_clip_is_low_stress() {
        let samples = sine(220.0, 0.01, 16_000, 0.5);
        let bytes = wav::encode_pcm16(&samples, 16_000);
        let analysis = analyze_wav(&bytes).unwrap();
        assert_eq!(analysis.level, StressLevel::LowOrNone);
    }
}
