//! Silence trimming, resampling, and channel selection — the glue between
//! a raw [`crate::audio::PcmBuffer`] and the mono stream the fingerprint
//! builder expects.

use rubato::{Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction};

use crate::audio::PcmBuffer;
use crate::error::{MatchError, Result};
use crate::fingerprint::params::CANONICAL_SAMPLE_RATE;

const SILENCE_TOP_DB: f64 = 120.0;
const SILENCE_FRAME: usize = 1024;
const SILENCE_HOP: usize = 256;

/// Trim leading/trailing samples more than [`SILENCE_TOP_DB`] below the peak
/// frame energy, measured over frames of length [`SILENCE_FRAME`] with hop
/// [`SILENCE_HOP`].
pub fn trim_silence(samples: &[f64]) -> &[f64] {
    if samples.is_empty() {
        return samples;
    }

    let n_frames = samples.len().div_ceil(SILENCE_HOP).max(1);
    let mut frame_rms = Vec::with_capacity(n_frames);
    let mut peak_rms = 0.0_f64;

    for frame_idx in 0..n_frames {
        let start = frame_idx * SILENCE_HOP;
        if start >= samples.len() {
            frame_rms.push(0.0);
            continue;
        }
        let end = (start + SILENCE_FRAME).min(samples.len());
        let frame = &samples[start..end];
        let sum_sq: f64 = frame.iter().map(|s| s * s).sum();
        let rms = (sum_sq / SILENCE_FRAME as f64).sqrt();
        peak_rms = peak_rms.max(rms);
        frame_rms.push(rms);
    }

    if peak_rms <= 0.0 {
        return &samples[0..0];
    }

    let threshold_ratio = 10f64.powf(-SILENCE_TOP_DB / 20.0);
    let threshold = peak_rms * threshold_ratio;

    let first_loud = frame_rms.iter().position(|&r| r >= threshold);
    let last_loud = frame_rms.iter().rposition(|&r| r >= threshold);

    match (first_loud, last_loud) {
        (Some(first), Some(last)) => {
            let start = first * SILENCE_HOP;
            let end = ((last * SILENCE_HOP) + SILENCE_FRAME).min(samples.len());
            &samples[start..end]
        }
        _ => &samples[0..0],
    }
}

/// Resample `samples` from `from_rate` to `to_rate` using a band-limited
/// windowed-sinc interpolator. Identity when the rates already match.
pub fn resample(samples: &[f64], from_rate: u32, to_rate: u32) -> Result<Vec<f64>> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }
    if from_rate == 0 || to_rate == 0 {
        return Err(MatchError::ParameterInvalid(
            "sample rate must be positive".to_string(),
        ));
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        oversampling_factor: 256,
        interpolation: SincInterpolationType::Linear,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = to_rate as f64 / from_rate as f64;
    let mut resampler = SincFixedIn::<f64>::new(ratio, 2.0, params, samples.len(), 1).map_err(
        |e| MatchError::ParameterInvalid(format!("failed to build resampler: {e}")),
    )?;

    let waves_in = vec![samples.to_vec()];
    let mut waves_out = resampler
        .process(&waves_in, None)
        .map_err(|e| MatchError::ParameterInvalid(format!("resample failed: {e}")))?;

    Ok(waves_out.remove(0))
}

/// Average all channels into one.
pub fn downmix_to_mono(buffer: &PcmBuffer) -> Vec<f64> {
    let n = buffer.num_samples();
    let num_channels = buffer.num_channels().max(1);
    let mut mono = vec![0.0_f64; n];
    for channel in &buffer.channels {
        for (i, &s) in channel.iter().enumerate() {
            mono[i] += s / num_channels as f64;
        }
    }
    mono
}

/// Select the mono streams the fingerprint builder should run over: either
/// the forced-mono downmix, or the requested channel indices, or (default)
/// every channel.
pub fn select_streams(
    buffer: &PcmBuffer,
    channel_indices: Option<&[usize]>,
    force_mono: bool,
) -> Vec<Vec<f64>> {
    if force_mono {
        return vec![downmix_to_mono(buffer)];
    }

    match channel_indices {
        Some(indices) => indices
            .iter()
            .filter_map(|&i| buffer.channels.get(i).cloned())
            .collect(),
        None => buffer.channels.clone(),
    }
}

/// Trim and resample a single mono stream to the canonical sample rate.
pub fn preprocess_channel(samples: &[f64], sample_rate: u32) -> Result<Vec<f64>> {
    let trimmed = trim_silence(samples);
    resample(trimmed, sample_rate, CANONICAL_SAMPLE_RATE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, duration_secs: f64, sample_rate: u32) -> Vec<f64> {
        let n = (duration_secs * sample_rate as f64) as usize;
        (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * freq * i as f64 / sample_rate as f64).sin())
            .collect()
    }

    #[test]
    fn trims_leading_and_trailing_silence() {
        let mut samples = vec![0.0; 4096];
        samples.extend(sine(440.0, 0.5, 44100));
        samples.extend(vec![0.0; 4096]);

        let trimmed = trim_silence(&samples);
        assert!(trimmed.len() < samples.len());
        assert!(trimmed.len() as f64 >= 0.5 * 44100.0 * 0.9);
    }

    #[test]
    fn all_silence_trims_to_empty() {
        let samples = vec![0.0; 8192];
        assert!(trim_silence(&samples).is_empty());
    }

    #[test]
    fn resample_identity_when_rates_match() {
        let samples = sine(440.0, 0.1, 44100);
        let out = resample(&samples, 44100, 44100).unwrap();
        assert_eq!(out, samples);
    }

    #[test]
    fn resample_changes_length_proportionally() {
        let samples = sine(440.0, 1.0, 22050);
        let out = resample(&samples, 22050, 44100).unwrap();
        let ratio = out.len() as f64 / samples.len() as f64;
        assert!((ratio - 2.0).abs() < 0.05);
    }

    #[test]
    fn downmix_averages_channels() {
        let buffer = PcmBuffer {
            channels: vec![vec![1.0, 1.0], vec![-1.0, -1.0]],
            sample_rate: 44100,
        };
        let mono = downmix_to_mono(&buffer);
        assert_eq!(mono, vec![0.0, 0.0]);
    }
}
