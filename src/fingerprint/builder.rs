use ndarray::{s, Array2};
use rustfft::{num_complex::Complex, FftPlanner};

use super::params::{
    octave_hi, octave_lo, samples_per_window, FFT_SIZE, MATCH_WINDOWS, OCTAVES,
};
use super::types::Fingerprint;
use crate::error::{MatchError, Result};

struct OctaveBand {
    lo_bin: usize,
    hi_bin: usize,
    lo_real: f64,
}

fn octave_bands(n_per_window: usize, sample_rate: u32) -> Result<Vec<OctaveBand>> {
    (0..OCTAVES)
        .map(|o| {
            let lo_real = octave_lo(o, n_per_window, sample_rate);
            let hi_real = octave_hi(o, n_per_window, sample_rate);
            let lo_bin = lo_real.floor() as usize;
            let hi_bin = hi_real.floor() as usize;
            if hi_bin <= lo_bin {
                return Err(MatchError::ParameterInvalid(format!(
                    "octave {o} yields an empty FFT-bin range at sample rate {sample_rate}"
                )));
            }
            Ok(OctaveBand {
                lo_bin,
                hi_bin,
                lo_real,
            })
        })
        .collect()
}

/// Argmax over `magnitudes[lo..hi]`, ties resolved to the lowest index.
fn dominant_bin(magnitudes: &[f64], lo: usize, hi: usize) -> usize {
    let mut best_idx = lo;
    let mut best_val = magnitudes[lo];
    for (offset, &m) in magnitudes[lo..hi].iter().enumerate().skip(1) {
        if m > best_val {
            best_val = m;
            best_idx = lo + offset;
        }
    }
    best_idx
}

/// Build a fingerprint from one preprocessed mono stream, already at
/// [`crate::fingerprint::params::CANONICAL_SAMPLE_RATE`].
pub fn build_fingerprint(samples: &[f64], sample_rate: u32) -> Result<Fingerprint> {
    let n_per_window = samples_per_window(sample_rate);
    if n_per_window == 0 {
        return Err(MatchError::ParameterInvalid(
            "sample rate too low to form a 20ms window".to_string(),
        ));
    }
    if samples.is_empty() {
        return Err(MatchError::EmptyAfterTrim {
            path: Default::default(),
        });
    }

    let bands = octave_bands(n_per_window, sample_rate)?;
    let max_hi_bin = bands.iter().map(|b| b.hi_bin).max().unwrap_or(0);

    let raw_windows = samples.len().div_ceil(n_per_window).max(1);
    let w = raw_windows.max(MATCH_WINDOWS);

    let mut feature = Array2::<f64>::zeros((w, OCTAVES));

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(FFT_SIZE);
    let mut buffer = vec![Complex::new(0.0, 0.0); FFT_SIZE];
    let mut magnitudes = vec![0.0_f64; max_hi_bin.min(FFT_SIZE)];

    for window_idx in 0..raw_windows {
        let start = window_idx * n_per_window;
        let end = (start + n_per_window).min(samples.len());

        buffer.iter_mut().for_each(|c| *c = Complex::new(0.0, 0.0));
        for (dst, &src) in buffer.iter_mut().zip(samples[start..end].iter()) {
            dst.re = src;
        }

        fft.process(&mut buffer);

        for (m, c) in magnitudes.iter_mut().zip(buffer.iter()) {
            *m = c.norm();
        }

        for (o, band) in bands.iter().enumerate() {
            let peak_offset = dominant_bin(&magnitudes, band.lo_bin, band.hi_bin);
            let peak = peak_offset as f64;
            feature[[window_idx, o]] = (peak / band.lo_real).log2();
        }
    }

    let f0 = feature.slice(s![0..w - 2, ..]).to_owned();
    let f1 = feature.slice(s![1..w - 1, ..]).to_owned();
    let f2 = feature.slice(s![2..w, ..]).to_owned();

    Ok(Fingerprint::new(f0, f1, f2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::params::CANONICAL_SAMPLE_RATE;

    fn sine(freq: f64, duration_secs: f64, sample_rate: u32) -> Vec<f64> {
        let n = (duration_secs * sample_rate as f64) as usize;
        (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * freq * i as f64 / sample_rate as f64).sin())
            .collect()
    }

    #[test]
    fn shape_matches_invariant() {
        let samples = sine(440.0, 1.0, CANONICAL_SAMPLE_RATE);
        let fp = build_fingerprint(&samples, CANONICAL_SAMPLE_RATE).unwrap();
        assert_eq!(fp.f0().ncols(), OCTAVES);
        assert_eq!(fp.f0().nrows(), fp.f1().nrows());
        assert_eq!(fp.f0().nrows(), fp.f2().nrows());
    }

    #[test]
    fn short_input_pads_to_minimum_windows() {
        let samples = sine(440.0, 0.01, CANONICAL_SAMPLE_RATE);
        let fp = build_fingerprint(&samples, CANONICAL_SAMPLE_RATE).unwrap();
        assert_eq!(fp.w(), MATCH_WINDOWS - 2);
    }

    #[test]
    fn features_are_in_unit_range() {
        let samples = sine(880.0, 0.5, CANONICAL_SAMPLE_RATE);
        let fp = build_fingerprint(&samples, CANONICAL_SAMPLE_RATE).unwrap();
        for row in fp.f0().rows() {
            for &v in row {
                assert!((0.0..1.0).contains(&v), "feature {v} out of range");
            }
        }
    }

    #[test]
    fn identical_streams_produce_identical_fingerprints() {
        let samples = sine(523.25, 0.3, CANONICAL_SAMPLE_RATE);
        let a = build_fingerprint(&samples, CANONICAL_SAMPLE_RATE).unwrap();
        let b = build_fingerprint(&samples, CANONICAL_SAMPLE_RATE).unwrap();
        assert_eq!(a, b);
    }
}
