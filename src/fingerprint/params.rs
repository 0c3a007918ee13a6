//! Canonical, bit-exact constants for the fingerprint builder and matcher.

pub const CANONICAL_SAMPLE_RATE: u32 = 44_100;
pub const BASE_FREQ: f64 = 220.0;
pub const OCTAVES: usize = 12;
pub const OCTAVE_RATIO: f64 = std::f64::consts::SQRT_2;
pub const WINDOW_SECONDS: f64 = 0.02;
pub const FFT_SIZE: usize = 1024;
pub const MATCH_WINDOWS: usize = 3;
pub const MATCH_EPSILON: f64 = 1e-6;
pub const PROGRESS_STEP: f64 = 0.05;

/// `n_per_window` at the given sample rate (882 at the canonical 44100 Hz rate).
pub fn samples_per_window(sample_rate: u32) -> usize {
    (WINDOW_SECONDS * sample_rate as f64).floor() as usize
}

/// Real-valued lower bound of octave `o`, in FFT-bin units, at `n_per_window`.
pub fn octave_lo(o: usize, n_per_window: usize, sample_rate: u32) -> f64 {
    BASE_FREQ * OCTAVE_RATIO.powi(o as i32) * (n_per_window as f64 / sample_rate as f64)
}

/// Real-valued upper bound of octave `o` (== lower bound of octave `o+1`).
pub fn octave_hi(o: usize, n_per_window: usize, sample_rate: u32) -> f64 {
    octave_lo(o + 1, n_per_window, sample_rate)
}
