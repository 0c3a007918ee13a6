//! Sliding-window matcher: scores a query fingerprint against a candidate
//! fingerprint by counting exact-equal feature triples at every alignment
//! offset, analogous to cross-correlation over discrete frequency indices.

use ndarray::Array2;

use crate::fingerprint::params::{MATCH_EPSILON, OCTAVES};
use crate::fingerprint::Fingerprint;

fn pad_rows(m: &Array2<f64>, pad: usize) -> Array2<f64> {
    let (rows, cols) = m.dim();
    let mut out = Array2::<f64>::zeros((rows + 2 * pad, cols));
    out.slice_mut(ndarray::s![pad..pad + rows, ..]).assign(m);
    out
}

/// Per-offset match scores between `a` and `b`; callers typically want
/// [`max_score`]. Orientation (which fingerprint is the "shorter" query) is
/// decided internally, so argument order does not matter.
pub fn scores(a: &Fingerprint, b: &Fingerprint) -> Vec<i64> {
    let (short, long) = if a.w() <= b.w() { (a, b) } else { (b, a) };

    let pad = short.w() / 2;
    let padded_f0 = pad_rows(long.f0(), pad);
    let padded_f1 = pad_rows(long.f1(), pad);
    let padded_f2 = pad_rows(long.f2(), pad);

    let padded_w = long.w() + 2 * pad;
    let conv_len = padded_w.saturating_sub(short.w()) + 1;

    let mut out = vec![0i64; conv_len];
    for (k, slot) in out.iter_mut().enumerate() {
        let mut total = 0i64;
        for t in 0..short.w() {
            let bt = k + t;

            let c0 = (0..OCTAVES)
                .filter(|&o0| (short.f0()[[t, o0]] - padded_f0[[bt, o0]]).abs() < MATCH_EPSILON)
                .count() as i64;

            let c12 = (0..OCTAVES)
                .filter(|&o1| {
                    (short.f1()[[t, o1]] - padded_f1[[bt, o1]]).abs() < MATCH_EPSILON
                        && (short.f2()[[t, o1]] - padded_f2[[bt, o1]]).abs() < MATCH_EPSILON
                })
                .count() as i64;

            total += c0 * c12;
        }
        *slot = total;
    }
    out
}

/// The matcher's result: the peak of the per-offset score vector.
pub fn max_score(a: &Fingerprint, b: &Fingerprint) -> i64 {
    scores(a, b).into_iter().max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::build_fingerprint;
    use crate::fingerprint::params::CANONICAL_SAMPLE_RATE;

    fn sine(freq: f64, duration_secs: f64, sample_rate: u32) -> Vec<f64> {
        let n = (duration_secs * sample_rate as f64) as usize;
        (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * freq * i as f64 / sample_rate as f64).sin())
            .collect()
    }

    #[test]
    fn self_match_hits_full_cell_count() {
        let samples = sine(440.0, 0.5, CANONICAL_SAMPLE_RATE);
        let fp = build_fingerprint(&samples, CANONICAL_SAMPLE_RATE).unwrap();
        let peak = max_score(&fp, &fp);
        assert_eq!(peak, (fp.w() * OCTAVES * OCTAVES) as i64);
    }

    #[test]
    fn embedded_in_silence_matches_self_score() {
        let clip = sine(440.0, 0.5, CANONICAL_SAMPLE_RATE);
        let clip_fp = build_fingerprint(&clip, CANONICAL_SAMPLE_RATE).unwrap();

        let pad = clip_fp.w() / 3;
        let mut padded = vec![0.0; pad * 882];
        padded.extend(&clip);
        padded.extend(vec![0.0; pad * 882]);
        let query_fp = build_fingerprint(&padded, CANONICAL_SAMPLE_RATE).unwrap();

        let self_peak = max_score(&clip_fp, &clip_fp);
        let embedded_peak = max_score(&query_fp, &clip_fp);
        assert_eq!(embedded_peak, self_peak);
    }

    #[test]
    fn unrelated_noise_scores_lower_than_self_match() {
        let mut state = 0x2545F4914F6CDD1Du64;
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state as f64 / u64::MAX as f64) * 2.0 - 1.0
        };

        let a: Vec<f64> = (0..22050).map(|_| next()).collect();
        let b: Vec<f64> = (0..22050).map(|_| next()).collect();

        let fp_a = build_fingerprint(&a, CANONICAL_SAMPLE_RATE).unwrap();
        let fp_b = build_fingerprint(&b, CANONICAL_SAMPLE_RATE).unwrap();

        let cross = max_score(&fp_a, &fp_b);
        let self_score = max_score(&fp_a, &fp_a);
        assert!(cross < self_score);
    }
}
