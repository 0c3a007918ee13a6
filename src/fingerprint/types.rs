use ndarray::Array2;

use super::params::OCTAVES;

/// The compact triple of 2-D matrices equivalent to the broadcast 4-D
/// tensor described in the data model: `f0` carries the δ=0 slice (one
/// column per octave o₀), `f1`/`f2` carry the δ=1/2 slices (one column
/// per octave o₁). Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Fingerprint {
    pub(super) f0: Array2<f64>,
    pub(super) f1: Array2<f64>,
    pub(super) f2: Array2<f64>,
}

impl Fingerprint {
    pub(super) fn new(f0: Array2<f64>, f1: Array2<f64>, f2: Array2<f64>) -> Self {
        debug_assert_eq!(f0.shape(), f1.shape());
        debug_assert_eq!(f0.shape(), f2.shape());
        debug_assert_eq!(f0.ncols(), OCTAVES);
        Self { f0, f1, f2 }
    }

    /// Stored time-axis length, `W - 2`.
    pub fn w(&self) -> usize {
        self.f0.nrows()
    }

    pub fn f0(&self) -> &Array2<f64> {
        &self.f0
    }

    pub fn f1(&self) -> &Array2<f64> {
        &self.f1
    }

    pub fn f2(&self) -> &Array2<f64> {
        &self.f2
    }

    /// Reconstruct the broadcast 4-D cell value `(t, o0, o1, delta)` the
    /// compact matrices stand in for.
    pub fn cell(&self, t: usize, o0: usize, o1: usize, delta: usize) -> f64 {
        match delta {
            0 => self.f0[[t, o0]],
            1 => self.f1[[t, o1]],
            2 => self.f2[[t, o1]],
            _ => panic!("delta out of range: {delta}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fingerprint() -> Fingerprint {
        let f0 = Array2::from_shape_fn((4, OCTAVES), |(t, o)| (t * OCTAVES + o) as f64);
        let f1 = Array2::from_shape_fn((4, OCTAVES), |(t, o)| 100.0 + (t * OCTAVES + o) as f64);
        let f2 = Array2::from_shape_fn((4, OCTAVES), |(t, o)| 200.0 + (t * OCTAVES + o) as f64);
        Fingerprint::new(f0, f1, f2)
    }

    #[test]
    fn delta_zero_cell_is_broadcast_across_o1() {
        let fp = sample_fingerprint();
        for t in 0..fp.w() {
            for o0 in 0..OCTAVES {
                let expected = fp.f0()[[t, o0]];
                for o1 in 0..OCTAVES {
                    assert_eq!(fp.cell(t, o0, o1, 0), expected);
                }
            }
        }
    }

    #[test]
    fn delta_one_and_two_cells_are_broadcast_across_o0() {
        let fp = sample_fingerprint();
        for t in 0..fp.w() {
            for o1 in 0..OCTAVES {
                let expected1 = fp.f1()[[t, o1]];
                let expected2 = fp.f2()[[t, o1]];
                for o0 in 0..OCTAVES {
                    assert_eq!(fp.cell(t, o0, o1, 1), expected1);
                    assert_eq!(fp.cell(t, o0, o1, 2), expected2);
                }
            }
        }
    }
}
