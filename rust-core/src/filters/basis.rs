//! Interpolated cosine/sine basis table for the correlator bank
//!
//! One table is built per engine and shared read-only by every band.

use std::f64::consts::PI;

/// Default number of table subdivisions over one cycle
pub const DEFAULT_RESOLUTION: usize = 24;

/// One cycle of cosine and sine, sampled at `resolution` points
///
/// Both tables carry one extra entry (a copy of entry 0) so interpolation
/// never has to wrap the upper index.
#[derive(Debug, Clone)]
pub struct BasisTable {
    cos: Vec<f64>,
    sin: Vec<f64>,
    resolution: usize,
}

impl BasisTable {
    /// Build a table
    ///
    /// # Arguments
    /// * `resolution` - Subdivisions per cycle (at least 4)
    pub fn new(resolution: usize) -> Self {
        let resolution = resolution.max(4);
        let mut cos = Vec::with_capacity(resolution + 1);
        let mut sin = Vec::with_capacity(resolution + 1);

        for i in 0..=resolution {
            let angle = 2.0 * PI * i as f64 / resolution as f64;
            cos.push(angle.cos());
            sin.push(angle.sin());
        }

        Self {
            cos,
            sin,
            resolution,
        }
    }

    /// Interpolated `(cos, sin)` at a phase in cycles, `[0, 1)`
    #[inline]
    pub fn lookup(&self, phase: f64) -> (f64, f64) {
        let pos = phase * self.resolution as f64;
        let idx = (pos as usize).min(self.resolution - 1);
        let frac = pos - idx as f64;

        let c = self.cos[idx] + (self.cos[idx + 1] - self.cos[idx]) * frac;
        let s = self.sin[idx] + (self.sin[idx + 1] - self.sin[idx]) * frac;
        (c, s)
    }

    /// Subdivisions per cycle
    pub fn resolution(&self) -> usize {
        self.resolution
    }
}

impl Default for BasisTable {
    fn default() -> Self {
        Self::new(DEFAULT_RESOLUTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_endpoints() {
        let table = BasisTable::default();
        assert_eq!(table.resolution(), 24);

        let (c, s) = table.lookup(0.0);
        assert!((c - 1.0).abs() < 1e-12);
        assert!(s.abs() < 1e-12);

        let (c, s) = table.lookup(0.25);
        assert!(c.abs() < 1e-12);
        assert!((s - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_interpolation_error_is_small() {
        let table = BasisTable::new(24);

        for i in 0..1000 {
            let phase = i as f64 / 1000.0;
            let (c, s) = table.lookup(phase);
            let angle = 2.0 * PI * phase;
            // Linear interpolation error bound: h²/8 with h = 2π/24
            assert!((c - angle.cos()).abs() < 0.01, "cos error at {}", phase);
            assert!((s - angle.sin()).abs() < 0.01, "sin error at {}", phase);
        }
    }

    #[test]
    fn test_lookup_just_below_one() {
        let table = BasisTable::new(24);
        let (c, s) = table.lookup(1.0 - 1e-12);
        assert!((c - 1.0).abs() < 1e-6);
        assert!(s.abs() < 1e-6);
    }
}
