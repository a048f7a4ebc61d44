//! Band scale: evenly spaced, equally wide slots for discrete values

/// Maps each value of an ordered discrete domain to a band in a pixel range
///
/// `padding` is the fraction of each step left empty, split evenly on both
/// sides of the band.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale<K> {
    domain: Vec<K>,
    range: (f64, f64),
    padding: f64,
}

impl<K: PartialEq + Clone> BandScale<K> {
    pub fn new(domain: Vec<K>, range: (f64, f64), padding: f64) -> Self {
        Self {
            domain,
            range,
            padding: padding.clamp(0.0, 0.95),
        }
    }

    /// Distance between the starts of adjacent bands
    pub fn step(&self) -> f64 {
        let n = self.domain.len();
        if n == 0 {
            return 0.0;
        }
        (self.range.1 - self.range.0) / n as f64
    }

    /// Width of one band
    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - self.padding)
    }

    /// Start of the band for `key`, `None` when `key` is not in the domain
    pub fn position(&self, key: &K) -> Option<f64> {
        let index = self.domain.iter().position(|k| k == key)?;
        Some(self.range.0 + self.step() * (index as f64 + self.padding * 0.5))
    }
}
