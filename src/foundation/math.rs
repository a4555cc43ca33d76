/// FNV-1a 64-bit hasher for layout fingerprints that stay stable across runs.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Fnv1a64(u64);

impl Fnv1a64 {
    const PRIME: u64 = 0x0000_0100_0000_01B3;

    pub(crate) fn new() -> Self {
        Self(0xcbf2_9ce4_8422_2325)
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        self.0 = bytes.iter().fold(self.0, |h, &b| {
            (h ^ u64::from(b)).wrapping_mul(Self::PRIME)
        });
    }

    /// Hash the bit pattern; `-0.0` and `0.0` are folded together.
    pub(crate) fn write_f64(&mut self, v: f64) {
        let v = if v == 0.0 { 0.0 } else { v };
        self.write_bytes(&v.to_bits().to_le_bytes());
    }

    pub(crate) fn write_opt_f64(&mut self, v: Option<f64>) {
        self.write_bytes(&[u8::from(v.is_some())]);
        if let Some(v) = v {
            self.write_f64(v);
        }
    }

    /// Length-prefixed so adjacent strings cannot alias.
    pub(crate) fn write_str(&mut self, s: &str) {
        self.write_bytes(&(s.len() as u64).to_le_bytes());
        self.write_bytes(s.as_bytes());
    }

    pub(crate) fn finish(self) -> u64 {
        self.0
    }
}

/// `x * y / 255` rounded to nearest, for 8-bit channel products.
pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    ((u32::from(x) * u32::from(y) + 127) / 255).min(255) as u8
}

/// Round to two decimal places, the precision persisted percent values carry.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Round up to two decimals, for values that must not fall below a floor.
pub fn ceil2(v: f64) -> f64 {
    (v * 100.0 - 1e-9).ceil() / 100.0
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
