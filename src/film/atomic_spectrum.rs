/// N independent atomic floats forming one color sample. Generic
/// over `N` so the core doesn't commit to a specific color representation
/// (RGB, a hero-wavelength spectrum, whatever the shading layer above
/// this crate chooses) - it only needs to add and load `[f32; N]`s.
use super::atomic_float::AtomicFloat;

#[derive(Debug)]
pub struct AtomicSpectrum<const N: usize> {
    samples: [AtomicFloat; N],
}

impl<const N: usize> AtomicSpectrum<N> {
    pub fn new(value: [f32; N]) -> Self {
        AtomicSpectrum {
            samples: value.map(AtomicFloat::new),
        }
    }

    pub fn load(&self) -> [f32; N] {
        std::array::from_fn(|i| self.samples[i].load())
    }

    pub fn add(&self, other: [f32; N]) {
        for i in 0..N {
            self.samples[i].add(other[i]);
        }
    }

    pub fn sub(&self, other: [f32; N]) {
        for i in 0..N {
            self.samples[i].sub(other[i]);
        }
    }

    pub fn mul(&self, other: [f32; N]) {
        for i in 0..N {
            self.samples[i].mul(other[i]);
        }
    }

    pub fn mul_scalar(&self, a: f32) {
        for sample in &self.samples {
            sample.mul(a);
        }
    }
}

impl<const N: usize> Default for AtomicSpectrum<N> {
    fn default() -> Self {
        AtomicSpectrum::new([0.0; N])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_after_new_returns_the_initial_value() {
        let s = AtomicSpectrum::new([1.0, 2.0, 3.0]);
        assert_eq!(s.load(), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn add_accumulates_componentwise() {
        let s: AtomicSpectrum<3> = AtomicSpectrum::default();
        s.add([1.0, 2.0, 3.0]);
        s.add([1.0, 1.0, 1.0]);
        assert_eq!(s.load(), [2.0, 3.0, 4.0]);
    }
}
