/// A float accumulated from multiple threads without locks:
/// storage is one atomic 32-bit word, bitcast to/from `f32`. There is no
/// hardware float-atomic-add on the targets this renders for, so every
/// read-modify-write goes through a CAS loop over the bit pattern.
///
/// NaN accumulation is undefined (NaN bit patterns aren't unique under
/// bitcast), so every entry point rejects a NaN operand in debug builds.
use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug)]
pub struct AtomicFloat {
    bits: AtomicU32,
}

impl AtomicFloat {
    pub fn new(value: f32) -> Self {
        debug_assert!(!value.is_nan());
        AtomicFloat {
            bits: AtomicU32::new(value.to_bits()),
        }
    }

    pub fn load(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::SeqCst))
    }

    pub fn store(&self, value: f32) {
        debug_assert!(!value.is_nan());
        self.bits.store(value.to_bits(), Ordering::SeqCst);
    }

    fn apply(&self, f: impl Fn(f32) -> f32) {
        let mut current = self.bits.load(Ordering::SeqCst);
        loop {
            let value = f(f32::from_bits(current));
            debug_assert!(!value.is_nan());
            match self.bits.compare_exchange_weak(
                current,
                value.to_bits(),
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return,
                Err(observed) => current = observed,
            }
        }
    }

    pub fn add(&self, b: f32) {
        debug_assert!(!b.is_nan());
        self.apply(|a| a + b);
    }

    pub fn sub(&self, b: f32) {
        debug_assert!(!b.is_nan());
        self.apply(|a| a - b);
    }

    pub fn mul(&self, b: f32) {
        debug_assert!(!b.is_nan());
        self.apply(|a| a * b);
    }
}

impl Default for AtomicFloat {
    fn default() -> Self {
        AtomicFloat::new(0.0)
    }
}
