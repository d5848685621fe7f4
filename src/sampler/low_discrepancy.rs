/// Bit-primitive (0,2)-sequence generators: van der Corput for
/// one dimension paired with a Gray-code Sobol-2 generator for the other,
/// each scrambled by XOR with a per-pixel random word.
use crate::math::reverse_bits;
use crate::rng::Rng;

/// Converts the top 24 bits of `bits` to a float strictly below `1.0` -
/// the full 32-bit conversion can round up to exactly `1.0` for inputs near
/// `u32::MAX`, which would violate the `[0,1)` contract every sampler slot
/// promises its caller.
fn to_float(bits: u32) -> f32 {
    (bits >> 8) as f32 * (1.0 / (1u32 << 24) as f32)
}

/// `index`'s van der Corput radical-inverse in base 2, scrambled.
pub fn van_der_corput(index: u32, scramble: u32) -> f32 {
    to_float(reverse_bits(index) ^ scramble)
}

/// Gray-code-driven Sobol dimension-2 generator, scrambled.
pub fn sobol2(index: u32, scramble: u32) -> u32 {
    let mut index = index;
    let mut v: u32 = 1 << 31;
    let mut scramble = scramble;
    while index != 0 {
        if index & 1 != 0 {
            scramble ^= v;
        }
        index >>= 1;
        v ^= v >> 1;
    }
    scramble
}

/// A single (0,2)-sequence point: van der Corput paired with Sobol-2.
pub fn zero_two(index: u32, scramble_0: u32, scramble_1: u32) -> (f32, f32) {
    (van_der_corput(index, scramble_0), to_float(sobol2(index, scramble_1)))
}

/// Generates `n` van der Corput values starting at `start_index`, scrambled
/// by one fresh random word drawn from `rng`.
pub fn low_discrepancy_1d(start_index: u32, n: usize, rng: &mut Rng) -> Vec<f32> {
    let scramble = rng.next_u32();
    (0..n as u32).map(|i| van_der_corput(start_index + i, scramble)).collect()
}

/// Generates `n` (0,2)-sequence points starting at `start_index`, scrambled
/// by two fresh random words drawn from `rng`.
pub fn low_discrepancy_2d(start_index: u32, n: usize, rng: &mut Rng) -> Vec<(f32, f32)> {
    let scramble_0 = rng.next_u32();
    let scramble_1 = rng.next_u32();
    (0..n as u32)
        .map(|i| zero_two(start_index + i, scramble_0, scramble_1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn van_der_corput_is_in_unit_range() {
        for i in 0..64 {
            let v = van_der_corput(i, 0);
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn van_der_corput_unscrambled_sequence_starts_at_known_values() {
        assert_eq!(van_der_corput(0, 0), 0.0);
        assert!((van_der_corput(1, 0) - 0.5).abs() < 1e-6);
        assert!((van_der_corput(2, 0) - 0.25).abs() < 1e-6);
        assert!((van_der_corput(3, 0) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn zero_two_net_property_holds_for_unscrambled_power_of_two_points() {
        // the first 2^k points of a (0,2)-sequence must
        // form a (0,2)-net - every elementary 4x4 rectangle (area 2^-4,
        // k=4 split as 4 strata per axis) holds exactly one point.
        const N: u32 = 16;
        let mut grid = [[0u32; 4]; 4];
        for i in 0..N {
            let (x, y) = zero_two(i, 0, 0);
            let cx = ((x * 4.0) as usize).min(3);
            let cy = ((y * 4.0) as usize).min(3);
            grid[cy][cx] += 1;
        }
        for row in grid {
            for count in row {
                assert_eq!(count, 1);
            }
        }
    }

    #[test]
    fn low_discrepancy_1d_produces_requested_count() {
        let mut rng = Rng::new(1);
        let values = low_discrepancy_1d(0, 32, &mut rng);
        assert_eq!(values.len(), 32);
        for v in values {
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn low_discrepancy_2d_produces_requested_count() {
        let mut rng = Rng::new(2);
        let values = low_discrepancy_2d(0, 32, &mut rng);
        assert_eq!(values.len(), 32);
        for (x, y) in values {
            assert!((0.0..1.0).contains(&x));
            assert!((0.0..1.0).contains(&y));
        }
    }
}
