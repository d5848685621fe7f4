/// Monte-Carlo sampling primitives: mapping a pair (or single) of
/// canonical `[0,1)` random numbers onto a geometric domain, with the
/// matching area-measure pdf, plus the Latin hypercube and MIS building
/// blocks the sampler substrate is built from.
use crate::geometry::Vector;
use crate::math::{PI, TWO_PI};
use crate::rng::Rng;

/// Uniformly distributed point on the unit disk, via the concentric
/// (Shirley-Chiu) mapping rather than `r=sqrt(u), theta=2*pi*v`, which
/// clusters samples near the origin less evenly under stratification.
pub fn uniform_disk_sample(u: (f32, f32)) -> (f32, f32) {
    let ux = 2.0 * u.0 - 1.0;
    let uy = 2.0 * u.1 - 1.0;
    if ux == 0.0 && uy == 0.0 {
        return (0.0, 0.0);
    }
    let (r, theta) = if ux.abs() > uy.abs() {
        (ux, (PI / 4.0) * (uy / ux))
    } else {
        (uy, (PI / 2.0) - (PI / 4.0) * (ux / uy))
    };
    (r * theta.cos(), r * theta.sin())
}

pub fn uniform_disk_pdf() -> f32 {
    1.0 / PI
}

pub fn uniform_sphere_sample(u: (f32, f32)) -> Vector {
    let z = 1.0 - 2.0 * u.0;
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = TWO_PI * u.1;
    Vector::new(r * phi.cos(), r * phi.sin(), z)
}

pub fn uniform_sphere_pdf() -> f32 {
    1.0 / (4.0 * PI)
}

pub fn uniform_hemisphere_sample(u: (f32, f32)) -> Vector {
    let z = u.0;
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = TWO_PI * u.1;
    Vector::new(r * phi.cos(), r * phi.sin(), z)
}

pub fn uniform_hemisphere_pdf() -> f32 {
    1.0 / (2.0 * PI)
}

/// Cosine-weighted hemisphere sample, lifted from a concentric disk sample
/// by projecting it up onto the hemisphere (Malley's method).
pub fn cosine_hemisphere_sample(u: (f32, f32)) -> Vector {
    let (x, y) = uniform_disk_sample(u);
    let z = (1.0 - x * x - y * y).max(0.0).sqrt();
    Vector::new(x, y, z)
}

pub fn cosine_hemisphere_pdf(cos_theta: f32) -> f32 {
    cos_theta * (1.0 / PI)
}

/// Uniform sample within a cone of half-angle `acos(cos_theta_max)` around
/// `+z`, used for sampling solid-angle-subtending shapes (e.g. spheres).
pub fn uniform_cone_sample(u: (f32, f32), cos_theta_max: f32) -> Vector {
    let cos_theta = (1.0 - u.0) + u.0 * cos_theta_max;
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi = TWO_PI * u.1;
    Vector::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}

pub fn uniform_cone_pdf(cos_theta_max: f32) -> f32 {
    1.0 / (TWO_PI * (1.0 - cos_theta_max))
}

/// Power heuristic (β=2) multiple-importance-sampling weight for a sample
/// drawn from strategy `a` among two strategies.
pub fn mis_power_heuristic(n_a: u32, p_a: f32, n_b: u32, p_b: f32) -> f32 {
    let a = n_a as f32 * p_a;
    let b = n_b as f32 * p_b;
    let a2 = a * a;
    let b2 = b * b;
    if a2 + b2 == 0.0 {
        0.0
    } else {
        a2 / (a2 + b2)
    }
}

/// Fills `samples` with `samples.len()` stratified values in `[0,1)`:
/// `(i + u) / n` with `u` drawn fresh per stratum, then (optionally)
/// shuffled by the caller.
pub fn stratified_sample_1d(samples: &mut [f32], rng: &mut Rng) {
    let n = samples.len() as f32;
    for (i, s) in samples.iter_mut().enumerate() {
        let u = rng.uniform_float();
        *s = (i as f32 + u) / n;
    }
}

/// Fills `samples` with `nx*ny` stratified 2-D values, one per cell of an
/// `nx` by `ny` grid over `[0,1)^2`.
pub fn stratified_sample_2d(samples: &mut [(f32, f32)], nx: usize, ny: usize, rng: &mut Rng) {
    assert_eq!(samples.len(), nx * ny);
    for y in 0..ny {
        for x in 0..nx {
            let ux = rng.uniform_float();
            let uy = rng.uniform_float();
            samples[y * nx + x] = ((x as f32 + ux) / nx as f32, (y as f32 + uy) / ny as f32);
        }
    }
}

/// Latin hypercube sampling over 2-D points: `samples.len()` stratified
/// values per axis, with `x` and `y` independently permuted afterward so
/// that projecting onto either axis alone still yields one sample per
/// stratum, while the pairing between axes is decorrelated.
pub fn latin_hypercube_sample(samples: &mut [(f32, f32)], rng: &mut Rng) {
    let n = samples.len();
    for (i, s) in samples.iter_mut().enumerate() {
        let ux = rng.uniform_float();
        let uy = rng.uniform_float();
        *s = ((i as f32 + ux) / n as f32, (i as f32 + uy) / n as f32);
    }

    let mut xs: Vec<f32> = samples.iter().map(|s| s.0).collect();
    let mut ys: Vec<f32> = samples.iter().map(|s| s.1).collect();
    shuffle(&mut xs, rng);
    shuffle(&mut ys, rng);
    for (s, (x, y)) in samples.iter_mut().zip(xs.into_iter().zip(ys)) {
        *s = (x, y);
    }
}

/// Fisher-Yates shuffle in place.
pub fn shuffle<T>(values: &mut [T], rng: &mut Rng) {
    let n = values.len();
    for i in (1..n).rev() {
        let j = rng.uniform_uint32((i + 1) as u32) as usize;
        values.swap(i, j);
    }
}

/// Shuffles `chunk_size`-sized groups among themselves (preserving order
/// within each group) and shuffles within each group, the way a (0,2)
/// sequence's array requests must be reshuffled without breaking its
/// per-chunk stratification guarantee.
pub fn shuffle_chunks<T>(values: &mut [T], chunk_size: usize, rng: &mut Rng) {
    if chunk_size == 0 {
        return;
    }
    let n_chunks = values.len() / chunk_size;
    for i in (1..n_chunks).rev() {
        let j = rng.uniform_uint32((i + 1) as u32) as usize;
        if i != j {
            let (lo, hi) = if i < j { (i, j) } else { (j, i) };
            let (left, right) = values.split_at_mut(hi * chunk_size);
            left[lo * chunk_size..lo * chunk_size + chunk_size]
                .swap_with_slice(&mut right[..chunk_size]);
        }
    }
    for chunk in values.chunks_mut(chunk_size) {
        shuffle(chunk, rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_disk_sample_stays_in_unit_disk() {
        let mut rng = Rng::new(1);
        for _ in 0..500 {
            let (x, y) = uniform_disk_sample((rng.uniform_float(), rng.uniform_float()));
            assert!(x * x + y * y <= 1.0 + 1e-4);
        }
    }

    #[test]
    fn uniform_sphere_sample_is_unit_length() {
        let mut rng = Rng::new(2);
        for _ in 0..500 {
            let v = uniform_sphere_sample((rng.uniform_float(), rng.uniform_float()));
            let len2 = v.x * v.x + v.y * v.y + v.z * v.z;
            assert!((len2 - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn cosine_hemisphere_sample_has_nonnegative_z() {
        let mut rng = Rng::new(3);
        for _ in 0..500 {
            let v = cosine_hemisphere_sample((rng.uniform_float(), rng.uniform_float()));
            assert!(v.z >= 0.0);
            let len2 = v.x * v.x + v.y * v.y + v.z * v.z;
            assert!((len2 - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn uniform_cone_sample_stays_within_cone() {
        let cos_theta_max = 0.5;
        let mut rng = Rng::new(4);
        for _ in 0..500 {
            let v = uniform_cone_sample((rng.uniform_float(), rng.uniform_float()), cos_theta_max);
            assert!(v.z >= cos_theta_max - 1e-4);
        }
    }

    #[test]
    fn mis_power_heuristic_is_symmetric_and_sums_with_its_swap() {
        let w_a = mis_power_heuristic(1, 0.5, 1, 0.25);
        let w_b = mis_power_heuristic(1, 0.25, 1, 0.5);
        assert!((w_a + w_b - 1.0).abs() < 1e-6);
    }

    #[test]
    fn mis_power_heuristic_zero_over_zero_is_zero() {
        assert_eq!(mis_power_heuristic(1, 0.0, 1, 0.0), 0.0);
    }

    #[test]
    fn stratified_1d_covers_every_stratum() {
        let mut rng = Rng::new(5);
        let mut samples = vec![0.0f32; 16];
        stratified_sample_1d(&mut samples, &mut rng);
        let mut strata: Vec<usize> = samples.iter().map(|&s| (s * 16.0) as usize).collect();
        strata.sort_unstable();
        strata.dedup();
        assert_eq!(strata.len(), 16);
    }

    #[test]
    fn stratified_2d_covers_every_cell() {
        let mut rng = Rng::new(6);
        let mut samples = vec![(0.0f32, 0.0f32); 12];
        stratified_sample_2d(&mut samples, 4, 3, &mut rng);
        let mut cells: Vec<(usize, usize)> = samples
            .iter()
            .map(|&(x, y)| ((x * 4.0) as usize, (y * 3.0) as usize))
            .collect();
        cells.sort_unstable();
        cells.dedup();
        assert_eq!(cells.len(), 12);
    }

    #[test]
    fn latin_hypercube_each_axis_covers_every_stratum() {
        let mut rng = Rng::new(7);
        let n = 8;
        let mut samples = vec![(0.0f32, 0.0f32); n];
        latin_hypercube_sample(&mut samples, &mut rng);

        let mut xs: Vec<usize> = samples.iter().map(|&(x, _)| (x * n as f32) as usize).collect();
        xs.sort_unstable();
        xs.dedup();
        assert_eq!(xs.len(), n);

        let mut ys: Vec<usize> = samples.iter().map(|&(_, y)| (y * n as f32) as usize).collect();
        ys.sort_unstable();
        ys.dedup();
        assert_eq!(ys.len(), n);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = Rng::new(8);
        let mut values: Vec<u32> = (0..20).collect();
        let original = values.clone();
        shuffle(&mut values, &mut rng);
        let mut sorted = values.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, original);
    }

    #[test]
    fn shuffle_chunks_preserves_chunk_membership() {
        let mut rng = Rng::new(9);
        let mut values: Vec<u32> = (0..12).collect();
        shuffle_chunks(&mut values, 4, &mut rng);
        let mut sorted = values.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..12).collect::<Vec<_>>());
    }
}
