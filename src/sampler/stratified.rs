/// Stratified sampler: jittered grid samples, one stratum per pixel
/// sample, with every dimension independently shuffled so that the
/// per-sample tuples used by different dimensions don't correlate.
use crate::monte_carlo::{latin_hypercube_sample, shuffle, stratified_sample_1d, stratified_sample_2d};
use crate::rng::Rng;

use super::Sampler;

#[derive(Debug, Clone)]
pub struct StratifiedSampler {
    samples_per_x: usize,
    samples_per_y: usize,
    samples_per_pixel: usize,
    num_1d_dims: usize,
    num_2d_dims: usize,
    array_sizes_1d: Vec<usize>,
    array_sizes_2d: Vec<usize>,

    rng: Rng,
    current_pixel: (i32, i32),
    current_sample_index: usize,

    // One stratified vector per declared plain dimension, covering every
    // sample in the current pixel; regenerated in `start_pixel`.
    samples_1d: Vec<Vec<f32>>,
    samples_2d: Vec<Vec<(f32, f32)>>,
    current_1d_dim: usize,
    current_2d_dim: usize,

    // Per-sample arrays, regenerated fresh in `start_pixel_sample`.
    arrays_1d: Vec<Vec<f32>>,
    arrays_2d: Vec<Vec<(f32, f32)>>,
}

impl StratifiedSampler {
    /// `samples_per_x * samples_per_y` samples are taken per pixel.
    /// `num_1d_dims`/`num_2d_dims` is how many plain `random_1d`/`random_2d`
    /// calls the caller will make per sample - fixed up front so every
    /// dimension's stratification can be precomputed per pixel.
    pub fn new(samples_per_x: usize, samples_per_y: usize, num_1d_dims: usize, num_2d_dims: usize, seed: u64) -> Self {
        StratifiedSampler {
            samples_per_x,
            samples_per_y,
            samples_per_pixel: samples_per_x * samples_per_y,
            num_1d_dims,
            num_2d_dims,
            array_sizes_1d: Vec::new(),
            array_sizes_2d: Vec::new(),
            rng: Rng::new(seed),
            current_pixel: (0, 0),
            current_sample_index: 0,
            samples_1d: vec![Vec::new(); num_1d_dims],
            samples_2d: vec![Vec::new(); num_2d_dims],
            current_1d_dim: 0,
            current_2d_dim: 0,
            arrays_1d: Vec::new(),
            arrays_2d: Vec::new(),
        }
    }
}

impl Sampler for StratifiedSampler {
    fn samples_per_pixel(&self) -> usize {
        self.samples_per_pixel
    }

    fn start_pixel(&mut self, pixel: (i32, i32)) {
        self.current_pixel = pixel;
        for dim in self.samples_1d.iter_mut() {
            let mut values = vec![0.0; self.samples_per_pixel];
            stratified_sample_1d(&mut values, &mut self.rng);
            shuffle(&mut values, &mut self.rng);
            *dim = values;
        }
        for dim in self.samples_2d.iter_mut() {
            let mut values = vec![(0.0, 0.0); self.samples_per_pixel];
            stratified_sample_2d(&mut values, self.samples_per_x, self.samples_per_y, &mut self.rng);
            shuffle(&mut values, &mut self.rng);
            *dim = values;
        }
    }

    fn start_pixel_sample(&mut self, sample_index: usize) {
        debug_assert!(sample_index < self.samples_per_pixel);
        self.current_sample_index = sample_index;
        self.current_1d_dim = 0;
        self.current_2d_dim = 0;
        for (i, arr) in self.arrays_1d.iter_mut().enumerate() {
            let n = self.array_sizes_1d[i];
            arr.resize(n, 0.0);
            stratified_sample_1d(arr, &mut self.rng);
            shuffle(arr, &mut self.rng);
        }
        for (i, arr) in self.arrays_2d.iter_mut().enumerate() {
            let n = self.array_sizes_2d[i];
            arr.resize(n, (0.0, 0.0));
            latin_hypercube_sample(arr, &mut self.rng);
        }
    }

    fn random_1d(&mut self) -> f32 {
        let dim = self.current_1d_dim;
        assert!(dim < self.num_1d_dims, "random_1d called more times than configured");
        self.current_1d_dim += 1;
        self.samples_1d[dim][self.current_sample_index]
    }

    fn random_2d(&mut self) -> (f32, f32) {
        let dim = self.current_2d_dim;
        assert!(dim < self.num_2d_dims, "random_2d called more times than configured");
        self.current_2d_dim += 1;
        self.samples_2d[dim][self.current_sample_index]
    }

    fn request_array_1d(&mut self, n: usize) -> usize {
        self.array_sizes_1d.push(n);
        self.arrays_1d.push(vec![0.0; n]);
        self.array_sizes_1d.len() - 1
    }

    fn request_array_2d(&mut self, n: usize) -> usize {
        self.array_sizes_2d.push(n);
        self.arrays_2d.push(vec![(0.0, 0.0); n]);
        self.array_sizes_2d.len() - 1
    }

    fn get_array_1d(&self, handle: usize) -> &[f32] {
        &self.arrays_1d[handle]
    }

    fn get_array_2d(&self, handle: usize) -> &[(f32, f32)] {
        &self.arrays_2d[handle]
    }

    fn split(&self, seed: u32) -> Self {
        StratifiedSampler::new(
            self.samples_per_x,
            self.samples_per_y,
            self.num_1d_dims,
            self.num_2d_dims,
            seed as u64,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_1d_dimension_covers_every_stratum_in_a_pixel() {
        let mut sampler = StratifiedSampler::new(4, 4, 1, 0, 1);
        sampler.start_pixel((0, 0));
        let mut strata = Vec::new();
        for i in 0..sampler.samples_per_pixel() {
            sampler.start_pixel_sample(i);
            let v = sampler.random_1d();
            strata.push((v * 16.0) as usize);
        }
        strata.sort_unstable();
        strata.dedup();
        assert_eq!(strata.len(), 16);
    }

    #[test]
    fn plain_2d_dimension_covers_every_cell_in_a_pixel() {
        let mut sampler = StratifiedSampler::new(4, 3, 0, 1, 2);
        sampler.start_pixel((0, 0));
        let mut cells = Vec::new();
        for i in 0..sampler.samples_per_pixel() {
            sampler.start_pixel_sample(i);
            let (x, y) = sampler.random_2d();
            cells.push((((x * 4.0) as usize).min(3), ((y * 3.0) as usize).min(2)));
        }
        cells.sort_unstable();
        cells.dedup();
        assert_eq!(cells.len(), 12);
    }

    #[test]
    fn requested_array_has_the_requested_length() {
        let mut sampler = StratifiedSampler::new(2, 2, 0, 0, 3);
        let handle = sampler.request_array_1d(5);
        sampler.start_pixel((0, 0));
        sampler.start_pixel_sample(0);
        assert_eq!(sampler.get_array_1d(handle).len(), 5);
    }

    #[test]
    fn split_is_deterministic_given_the_same_seed() {
        let base = StratifiedSampler::new(2, 2, 1, 1, 7);
        let mut a = base.split(99);
        let mut b = base.split(99);
        a.start_pixel((1, 1));
        b.start_pixel((1, 1));
        a.start_pixel_sample(0);
        b.start_pixel_sample(0);
        assert_eq!(a.random_1d(), b.random_1d());
        assert_eq!(a.random_2d(), b.random_2d());
    }

    #[test]
    #[should_panic]
    fn calling_random_1d_beyond_configured_dims_panics() {
        let mut sampler = StratifiedSampler::new(2, 2, 1, 0, 1);
        sampler.start_pixel((0, 0));
        sampler.start_pixel_sample(0);
        let _ = sampler.random_1d();
        let _ = sampler.random_1d();
    }
}
