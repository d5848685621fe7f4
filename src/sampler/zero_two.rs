/// (0,2)-sequence sampler: the whole pixel's samples are generated
/// as one low-discrepancy point set up front, then shuffled - within each
/// requested chunk, and chunk-to-sample assignment - so the set keeps its
/// `(0,2)`-net guarantee while decorrelating which physical sample gets
/// which point.
use crate::monte_carlo::{shuffle, shuffle_chunks};
use crate::rng::Rng;

use super::low_discrepancy::{low_discrepancy_1d, low_discrepancy_2d};
use super::Sampler;

#[derive(Debug, Clone)]
pub struct ZeroTwoSampler {
    samples_per_pixel: usize,
    num_1d_dims: usize,
    num_2d_dims: usize,
    array_sizes_1d: Vec<usize>,
    array_sizes_2d: Vec<usize>,

    rng: Rng,
    current_pixel: (i32, i32),
    current_sample_index: usize,

    samples_1d: Vec<Vec<f32>>,
    samples_2d: Vec<Vec<(f32, f32)>>,
    current_1d_dim: usize,
    current_2d_dim: usize,

    // Flattened `n * samples_per_pixel` buffers, one chunk of size `n` per
    // pixel sample.
    arrays_1d: Vec<Vec<f32>>,
    arrays_2d: Vec<Vec<(f32, f32)>>,
}

impl ZeroTwoSampler {
    pub fn new(samples_per_pixel: usize, num_1d_dims: usize, num_2d_dims: usize, seed: u64) -> Self {
        ZeroTwoSampler {
            samples_per_pixel,
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

impl Sampler for ZeroTwoSampler {
    fn samples_per_pixel(&self) -> usize {
        self.samples_per_pixel
    }

    fn start_pixel(&mut self, pixel: (i32, i32)) {
        self.current_pixel = pixel;

        for dim in self.samples_1d.iter_mut() {
            let mut values = low_discrepancy_1d(0, self.samples_per_pixel, &mut self.rng);
            shuffle(&mut values, &mut self.rng);
            *dim = values;
        }
        for dim in self.samples_2d.iter_mut() {
            let mut values = low_discrepancy_2d(0, self.samples_per_pixel, &mut self.rng);
            shuffle(&mut values, &mut self.rng);
            *dim = values;
        }
        for (i, arr) in self.arrays_1d.iter_mut().enumerate() {
            let n = self.array_sizes_1d[i];
            let mut values = low_discrepancy_1d(0, n * self.samples_per_pixel, &mut self.rng);
            shuffle_chunks(&mut values, n, &mut self.rng);
            *arr = values;
        }
        for (i, arr) in self.arrays_2d.iter_mut().enumerate() {
            let n = self.array_sizes_2d[i];
            let mut values = low_discrepancy_2d(0, n * self.samples_per_pixel, &mut self.rng);
            shuffle_chunks(&mut values, n, &mut self.rng);
            *arr = values;
        }
    }

    fn start_pixel_sample(&mut self, sample_index: usize) {
        debug_assert!(sample_index < self.samples_per_pixel);
        self.current_sample_index = sample_index;
        self.current_1d_dim = 0;
        self.current_2d_dim = 0;
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
        self.arrays_1d.push(vec![0.0; n * self.samples_per_pixel]);
        self.array_sizes_1d.len() - 1
    }

    fn request_array_2d(&mut self, n: usize) -> usize {
        self.array_sizes_2d.push(n);
        self.arrays_2d.push(vec![(0.0, 0.0); n * self.samples_per_pixel]);
        self.array_sizes_2d.len() - 1
    }

    fn get_array_1d(&self, handle: usize) -> &[f32] {
        let n = self.array_sizes_1d[handle];
        let start = self.current_sample_index * n;
        &self.arrays_1d[handle][start..start + n]
    }

    fn get_array_2d(&self, handle: usize) -> &[(f32, f32)] {
        let n = self.array_sizes_2d[handle];
        let start = self.current_sample_index * n;
        &self.arrays_2d[handle][start..start + n]
    }

    fn split(&self, seed: u32) -> Self {
        ZeroTwoSampler::new(self.samples_per_pixel, self.num_1d_dims, self.num_2d_dims, seed as u64)
    }
}
