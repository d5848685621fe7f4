/// The Monte-Carlo sampling substrate: a capability trait with two
/// concrete, statically-dispatched implementations rather than a
/// inheritance hierarchy - the renderer's integrator is monomorphic in
/// which sampler it drives, so there is no need for dynamic dispatch here.
pub mod low_discrepancy;
pub mod stratified;
pub mod zero_two;

pub use stratified::StratifiedSampler;
pub use zero_two::ZeroTwoSampler;

/// Per-pixel, per-sample source of canonical random numbers.
///
/// Lifecycle: `start_pixel` once per pixel, then `start_pixel_sample` once
/// per sample within that pixel (resetting the per-sample dimension
/// cursors), then any number of `random_1d`/`random_2d`/array reads.
pub trait Sampler: Clone {
    fn samples_per_pixel(&self) -> usize;

    fn start_pixel(&mut self, pixel: (i32, i32));

    fn start_pixel_sample(&mut self, sample_index: usize);

    /// Next plain 1-D slot for the current sample. Panics if called more
    /// times per sample than the sampler was configured for.
    fn random_1d(&mut self) -> f32;

    /// Next plain 2-D slot for the current sample.
    fn random_2d(&mut self) -> (f32, f32);

    /// Reserves a per-sample array of `n` 1-D values; returns a handle to
    /// read it back with [`Sampler::get_array_1d`].
    fn request_array_1d(&mut self, n: usize) -> usize;

    /// Reserves a per-sample array of `n` 2-D values.
    fn request_array_2d(&mut self, n: usize) -> usize;

    fn get_array_1d(&self, handle: usize) -> &[f32];

    fn get_array_2d(&self, handle: usize) -> &[(f32, f32)];

    /// Produces an independent sampler for another worker, with its RNG
    /// stream derived from `seed` rather than shared with `self`.
    fn split(&self, seed: u32) -> Self;
}
