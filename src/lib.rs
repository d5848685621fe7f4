/// Core of a physically-based offline renderer: a compiled voxel BSP and
/// its ray traversal, a lock-free atomic film accumulator, and the
/// Monte-Carlo sampling substrate that feeds path samples into traversal.
///
/// Shading, lights, cameras, scene loading and the CLI driver are external
/// collaborators; this crate only defines the interfaces they consume from
/// or expose to the three cores above (see `DESIGN.md`).
pub mod bsp;
pub mod film;
pub mod geometry;
pub mod grid;
pub mod math;
pub mod monte_carlo;
pub mod rng;
pub mod sampler;
pub mod voxel;
