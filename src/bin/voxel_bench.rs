//! Benchmark binary for the voxel BSP: times grid authoring and
//! compilation at a few grid sizes (construct N times, average, display).

use std::ops::{AddAssign, DivAssign};
use std::time::{Duration, Instant};

use voxel_render_core::geometry::{Boxi, Transform, Vec3i};
use voxel_render_core::grid::VoxelGrid;
use voxel_render_core::bsp::VoxelGridPrimitive;

fn main() {
    env_logger::init();

    let runs = 20;
    println!("Benchmarking with {runs} samples.\n");

    println!("Performance scaling with grid extent:");
    run_sparse(16, 8, runs).display("sparse 16^3, 8 voxels, dep: n/a");
    run_sparse(32, 64, runs).display("sparse 32^3, 64 voxels, dep: n/a");
    run_sparse(64, 512, runs).display("sparse 64^3, 512 voxels, dep: n/a");
    println!("----------------------------------");

    println!("\nPerformance scaling with fill density (64^3 extent):");
    run_dense(64, 0.01, runs).display("64^3, 1% filled");
    run_dense(64, 0.1, runs).display("64^3, 10% filled");
    run_dense(64, 0.5, runs).display("64^3, 50% filled");
    println!("----------------------------------");

    println!("\nAll done.");
}

/// Builds a grid with `count` voxels scattered via an xorshift stream over
/// `[0, extent)^3`, then compiles and times it `runs` times.
fn run_sparse(extent: i32, count: u32, runs: u32) -> BspConstructionTime {
    let mut total = BspConstructionTime::default();
    for _ in 0..runs {
        let mut state: u32 = 0x9e3779b9 ^ (extent as u32).wrapping_mul(count + 1);
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state
        };

        let grid_timer = Instant::now();
        let mut grid = VoxelGrid::new();
        for _ in 0..count {
            let x = (next() % extent as u32) as i32;
            let y = (next() % extent as u32) as i32;
            let z = (next() % extent as u32) as i32;
            let v = 1 + (next() % 100) as i16;
            grid.set(Vec3i::new(x, y, z), v);
        }
        let grid_build = grid_timer.elapsed();

        let compile_timer = Instant::now();
        let root = Boxi::new(Vec3i::ZERO, Vec3i::new(extent, extent, extent));
        let prim = VoxelGridPrimitive::build(&grid, root, Transform::identity())
            .expect("benchmark grid always fits the packed encoding");
        let compile = compile_timer.elapsed();

        std::hint::black_box(prim.node_count());
        total += BspConstructionTime {
            grid_authoring: grid_build,
            compilation: compile,
        };
    }
    total /= runs;
    total
}

fn run_dense(extent: i32, fill_fraction: f64, runs: u32) -> BspConstructionTime {
    let count = ((extent as f64).powi(3) * fill_fraction) as u32;
    run_sparse(extent, count, runs)
}

/// A small `AddAssign`/`DivAssign` accumulator for averaging timed runs,
/// broken down by construction phase.
#[derive(Debug, Copy, Clone, Default)]
struct BspConstructionTime {
    grid_authoring: Duration,
    compilation: Duration,
}

impl BspConstructionTime {
    fn total(&self) -> Duration {
        self.grid_authoring + self.compilation
    }

    fn display(&self, text: &str) -> Self {
        println!("{text}");
        println!("  grid authoring: {:?}", self.grid_authoring);
        println!("  compilation:    {:?}", self.compilation);
        println!("  total:          {:?}", self.total());
        *self
    }
}

impl AddAssign<BspConstructionTime> for BspConstructionTime {
    fn add_assign(&mut self, rhs: Self) {
        self.grid_authoring += rhs.grid_authoring;
        self.compilation += rhs.compilation;
    }
}

impl DivAssign<u32> for BspConstructionTime {
    fn div_assign(&mut self, rhs: u32) {
        self.grid_authoring /= rhs;
        self.compilation /= rhs;
    }
}
