/// The sparse, lump-chunked voxel authoring grid .
///
/// A front end writes voxels point-by-point (or lump-by-lump) into a
/// [`VoxelGrid`]; once authoring is done the grid is handed to the BSP
/// compiler (`crate::bsp`) and frozen.
use std::collections::HashMap;

use crate::geometry::{Boxi, Vec3i};
use crate::math::floor_div;
use crate::voxel::{unify_voxels, Voxel, VOXEL_EMPTY};

/// Side length of a storage [`Lump`] in voxels.
pub const LUMP_RADIUS: i32 = 16;
const LUMP_SIZE: usize = (LUMP_RADIUS * LUMP_RADIUS * LUMP_RADIUS) as usize;

/// A dense 16x16x16 block of voxels, row-major with index `x + y*R + z*R^2`.
///
/// This is the storage granule of [`VoxelGrid`] - a lump is allocated the
/// first time any voxel inside it is written.
#[derive(Debug, Clone)]
struct Lump {
    voxels: Box<[Voxel; LUMP_SIZE]>,
}

impl Lump {
    fn new() -> Self {
        Lump {
            voxels: Box::new([VOXEL_EMPTY; LUMP_SIZE]),
        }
    }

    /// `pos` must already be in `[0, LUMP_RADIUS)` on every axis.
    fn index(pos: Vec3i) -> usize {
        debug_assert!(pos.x >= 0 && pos.x < LUMP_RADIUS);
        debug_assert!(pos.y >= 0 && pos.y < LUMP_RADIUS);
        debug_assert!(pos.z >= 0 && pos.z < LUMP_RADIUS);
        (pos.x + pos.y * LUMP_RADIUS + pos.z * LUMP_RADIUS * LUMP_RADIUS) as usize
    }

    fn get(&self, pos: Vec3i) -> Voxel {
        self.voxels[Lump::index(pos)]
    }

    fn set(&mut self, pos: Vec3i, v: Voxel) {
        self.voxels[Lump::index(pos)] = v;
    }
}

/// A mapping from lump-coordinate to [`Lump`]; missing lumps read as
/// [`VOXEL_EMPTY`] everywhere.
#[derive(Debug, Clone, Default)]
pub struct VoxelGrid {
    lumps: HashMap<Vec3i, Lump>,
}

/// A cursor over a [`VoxelGrid`] that caches the lump it currently sits in,
/// so walking to a neighboring position is a single comparison in the
/// common case instead of a hash lookup.
///
/// Borrows the grid immutably; it cannot outlive it.
#[derive(Debug, Clone, Copy)]
pub struct Finger<'g> {
    grid: &'g VoxelGrid,
    lump: Option<&'g Lump>,
    lump_pos: Vec3i,
    pos: Vec3i,
}

impl<'g> Finger<'g> {
    pub fn voxel(&self) -> Voxel {
        match self.lump {
            None => VOXEL_EMPTY,
            Some(lump) => lump.get(self.pos - LUMP_RADIUS * self.lump_pos),
        }
    }

    pub fn position(&self) -> Vec3i {
        self.pos
    }

    /// Moves the cursor by an arbitrary integer `delta`, reusing the
    /// cached lump pointer when the destination stays inside it.
    pub fn shift(&self, delta: Vec3i) -> Finger<'g> {
        let next_pos = self.pos + delta;
        let next_lump_pos = VoxelGrid::lump_pos(next_pos);
        let lump = if next_lump_pos == self.lump_pos {
            self.lump
        } else {
            self.grid.lumps.get(&next_lump_pos)
        };
        Finger {
            grid: self.grid,
            lump,
            lump_pos: next_lump_pos,
            pos: next_pos,
        }
    }

    /// Moves the cursor by one step along `axis`, in `-1` direction when
    /// `negative` is set. A thin convenience over [`Finger::shift`] for the
    /// traversal's neighbor walk.
    pub fn shift_by_one(&self, axis: u8, negative: bool) -> Finger<'g> {
        let mut delta = Vec3i::ZERO;
        delta[axis] = if negative { -1 } else { 1 };
        self.shift(delta)
    }
}

impl VoxelGrid {
    pub fn new() -> Self {
        VoxelGrid::default()
    }

    pub fn lump_pos(pos: Vec3i) -> Vec3i {
        Vec3i::new(
            floor_div(pos.x, LUMP_RADIUS),
            floor_div(pos.y, LUMP_RADIUS),
            floor_div(pos.z, LUMP_RADIUS),
        )
    }

    pub fn get(&self, pos: Vec3i) -> Voxel {
        let lump_pos = VoxelGrid::lump_pos(pos);
        match self.lumps.get(&lump_pos) {
            None => VOXEL_EMPTY,
            Some(lump) => lump.get(pos - LUMP_RADIUS * lump_pos),
        }
    }

    pub fn set(&mut self, pos: Vec3i, v: Voxel) {
        let lump_pos = VoxelGrid::lump_pos(pos);
        let lump = self.lumps.entry(lump_pos).or_insert_with(Lump::new);
        lump.set(pos - LUMP_RADIUS * lump_pos, v);
    }

    /// Bulk-installs (or replaces) a whole lump at `lump_pos`, for front
    /// ends that stream in terrain lump-at-a-time instead of voxel-at-a-time.
    fn set_lump_raw(&mut self, lump_pos: Vec3i, voxels: Box<[Voxel; LUMP_SIZE]>) {
        self.lumps.insert(lump_pos, Lump { voxels });
    }

    /// Bulk-installs a whole lump from a flat, row-major `x + y*R + z*R^2`
    /// slice of exactly `LUMP_RADIUS^3` voxels.
    pub fn set_lump(&mut self, lump_pos: Vec3i, voxels: &[Voxel]) {
        assert_eq!(voxels.len(), LUMP_SIZE, "lump must hold exactly R^3 voxels");
        let mut boxed = Box::new([VOXEL_EMPTY; LUMP_SIZE]);
        boxed.copy_from_slice(voxels);
        self.set_lump_raw(lump_pos, boxed);
    }

    pub fn finger(&self, pos: Vec3i) -> Finger<'_> {
        let lump_pos = VoxelGrid::lump_pos(pos);
        Finger {
            grid: self,
            lump: self.lumps.get(&lump_pos),
            lump_pos,
            pos,
        }
    }

    pub fn shift_finger<'g>(&'g self, finger: &Finger<'g>, delta: Vec3i) -> Finger<'g> {
        finger.shift(delta)
    }

    /// Scans the half-open `box_` and unifies every voxel inside it under
    /// [`unify_voxels`]; `Some(voxel)` when the whole region collapses to a
    /// single value, `None` as soon as two voxels disagree.
    ///
    /// This is a building block for the BSP compiler, not a hot path - it
    /// is O(volume) and is only ever called on boxes that end up collapsing
    /// into a single leaf.
    pub fn homogeneous(&self, box_: &Boxi) -> Option<Voxel> {
        let mut voxel = self.get(box_.p_min);
        for z in box_.p_min.z..box_.p_max.z {
            for y in box_.p_min.y..box_.p_max.y {
                for x in box_.p_min.x..box_.p_max.x {
                    voxel = unify_voxels(voxel, self.get(Vec3i::new(x, y, z)))?;
                }
            }
        }
        Some(voxel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_empty_for_unwritten_positions() {
        let grid = VoxelGrid::new();
        assert_eq!(grid.get(Vec3i::new(0, 0, 0)), VOXEL_EMPTY);
        assert_eq!(grid.get(Vec3i::new(-100, 50, 7)), VOXEL_EMPTY);
    }

    #[test]
    fn round_trip_through_set_and_get() {
        let mut grid = VoxelGrid::new();
        let writes = [
            (Vec3i::new(0, 0, 0), 1),
            (Vec3i::new(15, 15, 15), 2),
            (Vec3i::new(16, 0, 0), 3),
            (Vec3i::new(-1, -1, -1), 4),
            (Vec3i::new(-17, 3, 100), 5),
        ];
        for (pos, v) in writes {
            grid.set(pos, v);
        }
        for (pos, v) in writes {
            assert_eq!(grid.get(pos), v);
        }
        // untouched position still reads empty
        assert_eq!(grid.get(Vec3i::new(8, 8, 8)), VOXEL_EMPTY);
    }

    #[test]
    fn lump_pos_is_floor_div_of_position() {
        assert_eq!(VoxelGrid::lump_pos(Vec3i::new(-1, 0, 15)), Vec3i::new(-1, 0, 0));
        assert_eq!(VoxelGrid::lump_pos(Vec3i::new(16, -16, 31)), Vec3i::new(1, -1, 1));
    }

    #[test]
    fn finger_equivalence_with_get() {
        let mut grid = VoxelGrid::new();
        grid.set(Vec3i::new(5, 5, 5), 9);
        grid.set(Vec3i::new(21, 5, 5), 3);

        let f = grid.finger(Vec3i::new(5, 5, 5));
        assert_eq!(f.voxel(), grid.get(Vec3i::new(5, 5, 5)));

        let deltas = [
            Vec3i::new(1, 0, 0),
            Vec3i::new(0, 0, 0),
            Vec3i::new(16, 0, 0),
            Vec3i::new(-5, -5, -5),
            Vec3i::new(100, -3, 8),
        ];
        for delta in deltas {
            let shifted = f.shift(delta);
            assert_eq!(shifted.voxel(), grid.get(Vec3i::new(5, 5, 5) + delta));
        }
    }

    #[test]
    fn shift_by_one_matches_get() {
        let mut grid = VoxelGrid::new();
        grid.set(Vec3i::new(0, 0, 0), 1);
        grid.set(Vec3i::new(-1, 0, 0), 2);

        let f = grid.finger(Vec3i::new(0, 0, 0));
        let left = f.shift_by_one(0, true);
        assert_eq!(left.voxel(), 2);
        assert_eq!(left.position(), Vec3i::new(-1, 0, 0));
    }

    #[test]
    fn homogeneous_true_for_uniform_region() {
        let mut grid = VoxelGrid::new();
        for z in 0..4 {
            for y in 0..4 {
                for x in 0..4 {
                    grid.set(Vec3i::new(x, y, z), 7);
                }
            }
        }
        let box_ = Boxi::new(Vec3i::ZERO, Vec3i::new(4, 4, 4));
        assert_eq!(grid.homogeneous(&box_), Some(7));
    }

    #[test]
    fn homogeneous_false_for_mixed_region() {
        let mut grid = VoxelGrid::new();
        grid.set(Vec3i::new(0, 0, 0), 1);
        grid.set(Vec3i::new(1, 0, 0), 2);
        let box_ = Boxi::new(Vec3i::ZERO, Vec3i::new(2, 1, 1));
        assert_eq!(grid.homogeneous(&box_), None);
    }

    #[test]
    fn homogeneous_unifies_through_wildcard() {
        use crate::voxel::VOXEL_WILDCARD;
        let mut grid = VoxelGrid::new();
        grid.set(Vec3i::new(0, 0, 0), 5);
        grid.set(Vec3i::new(1, 0, 0), VOXEL_WILDCARD);
        let box_ = Boxi::new(Vec3i::ZERO, Vec3i::new(2, 1, 1));
        assert_eq!(grid.homogeneous(&box_), Some(5));
    }

    #[test]
    fn set_lump_bulk_install() {
        let mut grid = VoxelGrid::new();
        let voxels = vec![3i16; LUMP_SIZE];
        grid.set_lump(Vec3i::ZERO, &voxels);
        assert_eq!(grid.get(Vec3i::new(0, 0, 0)), 3);
        assert_eq!(grid.get(Vec3i::new(15, 15, 15)), 3);
        assert_eq!(grid.get(Vec3i::new(16, 0, 0)), VOXEL_EMPTY);
    }
}
