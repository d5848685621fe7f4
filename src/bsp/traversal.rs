/// Ray / voxel-BSP intersection: a slab test against the root box
/// followed by a recursive descent that reconstructs child boxes from the
/// root box and the split axis stored in each node - no per-node box is
/// ever stored, only recomputed on the fly.
use crate::geometry::{axis_vector, Boxi, Point, Vector, Vec3i};
use crate::voxel::{Voxel, VOXEL_EMPTY};

use super::node::NodeType;
use super::VoxelGridPrimitive;

/// Where and how a ray enters (or exits) a box: the hit point, the
/// parameter along the ray, whether the crossing happened on a real axis
/// plane at all, and if so which axis/sign.
#[derive(Debug, Clone, Copy)]
pub struct RayEntry {
    pub p_hit: Vector,
    pub t_hit: f32,
    pub on_surface: bool,
    pub surface_axis: u8,
    pub surface_neg: bool,
}

/// A ray in voxel space with the per-axis quantities the slab test and the
/// recursive walk both need, precomputed once.
struct VoxelRay {
    orig: Vector,
    dir: Vector,
    dir_inv: Vector,
    t_min: f32,
    t_max: f32,
    dir_is_neg: [bool; 3],
}

fn index3(v: Vector, axis: u8) -> f32 {
    match axis {
        0 => v.x,
        1 => v.y,
        2 => v.z,
        _ => panic!("axis out of range: {axis}"),
    }
}

/// Slab test of `ray` against `box_`, in the ray's own `[t_min, t_max]`.
///
/// When `dir[axis]` is exactly zero the axis imposes no constraint (the
/// slab is treated as `(-inf, +inf)`) rather than being a guaranteed miss
/// or guaranteed pass-through; a ray tangent to a face is a miss on that
/// face unless another face provides the entry/exit.
fn ray_box_hit(ray: &VoxelRay, box_: &Boxi) -> Option<(RayEntry, RayEntry)> {
    let mut t0 = ray.t_min;
    let mut t1 = ray.t_max;
    let mut entry_axis: Option<u8> = None;
    let mut exit_axis: Option<u8> = None;

    for axis in 0u8..3 {
        let dir = index3(ray.dir, axis);
        if dir == 0.0 {
            continue;
        }
        let inv_d = index3(ray.dir_inv, axis);
        let orig = index3(ray.orig, axis);
        let mut t_near = (box_.p_min[axis] as f32 - orig) * inv_d;
        let mut t_far = (box_.p_max[axis] as f32 - orig) * inv_d;
        if t_near > t_far {
            std::mem::swap(&mut t_near, &mut t_far);
        }
        if t_near > t0 {
            t0 = t_near;
            entry_axis = Some(axis);
        }
        if t_far < t1 {
            t1 = t_far;
            exit_axis = Some(axis);
        }
        if t0 > t1 {
            return None;
        }
    }
    if t0 > t1 {
        return None;
    }

    let entry = RayEntry {
        p_hit: ray.orig + ray.dir * t0,
        t_hit: t0,
        on_surface: entry_axis.is_some(),
        surface_axis: entry_axis.unwrap_or(0),
        surface_neg: entry_axis.map(|a| ray.dir_is_neg[a as usize]).unwrap_or(false),
    };
    let exit = RayEntry {
        p_hit: ray.orig + ray.dir * t1,
        t_hit: t1,
        on_surface: exit_axis.is_some(),
        surface_axis: exit_axis.unwrap_or(0),
        surface_neg: exit_axis.map(|a| ray.dir_is_neg[a as usize]).unwrap_or(false),
    };
    Some((entry, exit))
}

/// Caller's decision after being handed a non-empty leaf during a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkControl {
    Stop,
    Continue,
}

/// First surface crossing reported by [`VoxelGridPrimitive::intersect`].
#[derive(Debug, Clone, Copy)]
pub struct Intersection {
    pub t_hit: f32,
    pub p_hit: Point,
    pub normal: Vector,
    pub voxel: Voxel,
}

impl VoxelGridPrimitive {
    fn to_voxel_ray(&self, orig: Point, dir: Vector, t_min: f32, t_max: f32) -> VoxelRay {
        let local_orig = self.voxel_to_frame.inverse().transform_point(orig);
        let local_dir = self.voxel_to_frame.inverse().transform_vector(dir);
        VoxelRay {
            orig: Vector::new(local_orig.x, local_orig.y, local_orig.z),
            dir: local_dir,
            dir_inv: Vector::new(1.0 / local_dir.x, 1.0 / local_dir.y, 1.0 / local_dir.z),
            t_min,
            t_max,
            dir_is_neg: [local_dir.x < 0.0, local_dir.y < 0.0, local_dir.z < 0.0],
        }
    }

    /// First hit with `t_hit`, world-space point, normal and the opaque
    /// voxel id at the struck surface. Resolving that id into a material
    /// or light is a shading-layer concern outside this crate's scope.
    pub fn intersect(&self, orig: Point, dir: Vector, t_min: f32, t_max: f32) -> Option<Intersection> {
        let ray = self.to_voxel_ray(orig, dir, t_min, t_max);
        let (entry, exit) = ray_box_hit(&ray, &self.root_box)?;

        let mut hit: Option<(Voxel, RayEntry)> = None;
        if let Some(voxel) = self.root_leaf {
            if voxel != VOXEL_EMPTY {
                hit = Some((voxel, entry));
            }
        } else {
            self.walk(&ray, 0, self.root_box, entry, exit, false, &mut |voxel, e| {
                hit = Some((voxel, e));
                WalkControl::Stop
            });
        }

        hit.map(|(voxel, e)| {
            let p_local = ray.orig + ray.dir * e.t_hit;
            let p_world = self
                .voxel_to_frame
                .transform_point(Point::new(p_local.x, p_local.y, p_local.z));
            let n_local = axis_vector(e.surface_axis, e.surface_neg);
            let n_world = cgmath::InnerSpace::normalize(self.voxel_to_frame.transform_normal(n_local));
            Intersection {
                t_hit: e.t_hit,
                p_hit: p_world,
                normal: n_world,
                voxel,
            }
        })
    }

    /// Occlusion query: does the ray hit *anything*? Accelerated by the
    /// "full" bit - a branch known to contain no empty voxels is treated
    /// as a single opaque surface without descending further.
    pub fn intersect_p(&self, orig: Point, dir: Vector, t_min: f32, t_max: f32) -> bool {
        let ray = self.to_voxel_ray(orig, dir, t_min, t_max);
        let (entry, exit) = match ray_box_hit(&ray, &self.root_box) {
            Some(v) => v,
            None => return false,
        };

        if let Some(voxel) = self.root_leaf {
            return voxel != VOXEL_EMPTY;
        }

        let mut hit = false;
        self.walk(&ray, 0, self.root_box, entry, exit, true, &mut |_voxel, _e| {
            hit = true;
            WalkControl::Stop
        });
        hit
    }

    /// World-space AABB of the voxel grid: the root box's eight corners,
    /// transformed and reduced to their component-wise min/max.
    pub fn bounds(&self) -> (Point, Point) {
        let b = self.root_box;
        let corners = [
            Vec3i::new(b.p_min.x, b.p_min.y, b.p_min.z),
            Vec3i::new(b.p_max.x, b.p_min.y, b.p_min.z),
            Vec3i::new(b.p_min.x, b.p_max.y, b.p_min.z),
            Vec3i::new(b.p_max.x, b.p_max.y, b.p_min.z),
            Vec3i::new(b.p_min.x, b.p_min.y, b.p_max.z),
            Vec3i::new(b.p_max.x, b.p_min.y, b.p_max.z),
            Vec3i::new(b.p_min.x, b.p_max.y, b.p_max.z),
            Vec3i::new(b.p_max.x, b.p_max.y, b.p_max.z),
        ];
        let mut lo = Point::new(f32::INFINITY, f32::INFINITY, f32::INFINITY);
        let mut hi = Point::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY);
        for c in corners {
            let [x, y, z] = c.to_f32();
            let p = self.voxel_to_frame.transform_point(Point::new(x, y, z));
            lo.x = lo.x.min(p.x);
            lo.y = lo.y.min(p.y);
            lo.z = lo.z.min(p.z);
            hi.x = hi.x.max(p.x);
            hi.y = hi.y.max(p.y);
            hi.z = hi.z.max(p.z);
        }
        (lo, hi)
    }

    #[allow(clippy::too_many_arguments)]
    fn walk(
        &self,
        ray: &VoxelRay,
        node_idx: u32,
        box_: Boxi,
        entry: RayEntry,
        exit: RayEntry,
        shadow: bool,
        callback: &mut dyn FnMut(Voxel, RayEntry) -> WalkControl,
    ) -> WalkControl {
        debug_assert!((node_idx as usize) < self.nodes.len());
        let node = self.nodes[node_idx as usize];
        let axis = node.axis();
        let (left_box, right_box, mid) = box_.split(axis);
        let mid_f = mid as f32;

        let inv_d = index3(ray.dir_inv, axis);
        let dir = index3(ray.dir, axis);
        let orig = index3(ray.orig, axis);
        let t_mid = if dir == 0.0 { None } else { Some((mid_f - orig) * inv_d) };
        let crosses = matches!(t_mid, Some(t) if t > entry.t_hit && t < exit.t_hit);

        let left_is_near = index3(entry.p_hit, axis) < mid_f;

        let mid_entry = t_mid.map(|t| RayEntry {
            p_hit: ray.orig + ray.dir * t,
            t_hit: t,
            on_surface: true,
            surface_axis: axis,
            surface_neg: ray.dir_is_neg[axis as usize],
        });

        let (near_is_left, near_box, near_entry, near_exit, far_box, far_entry, far_exit, visit_far) =
            if crosses {
                let mid_entry = mid_entry.unwrap();
                if left_is_near {
                    (true, left_box, entry, mid_entry, right_box, mid_entry, exit, true)
                } else {
                    (false, right_box, entry, mid_entry, left_box, mid_entry, exit, true)
                }
            } else if left_is_near {
                (true, left_box, entry, exit, right_box, entry, exit, false)
            } else {
                (false, right_box, entry, exit, left_box, entry, exit, false)
            };

        let result = self.visit_half(
            ray, node_idx, node, near_is_left, near_box, near_entry, near_exit, shadow, callback,
        );
        if result == WalkControl::Stop {
            return WalkControl::Stop;
        }
        if !visit_far {
            return WalkControl::Continue;
        }
        self.visit_half(
            ray, node_idx, node, !near_is_left, far_box, far_entry, far_exit, shadow, callback,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn visit_half(
        &self,
        ray: &VoxelRay,
        self_idx: u32,
        node: super::node::Node,
        is_left: bool,
        half_box: Boxi,
        half_entry: RayEntry,
        half_exit: RayEntry,
        shadow: bool,
        callback: &mut dyn FnMut(Voxel, RayEntry) -> WalkControl,
    ) -> WalkControl {
        match node.node_type() {
            NodeType::LeafLeaf => {
                let voxel = if is_left { node.voxel_1() } else { node.voxel_2() };
                if voxel == VOXEL_EMPTY {
                    WalkControl::Continue
                } else {
                    callback(voxel, half_entry)
                }
            }
            NodeType::LeafBranch => {
                if is_left == node.leaf_branch_is_leaf_left() {
                    let voxel = node.leaf_branch_leaf_voxel();
                    if voxel == VOXEL_EMPTY {
                        WalkControl::Continue
                    } else {
                        callback(voxel, half_entry)
                    }
                } else {
                    let full = node.leaf_branch_full_bit();
                    if shadow && full {
                        return callback(crate::voxel::VOXEL_WILDCARD, half_entry);
                    }
                    self.walk(ray, self_idx + 1, half_box, half_entry, half_exit, shadow, callback)
                }
            }
            NodeType::ShortBranchBranch | NodeType::LongBranchBranch => {
                let child_idx = if is_left {
                    self_idx + 1
                } else {
                    node.branch_branch_right_idx(self_idx)
                };
                let full = match node.node_type() {
                    NodeType::ShortBranchBranch => {
                        if is_left {
                            node.branch_branch_full_bit_left()
                        } else {
                            node.branch_branch_full_bit_right()
                        }
                    }
                    // LongBranchBranch never carries a full bit (open
                    // question 1) - always descend.
                    _ => false,
                };
                if shadow && full {
                    return callback(crate::voxel::VOXEL_WILDCARD, half_entry);
                }
                self.walk(ray, child_idx, half_box, half_entry, half_exit, shadow, callback)
            }
        }
    }
}

/// Test-only helper: walks the BSP (or reads the root leaf) to find the
/// voxel at an exact lattice point, without any ray math. Used to check
/// BSP fidelity against the authoring grid (BSP fidelity against the grid).
#[cfg(test)]
pub fn leaf_voxel_at(prim: &VoxelGridPrimitive, pos: Vec3i) -> Voxel {
    if let Some(v) = prim.root_leaf {
        return v;
    }
    fn recurse(prim: &VoxelGridPrimitive, idx: u32, box_: Boxi, pos: Vec3i) -> Voxel {
        let node = prim.nodes[idx as usize];
        let axis = node.axis();
        let (left_box, right_box, mid) = box_.split(axis);
        let is_left = pos[axis] < mid;
        match node.node_type() {
            NodeType::LeafLeaf => {
                if is_left {
                    node.voxel_1()
                } else {
                    node.voxel_2()
                }
            }
            NodeType::LeafBranch => {
                if is_left == node.leaf_branch_is_leaf_left() {
                    node.leaf_branch_leaf_voxel()
                } else {
                    let child_box = if is_left { left_box } else { right_box };
                    recurse(prim, idx + 1, child_box, pos)
                }
            }
            NodeType::ShortBranchBranch | NodeType::LongBranchBranch => {
                let child_box = if is_left { left_box } else { right_box };
                let child_idx = if is_left { idx + 1 } else { node.branch_branch_right_idx(idx) };
                recurse(prim, child_idx, child_box, pos)
            }
        }
    }
    recurse(prim, 0, prim.root_box, pos)
}
