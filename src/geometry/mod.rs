use cgmath::{Matrix, SquareMatrix};

pub mod boxi;
pub mod vec3i;

pub use boxi::Boxi;
pub use vec3i::Vec3i;

/// Floating-point 3-vector used once we leave the integer lattice (ray
/// directions, hit points, normals).
pub type Vector = cgmath::Vector3<f32>;
pub type Point = cgmath::Point3<f32>;

/// Unit vector along `axis`, `-1` direction when `negative` is set.
///
/// Used to turn a traversal's `surface_axis`/`surface_neg` pair back into
/// the voxel-face normal the ray actually struck.
pub fn axis_vector(axis: u8, negative: bool) -> Vector {
    let sign = if negative { -1.0 } else { 1.0 };
    match axis {
        0 => Vector::new(sign, 0.0, 0.0),
        1 => Vector::new(0.0, sign, 0.0),
        2 => Vector::new(0.0, 0.0, sign),
        _ => panic!("axis out of range: {axis}"),
    }
}

/// An affine transform between two frames, carried with its inverse
/// precomputed (as a pbrt-style renderer does) so that transforming rays
/// into voxel space and hit points back out never needs a runtime inverse.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub forward: cgmath::Matrix4<f32>,
    pub inverse: cgmath::Matrix4<f32>,
}

impl Transform {
    pub fn new(forward: cgmath::Matrix4<f32>) -> Self {
        let inverse = forward
            .invert()
            .expect("voxel_to_frame transform must be invertible");
        Transform { forward, inverse }
    }

    pub fn identity() -> Self {
        Transform::new(cgmath::SquareMatrix::identity())
    }

    pub fn inverse(&self) -> Transform {
        Transform {
            forward: self.inverse,
            inverse: self.forward,
        }
    }

    pub fn transform_point(&self, p: Point) -> Point {
        cgmath::Transform::transform_point(&self.forward, p)
    }

    pub fn transform_vector(&self, v: Vector) -> Vector {
        cgmath::Transform::transform_vector(&self.forward, v)
    }

    /// Transforms a normal by the inverse-transpose, which is required for
    /// correctness under non-uniform scale.
    pub fn transform_normal(&self, n: Vector) -> Vector {
        let it = self.inverse.transpose();
        (it * n.extend(0.0)).truncate()
    }
}
