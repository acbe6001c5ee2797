//! Fixed-size linear-algebra primitives.
//!
//! Positions are `Vector3<f64>` and link frames are 4x4 homogeneous
//! transforms (`Matrix4<f64>`) in row-major DH convention. Everything here is
//! a pure function of its inputs.

use nalgebra::{Matrix4, Vector3};

/// A point or direction in the base frame.
pub type Vec3 = Vector3<f64>;

/// Homogeneous transform of one link frame relative to the base frame.
pub type Pose = Matrix4<f64>;

/// Standard Denavit-Hartenberg transform for a single revolute joint.
///
/// # Arguments
/// * `theta` - Joint angle (the variable), radians
/// * `d` - Link offset along the previous Z axis
/// * `a` - Link length along the new X axis
/// * `alpha` - Link twist about the new X axis, radians
pub fn dh_transform(theta: f64, d: f64, a: f64, alpha: f64) -> Pose {
    let (st, ct) = theta.sin_cos();
    let (sa, ca) = alpha.sin_cos();

    Matrix4::new(
        ct, -st * ca, st * sa, a * ct,
        st, ct * ca, -ct * sa, a * st,
        0.0, sa, ca, d,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Compose two frames: `parent` followed by `child` expressed in `parent`.
pub fn compose(parent: &Pose, child: &Pose) -> Pose {
    parent * child
}

/// Translation part (frame origin) of a homogeneous transform.
pub fn origin(pose: &Pose) -> Vec3 {
    Vec3::new(pose[(0, 3)], pose[(1, 3)], pose[(2, 3)])
}

/// Local Z axis of a frame, expressed in the base frame.
pub fn z_axis(pose: &Pose) -> Vec3 {
    Vec3::new(pose[(0, 2)], pose[(1, 2)], pose[(2, 2)])
}

/// Row-major copy of a pose, the layout the renderer consumes.
pub fn to_row_major(pose: &Pose) -> [[f64; 4]; 4] {
    let mut rows = [[0.0; 4]; 4];
    for (i, row) in rows.iter_mut().enumerate() {
        for (j, value) in row.iter_mut().enumerate() {
            *value = pose[(i, j)];
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_dh_transform_identity_at_zero() {
        let t = dh_transform(0.0, 0.0, 0.0, 0.0);
        assert_relative_eq!(t, Pose::identity(), epsilon = 1e-12);
    }

    #[test]
    fn test_dh_transform_translation_column() {
        // theta = 90 deg swings the link length onto Y
        let t = dh_transform(FRAC_PI_2, 0.3, 0.5, 0.0);
        let p = origin(&t);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 0.5, epsilon = 1e-12);
        assert_relative_eq!(p.z, 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_dh_transform_twist_moves_z_axis() {
        // alpha = 90 deg about X takes local Z onto -Y
        let t = dh_transform(0.0, 0.0, 0.0, FRAC_PI_2);
        let z = z_axis(&t);
        assert_relative_eq!(z, Vec3::new(0.0, -1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_block_is_orthonormal() {
        let t = dh_transform(0.7, 0.1, 0.2, -1.1);
        let r = t.fixed_view::<3, 3>(0, 0).into_owned();
        assert_relative_eq!(r * r.transpose(), nalgebra::Matrix3::identity(), epsilon = 1e-12);
        assert_relative_eq!(r.determinant(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_compose_chains_translations() {
        let a = dh_transform(0.0, 0.0, 1.0, 0.0);
        let b = dh_transform(0.0, 0.0, 2.0, 0.0);
        assert_relative_eq!(origin(&compose(&a, &b)), Vec3::new(3.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_row_major_layout() {
        let t = dh_transform(0.0, 4.0, 5.0, 0.0);
        let rows = to_row_major(&t);
        assert_eq!(rows[0][3], 5.0);
        assert_eq!(rows[2][3], 4.0);
        assert_eq!(rows[3], [0.0, 0.0, 0.0, 1.0]);
    }
}
