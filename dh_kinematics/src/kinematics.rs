// Forward kinematics and the geometric Jacobian for all-revolute serial chains.
//
// Frames follow the standard DH convention: frame i+1 = frame i * DH(theta_i, d_i, a_i, alpha_i),
// frame 0 is the base (identity) and frame n is the end-effector.

use nalgebra::DMatrix;
use serde::ser::{Serialize, Serializer};

use crate::math::{self, Pose, Vec3};
use crate::robot_config::RobotModel;

/// Cumulative link frames from the base to the end-effector.
///
/// Always holds `joint_count + 1` poses.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameChain {
    frames: Vec<Pose>,
}

impl FrameChain {
    pub fn frames(&self) -> &[Pose] {
        &self.frames
    }

    /// Number of frames, `joint_count() + 1`.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn joint_count(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn frame(&self, index: usize) -> &Pose {
        &self.frames[index]
    }

    pub fn end_effector(&self) -> &Pose {
        &self.frames[self.frames.len() - 1]
    }

    pub fn end_effector_position(&self) -> Vec3 {
        math::origin(self.end_effector())
    }

    /// Origin of frame `index`, the point joint `index` rotates about.
    pub fn joint_origin(&self, index: usize) -> Vec3 {
        math::origin(&self.frames[index])
    }

    /// Rotation axis of joint `index` (Z of frame `index`) in the base frame.
    pub fn joint_axis(&self, index: usize) -> Vec3 {
        math::z_axis(&self.frames[index])
    }

    /// Row-major copies of every frame, base first.
    pub fn to_row_major(&self) -> Vec<[[f64; 4]; 4]> {
        self.frames.iter().map(math::to_row_major).collect()
    }
}

impl Serialize for FrameChain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.frames.iter().map(math::to_row_major))
    }
}

/// Compute the frame chain for a joint configuration.
///
/// # Arguments
/// * `model` - Robot whose DH table is applied
/// * `angles` - One angle per joint in radians; limits are not enforced
pub fn forward_kinematics(model: &RobotModel, angles: &[f64]) -> FrameChain {
    assert_eq!(angles.len(), model.joint_count(), "angle vector length must match joint count");

    let mut frames = Vec::with_capacity(angles.len() + 1);
    frames.push(Pose::identity());

    let mut current = Pose::identity();
    for (&theta, dh) in angles.iter().zip(model.dh()) {
        let link = math::dh_transform(theta, dh.d, dh.a, dh.alpha);
        current = math::compose(&current, &link);
        frames.push(current);
    }

    FrameChain { frames }
}

/// Geometric Jacobian of an all-revolute chain.
///
/// Column `i` of `linear` is `z_i x (p_e - p_i)` and column `i` of `angular`
/// is `z_i`, both expressed in the base frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Jacobian {
    linear: DMatrix<f64>,
    angular: DMatrix<f64>,
}

impl Jacobian {
    /// Position rows (3 x n).
    pub fn linear(&self) -> &DMatrix<f64> {
        &self.linear
    }

    /// Orientation rows (3 x n).
    pub fn angular(&self) -> &DMatrix<f64> {
        &self.angular
    }

    pub fn column_count(&self) -> usize {
        self.linear.ncols()
    }

    /// Linear rows on top of angular rows (6 x n).
    pub fn stacked(&self) -> DMatrix<f64> {
        let n = self.column_count();
        let mut full = DMatrix::zeros(6, n);
        full.rows_mut(0, 3).copy_from(&self.linear);
        full.rows_mut(3, 3).copy_from(&self.angular);
        full
    }
}

/// Build the Jacobian from an already computed frame chain.
pub fn jacobian_from_chain(chain: &FrameChain) -> Jacobian {
    let n = chain.joint_count();
    let p_e = chain.end_effector_position();

    let mut linear = DMatrix::zeros(3, n);
    let mut angular = DMatrix::zeros(3, n);

    for i in 0..n {
        let z_i = chain.joint_axis(i);
        let p_i = chain.joint_origin(i);
        let v = z_i.cross(&(p_e - p_i));

        linear.column_mut(i).copy_from(&v);
        angular.column_mut(i).copy_from(&z_i);
    }

    Jacobian { linear, angular }
}

/// Compute the geometric Jacobian at a joint configuration.
pub fn compute_jacobian(model: &RobotModel, angles: &[f64]) -> Jacobian {
    let chain = forward_kinematics(model, angles);
    jacobian_from_chain(&chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot_config::RobotPreset;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_planar_zero_position() {
        let model = RobotPreset::Planar3R.model();
        let chain = forward_kinematics(&model, &[0.0, 0.0, 0.0]);
        let p = chain.end_effector_position();
        assert!((p.x - 1.8).abs() < 1e-9);
        assert!(p.y.abs() < 1e-9);
        assert!(p.z.abs() < 1e-9);
    }

    #[test]
    fn test_planar_elbow_up() {
        // Second joint at 90 deg folds the last two links onto +Y
        let model = RobotPreset::Planar3R.model();
        let chain = forward_kinematics(&model, &[0.0, FRAC_PI_2, 0.0]);
        assert_relative_eq!(chain.end_effector_position(), Vec3::new(0.8, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_chain_length_and_base_identity() {
        let model = RobotPreset::Ur5.model();
        let chain = forward_kinematics(&model, &model.zero_angles());
        assert_eq!(chain.len(), 7);
        assert_eq!(chain.joint_count(), 6);
        assert_eq!(chain.frame(0), &Pose::identity());
    }

    #[test]
    fn test_chain_composition_invariant() {
        let model = RobotPreset::Ur5.model();
        let angles = [0.3, -1.2, 0.8, 0.1, -0.5, 2.0];
        let chain = forward_kinematics(&model, &angles);
        for (i, dh) in model.dh().iter().enumerate() {
            let expected = chain.frame(i) * math::dh_transform(angles[i], dh.d, dh.a, dh.alpha);
            assert_relative_eq!(*chain.frame(i + 1), expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_ur5_zero_pose() {
        // Arm stretched along -X; wrist offsets along Y and Z
        let model = RobotPreset::Ur5.model();
        let p = forward_kinematics(&model, &model.zero_angles()).end_effector_position();
        assert_relative_eq!(p.x, -0.81725, epsilon = 1e-9);
        assert_relative_eq!(p.y, -0.19145, epsilon = 1e-9);
        assert_relative_eq!(p.z, -0.005491, epsilon = 1e-9);
    }

    #[test]
    fn test_serialized_chain_is_row_major() {
        let model = RobotPreset::Planar3R.model();
        let chain = forward_kinematics(&model, &model.zero_angles());
        let json = serde_json::to_value(&chain).unwrap();
        let frames = json.as_array().unwrap();
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[3][0][3].as_f64().unwrap(), chain.to_row_major()[3][0][3]);
    }

    #[test]
    fn test_planar_jacobian_columns() {
        let model = RobotPreset::Planar3R.model();
        let jac = compute_jacobian(&model, &[0.0, 0.0, 0.0]);
        // Stretched along X: each joint moves the tip along +Y by its lever arm
        assert_relative_eq!(jac.linear()[(1, 0)], 1.8, epsilon = 1e-12);
        assert_relative_eq!(jac.linear()[(1, 1)], 1.0, epsilon = 1e-12);
        assert_relative_eq!(jac.linear()[(1, 2)], 0.4, epsilon = 1e-12);
        assert_relative_eq!(jac.linear().row(0).norm(), 0.0, epsilon = 1e-12);
        for i in 0..3 {
            assert_relative_eq!(jac.angular()[(2, i)], 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_jacobian_matches_finite_difference() {
        let model = RobotPreset::Ur5.model();
        let angles = [0.4, -0.9, 1.1, -0.3, 0.7, 0.2];
        let jac = compute_jacobian(&model, &angles);
        let h = 1e-6;

        for i in 0..angles.len() {
            let mut plus = angles;
            let mut minus = angles;
            plus[i] += h;
            minus[i] -= h;
            let p_plus = forward_kinematics(&model, &plus).end_effector_position();
            let p_minus = forward_kinematics(&model, &minus).end_effector_position();
            let numeric = (p_plus - p_minus) / (2.0 * h);
            let column = Vec3::new(jac.linear()[(0, i)], jac.linear()[(1, i)], jac.linear()[(2, i)]);
            assert_relative_eq!(column, numeric, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_stacked_layout() {
        let model = RobotPreset::Elbow3R.model();
        let jac = compute_jacobian(&model, &[0.1, 0.2, 0.3]);
        let full = jac.stacked();
        assert_eq!(full.shape(), (6, 3));
        assert_eq!(full.rows(0, 3).into_owned(), *jac.linear());
        assert_eq!(full.rows(3, 3).into_owned(), *jac.angular());
    }
}
