/// Robot configuration module for serial revolute manipulators
///
/// A robot is an immutable table of standard Denavit-Hartenberg rows
/// `(d, a, alpha)` plus one `(min, max)` limit per joint. The joint angle
/// `theta` is the variable and is never stored here: callers own their angle
/// vectors (or a [`JointState`]) and pass them into every kinematics call.
///
/// Lengths are in metres; limits are configured in degrees and converted to
/// radians once, when the model is built.

use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ConfigError;

/// Fixed link parameters of one joint (standard DH convention).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DhParameters {
    /// Offset along the previous Z axis
    pub d: f64,
    /// Length along the new X axis
    pub a: f64,
    /// Twist about the new X axis, radians
    pub alpha: f64,
}

impl DhParameters {
    pub const fn new(d: f64, a: f64, alpha: f64) -> Self {
        Self { d, a, alpha }
    }
}

/// Joint range in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointLimits {
    pub min: f64,
    pub max: f64,
}

impl JointLimits {
    pub fn from_degrees(min_deg: f64, max_deg: f64) -> Self {
        Self {
            min: min_deg.to_radians(),
            max: max_deg.to_radians(),
        }
    }

    pub fn clamp(&self, angle: f64) -> f64 {
        angle.clamp(self.min, self.max)
    }

    pub fn contains(&self, angle: f64) -> bool {
        angle >= self.min && angle <= self.max
    }
}

/// The closed set of built-in robots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RobotPreset {
    /// Three-link planar arm, links 0.8 / 0.6 / 0.4 m
    Planar3R,
    /// Anthropomorphic 3-DOF arm: waist, shoulder, elbow
    Elbow3R,
    /// Universal Robots UR5, six revolute joints
    Ur5,
}

const PLANAR_3R_DH: [DhParameters; 3] = [
    DhParameters::new(0.0, 0.8, 0.0),
    DhParameters::new(0.0, 0.6, 0.0),
    DhParameters::new(0.0, 0.4, 0.0),
];
const PLANAR_3R_LIMITS_DEG: [(f64, f64); 3] = [(-180.0, 180.0), (-180.0, 180.0), (-180.0, 180.0)];

const ELBOW_3R_DH: [DhParameters; 3] = [
    DhParameters::new(0.4, 0.0, FRAC_PI_2),
    DhParameters::new(0.0, 0.5, 0.0),
    DhParameters::new(0.0, 0.4, 0.0),
];
const ELBOW_3R_LIMITS_DEG: [(f64, f64); 3] = [(-170.0, 170.0), (-90.0, 150.0), (-150.0, 150.0)];

const UR5_DH: [DhParameters; 6] = [
    DhParameters::new(0.089159, 0.0, FRAC_PI_2),
    DhParameters::new(0.0, -0.425, 0.0),
    DhParameters::new(0.0, -0.39225, 0.0),
    DhParameters::new(0.10915, 0.0, FRAC_PI_2),
    DhParameters::new(0.09465, 0.0, -FRAC_PI_2),
    DhParameters::new(0.0823, 0.0, 0.0),
];
const UR5_LIMITS_DEG: [(f64, f64); 6] = [(-360.0, 360.0); 6];

impl RobotPreset {
    /// Get all built-in presets.
    pub fn all() -> Vec<RobotPreset> {
        vec![RobotPreset::Planar3R, RobotPreset::Elbow3R, RobotPreset::Ur5]
    }

    /// Lookup key accepted by [`create_robot`].
    pub fn key(&self) -> &'static str {
        match self {
            RobotPreset::Planar3R => "planar-3r",
            RobotPreset::Elbow3R => "elbow-3r",
            RobotPreset::Ur5 => "ur5",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RobotPreset::Planar3R => "Planar 3R (0.8 / 0.6 / 0.4 m)",
            RobotPreset::Elbow3R => "Elbow 3R (0.5 / 0.4 m)",
            RobotPreset::Ur5 => "UR5 (6 DOF, 850 mm)",
        }
    }

    pub fn dh(&self) -> &'static [DhParameters] {
        match self {
            RobotPreset::Planar3R => &PLANAR_3R_DH,
            RobotPreset::Elbow3R => &ELBOW_3R_DH,
            RobotPreset::Ur5 => &UR5_DH,
        }
    }

    /// Joint limits in degrees, as configured.
    pub fn limits_deg(&self) -> &'static [(f64, f64)] {
        match self {
            RobotPreset::Planar3R => &PLANAR_3R_LIMITS_DEG,
            RobotPreset::Elbow3R => &ELBOW_3R_LIMITS_DEG,
            RobotPreset::Ur5 => &UR5_LIMITS_DEG,
        }
    }

    /// Build the model for this preset.
    pub fn model(&self) -> RobotModel {
        let limits = self
            .limits_deg()
            .iter()
            .map(|&(min, max)| JointLimits::from_degrees(min, max))
            .collect();
        RobotModel::new_unchecked(self.key().to_string(), self.dh().to_vec(), limits)
    }
}

impl std::fmt::Display for RobotPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl std::str::FromStr for RobotPreset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "planar-3r" | "planar3r" | "planar" => Ok(RobotPreset::Planar3R),
            "elbow-3r" | "elbow3r" | "elbow" => Ok(RobotPreset::Elbow3R),
            "ur5" => Ok(RobotPreset::Ur5),
            _ => Err(ConfigError::UnknownPreset(s.to_string())),
        }
    }
}

/// Create a robot from a preset key such as `"planar-3r"` or `"ur5"`.
pub fn create_robot(preset_key: &str) -> Result<RobotModel, ConfigError> {
    let preset: RobotPreset = preset_key.parse()?;
    Ok(preset.model())
}

/// User-supplied robot description, e.g. loaded from JSON.
///
/// `alpha` in each DH row is in radians; `limits_deg` holds `[min, max]`
/// pairs in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotDefinition {
    pub name: String,
    pub dh: Vec<DhParameters>,
    pub limits_deg: Vec<(f64, f64)>,
}

impl RobotDefinition {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Immutable kinematic description of a serial revolute chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RobotModel {
    name: String,
    dh: Vec<DhParameters>,
    limits: Vec<JointLimits>,
}

impl RobotModel {
    fn new_unchecked(name: String, dh: Vec<DhParameters>, limits: Vec<JointLimits>) -> Self {
        debug!(robot = %name, joints = dh.len(), "robot model created");
        Self { name, dh, limits }
    }

    /// Validate a custom definition and build its model.
    pub fn from_definition(definition: RobotDefinition) -> Result<Self, ConfigError> {
        let RobotDefinition { name, dh, limits_deg } = definition;

        if dh.is_empty() {
            return Err(ConfigError::EmptyChain);
        }
        if dh.len() != limits_deg.len() {
            return Err(ConfigError::JointCountMismatch {
                dh: dh.len(),
                limits: limits_deg.len(),
            });
        }
        for (joint, &(min, max)) in limits_deg.iter().enumerate() {
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(ConfigError::InvalidLimits { joint, min, max });
            }
        }

        let limits = limits_deg
            .iter()
            .map(|&(min, max)| JointLimits::from_degrees(min, max))
            .collect();
        Ok(Self::new_unchecked(name, dh, limits))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn joint_count(&self) -> usize {
        self.dh.len()
    }

    pub fn dh(&self) -> &[DhParameters] {
        &self.dh
    }

    /// Per-joint limits in radians.
    pub fn limits(&self) -> &[JointLimits] {
        &self.limits
    }

    /// The default starting pose: every joint at zero.
    pub fn zero_angles(&self) -> Vec<f64> {
        vec![0.0; self.joint_count()]
    }

    /// Clamp every joint into its range. Returns a new vector.
    pub fn clamp(&self, angles: &[f64]) -> Vec<f64> {
        assert_eq!(angles.len(), self.joint_count(), "angle vector length must match joint count");
        angles
            .iter()
            .zip(&self.limits)
            .map(|(&q, limit)| limit.clamp(q))
            .collect()
    }

    pub fn within_limits(&self, angles: &[f64]) -> bool {
        angles.len() == self.joint_count()
            && angles.iter().zip(&self.limits).all(|(&q, limit)| limit.contains(q))
    }

    /// Upper bound on the base to end-effector distance.
    ///
    /// Each DH step translates by `(a cos θ, a sin θ, d)`, whose length is
    /// `hypot(a, d)` for every θ.
    pub fn max_reach(&self) -> f64 {
        self.dh.iter().map(|p| p.a.hypot(p.d)).sum()
    }
}

/// Caller-owned joint angles for one robot.
///
/// Changes only through `set`, `set_all` and `clamp_to`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointState {
    angles: Vec<f64>,
}

impl JointState {
    /// All joints at zero.
    pub fn new(model: &RobotModel) -> Self {
        Self {
            angles: model.zero_angles(),
        }
    }

    pub fn from_angles(angles: Vec<f64>) -> Self {
        Self { angles }
    }

    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    pub fn set(&mut self, joint: usize, angle: f64) {
        self.angles[joint] = angle;
    }

    pub fn set_all(&mut self, angles: &[f64]) {
        assert_eq!(angles.len(), self.angles.len(), "angle vector length must match joint count");
        self.angles.copy_from_slice(angles);
    }

    pub fn clamp_to(&mut self, model: &RobotModel) {
        self.angles = model.clamp(&self.angles);
    }
}
