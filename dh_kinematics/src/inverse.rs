//! Damped least-squares inverse kinematics.
//!
//! Position-only targets: each iteration solves
//! `(Jp Jp^T + lambda^2 I) v = target - p_e` and applies `dq = Jp^T v`,
//! then clamps every joint into its range. The solver is an explicit state
//! machine so a host can drive it one step at a time and stop between steps.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::errors::ConfigError;
use crate::kinematics::{forward_kinematics, jacobian_from_chain};
use crate::linear_solver;
use crate::math::Vec3;
use crate::robot_config::RobotModel;

/// Solver tuning. Missing JSON fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IkOptions {
    /// Iteration budget; the only bound on work.
    pub max_iterations: u32,
    /// Converged once the end-effector is closer than this to the target.
    pub position_tolerance: f64,
    /// Damping factor (lambda). Higher = more stable near singularities,
    /// slower convergence.
    pub damping_factor: f64,
}

impl Default for IkOptions {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            position_tolerance: 0.001,
            damping_factor: 0.5,
        }
    }
}

impl IkOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations == 0 {
            return Err(ConfigError::InvalidOption {
                name: "max_iterations".to_string(),
                value: 0.0,
            });
        }
        for (name, value) in [
            ("position_tolerance", self.position_tolerance),
            ("damping_factor", self.damping_factor),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidOption {
                    name: name.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Outcome of one IK solve. Both converged and exhausted solves are results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IkResult {
    /// Joint angles in radians, inside the model's limits.
    pub angles: Vec<f64>,
    pub converged: bool,
    /// Euclidean distance from the end-effector to the target.
    pub error: f64,
    pub iterations: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IkState {
    /// `iteration` steps have been applied so far.
    Iterating { iteration: u32 },
    Converged { iterations: u32 },
    Exhausted,
}

impl IkState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, IkState::Iterating { .. })
    }
}

/// Step-wise damped least-squares solver owning its working angles.
#[derive(Debug, Clone)]
pub struct IkSolver<'a> {
    model: &'a RobotModel,
    target: Vec3,
    angles: Vec<f64>,
    options: IkOptions,
    state: IkState,
    error: f64,
}

impl<'a> IkSolver<'a> {
    /// `start` defaults to the zero pose. Options are used as given; see
    /// [`IkOptions::validate`].
    pub fn new(
        model: &'a RobotModel,
        target: Vec3,
        start: Option<&[f64]>,
        options: IkOptions,
    ) -> Self {
        let angles = match start {
            Some(start) => {
                assert_eq!(start.len(), model.joint_count(), "start angles must match joint count");
                start.to_vec()
            }
            None => model.zero_angles(),
        };

        Self {
            model,
            target,
            angles,
            options,
            state: IkState::Iterating { iteration: 0 },
            error: f64::INFINITY,
        }
    }

    pub fn state(&self) -> IkState {
        self.state
    }

    /// Current working angles (not yet clamped before the first update).
    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    /// Perform one transition and return the new state.
    ///
    /// Terminal states are sticky.
    pub fn step(&mut self) -> IkState {
        let iteration = match self.state {
            IkState::Iterating { iteration } => iteration,
            terminal => return terminal,
        };

        let chain = forward_kinematics(self.model, &self.angles);
        let err = self.target - chain.end_effector_position();
        self.error = err.norm();

        if self.error < self.options.position_tolerance {
            debug!(robot = self.model.name(), iterations = iteration, error = self.error, "IK converged");
            self.state = IkState::Converged { iterations: iteration };
            return self.state;
        }

        if iteration >= self.options.max_iterations {
            warn!(
                robot = self.model.name(),
                iterations = iteration,
                error = self.error,
                "IK exhausted iteration budget"
            );
            self.state = IkState::Exhausted;
            return self.state;
        }

        trace!(iteration, error = self.error, "IK iteration");

        let jacobian = jacobian_from_chain(&chain);
        let jp = jacobian.linear();
        let lambda_sq = self.options.damping_factor * self.options.damping_factor;
        let damped = jp * jp.transpose() + DMatrix::identity(3, 3) * lambda_sq;
        let rhs = DVector::from_column_slice(err.as_slice());

        let v = linear_solver::solve(&damped, &rhs);
        let dq = jp.transpose() * v;

        for (q, delta) in self.angles.iter_mut().zip(dq.iter()) {
            *q += delta;
        }
        self.angles = self.model.clamp(&self.angles);

        self.state = IkState::Iterating { iteration: iteration + 1 };
        self.state
    }

    /// Run until converged or exhausted.
    pub fn finish(mut self) -> IkResult {
        while !self.step().is_terminal() {}
        self.into_result()
    }

    /// Snapshot of the solve. Before a terminal state this is the
    /// best-effort result so far.
    pub fn into_result(self) -> IkResult {
        let angles = self.model.clamp(&self.angles);
        match self.state {
            IkState::Converged { iterations } => IkResult {
                angles,
                converged: true,
                error: self.error,
                iterations,
            },
            IkState::Exhausted => IkResult {
                angles,
                converged: false,
                error: self.error,
                iterations: self.options.max_iterations,
            },
            IkState::Iterating { iteration } => {
                let reached = forward_kinematics(self.model, &angles).end_effector_position();
                IkResult {
                    error: (self.target - reached).norm(),
                    angles,
                    converged: false,
                    iterations: iteration,
                }
            }
        }
    }
}

/// Solve for joint angles placing the end-effector at `target`.
///
/// `start` defaults to the zero pose and `options` to [`IkOptions::default`].
/// Only invalid options produce an error.
pub fn solve_inverse_kinematics(
    model: &RobotModel,
    target: &Vec3,
    start: Option<&[f64]>,
    options: Option<&IkOptions>,
) -> Result<IkResult, ConfigError> {
    let options = options.cloned().unwrap_or_default();
    options.validate()?;
    Ok(IkSolver::new(model, *target, start, options).finish())
}
