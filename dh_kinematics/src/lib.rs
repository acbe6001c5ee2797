// Library exports for DH-parameter kinematics

pub mod errors;
pub mod math;
pub mod linear_solver;
pub mod robot_config;
pub mod kinematics;
pub mod inverse;

pub use errors::ConfigError;
pub use math::{Pose, Vec3};
pub use robot_config::{create_robot, DhParameters, JointLimits, JointState, RobotDefinition, RobotModel, RobotPreset};
pub use kinematics::{compute_jacobian, forward_kinematics, FrameChain, Jacobian};
pub use inverse::{solve_inverse_kinematics, IkOptions, IkResult, IkSolver, IkState};
