use std::error::Error;
use std::fmt;
use serde::{Deserialize, Serialize};

/// Failures raised while building a robot model or validating IK options.
///
/// IK outcomes are never errors: a solve that runs out of iterations is
/// reported through `IkResult::converged`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ConfigError {
    UnknownPreset(String),
    EmptyChain,
    JointCountMismatch { dh: usize, limits: usize },
    InvalidLimits { joint: usize, min: f64, max: f64 },
    InvalidOption { name: String, value: f64 },
    Definition(String),
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ConfigError::UnknownPreset(ref key) => write!(f, "Unknown robot preset: {}", key),
            ConfigError::EmptyChain => write!(f, "Robot definition has no joints"),
            ConfigError::JointCountMismatch { dh, limits } => write!(
                f,
                "Robot definition has {} DH rows but {} joint limits",
                dh, limits
            ),
            ConfigError::InvalidLimits { joint, min, max } => write!(
                f,
                "Joint {} has invalid limits [{}, {}]",
                joint, min, max
            ),
            ConfigError::InvalidOption { ref name, value } => {
                write!(f, "IK option {} must be positive and finite, got {}", name, value)
            }
            ConfigError::Definition(ref msg) => write!(f, "Could not parse robot definition: {}", msg),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Definition(err.to_string())
    }
}
