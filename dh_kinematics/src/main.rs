use std::error::Error;

use tracing::{error, info, warn};

use dh_kinematics::{
    create_robot, forward_kinematics, solve_inverse_kinematics, ConfigError, IkOptions,
    RobotDefinition, RobotModel, RobotPreset,
};

const SAMPLE_COUNT: usize = 8;

/// Deterministic joint configurations spread across each joint's range.
fn sample_configurations(model: &RobotModel) -> Vec<Vec<f64>> {
    (0..SAMPLE_COUNT)
        .map(|k| {
            model
                .limits()
                .iter()
                .enumerate()
                .map(|(i, limit)| {
                    let frac = 0.5 + 0.35 * ((k as f64) * 1.7 + (i as f64) * 0.9).sin();
                    limit.min + frac * (limit.max - limit.min)
                })
                .collect()
        })
        .collect()
}

fn report(model: &RobotModel, options: &IkOptions) -> Result<(), Box<dyn Error>> {
    let zero = forward_kinematics(model, &model.zero_angles()).end_effector_position();
    info!(
        "{} ({} joints): zero pose at [{:.4}, {:.4}, {:.4}], reach {:.4}",
        model.name(),
        model.joint_count(),
        zero.x,
        zero.y,
        zero.z,
        model.max_reach()
    );

    let mut converged = 0;
    let samples = sample_configurations(model);
    for (k, q) in samples.iter().enumerate() {
        let target = forward_kinematics(model, q).end_effector_position();
        let result = solve_inverse_kinematics(model, &target, None, Some(options))?;

        if result.converged {
            converged += 1;
            info!(
                "  sample {}: target [{:.4}, {:.4}, {:.4}] converged in {} iterations, error {:.2e}",
                k, target.x, target.y, target.z, result.iterations, result.error
            );
        } else {
            warn!(
                "  sample {}: target [{:.4}, {:.4}, {:.4}] not converged after {} iterations, error {:.4}",
                k, target.x, target.y, target.z, result.iterations, result.error
            );
        }
    }

    info!("{}: {}/{} round trips converged", model.name(), converged, samples.len());
    Ok(())
}

/// Models named on the command line, or every preset when none is given.
fn select_models(key: Option<&str>) -> Result<Vec<RobotModel>, ConfigError> {
    match key {
        Some(key) => match create_robot(key) {
            Ok(model) => Ok(vec![model]),
            Err(e) => {
                let keys: Vec<&str> = RobotPreset::all().iter().map(|p| p.key()).collect();
                error!("Available presets: {}", keys.join(", "));
                Err(e)
            }
        },
        None => Ok(RobotPreset::all().iter().map(|p| p.model()).collect()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let options = match std::env::var("IK_OPTIONS") {
        Ok(json) => serde_json::from_str::<IkOptions>(&json)?,
        Err(_) => IkOptions::default(),
    };
    options.validate()?;

    let mut models = select_models(std::env::args().nth(1).as_deref())?;

    if let Ok(path) = std::env::var("ROBOT_DEFINITION") {
        let json = std::fs::read_to_string(&path)?;
        let definition = RobotDefinition::from_json(&json)?;
        models.push(RobotModel::from_definition(definition)?);
    }

    for model in &models {
        report(model, &options)?;
    }

    Ok(())
}
