use tracing::info;

use crate::cmd::{connect, DeviceArgs};
use crate::exit::{outcome_code, protocol_error, CliResult};
use crate::output::{emit, ActionOutput, OutputFormat};

pub fn run(args: DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let mut radar = connect(&args)?;
    info!(
        attempts = radar.config().calibration_attempts,
        "running scene calibration, keep the field of view clear"
    );
    let outcome = radar
        .scene_calibrate()
        .map_err(|err| protocol_error("scene calibration failed", err))?;

    emit(&ActionOutput::new("calibrate", outcome), format);
    Ok(outcome_code(outcome))
}
