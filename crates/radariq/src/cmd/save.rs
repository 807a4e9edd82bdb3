use crate::cmd::{connect, DeviceArgs};
use crate::exit::{outcome_code, protocol_error, CliResult};
use crate::output::{emit, ActionOutput, OutputFormat};

pub fn run(args: DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let mut radar = connect(&args)?;
    let outcome = radar
        .save()
        .map_err(|err| protocol_error("save failed", err))?;

    emit(&ActionOutput::new("save", outcome), format);
    Ok(outcome_code(outcome))
}
