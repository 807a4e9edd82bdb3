use tracing::info;

use crate::cmd::{connect, ResetArgs};
use crate::exit::{outcome_code, protocol_error, CliResult};
use crate::output::{emit, ActionOutput, OutputFormat};

pub fn run(args: ResetArgs, format: OutputFormat) -> CliResult<i32> {
    let code = args.code();
    let mut radar = connect(&args.device)?;
    let outcome = radar
        .reset(code)
        .map_err(|err| protocol_error("reset failed", err))?;

    info!(reset = %code, "radar reset requested");
    emit(&ActionOutput::new("reset", outcome), format);
    Ok(outcome_code(outcome))
}
