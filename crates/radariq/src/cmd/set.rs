use radariq_protocol::Outcome;
use serde::Serialize;

use crate::cmd::setting::{self, SettingValue};
use crate::cmd::{connect, SetArgs};
use crate::exit::{outcome_code, protocol_error, CliResult};
use crate::output::{emit, outcome_label, OutputFormat, Render};

#[derive(Serialize)]
struct SetOutput {
    setting: &'static str,
    outcome: Outcome,
    /// Value read back after the change.
    value: SettingValue,
}

impl Render for SetOutput {
    fn rows(&self) -> Vec<(String, String)> {
        vec![
            ("setting".to_string(), self.setting.to_string()),
            ("outcome".to_string(), outcome_label(self.outcome).to_string()),
            ("value".to_string(), self.value.to_string()),
        ]
    }

    fn raw(&self) -> String {
        self.value.to_string()
    }
}

pub fn run(args: SetArgs, format: OutputFormat) -> CliResult<i32> {
    let mut radar = connect(&args.device)?;
    let outcome = setting::write(&mut radar, args.setting, &args.values)?;
    let value = setting::read(&mut radar, args.setting)
        .map_err(|err| protocol_error(&format!("get {} failed", args.setting), err))?;

    emit(
        &SetOutput {
            setting: args.setting.name(),
            outcome,
            value,
        },
        format,
    );
    Ok(outcome_code(outcome))
}
