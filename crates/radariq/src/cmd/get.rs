use serde::Serialize;

use crate::cmd::setting::{self, SettingValue};
use crate::cmd::{connect, GetArgs};
use crate::exit::{protocol_error, CliResult, SUCCESS};
use crate::output::{emit, OutputFormat, Render};

#[derive(Serialize)]
struct GetOutput {
    setting: &'static str,
    value: SettingValue,
}

impl Render for GetOutput {
    fn rows(&self) -> Vec<(String, String)> {
        vec![(self.setting.to_string(), self.value.to_string())]
    }

    fn raw(&self) -> String {
        self.value.to_string()
    }
}

pub fn run(args: GetArgs, format: OutputFormat) -> CliResult<i32> {
    let mut radar = connect(&args.device)?;
    let value = setting::read(&mut radar, args.setting)
        .map_err(|err| protocol_error(&format!("get {} failed", args.setting), err))?;

    emit(
        &GetOutput {
            setting: args.setting.name(),
            value,
        },
        format,
    );
    Ok(SUCCESS)
}
