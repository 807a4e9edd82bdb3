use clap::ValueEnum;
use radariq_protocol::{DeviceVersions, RadarVersions, SerialNumber};
use serde::Serialize;

use crate::cmd::setting::{self, Setting, SettingValue};
use crate::cmd::{connect, DeviceArgs};
use crate::exit::{protocol_error, CliResult, SUCCESS};
use crate::output::{emit, OutputFormat, Render};

#[derive(Serialize)]
struct SettingEntry {
    name: &'static str,
    value: SettingValue,
}

#[derive(Serialize)]
struct InfoOutput {
    port: String,
    firmware: String,
    hardware: String,
    serial_number: String,
    radar_firmware: RadarVersions,
    settings: Vec<SettingEntry>,
}

impl Render for InfoOutput {
    fn rows(&self) -> Vec<(String, String)> {
        let mut rows = vec![
            ("port".to_string(), self.port.clone()),
            ("firmware".to_string(), self.firmware.clone()),
            ("hardware".to_string(), self.hardware.clone()),
            ("serial number".to_string(), self.serial_number.clone()),
            (
                "radar sbl".to_string(),
                self.radar_firmware.sbl.version.to_string(),
            ),
        ];
        for (label, image) in [
            ("radar app1", &self.radar_firmware.app1),
            ("radar app2", &self.radar_firmware.app2),
        ] {
            rows.push((
                label.to_string(),
                format!("{} {}", image.version, image.name),
            ));
        }
        rows.extend(
            self.settings
                .iter()
                .map(|entry| (entry.name.to_string(), entry.value.to_string())),
        );
        rows
    }

    fn raw(&self) -> String {
        self.serial_number.clone()
    }
}

pub fn run(args: DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let mut radar = connect(&args)?;

    let DeviceVersions { firmware, hardware } = radar
        .version()
        .map_err(|err| protocol_error("version query failed", err))?;
    let serial: SerialNumber = radar
        .serial_number()
        .map_err(|err| protocol_error("serial number query failed", err))?;
    let radar_firmware = radar
        .radar_versions()
        .map_err(|err| protocol_error("radar version query failed", err))?;

    let mut settings = Vec::with_capacity(Setting::value_variants().len());
    for &which in Setting::value_variants() {
        let value = setting::read(&mut radar, which)
            .map_err(|err| protocol_error(&format!("get {which} failed"), err))?;
        settings.push(SettingEntry {
            name: which.name(),
            value,
        });
    }

    let out = InfoOutput {
        port: args.port,
        firmware: firmware.to_string(),
        hardware: hardware.to_string(),
        serial_number: serial.to_string(),
        radar_firmware,
        settings,
    };
    emit(&out, format);
    Ok(SUCCESS)
}
