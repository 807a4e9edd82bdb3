use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use radariq_protocol::{Radar, RadarConfig, ResetCode};
use radariq_transport::{open, SerialConfig, SerialPortLink};

use crate::exit::{transport_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod calibrate;
pub mod capture;
pub mod decode;
pub mod get;
pub mod info;
pub mod packet;
pub mod ports;
pub mod reset;
pub mod save;
pub mod set;
pub mod setting;
pub mod version;

use setting::Setting;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List serial ports on this host.
    Ports(PortsArgs),
    /// Show versions, serial number and every setting of a radar.
    Info(DeviceArgs),
    /// Read one setting.
    Get(GetArgs),
    /// Change one setting.
    Set(SetArgs),
    /// Stream decoded frames and statistics.
    Capture(CaptureArgs),
    /// Persist the current settings on the radar.
    Save(DeviceArgs),
    /// Reboot the radar or restore factory settings.
    Reset(ResetArgs),
    /// Run a scene calibration.
    Calibrate(DeviceArgs),
    /// Decode a recorded serial byte stream.
    Decode(DecodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Ports(args) => ports::run(args, format),
        Command::Info(args) => info::run(args, format),
        Command::Get(args) => get::run(args, format),
        Command::Set(args) => set::run(args, format),
        Command::Capture(args) => capture::run(args, format),
        Command::Save(args) => save::run(args, format),
        Command::Reset(args) => reset::run(args, format),
        Command::Calibrate(args) => calibrate::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Serial connection options shared by every device command.
#[derive(Args, Debug)]
pub struct DeviceArgs {
    /// Serial port, e.g. /dev/ttyUSB0 or COM3.
    pub port: String,
    /// Line rate in bits per second.
    #[arg(long, default_value_t = SerialConfig::DEFAULT_BAUD_RATE)]
    pub baud: u32,
    /// Response timeout (e.g. 2s, 500ms).
    #[arg(long, default_value = "1s")]
    pub timeout: String,
}

#[derive(Args, Debug, Default)]
pub struct PortsArgs {}

#[derive(Args, Debug)]
pub struct GetArgs {
    #[command(flatten)]
    pub device: DeviceArgs,
    /// Setting to read.
    pub setting: Setting,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    #[command(flatten)]
    pub device: DeviceArgs,
    /// Setting to change.
    pub setting: Setting,
    /// New value, or `MIN MAX` for filters.
    #[arg(required = true, num_args = 1..=2, allow_negative_numbers = true)]
    pub values: Vec<String>,
}

#[derive(Args, Debug)]
pub struct CaptureArgs {
    #[command(flatten)]
    pub device: DeviceArgs,
    /// Frames the radar should capture. 0 streams until stopped.
    #[arg(long, default_value_t = 0)]
    pub frames: u8,
    /// Exit after printing N complete frames.
    #[arg(long)]
    pub count: Option<usize>,
    /// Also print statistics and power packets.
    #[arg(long)]
    pub stats: bool,
}

#[derive(Args, Debug)]
pub struct ResetArgs {
    #[command(flatten)]
    pub device: DeviceArgs,
    /// Restore factory settings instead of rebooting.
    #[arg(long)]
    pub factory: bool,
}

impl ResetArgs {
    pub fn code(&self) -> ResetCode {
        if self.factory {
            ResetCode::FactorySettings
        } else {
            ResetCode::Reboot
        }
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// File holding raw bytes captured from the radar UART.
    pub file: PathBuf,
    /// Also print the decoded payload bytes.
    #[arg(long)]
    pub payload: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Open the serial port named by `args` and wrap it in a connection.
pub fn connect(args: &DeviceArgs) -> CliResult<Radar<SerialPortLink>> {
    let response_timeout = parse_timeout(&args.timeout)?;
    let serial = SerialConfig {
        baud_rate: args.baud,
        ..SerialConfig::new(&args.port)
    };
    let link = open(&serial).map_err(|err| transport_error("open failed", err))?;

    Ok(Radar::with_config(
        link,
        RadarConfig {
            response_timeout,
            ..RadarConfig::default()
        },
    ))
}

pub fn parse_timeout(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "timeout must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid timeout value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "timeout must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_timeout_seconds() {
        assert_eq!(parse_timeout("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_timeout("2").unwrap(), Duration::from_secs(2));
    }

    #[test]
    fn parse_timeout_millis() {
        assert_eq!(parse_timeout("150ms").unwrap(), Duration::from_millis(150));
    }

    #[test]
    fn parse_timeout_invalid() {
        assert!(parse_timeout("0s").is_err());
        assert!(parse_timeout("bad").is_err());
        assert_eq!(parse_timeout(" ").unwrap_err().code, USAGE);
    }
}
