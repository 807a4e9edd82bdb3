mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "radariq", version, about = "RadarIQ M1 radar command-line tool")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::setting::Setting;

    #[test]
    fn parses_set_with_negative_bounds() {
        let cli = Cli::try_parse_from([
            "radariq",
            "set",
            "/dev/ttyUSB0",
            "angle-filter",
            "-30",
            "45",
        ])
        .expect("set args should parse");

        let Command::Set(args) = cli.command else {
            panic!("expected set");
        };
        assert_eq!(args.setting, Setting::AngleFilter);
        assert_eq!(args.values, ["-30", "45"]);
        assert_eq!(args.device.baud, 115_200);
    }

    #[test]
    fn rejects_unknown_setting() {
        let err = Cli::try_parse_from(["radariq", "get", "/dev/ttyUSB0", "gain"])
            .expect_err("unknown setting should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn rejects_extra_set_values() {
        let parsed = Cli::try_parse_from(["radariq", "set", "COM3", "frame-rate", "1", "2", "3"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn parses_capture_options() {
        let cli = Cli::try_parse_from([
            "radariq",
            "--format",
            "json",
            "capture",
            "/dev/ttyACM0",
            "--frames",
            "10",
            "--baud",
            "921600",
            "--stats",
        ])
        .expect("capture args should parse");

        assert!(matches!(cli.format, Some(OutputFormat::Json)));
        let Command::Capture(args) = cli.command else {
            panic!("expected capture");
        };
        assert_eq!(args.frames, 10);
        assert_eq!(args.device.baud, 921_600);
        assert!(args.stats);
        assert!(args.count.is_none());
    }

    #[test]
    fn parses_reset_factory() {
        let cli = Cli::try_parse_from(["radariq", "reset", "/dev/ttyUSB0", "--factory"])
            .expect("reset args should parse");
        let Command::Reset(args) = cli.command else {
            panic!("expected reset");
        };
        assert_eq!(args.code(), radariq_protocol::ResetCode::FactorySettings);
    }
}
