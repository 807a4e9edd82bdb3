//! Command-line names, parsing and display for device settings.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use radariq_protocol::{Outcome, ProtocolError, Radar};
use radariq_transport::SerialLink;
use serde::Serialize;

use crate::exit::{protocol_error, CliError, CliResult, USAGE};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Setting {
    FrameRate,
    Mode,
    DistanceFilter,
    AngleFilter,
    MovingFilter,
    PointDensity,
    Sensitivity,
    HeightFilter,
    ObjectSize,
}

impl Setting {
    pub fn name(self) -> &'static str {
        match self {
            Setting::FrameRate => "frame-rate",
            Setting::Mode => "mode",
            Setting::DistanceFilter => "distance-filter",
            Setting::AngleFilter => "angle-filter",
            Setting::MovingFilter => "moving-filter",
            Setting::PointDensity => "point-density",
            Setting::Sensitivity => "sensitivity",
            Setting::HeightFilter => "height-filter",
            Setting::ObjectSize => "object-size",
        }
    }

    /// Values the setting takes on the command line.
    fn arity(self) -> usize {
        match self {
            Setting::DistanceFilter | Setting::AngleFilter | Setting::HeightFilter => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A setting value read back from the radar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
    Number(i32),
    Range { min: i32, max: i32 },
    Named(&'static str),
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Number(n) => write!(f, "{n}"),
            SettingValue::Range { min, max } => write!(f, "{min} {max}"),
            SettingValue::Named(name) => f.write_str(name),
        }
    }
}

fn range(min: impl Into<i32>, max: impl Into<i32>) -> SettingValue {
    SettingValue::Range {
        min: min.into(),
        max: max.into(),
    }
}

pub fn read<L: SerialLink>(
    radar: &mut Radar<L>,
    setting: Setting,
) -> radariq_protocol::Result<SettingValue> {
    Ok(match setting {
        Setting::FrameRate => SettingValue::Number(radar.frame_rate()?.into()),
        Setting::Mode => SettingValue::Named(radar.mode()?.name()),
        Setting::DistanceFilter => {
            let (min, max) = radar.distance_filter()?;
            range(min, max)
        }
        Setting::AngleFilter => {
            let (min, max) = radar.angle_filter()?;
            range(min, max)
        }
        Setting::MovingFilter => SettingValue::Named(radar.moving_filter()?.name()),
        Setting::PointDensity => SettingValue::Named(radar.point_density()?.name()),
        Setting::Sensitivity => SettingValue::Number(radar.sensitivity()?.into()),
        Setting::HeightFilter => {
            let (min, max) = radar.height_filter()?;
            range(min, max)
        }
        Setting::ObjectSize => SettingValue::Number(radar.object_size()?.into()),
    })
}

pub fn write<L: SerialLink>(
    radar: &mut Radar<L>,
    setting: Setting,
    values: &[String],
) -> CliResult<Outcome> {
    if values.len() != setting.arity() {
        return Err(CliError::new(
            USAGE,
            format!(
                "{setting} takes {} value(s), got {}",
                setting.arity(),
                values.len()
            ),
        ));
    }
    let first = values[0].as_str();
    let last = values[values.len() - 1].as_str();

    let result = match setting {
        Setting::FrameRate => radar.set_frame_rate(number(setting, first)?),
        Setting::Mode => radar.set_mode(named(first)?),
        Setting::DistanceFilter => {
            radar.set_distance_filter(number(setting, first)?, number(setting, last)?)
        }
        Setting::AngleFilter => {
            radar.set_angle_filter(number(setting, first)?, number(setting, last)?)
        }
        Setting::MovingFilter => radar.set_moving_filter(named(first)?),
        Setting::PointDensity => radar.set_point_density(named(first)?),
        Setting::Sensitivity => radar.set_sensitivity(number(setting, first)?),
        Setting::HeightFilter => {
            radar.set_height_filter(number(setting, first)?, number(setting, last)?)
        }
        Setting::ObjectSize => radar.set_object_size(number(setting, first)?),
    };

    result.map_err(|err| protocol_error(&format!("set {setting} failed"), err))
}

fn number<T: FromStr>(setting: Setting, value: &str) -> CliResult<T> {
    value
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid {setting} value: {value}")))
}

fn named<T: FromStr<Err = ProtocolError>>(value: &str) -> CliResult<T> {
    value
        .parse()
        .map_err(|err| protocol_error("invalid value", err))
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;
    use radariq_frame::{encode_frame, DEFAULT_MAX_PAYLOAD};
    use radariq_protocol::CaptureMode;
    use radariq_transport::MockLink;

    use super::*;

    fn wire(payload: &[u8]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_frame(payload, DEFAULT_MAX_PAYLOAD, &mut buf).unwrap();
        buf.to_vec()
    }

    fn radar_replying(reply: Vec<u8>) -> Radar<MockLink> {
        let mut link = MockLink::new();
        let mut reply = Some(reply);
        link.on_write(move |_| reply.take().map(|payload| wire(&payload)));
        Radar::new(link)
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn reads_filters_as_ranges() {
        let mut radar = radar_replying(vec![0x07, 0x01, 0xF6, 0x14]);
        let value = read(&mut radar, Setting::AngleFilter).unwrap();
        assert_eq!(value, SettingValue::Range { min: -10, max: 20 });
        assert_eq!(value.to_string(), "-10 20");
    }

    #[test]
    fn reads_enumerations_by_name() {
        let mut radar = radar_replying(vec![0x10, 0x01, 0x02]);
        let value = read(&mut radar, Setting::PointDensity).unwrap();
        assert_eq!(value, SettingValue::Named("very-dense"));
    }

    #[test]
    fn writes_named_values() {
        let mut radar = radar_replying(vec![0x05, 0x01]);
        let outcome = write(&mut radar, Setting::Mode, &args(&["object-tracking"])).unwrap();

        assert_eq!(outcome, Outcome::Ok);
        assert_eq!(radar.capture_mode(), CaptureMode::ObjectTracking);
        assert_eq!(radar.link().written(), &[wire(&[0x05, 0x02, 0x01])]);
    }

    #[test]
    fn writes_clamped_numbers() {
        let mut radar = radar_replying(vec![0x11, 0x01]);
        let outcome = write(&mut radar, Setting::Sensitivity, &args(&["12"])).unwrap();
        assert_eq!(outcome, Outcome::Adjusted);
        assert_eq!(radar.link().written(), &[wire(&[0x11, 0x02, 0x09])]);
    }

    #[test]
    fn rejects_bad_arguments_before_io() {
        let mut radar = Radar::new(MockLink::new());

        let err = write(&mut radar, Setting::DistanceFilter, &args(&["100"])).unwrap_err();
        assert_eq!(err.code, USAGE);

        let err = write(&mut radar, Setting::FrameRate, &args(&["fast"])).unwrap_err();
        assert_eq!(err.code, USAGE);

        let err = write(&mut radar, Setting::MovingFilter, &args(&["sideways"])).unwrap_err();
        assert_eq!(err.code, USAGE);

        assert!(radar.link().written().is_empty());
    }
}
