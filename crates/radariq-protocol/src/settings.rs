//! Device settings: enumerations, documented ranges, and the clamping rules
//! applied before a value is sent.
//!
//! Ranged values outside their bounds are clamped and reported as
//! [`Outcome::Adjusted`]. Swapped min/max pairs are reordered silently.
//! Enumerated values arrive as raw codes through `TryFrom<u8>` and are
//! rejected before any I/O.

use std::fmt;

use serde::Serialize;

use crate::error::{ProtocolError, Result};

/// Slowest capture frame rate, frames/second.
pub const MIN_FRAME_RATE: u8 = 1;
/// Fastest capture frame rate, frames/second.
pub const MAX_FRAME_RATE: u8 = 30;
/// Farthest distance filter bound, millimetres.
pub const MAX_DISTANCE_MM: u16 = 10_000;
/// Lowest angle filter bound, degrees.
pub const MIN_ANGLE_DEG: i8 = -55;
/// Highest angle filter bound, degrees.
pub const MAX_ANGLE_DEG: i8 = 55;
/// Highest point-cloud sensitivity level.
pub const MAX_SENSITIVITY: u8 = 9;
/// Largest tracking target object size.
pub const MAX_OBJECT_SIZE: u8 = 4;

/// Result of a successful setter call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The value was applied as given.
    Ok,
    /// The value was out of range; the clamped value was applied.
    Adjusted,
}

impl Outcome {
    fn adjusted_if(adjusted: bool) -> Self {
        if adjusted {
            Outcome::Adjusted
        } else {
            Outcome::Ok
        }
    }
}

/// Flat Ok/Warning/Error code for any wrapper result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ReturnVal {
    Ok = 0,
    Warning = 1,
    Error = 2,
}

impl<T> From<&Result<T>> for ReturnVal
where
    T: Into<ReturnVal> + Copy,
{
    fn from(result: &Result<T>) -> Self {
        match result {
            Ok(value) => (*value).into(),
            Err(_) => ReturnVal::Error,
        }
    }
}

impl From<Outcome> for ReturnVal {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Ok => ReturnVal::Ok,
            Outcome::Adjusted => ReturnVal::Warning,
        }
    }
}

impl From<()> for ReturnVal {
    fn from(_: ()) -> Self {
        ReturnVal::Ok
    }
}

/// A value after range checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checked<T> {
    /// The value to send.
    pub value: T,
    /// Whether the value had to be clamped.
    pub outcome: Outcome,
}

fn clamp<T: Ord + Copy>(value: T, min: T, max: T) -> (T, bool) {
    let clamped = value.clamp(min, max);
    (clamped, clamped != value)
}

fn ordered<T: Ord>(min: T, max: T) -> (T, T) {
    if min > max {
        (max, min)
    } else {
        (min, max)
    }
}

/// Clamp a frame rate to 1..=30.
pub fn check_frame_rate(rate: u8) -> Checked<u8> {
    let (value, adjusted) = clamp(rate, MIN_FRAME_RATE, MAX_FRAME_RATE);
    Checked {
        value,
        outcome: Outcome::adjusted_if(adjusted),
    }
}

/// Order and clamp distance filter bounds to 0..=10000 mm.
pub fn check_distance_filter(min: u16, max: u16) -> Checked<(u16, u16)> {
    let (min, max) = ordered(min, max);
    let (min, min_adjusted) = clamp(min, 0, MAX_DISTANCE_MM);
    let (max, max_adjusted) = clamp(max, 0, MAX_DISTANCE_MM);
    Checked {
        value: (min, max),
        outcome: Outcome::adjusted_if(min_adjusted || max_adjusted),
    }
}

/// Order and clamp angle filter bounds to -55..=55 degrees.
pub fn check_angle_filter(min: i8, max: i8) -> Checked<(i8, i8)> {
    let (min, max) = ordered(min, max);
    let (min, min_adjusted) = clamp(min, MIN_ANGLE_DEG, MAX_ANGLE_DEG);
    let (max, max_adjusted) = clamp(max, MIN_ANGLE_DEG, MAX_ANGLE_DEG);
    Checked {
        value: (min, max),
        outcome: Outcome::adjusted_if(min_adjusted || max_adjusted),
    }
}

/// Order height filter bounds. Any `i16` pair is in range.
pub fn check_height_filter(min: i16, max: i16) -> Checked<(i16, i16)> {
    Checked {
        value: ordered(min, max),
        outcome: Outcome::Ok,
    }
}

/// Clamp a sensitivity level to 0..=9.
pub fn check_sensitivity(level: u8) -> Checked<u8> {
    let (value, adjusted) = clamp(level, 0, MAX_SENSITIVITY);
    Checked {
        value,
        outcome: Outcome::adjusted_if(adjusted),
    }
}

/// Clamp an object size to 0..=4.
pub fn check_object_size(size: u8) -> Checked<u8> {
    let (value, adjusted) = clamp(size, 0, MAX_OBJECT_SIZE);
    Checked {
        value,
        outcome: Outcome::adjusted_if(adjusted),
    }
}

macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal {
            $($(#[$vmeta:meta])* $variant:ident = $code:literal => $text:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        #[serde(rename_all = "snake_case")]
        #[repr(u8)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $code,)+
        }

        impl $name {
            /// Wire code.
            pub const fn code(self) -> u8 {
                self as u8
            }

            /// Lowercase name, as accepted on the command line.
            pub const fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            /// Every value, in wire-code order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];
        }

        impl TryFrom<u8> for $name {
            type Error = ProtocolError;

            fn try_from(code: u8) -> Result<Self> {
                match code {
                    $($code => Ok($name::$variant),)+
                    other => Err(ProtocolError::InvalidSetting(format!(
                        "{} code {other}",
                        $label
                    ))),
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ProtocolError;

            fn from_str(s: &str) -> Result<Self> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|value| value.name() == s)
                    .ok_or_else(|| ProtocolError::InvalidSetting(format!("{} '{s}'", $label)))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

coded_enum! {
    /// What the radar streams while capturing.
    CaptureMode, "capture mode" {
        PointCloud = 0 => "point-cloud",
        ObjectTracking = 1 => "object-tracking",
    }
}

coded_enum! {
    /// Which detections the moving filter keeps.
    MovingFilter, "moving filter" {
        /// Keep static and moving detections.
        Both = 0 => "both",
        /// Drop static detections.
        MovingOnly = 1 => "moving-only",
    }
}

coded_enum! {
    /// How many radar frames are aggregated into one point cloud.
    PointDensity, "point density" {
        Normal = 0 => "normal",
        Dense = 1 => "dense",
        VeryDense = 2 => "very-dense",
    }
}

coded_enum! {
    /// Kind of device reset.
    ResetCode, "reset code" {
        /// Reboot the device.
        Reboot = 0 => "reboot",
        /// Restore factory settings.
        FactorySettings = 1 => "factory",
    }
}

impl Default for CaptureMode {
    fn default() -> Self {
        CaptureMode::PointCloud
    }
}
