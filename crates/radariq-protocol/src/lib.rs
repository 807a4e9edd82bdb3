//! Command protocol for the RadarIQ M1 radar.
//!
//! [`Radar`] owns one connection: it drives the frame receiver one byte at a
//! time, dispatches each decoded packet on its leading command byte, keeps
//! the latest data, statistics, power and message snapshots, and wraps every
//! device setting in a synchronous get/set call with a response timeout.

pub mod command;
pub mod config;
pub mod data;
pub mod error;
pub mod identity;
pub mod message;
pub mod radar;
pub mod settings;
pub mod stats;

mod fields;

pub use command::{build_request, Command, CommandResult, Variant};
pub use config::RadarConfig;
pub use data::{
    ObjectTrackingFrame, Point, PointCloudFrame, RadarData, SubFrame, TrackedObject, Vector3,
    MAX_OBJECTS, MAX_POINTS,
};
pub use error::{ProtocolError, Result};
pub use identity::{DeviceVersions, IwrVersion, RadarVersions, SerialNumber, Version};
pub use message::{DeviceMessage, MessageCode, MessageType};
pub use radar::Radar;
pub use settings::{CaptureMode, MovingFilter, Outcome, PointDensity, ResetCode, ReturnVal};
pub use stats::{ChipTemperatures, PointCloudStats, ProcessingStats};
