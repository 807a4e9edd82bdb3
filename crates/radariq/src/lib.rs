//! Host SDK for the RadarIQ M1 FMCW radar.
//!
//! # Crate Structure
//!
//! - [`transport`]: injected serial capabilities and the serial-port opener
//!   (behind the `serial` feature)
//! - [`frame`]: byte-stuffed framing with a CRC-16 trailer
//! - [`protocol`]: command/response protocol, payload parsers and the
//!   [`Radar`] connection object
//!
//! ```no_run
//! # #[cfg(feature = "serial")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use radariq::transport::{open, SerialConfig};
//! use radariq::{CommandResult, Radar};
//!
//! let mut radar = Radar::new(open(&SerialConfig::new("/dev/ttyUSB0"))?);
//! radar.set_frame_rate(5)?;
//! radar.start(0)?;
//! loop {
//!     if let CommandResult::Received(_) = radar.read_serial()? {
//!         if radar.data().is_complete() {
//!             println!("{} points", radar.data().len());
//!         }
//!     }
//! }
//! # }
//! # #[cfg(not(feature = "serial"))]
//! # fn main() {}
//! ```

/// Re-export transport types.
pub mod transport {
    pub use radariq_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use radariq_frame::*;
}

/// Re-export protocol types.
pub mod protocol {
    pub use radariq_protocol::*;
}

pub use radariq_protocol::{
    CaptureMode, Command, CommandResult, Outcome, ProtocolError, Radar, RadarConfig, RadarData,
    ReturnVal,
};
pub use radariq_transport::SerialLink;
