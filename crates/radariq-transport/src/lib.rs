//! Serial link abstraction for the RadarIQ SDK.
//!
//! The radar core never touches a concrete port. It consumes four injected
//! capabilities through [`SerialLink`]:
//! - read one byte if one is available
//! - write a block of bytes
//! - read a monotonic millisecond clock
//! - forward a diagnostic line to a log sink
//!
//! This is the lowest layer of the SDK. [`IoLink`] adapts any
//! `Read + Write` stream, the `serial` feature opens real serial ports, and
//! the `mock` feature provides a scripted link for tests.

pub mod error;
pub mod io;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;
#[cfg(feature = "serial")]
pub mod serial;

pub use error::{Result, TransportError};
pub use io::IoLink;
pub use traits::SerialLink;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockLink;
#[cfg(feature = "serial")]
pub use serial::{available_ports, open, PortSummary, SerialConfig, SerialPortLink};
