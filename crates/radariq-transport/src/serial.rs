use std::time::Duration;

use serialport::{SerialPort, SerialPortType};
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::io::IoLink;

/// A serial device wrapped as a [`crate::SerialLink`].
pub type SerialPortLink = IoLink<Box<dyn SerialPort>>;

/// Serial port settings.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Device path, e.g. `/dev/ttyUSB0` or `COM3`.
    pub path: String,
    /// Line rate in bits per second. Default: 115200.
    pub baud_rate: u32,
    /// How long a single byte read may block before reporting "no byte".
    pub read_timeout: Duration,
}

impl SerialConfig {
    /// Default line rate of the RadarIQ M1 UART.
    pub const DEFAULT_BAUD_RATE: u32 = 115_200;
    /// Default per-byte read timeout.
    pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(10);

    /// Settings for `path` with default line rate and timeout.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            baud_rate: Self::DEFAULT_BAUD_RATE,
            read_timeout: Self::DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Open a serial device.
pub fn open(config: &SerialConfig) -> Result<SerialPortLink> {
    let port = serialport::new(&config.path, config.baud_rate)
        .timeout(config.read_timeout)
        .open()
        .map_err(|source| TransportError::Open {
            path: config.path.clone(),
            source,
        })?;

    info!(path = %config.path, baud = config.baud_rate, "opened serial port");
    Ok(IoLink::new(port))
}

/// A serial device found on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSummary {
    /// Device path.
    pub name: String,
    /// Human-readable port kind (`usb`, `pci`, `bluetooth`, `unknown`).
    pub kind: &'static str,
    /// USB product string, when known.
    pub product: Option<String>,
}

/// List serial devices available on the host.
pub fn available_ports() -> Result<Vec<PortSummary>> {
    let ports = serialport::available_ports().map_err(TransportError::Enumerate)?;
    debug!(count = ports.len(), "enumerated serial ports");

    Ok(ports
        .into_iter()
        .map(|port| {
            let (kind, product) = match port.port_type {
                SerialPortType::UsbPort(usb) => ("usb", usb.product),
                SerialPortType::PciPort => ("pci", None),
                SerialPortType::BluetoothPort => ("bluetooth", None),
                SerialPortType::Unknown => ("unknown", None),
            };
            PortSummary {
                name: port.port_name,
                kind,
                product,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let cfg = SerialConfig::new("/dev/ttyUSB0");
        assert_eq!(cfg.path, "/dev/ttyUSB0");
        assert_eq!(cfg.baud_rate, 115_200);
        assert_eq!(cfg.read_timeout, Duration::from_millis(10));
    }

    #[test]
    fn open_missing_device_fails() {
        let cfg = SerialConfig::new("/dev/radariq-does-not-exist");
        let err = open(&cfg).unwrap_err();
        assert!(matches!(err, TransportError::Open { .. }));
    }
}
