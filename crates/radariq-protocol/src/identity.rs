//! Version and serial number replies.

use std::fmt;

use bytes::Buf;
use serde::Serialize;

use crate::fields::{block_at, c_str_at, u32_at};

const IWR_NAME_LEN: usize = 20;

/// `major.minor.build` version number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub build: u16,
}

impl Version {
    const SIZE: usize = 4;

    /// Read a version at `offset`: major u8, minor u8, build u16 LE.
    pub fn parse_at(payload: &[u8], offset: usize) -> Option<Self> {
        let mut b = block_at(payload, offset, Self::SIZE)?;
        Some(Self {
            major: b.get_u8(),
            minor: b.get_u8(),
            build: b.get_u16_le(),
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.build)
    }
}

/// A firmware image on the radar chip.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct IwrVersion {
    pub version: Version,
    /// Application name. Empty for the bootloader.
    pub name: String,
}

impl IwrVersion {
    const SIZE: usize = Version::SIZE + IWR_NAME_LEN;

    fn parse_named_at(payload: &[u8], offset: usize) -> Option<Self> {
        block_at(payload, offset, Self::SIZE)?;
        Some(Self {
            version: Version::parse_at(payload, offset)?,
            name: c_str_at(payload, offset + Version::SIZE, IWR_NAME_LEN),
        })
    }
}

/// Firmware images reported by the radar chip.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RadarVersions {
    /// Secondary bootloader.
    pub sbl: IwrVersion,
    pub app1: IwrVersion,
    pub app2: IwrVersion,
}

impl RadarVersions {
    /// Parse an IWR version reply: bootloader at 2 (no name), then two
    /// named images at 6 and 30.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        Some(Self {
            sbl: IwrVersion {
                version: Version::parse_at(payload, 2)?,
                name: String::new(),
            },
            app1: IwrVersion::parse_named_at(payload, 6)?,
            app2: IwrVersion::parse_named_at(payload, 30)?,
        })
    }
}

/// Device firmware and hardware versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DeviceVersions {
    pub firmware: Version,
    pub hardware: Version,
}

impl DeviceVersions {
    /// Parse a version reply: firmware at 2, hardware at 6.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        Some(Self {
            firmware: Version::parse_at(payload, 2)?,
            hardware: Version::parse_at(payload, 6)?,
        })
    }
}

/// Two-part device serial number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SerialNumber {
    pub a: u32,
    pub b: u32,
}

impl SerialNumber {
    /// Parse a serial reply: two u32 LE at 2 and 6.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        Some(Self {
            a: u32_at(payload, 2)?,
            b: u32_at(payload, 6)?,
        })
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.a, self.b)
    }
}

#[cfg(test)]
mod tests {
    use bytes::BufMut;

    use super::*;

    #[test]
    fn device_versions() {
        let payload = [0x01, 0x01, 1, 2, 0x34, 0x12, 3, 0, 0x05, 0x00];
        let versions = DeviceVersions::parse(&payload).unwrap();

        assert_eq!(
            versions.firmware,
            Version {
                major: 1,
                minor: 2,
                build: 0x1234
            }
        );
        assert_eq!(versions.hardware.to_string(), "3.0.5");
        assert!(DeviceVersions::parse(&payload[..9]).is_none());
    }

    fn named(buf: &mut Vec<u8>, major: u8, name: &str) {
        buf.put_u8(major);
        buf.put_u8(0);
        buf.put_u16_le(7);
        let mut field = [0u8; IWR_NAME_LEN];
        field[..name.len()].copy_from_slice(name.as_bytes());
        buf.put_slice(&field);
    }

    #[test]
    fn radar_versions() {
        let mut payload = vec![0x14, 0x01, 9, 9, 1, 0];
        named(&mut payload, 2, "point_cloud");
        named(&mut payload, 3, "tracking");
        assert_eq!(payload.len(), 54);

        let versions = RadarVersions::parse(&payload).unwrap();
        assert_eq!(versions.sbl.version.to_string(), "9.9.1");
        assert!(versions.sbl.name.is_empty());
        assert_eq!(versions.app1.name, "point_cloud");
        assert_eq!(versions.app1.version.major, 2);
        assert_eq!(versions.app2.name, "tracking");
        assert!(RadarVersions::parse(&payload[..53]).is_none());
    }

    #[test]
    fn serial_number() {
        let payload = [0x02, 0x01, 0x78, 0x56, 0x34, 0x12, 0x01, 0x00, 0x00, 0x00];
        let serial = SerialNumber::parse(&payload).unwrap();
        assert_eq!(serial.a, 0x1234_5678);
        assert_eq!(serial.b, 1);
        assert_eq!(serial.to_string(), "305419896-1");
    }
}
