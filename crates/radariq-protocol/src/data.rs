//! Point-cloud and object-tracking frame snapshots.
//!
//! A radar frame may span several packets. Each packet carries a sub-frame
//! tag at offset 2, an item count at offset 3, and fixed-size items from
//! offset 4. Items are appended at a cumulative index that survives across
//! packets and is reset only by an `End` packet. Items beyond the snapshot
//! capacity, or beyond the bytes actually present, are dropped. A frame is
//! complete only when its `End` packet was applied without dropping
//! anything.

use bytes::Buf;
use serde::Serialize;

use crate::fields::block_at;
use crate::settings::CaptureMode;

/// Points kept per point-cloud frame.
pub const MAX_POINTS: usize = 64;
/// Objects kept per object-tracking frame.
pub const MAX_OBJECTS: usize = 16;

const SUB_FRAME_OFFSET: usize = 2;
const COUNT_OFFSET: usize = 3;
const ITEMS_OFFSET: usize = 4;

/// Position of a packet within a multi-packet radar frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SubFrame {
    Start = 0,
    Middle = 1,
    End = 2,
}

impl TryFrom<u8> for SubFrame {
    type Error = u8;

    fn try_from(code: u8) -> std::result::Result<Self, u8> {
        match code {
            0 => Ok(SubFrame::Start),
            1 => Ok(SubFrame::Middle),
            2 => Ok(SubFrame::End),
            other => Err(other),
        }
    }
}

/// One point-cloud detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Point {
    /// Millimetres.
    pub x: i16,
    /// Millimetres.
    pub y: i16,
    /// Millimetres.
    pub z: i16,
    /// 0-255.
    pub intensity: u8,
    /// Velocity magnitude, millimetres/second.
    pub velocity: i16,
}

/// A signed 3-axis quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Vector3 {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl Vector3 {
    fn read(buf: &mut impl Buf) -> Self {
        Self {
            x: buf.get_i16_le(),
            y: buf.get_i16_le(),
            z: buf.get_i16_le(),
        }
    }
}

/// One tracked object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TrackedObject {
    /// Below 250 for a tracked target; above 250 when not associated.
    pub target_id: u8,
    /// Millimetres.
    pub position: Vector3,
    /// Millimetres/second.
    pub velocity: Vector3,
    /// Millimetres/second².
    pub acceleration: Vector3,
}

/// A fixed-size record inside a frame packet.
pub trait FrameItem: Copy {
    /// Encoded size in bytes.
    const WIRE_SIZE: usize;
    /// Items a snapshot keeps.
    const CAPACITY: usize;

    /// Parse from exactly `WIRE_SIZE` bytes.
    fn parse(bytes: &[u8]) -> Self;
}

impl FrameItem for Point {
    const WIRE_SIZE: usize = 9;
    const CAPACITY: usize = MAX_POINTS;

    fn parse(mut bytes: &[u8]) -> Self {
        Self {
            x: bytes.get_i16_le(),
            y: bytes.get_i16_le(),
            z: bytes.get_i16_le(),
            intensity: bytes.get_u8(),
            velocity: bytes.get_i16_le(),
        }
    }
}

impl FrameItem for TrackedObject {
    const WIRE_SIZE: usize = 19;
    const CAPACITY: usize = MAX_OBJECTS;

    fn parse(mut bytes: &[u8]) -> Self {
        Self {
            target_id: bytes.get_u8(),
            position: Vector3::read(&mut bytes),
            velocity: Vector3::read(&mut bytes),
            acceleration: Vector3::read(&mut bytes),
        }
    }
}

/// What one packet contributed to a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubFrameReport {
    pub sub_frame: SubFrame,
    /// Item count the packet declared.
    pub declared: usize,
    /// Items actually stored.
    pub processed: usize,
}

impl SubFrameReport {
    /// True if any declared item was dropped.
    pub fn truncated(&self) -> bool {
        self.processed < self.declared
    }
}

/// Why a frame packet could not be applied at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubFrameError {
    /// The packet is shorter than its 4-byte header.
    MissingHeader { len: usize },
    /// The sub-frame tag is not Start, Middle or End.
    UnknownSubFrame(u8),
}

/// The items of one radar frame, accumulated across packets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameSnapshot<T> {
    items: Vec<T>,
    complete: bool,
    #[serde(skip)]
    cursor: usize,
}

/// Point-cloud frame snapshot.
pub type PointCloudFrame = FrameSnapshot<Point>;
/// Object-tracking frame snapshot.
pub type ObjectTrackingFrame = FrameSnapshot<TrackedObject>;

impl<T: FrameItem> FrameSnapshot<T> {
    /// An empty, incomplete snapshot.
    pub fn new() -> Self {
        Self {
            items: Vec::with_capacity(T::CAPACITY),
            complete: false,
            cursor: 0,
        }
    }

    /// Items accumulated so far for the current or last frame.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of items accumulated.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True when the last `End` packet was applied without truncation.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Apply one frame packet (command byte included).
    pub fn apply(&mut self, payload: &[u8]) -> Result<SubFrameReport, SubFrameError> {
        if payload.len() < ITEMS_OFFSET {
            return Err(SubFrameError::MissingHeader { len: payload.len() });
        }
        let sub_frame = SubFrame::try_from(payload[SUB_FRAME_OFFSET])
            .map_err(SubFrameError::UnknownSubFrame)?;
        let declared = usize::from(payload[COUNT_OFFSET]);

        self.complete = false;
        self.items.truncate(self.cursor);

        let mut processed = 0;
        while processed < declared && self.items.len() < T::CAPACITY {
            let offset = ITEMS_OFFSET + processed * T::WIRE_SIZE;
            let Some(bytes) = block_at(payload, offset, T::WIRE_SIZE) else {
                break;
            };
            self.items.push(T::parse(bytes));
            processed += 1;
        }
        self.cursor = self.items.len();

        if sub_frame == SubFrame::End {
            self.complete = processed == declared;
            self.cursor = 0;
        }

        Ok(SubFrameReport {
            sub_frame,
            declared,
            processed,
        })
    }
}

impl<T: FrameItem> Default for FrameSnapshot<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The latest radar data, shaped by the active capture mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RadarData {
    PointCloud(PointCloudFrame),
    ObjectTracking(ObjectTrackingFrame),
}

impl RadarData {
    /// An empty snapshot for `mode`.
    pub fn for_mode(mode: CaptureMode) -> Self {
        match mode {
            CaptureMode::PointCloud => RadarData::PointCloud(PointCloudFrame::new()),
            CaptureMode::ObjectTracking => RadarData::ObjectTracking(ObjectTrackingFrame::new()),
        }
    }

    /// The capture mode this snapshot belongs to.
    pub fn mode(&self) -> CaptureMode {
        match self {
            RadarData::PointCloud(_) => CaptureMode::PointCloud,
            RadarData::ObjectTracking(_) => CaptureMode::ObjectTracking,
        }
    }

    pub fn is_complete(&self) -> bool {
        match self {
            RadarData::PointCloud(frame) => frame.is_complete(),
            RadarData::ObjectTracking(frame) => frame.is_complete(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RadarData::PointCloud(frame) => frame.len(),
            RadarData::ObjectTracking(frame) => frame.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The point cloud, if this is one.
    pub fn as_point_cloud(&self) -> Option<&PointCloudFrame> {
        match self {
            RadarData::PointCloud(frame) => Some(frame),
            RadarData::ObjectTracking(_) => None,
        }
    }

    /// The tracked objects, if this is an object-tracking frame.
    pub fn as_object_tracking(&self) -> Option<&ObjectTrackingFrame> {
        match self {
            RadarData::ObjectTracking(frame) => Some(frame),
            RadarData::PointCloud(_) => None,
        }
    }
}

impl Default for RadarData {
    fn default() -> Self {
        RadarData::for_mode(CaptureMode::default())
    }
}

#[cfg(test)]
mod tests {
    use bytes::BufMut;

    use super::*;

    fn point_packet(sub_frame: SubFrame, declared: u8, points: &[Point]) -> Vec<u8> {
        let mut payload = vec![0x66, 0x01, sub_frame as u8, declared];
        for p in points {
            payload.put_i16_le(p.x);
            payload.put_i16_le(p.y);
            payload.put_i16_le(p.z);
            payload.put_u8(p.intensity);
            payload.put_i16_le(p.velocity);
        }
        payload
    }

    fn points(n: usize) -> Vec<Point> {
        (0..n)
            .map(|i| Point {
                x: i as i16,
                y: -(i as i16),
                z: 100,
                intensity: i as u8,
                velocity: -250,
            })
            .collect()
    }

    #[test]
    fn single_packet_frame_is_complete() {
        let mut frame = PointCloudFrame::new();
        let pts = points(3);
        let report = frame.apply(&point_packet(SubFrame::End, 3, &pts)).unwrap();

        assert_eq!(report.processed, 3);
        assert!(!report.truncated());
        assert!(frame.is_complete());
        assert_eq!(frame.items(), pts.as_slice());
    }

    #[test]
    fn point_fields_decode_little_endian() {
        let payload = [
            0x66, 0x01, 0x02, 0x01, 0x10, 0x00, 0xF0, 0xFF, 0xE8, 0x03, 0xC8, 0x0C, 0xFE,
        ];
        let mut frame = PointCloudFrame::new();
        frame.apply(&payload).unwrap();

        assert_eq!(
            frame.items()[0],
            Point {
                x: 16,
                y: -16,
                z: 1000,
                intensity: 200,
                velocity: -500,
            }
        );
    }

    #[test]
    fn frame_accumulates_across_packets() {
        let mut frame = PointCloudFrame::new();
        let pts = points(5);

        frame.apply(&point_packet(SubFrame::Start, 2, &pts[..2])).unwrap();
        assert!(!frame.is_complete());
        frame.apply(&point_packet(SubFrame::Middle, 2, &pts[2..4])).unwrap();
        assert_eq!(frame.len(), 4);
        frame.apply(&point_packet(SubFrame::End, 1, &pts[4..])).unwrap();

        assert!(frame.is_complete());
        assert_eq!(frame.items(), pts.as_slice());

        // Next frame starts over.
        frame.apply(&point_packet(SubFrame::Start, 1, &pts[..1])).unwrap();
        assert_eq!(frame.len(), 1);
        assert!(!frame.is_complete());
    }

    #[test]
    fn end_packet_over_capacity_is_incomplete_and_resets_index() {
        let mut frame = PointCloudFrame::new();
        let pts = points(70);

        frame.apply(&point_packet(SubFrame::Start, 60, &pts[..60])).unwrap();
        let report = frame.apply(&point_packet(SubFrame::End, 10, &pts[60..])).unwrap();

        assert_eq!(report.processed, 4);
        assert!(report.truncated());
        assert!(!frame.is_complete());
        assert_eq!(frame.len(), MAX_POINTS);

        frame.apply(&point_packet(SubFrame::End, 1, &pts[..1])).unwrap();
        assert_eq!(frame.len(), 1);
        assert!(frame.is_complete());
    }

    #[test]
    fn declared_count_beyond_payload_is_truncation() {
        let mut frame = PointCloudFrame::new();
        let report = frame.apply(&point_packet(SubFrame::End, 4, &points(2))).unwrap();

        assert_eq!(report.processed, 2);
        assert!(!frame.is_complete());
        assert_eq!(frame.len(), 2);
    }

    #[test]
    fn empty_end_packet_completes_frame() {
        let mut frame = PointCloudFrame::new();
        frame.apply(&point_packet(SubFrame::End, 0, &[])).unwrap();
        assert!(frame.is_complete());
        assert!(frame.is_empty());
    }

    #[test]
    fn short_or_untagged_packets_are_rejected() {
        let mut frame = PointCloudFrame::new();
        assert_eq!(
            frame.apply(&[0x66, 0x01, 0x02]),
            Err(SubFrameError::MissingHeader { len: 3 })
        );
        assert_eq!(
            frame.apply(&[0x66, 0x01, 0x07, 0x00]),
            Err(SubFrameError::UnknownSubFrame(7))
        );
    }

    #[test]
    fn object_tracking_layout() {
        let mut payload = vec![0x67, 0x01, SubFrame::End as u8, 1, 42];
        for v in 1..=9i16 {
            payload.put_i16_le(-v);
        }

        let mut frame = ObjectTrackingFrame::new();
        frame.apply(&payload).unwrap();

        let object = frame.items()[0];
        assert!(frame.is_complete());
        assert_eq!(object.target_id, 42);
        assert_eq!(object.position, Vector3 { x: -1, y: -2, z: -3 });
        assert_eq!(object.velocity, Vector3 { x: -4, y: -5, z: -6 });
        assert_eq!(object.acceleration, Vector3 { x: -7, y: -8, z: -9 });
    }

    #[test]
    fn object_capacity_is_sixteen() {
        let mut payload = vec![0x67, 0x01, SubFrame::End as u8, 20];
        payload.extend(std::iter::repeat(0u8).take(20 * TrackedObject::WIRE_SIZE));

        let mut frame = ObjectTrackingFrame::new();
        let report = frame.apply(&payload).unwrap();
        assert_eq!(report.processed, MAX_OBJECTS);
        assert!(!frame.is_complete());
    }

    #[test]
    fn radar_data_follows_mode() {
        let data = RadarData::for_mode(CaptureMode::ObjectTracking);
        assert_eq!(data.mode(), CaptureMode::ObjectTracking);
        assert!(data.as_point_cloud().is_none());
        assert!(data.is_empty());
        assert_eq!(RadarData::default().mode(), CaptureMode::PointCloud);
    }
}
