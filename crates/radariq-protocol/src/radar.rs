use std::time::Duration;

use bytes::{Bytes, BytesMut};
use radariq_frame::{encode_frame, FrameReceiver, RxState};
use radariq_transport::SerialLink;
use tracing::{debug, error, info, trace, warn};

use crate::command::{build_request, Command, CommandResult, Variant};
use crate::config::RadarConfig;
use crate::data::RadarData;
use crate::error::{ProtocolError, Result};
use crate::fields::{i16_at, i8_at, u16_at, u8_at};
use crate::identity::{DeviceVersions, RadarVersions, SerialNumber};
use crate::message::{DeviceMessage, MessageType};
use crate::settings::{
    check_angle_filter, check_distance_filter, check_frame_rate, check_height_filter,
    check_object_size, check_sensitivity, CaptureMode, MovingFilter, Outcome, PointDensity,
    ResetCode,
};
use crate::stats::{parse_power_good, ChipTemperatures, PointCloudStats, ProcessingStats};

/// One radar connection.
///
/// Call [`Radar::read_serial`] from the host loop to receive streamed
/// packets. The get/set wrappers send a request and block on
/// [`Radar::poll_response`] until the first packet arrives or the response
/// timeout passes; the first packet must be the matching reply.
#[derive(Debug)]
pub struct Radar<L> {
    link: L,
    config: RadarConfig,
    receiver: FrameReceiver,
    tx: BytesMut,
    last_packet: Bytes,
    data: RadarData,
    processing: ProcessingStats,
    temperatures: ChipTemperatures,
    point_cloud_stats: PointCloudStats,
    power_good: bool,
    last_message: Option<DeviceMessage>,
}

impl<L: SerialLink> Radar<L> {
    /// Create a connection with default configuration.
    pub fn new(link: L) -> Self {
        Self::with_config(link, RadarConfig::default())
    }

    /// Create a connection with explicit configuration.
    pub fn with_config(link: L, config: RadarConfig) -> Self {
        Self {
            link,
            receiver: FrameReceiver::with_config(config.frame.clone()),
            tx: BytesMut::with_capacity(config.frame.max_frame_size),
            config,
            last_packet: Bytes::new(),
            data: RadarData::default(),
            processing: ProcessingStats::default(),
            temperatures: ChipTemperatures::default(),
            point_cloud_stats: PointCloudStats::default(),
            power_good: false,
            last_message: None,
        }
    }

    // ------------------------------------------------------------------
    // Receive path
    // ------------------------------------------------------------------

    /// Read at most one byte from the link and feed it to the frame receiver.
    ///
    /// Returns [`CommandResult::None`] until a frame completes. Only
    /// transport failures are `Err`; bad frames are [`CommandResult::Error`].
    pub fn read_serial(&mut self) -> Result<CommandResult> {
        let Some(byte) = self.link.read_byte()? else {
            return Ok(CommandResult::None);
        };

        Ok(match self.receiver.push(byte) {
            None => CommandResult::None,
            Some(Ok(payload)) => self.process_packet(payload),
            Some(Err(_)) => CommandResult::Error,
        })
    }

    /// Drive [`Radar::read_serial`] until it yields something other than
    /// `None`, or until the response timeout has passed.
    pub fn poll_response(&mut self) -> Result<CommandResult> {
        let timeout_ms = duration_ms(self.config.response_timeout);
        let start = self.link.millis();

        loop {
            let result = self.read_serial()?;
            if !result.is_none() {
                return Ok(result);
            }

            let elapsed = self.link.millis().saturating_sub(start);
            if elapsed > timeout_ms {
                debug!(elapsed_ms = elapsed, "no response before deadline");
                return Err(ProtocolError::Timeout(Duration::from_millis(elapsed)));
            }
        }
    }

    /// Dispatch one decoded payload on its command byte and update the
    /// matching snapshot.
    ///
    /// [`Radar::read_serial`] calls this for every frame it completes. It is
    /// public for payloads framed elsewhere, such as a recorded stream split
    /// by [`radariq_frame::FrameReader`].
    pub fn process_packet(&mut self, payload: Bytes) -> CommandResult {
        self.last_packet = payload.clone();

        let Some(&code) = payload.first() else {
            debug!("empty packet");
            return CommandResult::Error;
        };
        let command = match Command::try_from(code) {
            Ok(command) => command,
            Err(code) => {
                warn!(code, len = payload.len(), "unknown command");
                self.link.log(&format!("Unknown command 0x{code:02x}"));
                return CommandResult::Unknown;
            }
        };

        let parsed = match command {
            Command::Message => self.on_message(&payload),
            Command::PointCloudFrame => self.on_frame(CaptureMode::PointCloud, &payload),
            Command::ObjectTrackingFrame => self.on_frame(CaptureMode::ObjectTracking, &payload),
            Command::ProcessingStats => self.on_processing_stats(&payload),
            Command::PointCloudStats => match PointCloudStats::parse(&payload) {
                Some(stats) => {
                    self.point_cloud_stats = stats;
                    true
                }
                None => false,
            },
            Command::PowerStatus => match parse_power_good(&payload) {
                Some(good) => {
                    self.power_good = good;
                    true
                }
                None => false,
            },
            // Replies are read from `last_packet` by the waiting call.
            _ => true,
        };

        if parsed {
            trace!(%command, len = payload.len(), "received packet");
            CommandResult::Received(command)
        } else {
            debug!(%command, len = payload.len(), "malformed packet");
            CommandResult::Error
        }
    }

    fn on_message(&mut self, payload: &[u8]) -> bool {
        let Some(message) = DeviceMessage::parse(payload) else {
            return false;
        };

        let kind = message.kind.label();
        let code = message.code.code();
        let text = message.text.as_str();
        match message.kind {
            MessageType::Temporary | MessageType::Debug => {
                debug!(target: "radariq::device", kind, code, "{text}")
            }
            MessageType::Warning => warn!(target: "radariq::device", kind, code, "{text}"),
            MessageType::Error => error!(target: "radariq::device", kind, code, "{text}"),
            MessageType::Info | MessageType::Success | MessageType::Other(_) => {
                info!(target: "radariq::device", kind, code, "{text}")
            }
        }

        self.link.log(&message.log_line());
        self.last_message = Some(message);
        true
    }

    fn on_frame(&mut self, kind: CaptureMode, payload: &[u8]) -> bool {
        if self.data.mode() != kind {
            debug!(from = %self.data.mode(), to = %kind, "frame kind changed, resetting snapshot");
            self.data = RadarData::for_mode(kind);
        }

        let applied = match &mut self.data {
            RadarData::PointCloud(frame) => frame.apply(payload),
            RadarData::ObjectTracking(frame) => frame.apply(payload),
        };

        match applied {
            Ok(report) if report.truncated() => {
                warn!(
                    sub_frame = ?report.sub_frame,
                    declared = report.declared,
                    processed = report.processed,
                    "sub-frame truncated"
                );
                true
            }
            Ok(_) => true,
            Err(err) => {
                debug!(?err, "rejected frame packet");
                false
            }
        }
    }

    fn on_processing_stats(&mut self, payload: &[u8]) -> bool {
        match (
            ProcessingStats::parse(payload),
            ChipTemperatures::parse(payload),
        ) {
            (Some(processing), Some(temperatures)) => {
                self.processing = processing;
                self.temperatures = temperatures;
                true
            }
            _ => false,
        }
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    /// Latest radar data. Check [`RadarData::is_complete`] before use.
    pub fn data(&self) -> &RadarData {
        &self.data
    }

    pub fn processing_stats(&self) -> &ProcessingStats {
        &self.processing
    }

    pub fn chip_temperatures(&self) -> &ChipTemperatures {
        &self.temperatures
    }

    pub fn point_cloud_stats(&self) -> &PointCloudStats {
        &self.point_cloud_stats
    }

    /// Whether the radar power supply reported regulating correctly.
    pub fn is_power_good(&self) -> bool {
        self.power_good
    }

    /// Most recent device message.
    pub fn last_message(&self) -> Option<&DeviceMessage> {
        self.last_message.as_ref()
    }

    /// Most recent decoded payload, command byte included.
    pub fn last_packet(&self) -> &[u8] {
        &self.last_packet
    }

    /// State of the frame receiver.
    pub fn receiver_state(&self) -> RxState {
        self.receiver.state()
    }

    /// Capture mode the data snapshot is shaped for.
    pub fn capture_mode(&self) -> CaptureMode {
        self.data.mode()
    }

    pub fn config(&self) -> &RadarConfig {
        &self.config
    }

    /// Borrow the link.
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Mutably borrow the link.
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Consume the connection and return the link.
    pub fn into_link(self) -> L {
        self.link
    }

    // ------------------------------------------------------------------
    // Send path
    // ------------------------------------------------------------------

    /// Encode and write one payload.
    pub fn send_packet(&mut self, payload: &[u8]) -> Result<()> {
        self.tx.clear();
        encode_frame(payload, self.config.frame.max_payload_size, &mut self.tx)?;
        trace!(len = payload.len(), wire_len = self.tx.len(), "sending packet");
        self.link.write_bytes(&self.tx)?;
        Ok(())
    }

    /// Send `[command, variant, args...]` without waiting for a reply.
    pub fn send_command(&mut self, command: Command, variant: Variant, args: &[u8]) -> Result<()> {
        let payload = build_request(command, variant, args);
        self.send_packet(&payload)
    }

    fn request(&mut self, command: Command, variant: Variant, args: &[u8]) -> Result<Bytes> {
        self.send_command(command, variant, args)?;
        match self.poll_response()? {
            CommandResult::Received(received) if received == command => {
                Ok(self.last_packet.clone())
            }
            received => Err(ProtocolError::UnexpectedResponse {
                expected: command,
                received,
            }),
        }
    }

    fn query(&mut self, command: Command) -> Result<Bytes> {
        self.request(command, Variant::Request, &[])
    }

    fn set(&mut self, command: Command, args: &[u8], outcome: Outcome) -> Result<Outcome> {
        if outcome == Outcome::Adjusted {
            warn!(%command, "value out of range, sending clamped value");
        }
        self.request(command, Variant::Set, args)?;
        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // Device commands
    // ------------------------------------------------------------------

    /// Start capturing `num_frames` frames, or continuously for 0.
    ///
    /// Frames start streaming immediately; no reply is awaited.
    pub fn start(&mut self, num_frames: u8) -> Result<()> {
        info!(num_frames, "starting capture");
        self.send_command(Command::CaptureStart, Variant::Request, &[num_frames])
    }

    /// Stop capturing. No reply is awaited.
    pub fn stop(&mut self) -> Result<()> {
        info!("stopping capture");
        self.send_command(Command::CaptureStop, Variant::Request, &[])
    }

    /// Reboot or restore factory settings.
    pub fn reset(&mut self, code: ResetCode) -> Result<Outcome> {
        self.set(Command::Reset, &[code.code()], Outcome::Ok)
    }

    /// Persist the current settings to the device EEPROM.
    pub fn save(&mut self) -> Result<Outcome> {
        self.query(Command::Save)?;
        Ok(Outcome::Ok)
    }

    /// Firmware and hardware versions.
    pub fn version(&mut self) -> Result<DeviceVersions> {
        let reply = self.query(Command::Version)?;
        field(Command::Version, DeviceVersions::parse(&reply))
    }

    /// Firmware images on the radar chip.
    pub fn radar_versions(&mut self) -> Result<RadarVersions> {
        let reply = self.query(Command::IwrVersion)?;
        field(Command::IwrVersion, RadarVersions::parse(&reply))
    }

    pub fn serial_number(&mut self) -> Result<SerialNumber> {
        let reply = self.query(Command::Serial)?;
        field(Command::Serial, SerialNumber::parse(&reply))
    }

    /// Capture frame rate, frames/second.
    pub fn frame_rate(&mut self) -> Result<u8> {
        let reply = self.query(Command::FrameRate)?;
        field(Command::FrameRate, u8_at(&reply, 2))
    }

    /// Set the capture frame rate, clamped to 1..=30.
    pub fn set_frame_rate(&mut self, rate: u8) -> Result<Outcome> {
        let checked = check_frame_rate(rate);
        self.set(Command::FrameRate, &[checked.value], checked.outcome)
    }

    /// Current capture mode. Also reshapes the data snapshot to match.
    pub fn mode(&mut self) -> Result<CaptureMode> {
        let reply = self.query(Command::Mode)?;
        let code = field(Command::Mode, u8_at(&reply, 2))?;
        let mode = CaptureMode::try_from(code).map_err(|_| ProtocolError::MalformedResponse {
            command: Command::Mode,
            reason: format!("unknown capture mode {code}"),
        })?;
        self.track_mode(mode);
        Ok(mode)
    }

    /// Set the capture mode. The data snapshot follows on success.
    pub fn set_mode(&mut self, mode: CaptureMode) -> Result<Outcome> {
        let outcome = self.set(Command::Mode, &[mode.code()], Outcome::Ok)?;
        self.track_mode(mode);
        Ok(outcome)
    }

    fn track_mode(&mut self, mode: CaptureMode) {
        if self.data.mode() != mode {
            info!(%mode, "capture mode changed");
            self.data = RadarData::for_mode(mode);
        }
    }

    /// Distance filter `(min, max)` in millimetres.
    pub fn distance_filter(&mut self) -> Result<(u16, u16)> {
        let reply = self.query(Command::DistanceFilter)?;
        let min = field(Command::DistanceFilter, u16_at(&reply, 2))?;
        let max = field(Command::DistanceFilter, u16_at(&reply, 4))?;
        Ok((min, max))
    }

    /// Set the distance filter. Bounds are reordered if swapped and clamped
    /// to 0..=10000 mm.
    pub fn set_distance_filter(&mut self, min: u16, max: u16) -> Result<Outcome> {
        let checked = check_distance_filter(min, max);
        let (min, max) = checked.value;
        let [min_lo, min_hi] = min.to_le_bytes();
        let [max_lo, max_hi] = max.to_le_bytes();
        self.set(
            Command::DistanceFilter,
            &[min_lo, min_hi, max_lo, max_hi],
            checked.outcome,
        )
    }

    /// Angle filter `(min, max)` in degrees.
    pub fn angle_filter(&mut self) -> Result<(i8, i8)> {
        let reply = self.query(Command::AngleFilter)?;
        let min = field(Command::AngleFilter, i8_at(&reply, 2))?;
        let max = field(Command::AngleFilter, i8_at(&reply, 3))?;
        Ok((min, max))
    }

    /// Set the angle filter. Bounds are reordered if swapped and clamped to
    /// -55..=55 degrees.
    pub fn set_angle_filter(&mut self, min: i8, max: i8) -> Result<Outcome> {
        let checked = check_angle_filter(min, max);
        let (min, max) = checked.value;
        let [min] = min.to_le_bytes();
        let [max] = max.to_le_bytes();
        self.set(Command::AngleFilter, &[min, max], checked.outcome)
    }

    pub fn moving_filter(&mut self) -> Result<MovingFilter> {
        let reply = self.query(Command::MovingFilter)?;
        let code = field(Command::MovingFilter, u8_at(&reply, 2))?;
        MovingFilter::try_from(code).map_err(|_| ProtocolError::MalformedResponse {
            command: Command::MovingFilter,
            reason: format!("unknown moving filter {code}"),
        })
    }

    pub fn set_moving_filter(&mut self, filter: MovingFilter) -> Result<Outcome> {
        self.set(Command::MovingFilter, &[filter.code()], Outcome::Ok)
    }

    pub fn point_density(&mut self) -> Result<PointDensity> {
        let reply = self.query(Command::PointDensity)?;
        let code = field(Command::PointDensity, u8_at(&reply, 2))?;
        PointDensity::try_from(code).map_err(|_| ProtocolError::MalformedResponse {
            command: Command::PointDensity,
            reason: format!("unknown point density {code}"),
        })
    }

    pub fn set_point_density(&mut self, density: PointDensity) -> Result<Outcome> {
        self.set(Command::PointDensity, &[density.code()], Outcome::Ok)
    }

    /// Point-cloud sensitivity level, 0-9.
    pub fn sensitivity(&mut self) -> Result<u8> {
        let reply = self.query(Command::Sensitivity)?;
        field(Command::Sensitivity, u8_at(&reply, 2))
    }

    /// Set the sensitivity level, clamped to 0..=9.
    pub fn set_sensitivity(&mut self, level: u8) -> Result<Outcome> {
        let checked = check_sensitivity(level);
        self.set(Command::Sensitivity, &[checked.value], checked.outcome)
    }

    /// Height filter `(min, max)` in millimetres.
    pub fn height_filter(&mut self) -> Result<(i16, i16)> {
        let reply = self.query(Command::HeightFilter)?;
        let min = field(Command::HeightFilter, i16_at(&reply, 2))?;
        let max = field(Command::HeightFilter, i16_at(&reply, 4))?;
        Ok((min, max))
    }

    /// Set the height filter. Bounds are reordered if swapped.
    pub fn set_height_filter(&mut self, min: i16, max: i16) -> Result<Outcome> {
        let checked = check_height_filter(min, max);
        let (min, max) = checked.value;
        let [min_lo, min_hi] = min.to_le_bytes();
        let [max_lo, max_hi] = max.to_le_bytes();
        self.set(
            Command::HeightFilter,
            &[min_lo, min_hi, max_lo, max_hi],
            checked.outcome,
        )
    }

    /// Run a scene calibration.
    ///
    /// The device sends several messages before its acknowledgement, so up
    /// to `calibration_attempts` response waits are spent looking for it.
    pub fn scene_calibrate(&mut self) -> Result<Outcome> {
        self.send_command(Command::SceneCalibration, Variant::Set, &[])?;
        let start = self.link.millis();

        for attempt in 1..=self.config.calibration_attempts {
            match self.poll_response() {
                Ok(CommandResult::Received(Command::SceneCalibration)) => {
                    info!(attempt, "scene calibration acknowledged");
                    return Ok(Outcome::Ok);
                }
                Ok(other) => trace!(attempt, %other, "waiting for calibration ack"),
                Err(ProtocolError::Timeout(_)) => trace!(attempt, "calibration wait timed out"),
                Err(err) => return Err(err),
            }
        }

        let elapsed = self.link.millis().saturating_sub(start);
        Err(ProtocolError::Timeout(Duration::from_millis(elapsed)))
    }

    /// Target object size for tracking, 0-4.
    pub fn object_size(&mut self) -> Result<u8> {
        let reply = self.query(Command::ObjectSize)?;
        field(Command::ObjectSize, u8_at(&reply, 2))
    }

    /// Set the target object size, clamped to 0..=4.
    pub fn set_object_size(&mut self, size: u8) -> Result<Outcome> {
        let checked = check_object_size(size);
        self.set(Command::ObjectSize, &[checked.value], checked.outcome)
    }
}

fn field<T>(command: Command, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| ProtocolError::MalformedResponse {
        command,
        reason: "reply too short".to_string(),
    })
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
