//! Statistics packets.
//!
//! Each struct is read from a fixed offset of its packet. A payload too
//! short for the layout yields `None` and leaves the previous snapshot
//! untouched.

use bytes::Buf;
use serde::Serialize;

use crate::fields::block_at;

/// Processing timing of the radar chip, from a processing-stats packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ProcessingStats {
    /// CPU load (%) during the active frame.
    pub active_frame_cpu_load: u32,
    /// CPU load (%) between frames.
    pub inter_frame_cpu_load: u32,
    /// Processing time between frames, microseconds.
    pub inter_frame_proc_time: u32,
    /// Time to process and transmit one frame, microseconds.
    pub transmit_output_time: u32,
    /// Free processing time between frames, microseconds.
    pub inter_frame_proc_margin: u32,
    /// Free processing time between chirps, microseconds.
    pub inter_chirp_proc_margin: u32,
    /// Time to send one frame over UART, microseconds.
    pub uart_transmit_time: u32,
}

impl ProcessingStats {
    const OFFSET: usize = 2;
    const SIZE: usize = 28;

    pub fn parse(payload: &[u8]) -> Option<Self> {
        let mut b = block_at(payload, Self::OFFSET, Self::SIZE)?;
        Some(Self {
            active_frame_cpu_load: b.get_u32_le(),
            inter_frame_cpu_load: b.get_u32_le(),
            inter_frame_proc_time: b.get_u32_le(),
            transmit_output_time: b.get_u32_le(),
            inter_frame_proc_margin: b.get_u32_le(),
            inter_chirp_proc_margin: b.get_u32_le(),
            uart_transmit_time: b.get_u32_le(),
        })
    }
}

/// Radar chip temperatures in °C, carried in the processing-stats packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ChipTemperatures {
    pub sensor0: i16,
    pub sensor1: i16,
    pub power_management: i16,
    pub rx0: i16,
    pub rx1: i16,
    pub rx2: i16,
    pub rx3: i16,
    pub tx0: i16,
    pub tx1: i16,
    pub tx2: i16,
}

impl ChipTemperatures {
    const OFFSET: usize = 30;
    const SIZE: usize = 20;

    pub fn parse(payload: &[u8]) -> Option<Self> {
        let mut b = block_at(payload, Self::OFFSET, Self::SIZE)?;
        Some(Self {
            sensor0: b.get_i16_le(),
            sensor1: b.get_i16_le(),
            power_management: b.get_i16_le(),
            rx0: b.get_i16_le(),
            rx1: b.get_i16_le(),
            rx2: b.get_i16_le(),
            rx3: b.get_i16_le(),
            tx0: b.get_i16_le(),
            tx1: b.get_i16_le(),
            tx2: b.get_i16_le(),
        })
    }
}

/// Point-cloud processing statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PointCloudStats {
    /// Time aggregating points from frames, microseconds.
    pub frame_aggregating_time: u32,
    /// Time ordering points by intensity, microseconds.
    pub intensity_sort_time: u32,
    /// Time in the nearest-neighbours filter, microseconds.
    pub nearest_neighbours_time: u32,
    /// Time to send one frame over UART, microseconds.
    pub uart_transmit_time: u32,
    /// Points removed by the nearest-neighbours filter.
    pub filtered_points: u32,
    /// Points transmitted in the frame.
    pub transmitted_points: u32,
    /// Points to aggregate were truncated to the frame size.
    pub input_truncated: bool,
    /// Points to transmit were truncated to the frame size.
    pub output_truncated: bool,
}

impl PointCloudStats {
    const OFFSET: usize = 2;
    const SIZE: usize = 26;

    pub fn parse(payload: &[u8]) -> Option<Self> {
        let mut b = block_at(payload, Self::OFFSET, Self::SIZE)?;
        Some(Self {
            frame_aggregating_time: b.get_u32_le(),
            intensity_sort_time: b.get_u32_le(),
            nearest_neighbours_time: b.get_u32_le(),
            uart_transmit_time: b.get_u32_le(),
            filtered_points: b.get_u32_le(),
            transmitted_points: b.get_u32_le(),
            input_truncated: b.get_u8() != 0,
            output_truncated: b.get_u8() != 0,
        })
    }
}

/// Power-good flag from a power-status packet: the supply is regulating
/// when byte 2 is zero.
pub fn parse_power_good(payload: &[u8]) -> Option<bool> {
    payload.get(2).map(|&flag| flag == 0)
}
