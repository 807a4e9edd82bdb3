use std::time::Duration;

use radariq_frame::FrameConfig;

/// Configuration for a [`crate::Radar`] connection.
#[derive(Debug, Clone)]
pub struct RadarConfig {
    /// How long a synchronous call waits for any packet. Default: 1000 ms.
    pub response_timeout: Duration,
    /// Response waits allowed for scene calibration, which is preceded by
    /// several unrelated messages. Default: 50.
    pub calibration_attempts: u32,
    /// Frame codec limits.
    pub frame: FrameConfig,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            response_timeout: Duration::from_millis(1000),
            calibration_attempts: 50,
            frame: FrameConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = RadarConfig::default();
        assert_eq!(cfg.response_timeout, Duration::from_secs(1));
        assert_eq!(cfg.calibration_attempts, 50);
        assert_eq!(cfg.frame.max_frame_size, 256);
    }
}
