// Ammeter-to-wall-clock calibration

use super::Sample;

/// Milliseconds to add to an ammeter device time to get epoch time.
///
/// Computed once from a reference sample and reused for the whole session.
/// Only the phase is corrected; if the meter's counter runs at a different
/// rate than the wall clock the error grows with session length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockOffset(pub i64);

impl ClockOffset {
    /// `wall_clock_ms` is the epoch time at which `reference` was fetched.
    pub fn calibrate(reference: &Sample, wall_clock_ms: i64) -> Self {
        Self(wall_clock_ms - reference.device_time)
    }

    pub fn to_epoch_ms(self, device_time: i64) -> i64 {
        device_time + self.0
    }

    pub fn millis(self) -> i64 {
        self.0
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_else(|e| {
            tracing::warn!(
                error = %e,
                operation = "get_timestamp",
                "system time error"
            );
            0
        })
}
