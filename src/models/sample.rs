// Raw and clock-corrected ammeter readings

use super::ClockOffset;

/// One ammeter reading as delivered by the meter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Milliamps.
    pub current: f64,
    /// Volts.
    pub voltage: f64,
    /// Ammeter-local millisecond counter.
    pub device_time: i64,
}

/// A sample whose device time has been mapped onto the wall clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectedSample {
    pub current: f64,
    pub voltage: f64,
    pub epoch_ms: i64,
}

impl Sample {
    pub fn corrected(&self, offset: ClockOffset) -> CorrectedSample {
        CorrectedSample {
            current: self.current,
            voltage: self.voltage,
            epoch_ms: offset.to_epoch_ms(self.device_time),
        }
    }
}

/// Everything one sampling window collected, in arrival order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleWindow {
    /// Epoch ms when polling began.
    pub started_at_ms: i64,
    /// Wall time the window actually took.
    pub elapsed_ms: u64,
    pub samples: Vec<CorrectedSample>,
    /// Raw current readings, same order as `samples`.
    pub currents: Vec<f64>,
    pub total_current: f64,
}

impl SampleWindow {
    pub fn new(started_at_ms: i64) -> Self {
        Self {
            started_at_ms,
            ..Default::default()
        }
    }

    pub fn push(&mut self, sample: &Sample, offset: ClockOffset) {
        self.samples.push(sample.corrected(offset));
        self.currents.push(sample.current);
        self.total_current += sample.current;
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
