// Domain models: ammeter samples, clock calibration, aggregated profiles

mod clock;
mod profile;
mod sample;

pub use clock::{ClockOffset, now_epoch_ms};
pub use profile::{PowerProfile, ScenarioIdentity, mean_floor};
pub use sample::{CorrectedSample, Sample, SampleWindow};
