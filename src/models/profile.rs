// Aggregated result of one scenario's sampling window

use chrono::{DateTime, Local};

use super::{CorrectedSample, SampleWindow};
use crate::error::PowerTestError;

/// Name/app/context triple a scenario reports under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioIdentity {
    pub test_name: String,
    pub app_name: String,
    /// Short context, e.g. `camera`; the summary appends the configured domain.
    pub context: String,
}

impl ScenarioIdentity {
    pub fn new(test_name: &str, app_name: &str, context: &str) -> Self {
        Self {
            test_name: test_name.into(),
            app_name: app_name.into(),
            context: context.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PowerProfile {
    pub identity: ScenarioIdentity,
    pub started_at_ms: i64,
    /// When aggregation finished; stamps the summary file name.
    pub finished_at: DateTime<Local>,
    pub samples: Vec<CorrectedSample>,
    pub currents: Vec<f64>,
    pub average_ma: i64,
}

impl PowerProfile {
    /// Fails with `NoSamples` when the window is empty.
    pub fn build(
        identity: ScenarioIdentity,
        window: SampleWindow,
        finished_at: DateTime<Local>,
    ) -> Result<Self, PowerTestError> {
        let Some(average_ma) = mean_floor(window.total_current, window.len()) else {
            return Err(PowerTestError::NoSamples {
                scenario: identity.test_name,
                elapsed_ms: window.elapsed_ms,
            });
        };
        Ok(Self {
            identity,
            started_at_ms: window.started_at_ms,
            finished_at,
            samples: window.samples,
            currents: window.currents,
            average_ma,
        })
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

/// Floor of `total / count`; None when there is nothing to average.
pub fn mean_floor(total: f64, count: usize) -> Option<i64> {
    if count == 0 {
        return None;
    }
    Some((total / count as f64).floor() as i64)
}
