// Ammeter access: blocking meter reads run on the blocking pool behind a mutex

mod serial;

pub use serial::{SerialAmmeter, parse_sample_line};

use crate::error::{AmmeterError, PowerTestError};
use crate::models::{ClockOffset, Sample, SampleWindow, now_epoch_ms};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::instrument;

/// A meter that hands out one reading per request.
///
/// `read_sample` may block until the hardware produces something. `Ok(None)`
/// means the meter answered without a usable reading.
pub trait Ammeter: Send {
    fn read_sample(&mut self) -> Result<Option<Sample>, AmmeterError>;

    fn close(&mut self) -> Result<(), AmmeterError> {
        Ok(())
    }
}

pub struct AmmeterRepo {
    meter: Arc<Mutex<Box<dyn Ammeter>>>,
}

impl AmmeterRepo {
    pub fn new(meter: Box<dyn Ammeter>) -> Self {
        Self {
            meter: Arc::new(Mutex::new(meter)),
        }
    }

    pub fn open_serial(port: &str) -> Result<Self, AmmeterError> {
        let meter = SerialAmmeter::open(port)?;
        tracing::debug!(port, "ammeter opened");
        Ok(Self::new(Box::new(meter)))
    }

    /// Polls until the meter yields one reference sample and derives the
    /// device-time to epoch-time offset from the moment it arrived.
    #[instrument(skip(self), fields(repo = "ammeter", operation = "calibrate"))]
    pub async fn calibrate(&self, timeout: Duration) -> Result<ClockOffset, PowerTestError> {
        self.with_meter(move |meter| {
            let started = Instant::now();
            loop {
                if let Some(sample) = meter.read_sample()? {
                    let wall_clock_ms = now_epoch_ms();
                    return Ok(ClockOffset::calibrate(&sample, wall_clock_ms));
                }
                if started.elapsed() > timeout {
                    return Err(PowerTestError::CalibrationTimeout {
                        waited_ms: started.elapsed().as_millis() as u64,
                    });
                }
            }
        })
        .await
    }

    /// Collects samples until `duration` has passed. Empty reads are skipped,
    /// and so are readings stamped before the window opened (backlog the meter
    /// streamed while nobody was reading). The deadline is checked after every
    /// read, so a read that blocks holds the window open until it returns.
    #[instrument(skip(self), fields(repo = "ammeter", operation = "sample_window"))]
    pub async fn sample_window(
        &self,
        offset: ClockOffset,
        duration: Duration,
    ) -> Result<SampleWindow, PowerTestError> {
        self.with_meter(move |meter| {
            let started = Instant::now();
            let deadline = started + duration;
            let mut window = SampleWindow::new(now_epoch_ms());
            let mut stale: u64 = 0;
            loop {
                if let Some(sample) = meter.read_sample()? {
                    if offset.to_epoch_ms(sample.device_time) < window.started_at_ms {
                        stale += 1;
                    } else {
                        window.push(&sample, offset);
                    }
                }
                if Instant::now() > deadline {
                    break;
                }
            }
            window.elapsed_ms = started.elapsed().as_millis() as u64;
            if stale > 0 {
                tracing::debug!(stale, "dropped readings from before the window");
            }
            Ok(window)
        })
        .await
    }

    /// Closes the meter. The port is released when the last handle drops.
    #[instrument(skip(self), fields(repo = "ammeter", operation = "close"))]
    pub async fn close(self) -> Result<(), PowerTestError> {
        self.with_meter(|meter| Ok(meter.close()?)).await?;
        tracing::debug!("ammeter closed");
        Ok(())
    }

    async fn with_meter<T, F>(&self, f: F) -> Result<T, PowerTestError>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn Ammeter) -> Result<T, PowerTestError> + Send + 'static,
    {
        let meter = self.meter.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = meter.lock().map_err(|_| AmmeterError::Poisoned)?;
            f(&mut **guard)
        })
        .await
        .map_err(|e| PowerTestError::Task(format!("ammeter task join: {}", e)))?
    }
}
