// Shared test helpers: scripted ammeter and a device that records what it was asked to do

#![allow(dead_code)]

use powerprobe::ammeter_repo::Ammeter;
use powerprobe::device_repo::Device;
use powerprobe::error::{AmmeterError, DeviceError};
use powerprobe::models::Sample;
use powerprobe::session::{SessionSettings, SessionTiming};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const HOMESCREEN: &str = "com.example.homescreen";
pub const CAMERA: &str = "com.example.camera";
pub const GEOLOCATION: &str = "android.permission.ACCESS_FINE_LOCATION";

pub fn sample(current: f64, device_time: i64) -> Sample {
    Sample {
        current,
        voltage: 3.8,
        device_time,
    }
}

/// Replays a fixed script of reads, then reports no data forever.
pub struct ScriptedAmmeter {
    script: VecDeque<Option<Sample>>,
    read_delay: Duration,
    closed: Arc<AtomicBool>,
    fail_close: bool,
}

impl ScriptedAmmeter {
    pub fn new(script: Vec<Option<Sample>>) -> Self {
        Self {
            script: script.into(),
            read_delay: Duration::ZERO,
            closed: Arc::new(AtomicBool::new(false)),
            fail_close: false,
        }
    }

    /// Every read sleeps this long first, like a meter waiting on hardware.
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = delay;
        self
    }

    /// `close` reports the stream as already gone.
    pub fn with_failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        self.closed.clone()
    }
}

impl Ammeter for ScriptedAmmeter {
    fn read_sample(&mut self) -> Result<Option<Sample>, AmmeterError> {
        if !self.read_delay.is_zero() {
            std::thread::sleep(self.read_delay);
        }
        Ok(self.script.pop_front().flatten())
    }

    fn close(&mut self) -> Result<(), AmmeterError> {
        self.closed.store(true, Ordering::SeqCst);
        if self.fail_close {
            return Err(AmmeterError::Closed {
                port: "scripted".into(),
            });
        }
        Ok(())
    }
}

/// A meter whose stream is already gone.
pub struct BrokenAmmeter;

impl Ammeter for BrokenAmmeter {
    fn read_sample(&mut self) -> Result<Option<Sample>, AmmeterError> {
        Err(AmmeterError::Closed {
            port: "/dev/null".into(),
        })
    }
}

/// Fake phone: unlock brings up the homescreen, launch brings up the app.
#[derive(Clone, Default)]
pub struct RecordingDevice {
    pub calls: Arc<Mutex<Vec<String>>>,
    displayed: Arc<Mutex<Option<String>>>,
    stays_locked: bool,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unlocking never brings the homescreen up.
    pub fn stays_locked() -> Self {
        Self {
            stays_locked: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Device for RecordingDevice {
    async fn lock(&self) -> Result<(), DeviceError> {
        self.record("lock".into());
        *self.displayed.lock().unwrap() = None;
        Ok(())
    }

    async fn unlock(&self) -> Result<(), DeviceError> {
        self.record("unlock".into());
        if !self.stays_locked {
            *self.displayed.lock().unwrap() = Some(HOMESCREEN.into());
        }
        Ok(())
    }

    async fn set_auto_brightness(&self, enabled: bool) -> Result<(), DeviceError> {
        self.record(format!("auto_brightness {}", enabled));
        Ok(())
    }

    async fn set_brightness(&self, level: f64) -> Result<(), DeviceError> {
        self.record(format!("brightness {}", level));
        Ok(())
    }

    async fn displayed_app(&self) -> Result<Option<String>, DeviceError> {
        Ok(self.displayed.lock().unwrap().clone())
    }

    async fn turn_screen_off(&self) -> Result<(), DeviceError> {
        self.record("screen_off".into());
        Ok(())
    }

    async fn launch_app(&self, package: &str) -> Result<(), DeviceError> {
        self.record(format!("launch {}", package));
        *self.displayed.lock().unwrap() = Some(package.into());
        Ok(())
    }

    async fn set_permission(
        &self,
        package: &str,
        permission: &str,
        granted: bool,
    ) -> Result<(), DeviceError> {
        self.record(format!("permission {} {} {}", package, permission, granted));
        Ok(())
    }

    async fn capture_picture(&self) -> Result<(), DeviceError> {
        self.record("capture".into());
        Ok(())
    }

    fn set_charging_enabled(&self, enabled: bool) {
        self.record(format!("charging {}", enabled));
    }
}

/// Settings with short waits and output under `dir`.
pub fn fast_settings(dir: &Path, sample_window: Duration) -> SessionSettings {
    SessionSettings {
        timing: SessionTiming {
            stabilization: Duration::ZERO,
            sample_window,
            capture_delay: Duration::ZERO,
            teardown_grace: Duration::ZERO,
            calibration_timeout: Duration::from_millis(200),
            app_wait_timeout: Duration::from_millis(100),
            app_wait_poll: Duration::from_millis(10),
        },
        brightness: 1.0,
        homescreen_package: HOMESCREEN.into(),
        camera_package: CAMERA.into(),
        geolocation_permission: GEOLOCATION.into(),
        output_dir: dir.to_path_buf(),
        context_domain: "gaiamobile.org".into(),
    }
}
