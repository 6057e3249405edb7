// One test session: device preparation, ammeter calibration, measurement, teardown

use crate::ammeter_repo::AmmeterRepo;
use crate::config::AppConfig;
use crate::device_repo::{Device, wait_for_app};
use crate::error::PowerTestError;
use crate::models::{ClockOffset, PowerProfile, ScenarioIdentity};
use crate::summary::write_summary;
use std::path::PathBuf;
use std::time::Duration;

/// Waits a session observes, resolved from config.
#[derive(Debug, Clone)]
pub struct SessionTiming {
    pub stabilization: Duration,
    pub sample_window: Duration,
    pub capture_delay: Duration,
    pub teardown_grace: Duration,
    pub calibration_timeout: Duration,
    pub app_wait_timeout: Duration,
    pub app_wait_poll: Duration,
}

/// Everything a session needs besides the device and the meter.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub timing: SessionTiming,
    pub brightness: f64,
    pub homescreen_package: String,
    pub camera_package: String,
    pub geolocation_permission: String,
    pub output_dir: PathBuf,
    pub context_domain: String,
}

impl SessionSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            timing: SessionTiming {
                stabilization: Duration::from_secs(config.timing.stabilization_secs),
                sample_window: Duration::from_secs(config.timing.sample_secs),
                capture_delay: Duration::from_secs(config.timing.capture_delay_secs),
                teardown_grace: Duration::from_millis(config.timing.teardown_grace_ms),
                calibration_timeout: Duration::from_millis(config.ammeter.calibration_timeout_ms),
                app_wait_timeout: Duration::from_secs(config.device.app_wait_timeout_secs),
                app_wait_poll: Duration::from_millis(config.device.app_wait_poll_ms),
            },
            brightness: config.device.brightness,
            homescreen_package: config.device.homescreen_package.clone(),
            camera_package: config.device.camera_package.clone(),
            geolocation_permission: config.device.geolocation_permission.clone(),
            output_dir: config.output.dir.clone(),
            context_domain: config.output.context_domain.clone(),
        }
    }
}

/// Owns the open ammeter and the clock offset for the lifetime of a session.
pub struct Session<D: Device> {
    device: D,
    ammeter: AmmeterRepo,
    offset: ClockOffset,
    settings: SessionSettings,
}

impl<D: Device> Session<D> {
    /// Locks the phone, sets full brightness, disables charging and
    /// calibrates the ammeter clock. If calibration fails, charging is
    /// switched back on before the error is returned.
    pub async fn setup(
        device: D,
        ammeter: AmmeterRepo,
        settings: SessionSettings,
    ) -> Result<Self, PowerTestError> {
        tracing::debug!("setup - start");
        device.lock().await?;
        device.set_auto_brightness(false).await?;
        device.set_brightness(settings.brightness).await?;
        device.set_charging_enabled(false);

        let offset = match ammeter.calibrate(settings.timing.calibration_timeout).await {
            Ok(offset) => offset,
            Err(e) => {
                device.set_charging_enabled(true);
                return Err(e);
            }
        };
        tracing::debug!(offset_ms = offset.millis(), "setup - done");
        Ok(Self {
            device,
            ammeter,
            offset,
            settings,
        })
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn offset(&self) -> ClockOffset {
        self.offset
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Unlocks and waits for the homescreen to be in front.
    pub async fn unlock_to_homescreen(&self) -> Result<(), PowerTestError> {
        self.device.unlock().await?;
        wait_for_app(
            &self.device,
            &self.settings.homescreen_package,
            self.settings.timing.app_wait_timeout,
            self.settings.timing.app_wait_poll,
        )
        .await?;
        Ok(())
    }

    /// Denies the camera's geolocation prompt up front, then launches it.
    pub async fn launch_camera(&self) -> Result<(), PowerTestError> {
        let camera = &self.settings.camera_package;
        self.device
            .set_permission(camera, &self.settings.geolocation_permission, false)
            .await?;
        self.device.launch_app(camera).await?;
        Ok(())
    }

    /// Stabilizes, samples for the configured window, aggregates and writes
    /// the summary file.
    pub async fn measure(
        &self,
        identity: ScenarioIdentity,
    ) -> Result<PowerProfile, PowerTestError> {
        let timing = &self.settings.timing;
        tracing::info!(
            stabilization_secs = timing.stabilization.as_secs_f64(),
            "waiting to stabilize"
        );
        tokio::time::sleep(timing.stabilization).await;

        tracing::info!(
            sample_secs = timing.sample_window.as_secs_f64(),
            "starting power test"
        );
        let window = self
            .ammeter
            .sample_window(self.offset, timing.sample_window)
            .await?;
        let profile = PowerProfile::build(identity, window, chrono::Local::now())?;
        tracing::info!(
            sample_count = profile.sample_count(),
            average_ma = profile.average_ma,
            "power test complete"
        );
        write_summary(
            &self.settings.output_dir,
            &profile,
            &self.settings.context_domain,
        )?;
        Ok(profile)
    }

    /// Closes the ammeter and turns charging back on.
    pub async fn teardown(self) -> Result<(), PowerTestError> {
        let closed = self.ammeter.close().await;
        self.device.set_charging_enabled(true);
        tokio::time::sleep(self.settings.timing.teardown_grace).await;
        tracing::debug!("teardown - done");
        closed
    }
}
