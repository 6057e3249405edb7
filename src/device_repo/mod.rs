// Device control: the phone under test, driven through adb

mod adb;
mod shell;

pub use adb::{AdbDevice, parse_focused_package};
pub use shell::BackgroundCommand;

use crate::error::DeviceError;
use std::time::Duration;
use tokio::time::Instant;

/// Operations the scenarios need from the phone.
#[allow(async_fn_in_trait)]
pub trait Device {
    /// Puts the lock screen up with the display on.
    async fn lock(&self) -> Result<(), DeviceError>;
    async fn unlock(&self) -> Result<(), DeviceError>;
    async fn set_auto_brightness(&self, enabled: bool) -> Result<(), DeviceError>;
    /// `level` in 0.0..=1.0.
    async fn set_brightness(&self, level: f64) -> Result<(), DeviceError>;
    /// Package of the app currently in the foreground, if any.
    async fn displayed_app(&self) -> Result<Option<String>, DeviceError>;
    async fn turn_screen_off(&self) -> Result<(), DeviceError>;
    async fn launch_app(&self, package: &str) -> Result<(), DeviceError>;
    async fn set_permission(
        &self,
        package: &str,
        permission: &str,
        granted: bool,
    ) -> Result<(), DeviceError>;
    async fn capture_picture(&self) -> Result<(), DeviceError>;

    /// Best-effort and non-blocking: the command is issued and never awaited,
    /// so callers cannot observe whether it took effect.
    fn set_charging_enabled(&self, enabled: bool);
}

/// Polls `displayed_app` until it reports `package` or `timeout` passes.
pub async fn wait_for_app<D: Device>(
    device: &D,
    package: &str,
    timeout: Duration,
    poll: Duration,
) -> Result<(), DeviceError> {
    let started = Instant::now();
    loop {
        let shown = device.displayed_app().await?;
        if shown.as_deref() == Some(package) {
            tracing::debug!(
                package,
                waited_ms = started.elapsed().as_millis() as u64,
                "app displayed"
            );
            return Ok(());
        }
        if started.elapsed() >= timeout {
            return Err(DeviceError::Timeout {
                what: format!("{} to be displayed (showing {:?})", package, shown),
                waited_ms: started.elapsed().as_millis() as u64,
            });
        }
        tokio::time::sleep(poll).await;
    }
}
