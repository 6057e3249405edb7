// Phone control via `adb shell`

use super::{BackgroundCommand, Device};
use crate::config::DeviceConfig;
use crate::error::DeviceError;
use std::process::Stdio;

pub struct AdbDevice {
    adb_path: String,
    serial: Option<String>,
    charging_control_path: String,
}

impl AdbDevice {
    pub fn new(adb_path: &str, serial: Option<&str>, charging_control_path: &str) -> Self {
        Self {
            adb_path: adb_path.to_string(),
            serial: serial.map(str::to_string),
            charging_control_path: charging_control_path.to_string(),
        }
    }

    pub fn from_config(config: &DeviceConfig) -> Self {
        Self::new(
            &config.adb_path,
            config.serial.as_deref(),
            &config.charging_control_path,
        )
    }

    /// adb arguments for running `command` in the device shell.
    pub fn shell_args(&self, command: &str) -> Vec<String> {
        let mut args = Vec::with_capacity(4);
        if let Some(serial) = &self.serial {
            args.push("-s".to_string());
            args.push(serial.clone());
        }
        args.push("shell".to_string());
        args.push(command.to_string());
        args
    }

    /// Command that writes the charging flag on the device.
    pub fn charging_command(&self, enabled: bool) -> BackgroundCommand {
        let flag = if enabled { 1 } else { 0 };
        BackgroundCommand::new(
            self.adb_path.clone(),
            self.shell_args(&format!("echo {} > {}", flag, self.charging_control_path)),
        )
    }

    async fn shell(&self, command: &str) -> Result<String, DeviceError> {
        let args = self.shell_args(command);
        let command_line = format!("{} {}", self.adb_path, args.join(" "));
        let output = tokio::process::Command::new(&self.adb_path)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| DeviceError::Spawn {
                command: command_line.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(DeviceError::CommandFailed {
                command: command_line,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        tracing::trace!(command = %command_line, "adb shell ok");
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn keyevent(&self, key: &str) -> Result<(), DeviceError> {
        self.shell(&format!("input keyevent {}", key)).await?;
        Ok(())
    }
}

impl Device for AdbDevice {
    async fn lock(&self) -> Result<(), DeviceError> {
        self.keyevent("KEYCODE_SLEEP").await?;
        self.keyevent("KEYCODE_WAKEUP").await
    }

    async fn unlock(&self) -> Result<(), DeviceError> {
        self.shell("wm dismiss-keyguard").await?;
        Ok(())
    }

    async fn set_auto_brightness(&self, enabled: bool) -> Result<(), DeviceError> {
        let mode = if enabled { 1 } else { 0 };
        self.shell(&format!("settings put system screen_brightness_mode {}", mode))
            .await?;
        Ok(())
    }

    async fn set_brightness(&self, level: f64) -> Result<(), DeviceError> {
        self.shell(&format!(
            "settings put system screen_brightness {}",
            brightness_to_setting(level)
        ))
        .await?;
        Ok(())
    }

    async fn displayed_app(&self) -> Result<Option<String>, DeviceError> {
        let out = self.shell("dumpsys window").await?;
        Ok(parse_focused_package(&out))
    }

    async fn turn_screen_off(&self) -> Result<(), DeviceError> {
        self.keyevent("KEYCODE_SLEEP").await
    }

    async fn launch_app(&self, package: &str) -> Result<(), DeviceError> {
        self.shell(&format!(
            "monkey -p {} -c android.intent.category.LAUNCHER 1",
            package
        ))
        .await?;
        Ok(())
    }

    async fn set_permission(
        &self,
        package: &str,
        permission: &str,
        granted: bool,
    ) -> Result<(), DeviceError> {
        let verb = if granted { "grant" } else { "revoke" };
        self.shell(&format!("pm {} {} {}", verb, package, permission))
            .await?;
        Ok(())
    }

    async fn capture_picture(&self) -> Result<(), DeviceError> {
        self.keyevent("KEYCODE_CAMERA").await
    }

    fn set_charging_enabled(&self, enabled: bool) {
        self.charging_command(enabled).fire_and_forget();
    }
}

/// Maps 0.0..=1.0 onto the 0..=255 system setting.
fn brightness_to_setting(level: f64) -> u8 {
    (level.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Extracts the package from the `mCurrentFocus` line of `dumpsys window`,
/// e.g. `mCurrentFocus=Window{1f2e u0 com.android.camera2/com.android.camera.CameraActivity}`.
pub fn parse_focused_package(dumpsys: &str) -> Option<String> {
    let line = dumpsys.lines().find(|l| l.contains("mCurrentFocus="))?;
    let focus = line.split("mCurrentFocus=").nth(1)?.trim();
    if focus.is_empty() || focus == "null" {
        return None;
    }
    let component = focus.split_whitespace().last()?.trim_end_matches('}');
    let package = component.split('/').next()?;
    if package.is_empty() {
        return None;
    }
    Some(package.to_string())
}
