use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub ammeter: AmmeterConfig,
    pub device: DeviceConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AmmeterConfig {
    #[serde(default = "default_port")]
    pub port: String,
    /// How long setup keeps polling for the reference sample before giving up.
    #[serde(default = "default_calibration_timeout_ms")]
    pub calibration_timeout_ms: u64,
}

impl Default for AmmeterConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            calibration_timeout_ms: default_calibration_timeout_ms(),
        }
    }
}

fn default_port() -> String {
    "/dev/ttyACM0".into()
}

fn default_calibration_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    #[serde(default = "default_adb_path")]
    pub adb_path: String,
    /// adb `-s` serial; None lets adb pick the only attached device.
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default = "default_charging_control_path")]
    pub charging_control_path: String,
    #[serde(default = "default_brightness")]
    pub brightness: f64,
    pub homescreen_package: String,
    pub camera_package: String,
    #[serde(default = "default_geolocation_permission")]
    pub geolocation_permission: String,
    #[serde(default = "default_app_wait_timeout_secs")]
    pub app_wait_timeout_secs: u64,
    #[serde(default = "default_app_wait_poll_ms")]
    pub app_wait_poll_ms: u64,
}

fn default_adb_path() -> String {
    "adb".into()
}

fn default_charging_control_path() -> String {
    "/sys/class/power_supply/battery/charging_enabled".into()
}

fn default_brightness() -> f64 {
    1.0
}

fn default_geolocation_permission() -> String {
    "android.permission.ACCESS_FINE_LOCATION".into()
}

fn default_app_wait_timeout_secs() -> u64 {
    30
}

fn default_app_wait_poll_ms() -> u64 {
    500
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    /// Wait after the scenario's device actions before sampling starts.
    #[serde(default = "default_thirty_secs")]
    pub stabilization_secs: u64,
    /// Length of the sampling window.
    #[serde(default = "default_thirty_secs")]
    pub sample_secs: u64,
    /// Wait between launching the camera and taking the picture.
    #[serde(default = "default_thirty_secs")]
    pub capture_delay_secs: u64,
    /// Sleep after teardown so the charging command is dispatched before exit.
    #[serde(default = "default_teardown_grace_ms")]
    pub teardown_grace_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            stabilization_secs: default_thirty_secs(),
            sample_secs: default_thirty_secs(),
            capture_delay_secs: default_thirty_secs(),
            teardown_grace_ms: default_teardown_grace_ms(),
        }
    }
}

fn default_thirty_secs() -> u64 {
    30
}

fn default_teardown_grace_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    /// Appended to each scenario context, e.g. `camera` -> `camera.gaiamobile.org`.
    #[serde(default = "default_context_domain")]
    pub context_domain: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            context_domain: default_context_domain(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_context_domain() -> String {
    "gaiamobile.org".into()
}

impl AppConfig {
    /// Loads from `CONFIG_FILE`, falling back to `config.toml`.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: &str) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path, e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.ammeter.port.is_empty(), "ammeter.port must be non-empty");
        anyhow::ensure!(
            self.ammeter.calibration_timeout_ms > 0,
            "ammeter.calibration_timeout_ms must be > 0, got {}",
            self.ammeter.calibration_timeout_ms
        );
        anyhow::ensure!(
            !self.device.adb_path.is_empty(),
            "device.adb_path must be non-empty"
        );
        anyhow::ensure!(
            !self.device.charging_control_path.is_empty(),
            "device.charging_control_path must be non-empty"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.device.brightness),
            "device.brightness must be between 0.0 and 1.0, got {}",
            self.device.brightness
        );
        anyhow::ensure!(
            !self.device.homescreen_package.is_empty(),
            "device.homescreen_package must be non-empty"
        );
        anyhow::ensure!(
            !self.device.camera_package.is_empty(),
            "device.camera_package must be non-empty"
        );
        anyhow::ensure!(
            self.device.app_wait_timeout_secs > 0,
            "device.app_wait_timeout_secs must be > 0, got {}",
            self.device.app_wait_timeout_secs
        );
        anyhow::ensure!(
            self.device.app_wait_poll_ms > 0,
            "device.app_wait_poll_ms must be > 0, got {}",
            self.device.app_wait_poll_ms
        );
        anyhow::ensure!(
            self.timing.sample_secs > 0,
            "timing.sample_secs must be > 0, got {}",
            self.timing.sample_secs
        );
        anyhow::ensure!(
            !self.output.context_domain.is_empty(),
            "output.context_domain must be non-empty"
        );
        Ok(())
    }
}
