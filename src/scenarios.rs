// The measured scenarios and the per-scenario session runner

use crate::ammeter_repo::AmmeterRepo;
use crate::device_repo::Device;
use crate::error::PowerTestError;
use crate::models::{PowerProfile, ScenarioIdentity};
use crate::session::{Session, SessionSettings};
use tracing::Instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Scenario {
    /// Homescreen, display off.
    #[value(name = "idle_screen_off")]
    IdleScreenOff,
    /// Homescreen, display on.
    #[value(name = "idle_screen_on")]
    IdleScreenOn,
    /// Camera open on its viewfinder.
    #[value(name = "camera_preview")]
    CameraPreview,
    /// Camera open, one picture taken before sampling.
    #[value(name = "camera_picture")]
    CameraPicture,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [
        Scenario::IdleScreenOff,
        Scenario::IdleScreenOn,
        Scenario::CameraPreview,
        Scenario::CameraPicture,
    ];

    pub fn test_name(self) -> &'static str {
        match self {
            Scenario::IdleScreenOff => "idle_screen_off",
            Scenario::IdleScreenOn => "idle_screen_on",
            Scenario::CameraPreview => "camera_preview",
            Scenario::CameraPicture => "camera_picture",
        }
    }

    pub fn identity(self) -> ScenarioIdentity {
        match self {
            Scenario::IdleScreenOff | Scenario::IdleScreenOn => {
                ScenarioIdentity::new(self.test_name(), "Homescreen", "verticalhome")
            }
            Scenario::CameraPreview | Scenario::CameraPicture => {
                ScenarioIdentity::new(self.test_name(), "Camera", "camera")
            }
        }
    }

    /// Drives the device into the scenario's state, then measures.
    pub async fn run<D: Device>(
        self,
        session: &Session<D>,
    ) -> Result<PowerProfile, PowerTestError> {
        session.unlock_to_homescreen().await?;
        match self {
            Scenario::IdleScreenOff => session.device().turn_screen_off().await?,
            Scenario::IdleScreenOn => {}
            Scenario::CameraPreview => session.launch_camera().await?,
            Scenario::CameraPicture => {
                session.launch_camera().await?;
                tokio::time::sleep(session.settings().timing.capture_delay).await;
                session.device().capture_picture().await?;
            }
        }
        tracing::info!("running {} test", self.test_name());
        session.measure(self.identity()).await
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.test_name())
    }
}

/// Runs one scenario in a fresh session. Teardown runs whether or not the
/// scenario succeeded; its own failure is logged, never returned.
pub async fn run_in_session<D: Device>(
    scenario: Scenario,
    device: D,
    ammeter: AmmeterRepo,
    settings: SessionSettings,
) -> Result<PowerProfile, PowerTestError> {
    let span = tracing::info_span!("scenario", scenario = scenario.test_name());
    async move {
        let session = Session::setup(device, ammeter, settings).await?;
        let result = scenario.run(&session).await;
        let teardown = session.teardown().await;
        // The summary is already on disk once the scenario succeeds, so a
        // teardown failure is logged and does not fail the run.
        if let Err(e) = &teardown {
            tracing::warn!(error = %e, operation = "teardown", "teardown failed");
        }
        result
    }
    .instrument(span)
    .await
}
