use anyhow::Result;
use clap::Parser;
use powerprobe::ammeter_repo::AmmeterRepo;
use powerprobe::config::AppConfig;
use powerprobe::device_repo::AdbDevice;
use powerprobe::scenarios::{Scenario, run_in_session};
use powerprobe::session::SessionSettings;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

/// Measure a phone's current draw across idle and camera scenarios.
#[derive(Parser)]
#[command(name = "powerprobe")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file (overrides CONFIG_FILE; defaults to config.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<String>,

    /// Verbosity when RUST_LOG is unset (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print the scenario names and exit
    #[arg(long)]
    list: bool,

    /// Scenarios to run, in order (default: all)
    #[arg(value_enum, value_name = "SCENARIO")]
    scenarios: Vec<Scenario>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    if cli.list {
        for scenario in Scenario::ALL {
            println!("{}", scenario);
        }
        return Ok(());
    }

    let app_config = match &cli.config {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    let settings = SessionSettings::from_config(&app_config);
    let scenarios = if cli.scenarios.is_empty() {
        Scenario::ALL.to_vec()
    } else {
        cli.scenarios
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        port = %app_config.ammeter.port,
        scenarios = scenarios.len(),
        "{} starting",
        env!("CARGO_PKG_NAME")
    );

    let mut failed = Vec::new();
    for scenario in scenarios {
        let ammeter = match AmmeterRepo::open_serial(&app_config.ammeter.port) {
            Ok(a) => a,
            Err(e) => {
                tracing::error!(error = %e, scenario = %scenario, "ammeter unavailable");
                failed.push(scenario);
                continue;
            }
        };
        let device = AdbDevice::from_config(&app_config.device);
        match run_in_session(scenario, device, ammeter, settings.clone()).await {
            Ok(profile) => tracing::info!(
                scenario = %scenario,
                sample_count = profile.sample_count(),
                average_ma = profile.average_ma,
                "scenario done"
            ),
            Err(e) => {
                tracing::error!(error = %e, scenario = %scenario, "scenario failed");
                failed.push(scenario);
            }
        }
    }

    anyhow::ensure!(
        failed.is_empty(),
        "{} scenario(s) failed: {}",
        failed.len(),
        failed
            .iter()
            .map(|s| s.test_name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(())
}
