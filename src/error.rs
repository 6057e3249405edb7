// Error types for the ammeter, the device seam and a test session.

use std::path::PathBuf;

/// Errors raised by an ammeter connection.
#[derive(Debug, thiserror::Error)]
pub enum AmmeterError {
    #[error("opening ammeter port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: std::io::Error,
    },

    #[error("reading ammeter port {port}: {source}")]
    Io {
        port: String,
        #[source]
        source: std::io::Error,
    },

    /// The sample stream hit end of file.
    #[error("ammeter stream on {port} closed")]
    Closed { port: String },

    #[error("ammeter lock poisoned")]
    Poisoned,
}

/// Errors raised while driving the device.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("spawning `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("timed out after {waited_ms} ms waiting for {what}")]
    Timeout { what: String, waited_ms: u64 },
}

/// Session-level failures. All of them end the scenario that raised them.
#[derive(Debug, thiserror::Error)]
pub enum PowerTestError {
    #[error("ammeter: {0}")]
    Ammeter(#[from] AmmeterError),

    #[error("device: {0}")]
    Device(#[from] DeviceError),

    #[error("no reference sample from ammeter within {waited_ms} ms")]
    CalibrationTimeout { waited_ms: u64 },

    /// The sampling window closed without a single sample; there is no average.
    #[error("scenario {scenario}: no samples collected in {elapsed_ms} ms")]
    NoSamples { scenario: String, elapsed_ms: u64 },

    #[error("writing summary {}: {source}", .path.display())]
    SummaryWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("blocking task: {0}")]
    Task(String),
}
