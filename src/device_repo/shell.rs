// Fire-and-forget process launches

use std::process::Stdio;

/// A command run purely for its side effect. It is spawned and dropped:
/// the exit status is never read, and the runtime reaps the child later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundCommand {
    program: String,
    args: Vec<String>,
}

impl BackgroundCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Spawns the process and returns immediately. A spawn failure is logged,
    /// not returned; the return value only says whether a process started.
    pub fn fire_and_forget(&self) -> bool {
        let spawned = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(_child) => {
                tracing::debug!(command = %self, "background command started");
                true
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    command = %self,
                    "background command failed to start"
                );
                false
            }
        }
    }
}

impl std::fmt::Display for BackgroundCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
