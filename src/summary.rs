// Flat key-value summary file, one per scenario run

use crate::error::PowerTestError;
use crate::models::PowerProfile;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Format of the timestamp embedded in summary file names.
pub const FILE_STAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Summary body; a function of the profile and domain alone.
pub fn render_summary(profile: &PowerProfile, context_domain: &str) -> String {
    let id = &profile.identity;
    format!(
        "name: power.{}.current\ntime: {}\nvalue: {}\ncontext: {}.{}\napp_name: {}\n\n",
        id.test_name,
        profile.started_at_ms,
        profile.average_ma,
        id.context,
        context_domain,
        id.app_name,
    )
}

/// `<testName>_<YYYYMMDDHHMMSS>_summary.log`
pub fn summary_file_name(profile: &PowerProfile) -> String {
    format!(
        "{}_{}_summary.log",
        profile.identity.test_name,
        profile.finished_at.format(FILE_STAMP_FORMAT)
    )
}

/// Writes a new summary file under `dir`, creating `dir` if needed.
/// An existing file with the same name is left alone and reported as an error.
pub fn write_summary(
    dir: &Path,
    profile: &PowerProfile,
    context_domain: &str,
) -> Result<PathBuf, PowerTestError> {
    let path = dir.join(summary_file_name(profile));
    let body = render_summary(profile, context_domain);
    let write = || -> std::io::Result<()> {
        std::fs::create_dir_all(dir)?;
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        file.write_all(body.as_bytes())?;
        file.sync_all()
    };
    write().map_err(|source| PowerTestError::SummaryWrite {
        path: path.clone(),
        source,
    })?;
    tracing::info!(path = %path.display(), "summary written");
    Ok(path)
}
