// Summary rendering and file emission tests

use chrono::{Local, TimeZone};
use powerprobe::error::PowerTestError;
use powerprobe::models::*;
use powerprobe::summary::{render_summary, summary_file_name, write_summary};

fn profile() -> PowerProfile {
    let mut window = SampleWindow::new(1_400_000_000_123);
    for (c, t) in [(180.0, 10), (220.0, 20)] {
        window.push(
            &Sample {
                current: c,
                voltage: 3.9,
                device_time: t,
            },
            ClockOffset(1_400_000_000_000),
        );
    }
    PowerProfile::build(
        ScenarioIdentity::new("camera_preview", "Camera", "camera"),
        window,
        Local.with_ymd_and_hms(2014, 11, 5, 9, 7, 3).unwrap(),
    )
    .unwrap()
}

#[test]
fn render_summary_has_five_lines_and_trailing_blank() {
    let body = render_summary(&profile(), "gaiamobile.org");
    assert_eq!(
        body,
        "name: power.camera_preview.current\n\
         time: 1400000000123\n\
         value: 200\n\
         context: camera.gaiamobile.org\n\
         app_name: Camera\n\
         \n"
    );
}

#[test]
fn render_summary_is_deterministic() {
    let p = profile();
    assert_eq!(render_summary(&p, "x.org"), render_summary(&p, "x.org"));
}

#[test]
fn summary_file_name_embeds_test_name_and_stamp() {
    assert_eq!(
        summary_file_name(&profile()),
        "camera_preview_20141105090703_summary.log"
    );
}

#[test]
fn write_summary_creates_dir_and_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let out = dir.path().join("nested/results");
    let path = write_summary(&out, &profile(), "gaiamobile.org").unwrap();
    assert_eq!(
        path.file_name().and_then(|n| n.to_str()),
        Some("camera_preview_20141105090703_summary.log")
    );
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, render_summary(&profile(), "gaiamobile.org"));
}

#[test]
fn write_summary_never_overwrites() {
    let dir = tempfile::TempDir::new().unwrap();
    write_summary(dir.path(), &profile(), "gaiamobile.org").unwrap();
    let err = write_summary(dir.path(), &profile(), "gaiamobile.org").unwrap_err();
    assert!(matches!(err, PowerTestError::SummaryWrite { .. }));
    assert!(err.to_string().contains("camera_preview_20141105090703_summary.log"));
}

#[test]
fn write_summary_reports_unwritable_dir() {
    let dir = tempfile::TempDir::new().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, "not a directory").unwrap();
    let err = write_summary(&blocker, &profile(), "gaiamobile.org").unwrap_err();
    assert!(matches!(err, PowerTestError::SummaryWrite { .. }));
}
