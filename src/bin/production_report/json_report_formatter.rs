use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::Serialize;

/// Pretty JSON to `path`, or to stdout when no path is given.
pub fn write_report<T: Serialize>(path: Option<&Path>, report: &T) -> Result<(), String> {
    let Some(path) = path else {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        serde_json::to_writer_pretty(&mut handle, report)
            .map_err(|err| format!("Failed to serialize report JSON to stdout: {err}"))?;
        return handle
            .write_all(b"\n")
            .map_err(|err| format!("Failed to write report to stdout: {err}"));
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| {
            format!(
                "Failed to create report output directory '{}': {err}",
                parent.display()
            )
        })?;
    }

    let mut file = File::create(path)
        .map_err(|err| format!("Failed to create report file '{}': {err}", path.display()))?;
    serde_json::to_writer_pretty(&mut file, report).map_err(|err| {
        format!(
            "Failed to serialize report JSON '{}': {err}",
            path.display()
        )
    })?;
    file.write_all(b"\n")
        .map_err(|err| format!("Failed to finalize report file '{}': {err}", path.display()))?;
    Ok(())
}
