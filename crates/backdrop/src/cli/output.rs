//! Shared output helpers.

use backdrop::{BackdropResult, DownloadOutcome};
use backdrop_error::{StorageError, StorageErrorKind};

/// Pretty-print a JSON value to stdout.
pub fn print_json(value: &serde_json::Value) -> BackdropResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| StorageError::new(StorageErrorKind::Serialization(e.to_string())))?;
    println!("{}", json);
    Ok(())
}

/// JSON view of one download.
pub fn outcome_json(outcome: &DownloadOutcome) -> serde_json::Value {
    match &outcome.result {
        Ok(size) => serde_json::json!({ "key": outcome.key.to_string(), "ok": true, "size": size }),
        Err(e) => serde_json::json!({ "key": outcome.key.to_string(), "ok": false, "error": e.to_string() }),
    }
}

/// One line per download.
pub fn print_outcomes(outcomes: &[DownloadOutcome]) {
    for outcome in outcomes {
        match &outcome.result {
            Ok(size) => println!("  ok      {} ({} bytes)", outcome.key, size),
            Err(e) => println!("  failed  {}: {}", outcome.key, e),
        }
    }
}
