// JSON export of command results.
//
// Every file carries the command that produced it and a UTC timestamp next to
// the payload, so exported feature tables can be traced back to a run.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

/// Wrapper written around every exported payload.
#[derive(Debug, Serialize)]
pub struct Export<'a, T: Serialize> {
    pub command: &'a str,
    pub generated_at: DateTime<Utc>,
    pub result: &'a T,
}

impl<'a, T: Serialize> Export<'a, T> {
    pub fn new(command: &'a str, result: &'a T) -> Self {
        Self {
            command,
            generated_at: Utc::now(),
            result,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize export")
    }
}

/// Write `result` to `path` as pretty-printed JSON.
pub fn write_json<T: Serialize>(path: &Path, command: &str, result: &T) -> Result<()> {
    let json = Export::new(command, result).to_json()?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), command, "Results exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_json(&path, "features", &vec![1.0, 2.0]).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["command"], "features");
        assert_eq!(value["result"], serde_json::json!([1.0, 2.0]));
        assert!(value["generated_at"].is_string());
    }
}
