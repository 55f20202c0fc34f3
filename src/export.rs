//! Record export to JSON and JSON-Lines files.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Output layout for exported records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// One pretty-printed JSON array
    Json,
    /// One compact JSON object per line
    JsonLines,
}

impl ExportFormat {
    /// Parse a CLI format flag. Unknown values fall back to JSON-Lines.
    pub fn from_flag(flag: &str) -> Self {
        match flag {
            "json" => ExportFormat::Json,
            "jsonl" => ExportFormat::JsonLines,
            other => {
                eprintln!("Unknown format: {}. Using jsonl.", other);
                ExportFormat::JsonLines
            }
        }
    }
}

/// Write `records` to `path` in the requested layout.
pub fn write_records<T: Serialize>(path: &Path, records: &[T], format: ExportFormat) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
    }

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    match format {
        ExportFormat::Json => {
            let body = serde_json::to_string_pretty(records)?;
            file.write_all(body.as_bytes())?;
            file.write_all(b"\n")?;
        }
        ExportFormat::JsonLines => {
            for record in records {
                let line = serde_json::to_string(record)?;
                file.write_all(line.as_bytes())?;
                file.write_all(b"\n")?;
            }
        }
    }

    Ok(())
}
