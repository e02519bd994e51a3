//! Loading of JSON input files.
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Drops commas directly followed (ignoring whitespace) by `]` or `}`.
///
/// String literals are copied untouched.
pub fn strip_trailing_commas(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.char_indices().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some((i, c)) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = raw[i + 1..].trim_start().chars().next();
                if !matches!(next, Some(']') | Some('}')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

pub fn parse_json<T: DeserializeOwned>(raw: &str) -> serde_json::Result<T> {
    serde_json::from_str(&strip_trailing_commas(raw))
}

/// Reads and parses a required input file.
pub fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    let parsed = parse_json(&raw)
        .with_context(|| format!("Failed to parse input file: {}", path.display()))?;
    debug!("Loaded {}", path.display());
    Ok(parsed)
}

/// Reads a metadata list, treating a missing file as an empty list.
///
/// Other read failures and malformed content are still errors.
pub fn read_optional_list<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<Vec<T>> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(raw) => parse_json(&raw)
            .with_context(|| format!("Failed to parse metadata file: {}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Metadata file {} not found, continuing without it", path.display());
            Ok(Vec::new())
        }
        Err(e) => Err(e)
            .with_context(|| format!("Failed to read metadata file: {}", path.display())),
    }
}
