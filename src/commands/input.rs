//! Parsing and validation of command-line values.

use anyhow::{Result, bail};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::runtime::Runtime;

/// Parses IDs given as separate arguments, comma-separated, or both.
/// Blank entries are skipped; at least one ID is required.
pub fn parse_integer_list(values: &[String], label: &str) -> Result<Vec<u64>> {
    let mut numbers = Vec::new();

    for item in values.iter().flat_map(|value| value.split(',')) {
        let trimmed = item.trim();
        if trimmed.is_empty() {
            continue;
        }
        match trimmed.parse::<u64>() {
            Ok(number) => numbers.push(number),
            Err(_) => bail!("Invalid number \"{}\" in {}.", item, label),
        }
    }

    if numbers.is_empty() {
        bail!("At least one value is required for {}.", label);
    }

    Ok(numbers)
}

/// Flattens comma-separated values, trimming each and dropping blanks.
pub fn parse_string_list(values: Vec<String>) -> Vec<String> {
    values
        .iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trims the value; blank strings count as absent.
pub fn normalize_string(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Returns the inline value or the contents of the file given by `--<flag>-file`.
pub fn read_inline_or_file<R: Runtime>(
    runtime: &R,
    inline: Option<String>,
    file: Option<PathBuf>,
    flag: &str,
) -> Result<Option<String>> {
    match (inline, file) {
        (Some(_), Some(_)) => bail!("Provide either --{} or --{}-file, not both.", flag, flag),
        (_, Some(path)) => Ok(Some(runtime.read_to_string(&path)?)),
        (inline, None) => Ok(inline),
    }
}

/// Parses `raw` as a JSON object. `label` names the value in error messages,
/// as it should read at the start of a sentence.
pub fn parse_json_object(raw: &str, label: &str) -> Result<Map<String, Value>> {
    let parsed: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => bail!("Failed to parse {} JSON: {}.", label.to_lowercase(), e),
    };

    match parsed {
        Value::Object(map) => Ok(map),
        _ => bail!("{} must be a JSON object.", label),
    }
}

/// Parses a JSON array of objects whose values are all strings.
pub fn parse_headers(raw: &str) -> Result<Vec<BTreeMap<String, String>>> {
    let parsed: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => bail!("Failed to parse headers JSON: {}.", e),
    };

    let Value::Array(entries) = parsed else {
        bail!("Headers must be a JSON array.");
    };

    let mut headers = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let Value::Object(map) = entry else {
            bail!("Header entry at index {} must be an object.", index);
        };

        let mut record = BTreeMap::new();
        for (key, value) in map {
            match value {
                Value::String(text) => {
                    record.insert(key, text);
                }
                _ => bail!(
                    "Header value for \"{}\" at index {} must be a string.",
                    key,
                    index
                ),
            }
        }
        headers.push(record);
    }

    Ok(headers)
}
