//! Reading and writing booking files.
//!
//! A booking file is a JSON array. Each entry is either a spreadsheet row
//! (a JSON array, read with the configured column layout) or a stored
//! record (a JSON object).

use anyhow::{Context, Result};
use gearroom_core::{Error, Form, FormColumns};
use serde_json::Value;
use std::path::Path;

pub fn load_forms(path: &Path, columns: &FormColumns) -> Result<Vec<Form>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let parsed: Value = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    let forms = parse_forms(parsed, columns)?;
    log::info!("Loaded {} bookings from {}", forms.len(), path.display());
    Ok(forms)
}

pub fn parse_forms(parsed: Value, columns: &FormColumns) -> gearroom_core::Result<Vec<Form>> {
    let Value::Array(entries) = parsed else {
        return Err(Error::InvalidData(String::from(
            "expected a JSON array of booking rows or records",
        )));
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            Value::Array(row) => Ok(Form::from_row(&row, columns)),
            Value::Object(record) => Ok(Form::from_record(&record)),
            other => Err(Error::InvalidData(format!(
                "entry {} is neither a row nor a record: {}",
                index, other
            ))),
        })
        .collect()
}

pub fn save_forms(path: &Path, forms: &[Form]) -> Result<()> {
    let json = serde_json::to_string_pretty(forms).context("Failed to encode bookings")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote {} bookings to {}", forms.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_parse_mixed_rows_and_records() {
        let input = json!([
            ["17", "2026-03-16 09:00", "2026-03-16 13:00", "Studio A", "", "", "", "", false, false, "[]", "[]", "[]"],
            {"id": "18", "location": "Studio B"},
        ]);
        let forms = parse_forms(input, &FormColumns::default()).unwrap();
        assert_eq!(forms.len(), 2);
        assert_eq!(forms[0].id, "17");
        assert_eq!(forms[0].start_time, "2026-03-16T09:00:00Z");
        assert_eq!(forms[1].location, "Studio B");
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let err = parse_forms(json!({"id": "1"}), &FormColumns::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_parse_rejects_scalar_entries() {
        let err = parse_forms(json!([{"id": "1"}, 5]), &FormColumns::default()).unwrap_err();
        assert!(err.to_string().contains("entry 1"));
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bookings.json");

        let mut form = Form::new("42");
        form.location = String::from("Studio C");
        form.set_hash(None).unwrap();

        save_forms(&path, std::slice::from_ref(&form)).unwrap();
        let loaded = load_forms(&path, &FormColumns::default()).unwrap();

        assert_eq!(loaded, vec![form]);
        assert!(loaded[0].has_current_hash());
    }
}
