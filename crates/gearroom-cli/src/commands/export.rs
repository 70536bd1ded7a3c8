use anyhow::{Context, Result};
use gearroom_core::Form;
use serde_json::Value;
use std::path::Path;

use crate::config::Config;
use crate::input;

/// Print each booking's content hash.
pub fn show_hashes(path: &Path, config: &Config) -> Result<()> {
    let mut forms = input::load_forms(path, &config.columns.forms)?;
    for line in hash_lines(&mut forms)? {
        println!("{}", line);
    }
    Ok(())
}

/// One `id<TAB>hash` line per booking, marking stored hashes that no longer
/// match the content.
fn hash_lines(forms: &mut [Form]) -> gearroom_core::Result<Vec<String>> {
    forms
        .iter_mut()
        .map(|form| -> gearroom_core::Result<String> {
            let stored = form.hash.clone();
            let current = form.set_hash(None)?.hash.clone();
            let marker = if stored.is_empty() || stored == current { "" } else { "  (changed)" };
            Ok(format!("{}\t{}{}", form.id, current, marker))
        })
        .collect()
}

/// Print bookings as storage rows.
pub fn run_export(path: &Path, config: &Config) -> Result<()> {
    let forms = input::load_forms(path, &config.columns.forms)?;
    let json = serde_json::to_string_pretty(&export_rows(&forms)?).context("Failed to encode rows")?;
    println!("{}", json);
    Ok(())
}

fn export_rows(forms: &[Form]) -> gearroom_core::Result<Vec<Vec<Value>>> {
    forms.iter().map(Form::to_array).collect()
}
