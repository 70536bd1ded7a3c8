use anyhow::Result;
use chrono::{DateTime, Utc};
use gearroom_core::Form;
use std::path::Path;

use crate::config::Config;
use crate::input;

/// Validate every booking in a file, stamping pending server times.
///
/// With `write`, the stamped and re-hashed bookings replace the file's
/// contents, including bookings that failed validation.
pub fn run_validate(path: &Path, write: bool, config: &Config) -> Result<()> {
    let mut forms = input::load_forms(path, &config.columns.forms)?;
    let failures = validate_forms(&mut forms, Utc::now())?;

    if write {
        input::save_forms(path, &forms)?;
    }

    if failures > 0 {
        anyhow::bail!("{} of {} bookings failed validation", failures, forms.len());
    }

    println!("\nAll {} bookings valid", forms.len());
    Ok(())
}

/// Validate and re-hash each booking, returning how many failed.
///
/// Every booking is re-hashed, since stamping may have changed its items
/// even when a required field is missing.
fn validate_forms(forms: &mut [Form], now: DateTime<Utc>) -> gearroom_core::Result<usize> {
    let mut failures = 0;
    for form in forms.iter_mut() {
        match form.validate_at(now) {
            Ok(()) => println!("✓ {}", form.id),
            Err(e) => {
                failures += 1;
                log::warn!("Booking {} failed validation: {}", form.id, e);
                println!("✗ {}: {}", form.id, e);
            }
        }
        form.set_hash(None)?;
    }
    Ok(failures)
}
