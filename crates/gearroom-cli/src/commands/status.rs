use anyhow::Result;
use chrono::{DateTime, Utc};
use gearroom_core::{BookingStatus, Form};
use std::path::Path;

use crate::config::Config;
use crate::input;

pub fn show_status(path: &Path, at: Option<DateTime<Utc>>, config: &Config) -> Result<()> {
    let forms = input::load_forms(path, &config.columns.forms)?;
    let now = at.unwrap_or_else(Utc::now);

    println!("\n📋 Gearroom Status\n");
    println!("  File: {}", path.display());
    println!("  As of: {}\n", gearroom_core::dates::format_date_time(now));

    for form in &forms {
        println!("{}", status_line(form, form.status_at(now)));
    }

    let closable = forms.iter().filter(|f| f.is_ready_to_close()).count();
    let no_shows = forms.iter().filter(|f| f.is_no_show_at(now)).count();
    println!("\n  {} bookings, {} ready to close, {} no-shows", forms.len(), closable, no_shows);

    Ok(())
}

fn status_line(form: &Form, status: BookingStatus) -> String {
    let id = if form.id.is_empty() { "<unsaved>" } else { form.id.as_str() };
    let mut flags = Vec::new();
    if status.is_no_show {
        flags.push("no-show");
    }
    if status.has_active_student {
        flags.push("active");
    }
    if !status.all_gear_returned {
        flags.push("gear-out");
    }
    if status.is_ready_to_close {
        flags.push("ready-to-close");
    }
    let flags = if flags.is_empty() { String::from("-") } else { flags.join(", ") };

    format!("  {:<16} {:<20} {:<22} {}", id, form.location, form.start_time, flags)
}
