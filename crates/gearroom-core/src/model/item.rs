use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ops::RangeInclusive;

use crate::coerce::{self, cell, field, is_truthy, to_loose_string};
use crate::schema::ItemColumns;

/// Barcodes reserved for bulk consumables that are not tracked one by one.
pub const BULK_BARCODES: RangeInclusive<f64> = 10000.0..=10100.0;

/// One physical asset checked out as part of a booking.
///
/// Items are immutable: every state change goes through a `with_*` method
/// that consumes the item and returns a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Map<String, Value>")]
pub struct Item {
    barcode: String,
    id: String,
    description: String,
    notes: String,

    /// Set when the item cannot be found as the booking is closed.
    missing: bool,

    quantity: u32,
    time_checked_in_by_client: String,
    time_checked_in_by_server: String,
    time_checked_out_by_client: String,
    time_checked_out_by_server: String,
}

impl Item {
    #[must_use]
    pub fn new(
        barcode: impl Into<String>,
        id: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            barcode: barcode.into(),
            id: id.into(),
            description: description.into(),
            notes: String::new(),
            missing: false,
            quantity: 1,
            time_checked_in_by_client: String::new(),
            time_checked_in_by_server: String::new(),
            time_checked_out_by_client: String::new(),
            time_checked_out_by_server: String::new(),
        }
    }

    /// Build an item from an inventory spreadsheet row.
    ///
    /// The description is "make model" when both are present, otherwise the
    /// row's own description cell.
    #[must_use]
    pub fn from_row(row: &[Value], columns: &ItemColumns) -> Self {
        let make = cell(row, columns.make);
        let model = cell(row, columns.model);
        let description = if is_truthy(make) && is_truthy(model) {
            format!("{} {}", to_loose_string(make), to_loose_string(model))
        } else {
            to_loose_string(cell(row, columns.description))
        };

        Self::new(
            to_loose_string(cell(row, columns.barcode)),
            to_loose_string(cell(row, columns.id)),
            description,
        )
    }

    /// Rebuild an item from a stored record, coercing every field.
    #[must_use]
    pub fn from_record(record: &Map<String, Value>) -> Self {
        let text = |key: &str| to_loose_string(field(record, key));
        Self {
            barcode: text("barcode"),
            id: text("id"),
            description: text("description"),
            notes: text("notes"),
            missing: is_truthy(field(record, "missing")),
            quantity: coerce::to_quantity(field(record, "quantity")),
            time_checked_in_by_client: text("timeCheckedInByClient"),
            time_checked_in_by_server: text("timeCheckedInByServer"),
            time_checked_out_by_client: text("timeCheckedOutByClient"),
            time_checked_out_by_server: text("timeCheckedOutByServer"),
        }
    }

    #[must_use]
    pub fn barcode(&self) -> &str {
        &self.barcode
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }

    #[must_use]
    pub const fn missing(&self) -> bool {
        self.missing
    }

    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    #[must_use]
    pub fn time_checked_in_by_client(&self) -> &str {
        &self.time_checked_in_by_client
    }

    #[must_use]
    pub fn time_checked_in_by_server(&self) -> &str {
        &self.time_checked_in_by_server
    }

    #[must_use]
    pub fn time_checked_out_by_client(&self) -> &str {
        &self.time_checked_out_by_client
    }

    #[must_use]
    pub fn time_checked_out_by_server(&self) -> &str {
        &self.time_checked_out_by_server
    }

    /// Whether this is an individually tracked asset.
    ///
    /// Barcodes inside [`BULK_BARCODES`] (inclusive) denote consumables, and
    /// a blank or non-numeric barcode is never serialized.
    #[must_use]
    pub fn is_serialized(&self) -> bool {
        !self.barcode.is_empty()
            && coerce::parse_number(&self.barcode).is_some_and(|n| !BULK_BARCODES.contains(&n))
    }

    /// Whether the server recorded this item leaving.
    #[must_use]
    pub fn is_checked_out(&self) -> bool {
        !self.time_checked_out_by_server.is_empty()
    }

    /// Whether the item is accounted for: never left, came back, or was
    /// written off as missing.
    #[must_use]
    pub fn is_returned(&self) -> bool {
        !self.is_checked_out() || !self.time_checked_in_by_server.is_empty() || self.missing
    }

    /// Whether the client reported a checkout the server has not stamped.
    #[must_use]
    pub fn needs_server_checkout(&self) -> bool {
        !self.time_checked_out_by_client.is_empty() && self.time_checked_out_by_server.is_empty()
    }

    /// Whether the client reported a check-in the server has not stamped.
    #[must_use]
    pub fn needs_server_check_in(&self) -> bool {
        !self.time_checked_in_by_client.is_empty() && self.time_checked_in_by_server.is_empty()
    }

    #[must_use]
    pub fn with_notes(self, notes: impl Into<String>) -> Self {
        Self {
            notes: notes.into(),
            ..self
        }
    }

    #[must_use]
    pub fn with_missing(self, missing: bool) -> Self {
        Self { missing, ..self }
    }

    #[must_use]
    pub fn with_quantity(self, quantity: u32) -> Self {
        Self {
            quantity: quantity.max(1),
            ..self
        }
    }

    #[must_use]
    pub fn with_time_checked_out_by_client(self, time: impl Into<String>) -> Self {
        Self {
            time_checked_out_by_client: time.into(),
            ..self
        }
    }

    #[must_use]
    pub fn with_time_checked_out_by_server(self, time: impl Into<String>) -> Self {
        Self {
            time_checked_out_by_server: time.into(),
            ..self
        }
    }

    #[must_use]
    pub fn with_time_checked_in_by_client(self, time: impl Into<String>) -> Self {
        Self {
            time_checked_in_by_client: time.into(),
            ..self
        }
    }

    #[must_use]
    pub fn with_time_checked_in_by_server(self, time: impl Into<String>) -> Self {
        Self {
            time_checked_in_by_server: time.into(),
            ..self
        }
    }
}

impl From<Map<String, Value>> for Item {
    fn from(record: Map<String, Value>) -> Self {
        Self::from_record(&record)
    }
}
