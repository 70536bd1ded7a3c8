use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::coerce::{cell, field, is_truthy, to_loose_string};
use crate::dates;
use crate::digest;
use crate::error::{Error, Result};
use crate::model::{Item, Student};
use crate::schema::FormColumns;

/// Minutes after the start time before a booking with no arrivals is a no-show.
pub const NO_SHOW_GRACE_MINUTES: i64 = 30;

/// One booking: a time window and location, the gear going out, and the
/// students borrowing it.
///
/// Lifecycle state (no-show, active, returned, ready to close) is derived
/// from the items and students on every call and never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Map<String, Value>")]
pub struct Form {
    /// Expected headcount or roster reference, as entered.
    pub booked_students: String,
    pub booking_id: String,
    pub contact: String,
    pub end_time: String,

    /// Fingerprint of the booking's content, empty until computed.
    pub hash: String,

    /// Empty for a booking that has not been saved yet.
    pub id: String,

    pub items: Vec<Item>,
    pub location: String,
    pub notes: Vec<Value>,
    pub overnight: bool,
    pub project: String,
    pub start_time: String,
    pub students: Vec<Student>,
    pub tape: bool,
}

/// Snapshot of a booking's derived state at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingStatus {
    pub is_no_show: bool,
    pub has_active_student: bool,
    pub all_gear_returned: bool,
    pub is_ready_to_close: bool,
}

impl Form {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Build a booking from a spreadsheet row.
    ///
    /// The students, items and notes cells hold JSON. A cell that does not
    /// decode yields an empty list rather than an error.
    #[must_use]
    pub fn from_row(row: &[Value], columns: &FormColumns) -> Self {
        let text = |index: usize| to_loose_string(cell(row, index));
        Self {
            booked_students: text(columns.booked_students),
            booking_id: text(columns.booking_id),
            contact: text(columns.contact),
            end_time: dates::normalize_cell(cell(row, columns.end_time)),
            hash: String::new(),
            id: text(columns.id),
            items: decode_list(cell(row, columns.items), "items"),
            location: text(columns.location),
            notes: decode_list(cell(row, columns.notes), "notes"),
            overnight: is_truthy(cell(row, columns.overnight)),
            project: text(columns.project),
            start_time: dates::normalize_cell(cell(row, columns.start_time)),
            students: decode_list(cell(row, columns.students), "students"),
            tape: is_truthy(cell(row, columns.tape)),
        }
    }

    /// Rebuild a booking from a stored record.
    ///
    /// Absent or empty fields fall back to `""`, `false` or an empty list.
    #[must_use]
    pub fn from_record(record: &Map<String, Value>) -> Self {
        let text = |key: &str| {
            let value = field(record, key);
            if is_truthy(value) {
                to_loose_string(value)
            } else {
                String::new()
            }
        };
        Self {
            booked_students: text("bookedStudents"),
            booking_id: text("bookingId"),
            contact: text("contact"),
            end_time: text("endTime"),
            hash: text("hash"),
            id: text("id"),
            items: decode_list(field(record, "items"), "items"),
            location: text("location"),
            notes: decode_list(field(record, "notes"), "notes"),
            overnight: is_truthy(field(record, "overnight")),
            project: text("project"),
            start_time: text("startTime"),
            students: decode_list(field(record, "students"), "students"),
            tape: is_truthy(field(record, "tape")),
        }
    }

    /// Every item that went out has come back or been marked missing.
    #[must_use]
    pub fn all_gear_returned(&self) -> bool {
        self.items.iter().all(Item::is_returned)
    }

    /// Number of students checked in and not yet checked out or gone.
    #[must_use]
    pub fn active_student_count(&self) -> usize {
        self.students.iter().filter(|s| s.is_active()).count()
    }

    /// Whether more than one student is still on site.
    ///
    /// A single active student does not count; closing logic relies on the
    /// threshold being two.
    #[must_use]
    pub fn has_active_student(&self) -> bool {
        self.active_student_count() > 1
    }

    /// [`Form::is_no_show_at`] evaluated against the system clock.
    #[must_use]
    pub fn is_no_show(&self) -> bool {
        self.is_no_show_at(Utc::now())
    }

    /// Whether the grace period after the start time has passed with nobody
    /// checked in.
    ///
    /// Unsaved bookings and bookings whose start time does not parse (or
    /// sits too close to the end of the calendar to add the grace period)
    /// are never no-shows.
    #[must_use]
    pub fn is_no_show_at(&self, now: DateTime<Utc>) -> bool {
        if self.id.is_empty() {
            return false;
        }
        let Some(start) = dates::parse_date_time(&self.start_time) else {
            return false;
        };
        let Some(deadline) = start.checked_add_signed(Duration::minutes(NO_SHOW_GRACE_MINUTES)) else {
            return false;
        };

        now > deadline && !self.students.iter().any(Student::is_checked_in)
    }

    /// Whether the booking can be archived: somebody showed up, nobody is
    /// still on site, and all gear is accounted for.
    #[must_use]
    pub fn is_ready_to_close(&self) -> bool {
        if self.has_active_student() || !self.all_gear_returned() {
            return false;
        }
        self.students.iter().any(Student::is_checked_in)
            && self.students.iter().all(Student::is_settled)
    }

    #[must_use]
    pub fn status_at(&self, now: DateTime<Utc>) -> BookingStatus {
        BookingStatus {
            is_no_show: self.is_no_show_at(now),
            has_active_student: self.has_active_student(),
            all_gear_returned: self.all_gear_returned(),
            is_ready_to_close: self.is_ready_to_close(),
        }
    }

    /// Set the content hash.
    ///
    /// A non-empty `hash` is stored as given. Otherwise the hash is cleared
    /// and recomputed over the booking's JSON, so a stale value never feeds
    /// into the new one.
    pub fn set_hash(&mut self, hash: Option<&str>) -> Result<&mut Self> {
        match hash.filter(|h| !h.is_empty()) {
            Some(hash) => self.hash = hash.to_owned(),
            None => {
                self.hash.clear();
                self.hash = digest::fingerprint(&self.to_json()?);
            }
        }
        Ok(self)
    }

    /// Whether the stored hash matches the booking's current content.
    #[must_use]
    pub fn has_current_hash(&self) -> bool {
        if self.hash.is_empty() {
            return false;
        }
        let mut unhashed = self.clone();
        unhashed.hash.clear();
        unhashed
            .to_json()
            .is_ok_and(|json| digest::fingerprint(&json) == self.hash)
    }

    /// The JSON snapshot the content hash is computed over.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Flatten to a storage row.
    ///
    /// The column order is fixed and matches [`FormColumns::default`].
    pub fn to_array(&self) -> Result<Vec<Value>> {
        Ok(vec![
            Value::from(self.id.as_str()),
            Value::from(self.start_time.as_str()),
            Value::from(self.end_time.as_str()),
            Value::from(self.location.as_str()),
            Value::from(self.booking_id.as_str()),
            Value::from(self.booked_students.as_str()),
            Value::from(self.contact.as_str()),
            Value::from(self.project.as_str()),
            Value::Bool(self.tape),
            Value::Bool(self.overnight),
            Value::String(serde_json::to_string(&self.students)?),
            Value::String(serde_json::to_string(&self.items)?),
            Value::String(serde_json::to_string(&self.notes)?),
        ])
    }

    /// [`Form::validate_at`] evaluated against the system clock.
    pub fn validate(&mut self) -> Result<()> {
        self.validate_at(Utc::now())
    }

    /// Stamp pending server times onto items, then check required fields.
    ///
    /// An item gets at most one stamp per call, checkout before check-in.
    /// Required fields are checked in order (start time, end time, location,
    /// students) and the first empty one is reported.
    pub fn validate_at(&mut self, now: DateTime<Utc>) -> Result<()> {
        let stamp = dates::format_date_time(now);
        self.items = std::mem::take(&mut self.items)
            .into_iter()
            .map(|item| {
                if item.needs_server_checkout() {
                    log::debug!("Stamping server checkout for item {} on booking {}", item.id(), self.id);
                    item.with_time_checked_out_by_server(stamp.as_str())
                } else if item.needs_server_check_in() {
                    log::debug!("Stamping server check-in for item {} on booking {}", item.id(), self.id);
                    item.with_time_checked_in_by_server(stamp.as_str())
                } else {
                    item
                }
            })
            .collect();

        let required = [
            ("start time", self.start_time.as_str(), self.start_time.is_empty()),
            ("end time", self.end_time.as_str(), self.end_time.is_empty()),
            ("location", self.location.as_str(), self.location.is_empty()),
            ("students", "", self.students.is_empty()),
        ];
        match required.into_iter().find(|(_, _, empty)| *empty) {
            Some((field, value, _)) => Err(Error::InvalidForm {
                field,
                value: value.to_owned(),
            }),
            None => Ok(()),
        }
    }

    /// A new booking id: the current time in epoch milliseconds.
    ///
    /// Not collision-proof; creation is expected to be serialized by the
    /// datastore.
    #[must_use]
    pub fn create_id() -> String {
        Utc::now().timestamp_millis().to_string()
    }
}

impl From<Map<String, Value>> for Form {
    fn from(record: Map<String, Value>) -> Self {
        Self::from_record(&record)
    }
}

/// Decode a JSON list from a cell or record field.
///
/// Text that is not a JSON list yields an empty list. Within a list, only
/// the entries that do not decode are dropped.
fn decode_list<T: DeserializeOwned>(value: &Value, label: &str) -> Vec<T> {
    let entries = match value {
        Value::String(text) if text.trim().is_empty() => return Vec::new(),
        Value::String(text) => match serde_json::from_str::<Option<Vec<Value>>>(text) {
            Ok(entries) => entries.unwrap_or_default(),
            Err(e) => {
                log::debug!("Discarding undecodable {}: {}", label, e);
                return Vec::new();
            }
        },
        Value::Array(entries) => entries.clone(),
        _ => return Vec::new(),
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                log::debug!("Skipping {} entry {}: {}", label, index, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 16, h, m, 0).unwrap()
    }

    fn booking() -> Form {
        let mut form = Form::new("1773651600000");
        form.start_time = String::from("2026-03-16T09:00:00Z");
        form.end_time = String::from("2026-03-16T17:00:00Z");
        form.location = String::from("Studio A");
        form
    }

    fn checked_in(id: &str) -> Student {
        Student::new(id, id).with_check_in("2026-03-16T09:10:00Z")
    }

    #[test]
    fn test_decode_list_tolerates_garbage() {
        let items: Vec<Item> = decode_list(&json!("{not json"), "items");
        assert!(items.is_empty());
        let items: Vec<Item> = decode_list(&json!("null"), "items");
        assert!(items.is_empty());
        let items: Vec<Item> = decode_list(&json!(""), "items");
        assert!(items.is_empty());
        let items: Vec<Item> = decode_list(&json!(17), "items");
        assert!(items.is_empty());
        let items: Vec<Item> = decode_list(&json!(r#"{"barcode": "1"}"#), "items");
        assert!(items.is_empty());
    }

    #[test]
    fn test_decode_list_reads_strings_and_arrays() {
        let notes: Vec<Value> = decode_list(&json!(r#"["bring batteries"]"#), "notes");
        assert_eq!(notes, vec![json!("bring batteries")]);
        let notes: Vec<Value> = decode_list(&json!(["late pickup"]), "notes");
        assert_eq!(notes, vec![json!("late pickup")]);
    }

    #[test]
    fn test_from_record_defaults() {
        let form: Form = serde_json::from_value(json!({"id": "5", "tape": null})).unwrap();
        assert_eq!(form.id, "5");
        assert_eq!(form.location, "");
        assert!(form.items.is_empty());
        assert!(form.students.is_empty());
        assert!(form.notes.is_empty());
        assert!(!form.tape);
        assert!(!form.overnight);
    }

    #[test]
    fn test_all_gear_returned_vacuous() {
        assert!(booking().all_gear_returned());
    }

    #[test]
    fn test_single_active_student_is_not_active() {
        let mut form = booking();
        form.students = vec![checked_in("a")];
        assert_eq!(form.active_student_count(), 1);
        assert!(!form.has_active_student());

        form.students.push(checked_in("b"));
        assert!(form.has_active_student());
    }

    #[test]
    fn test_no_show_needs_saved_id() {
        let mut form = booking();
        form.id.clear();
        assert!(!form.is_no_show_at(at(12, 0)));
    }

    #[test]
    fn test_no_show_with_unparseable_start() {
        let mut form = booking();
        form.start_time = String::from("TBD");
        assert!(!form.is_no_show_at(at(23, 0)));
    }

    #[test]
    fn test_no_show_with_start_at_end_of_calendar() {
        let mut form = booking();
        form.start_time = String::from("+262142-12-31T23:59:59");
        assert!(!form.is_no_show_at(at(23, 0)));
        assert!(!form.status_at(at(23, 0)).is_no_show);
    }

    #[test]
    fn test_decode_list_keeps_good_entries() {
        let items: Vec<Item> = decode_list(
            &json!(r#"[{"barcode": "20001", "timeCheckedOutByServer": "t"}, null]"#),
            "items",
        );
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].barcode(), "20001");

        let students: Vec<Student> = decode_list(&json!([{"id": "a", "checkIn": "t"}, "Bob"]), "students");
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].id, "a");
    }

    #[test]
    fn test_mixed_payload_keeps_gear_outstanding() {
        let mut row = booking().to_array().unwrap();
        row[10] = json!(r#"[{"id": "a", "checkIn": "t"}, "Bob"]"#);
        row[11] = json!(r#"[{"barcode": "20001", "timeCheckedOutByServer": "t"}, null]"#);
        let form = Form::from_row(&row, &FormColumns::default());

        assert_eq!(form.students.len(), 1);
        assert_eq!(form.items.len(), 1);
        assert!(!form.all_gear_returned());
        assert!(!form.is_ready_to_close());
    }

    #[test]
    fn test_ready_to_close_needs_someone_checked_in() {
        let mut form = booking();
        form.students = vec![Student::new("a", "Ada")];
        assert!(!form.is_ready_to_close());

        form.students = vec![checked_in("a").with_check_out("2026-03-16T12:00:00Z")];
        assert!(form.is_ready_to_close());
    }

    #[test]
    fn test_status_at() {
        let mut form = booking();
        form.students = vec![checked_in("a").with_left(true)];
        let status = form.status_at(at(12, 0));
        assert_eq!(
            status,
            BookingStatus {
                is_no_show: false,
                has_active_student: false,
                all_gear_returned: true,
                is_ready_to_close: true,
            }
        );
    }

    #[test]
    fn test_set_hash_verbatim() {
        let mut form = booking();
        form.set_hash(Some("imported")).unwrap();
        assert_eq!(form.hash, "imported");
        assert!(!form.has_current_hash());
    }

    #[test]
    fn test_set_hash_ignores_stale_value() {
        let mut fresh = booking();
        fresh.set_hash(None).unwrap();

        let mut stale = booking();
        stale.hash = String::from("left over from last week");
        stale.set_hash(None).unwrap();

        assert_eq!(fresh.hash, stale.hash);
        assert!(stale.has_current_hash());
    }

    #[test]
    fn test_validate_stamps_checkout_before_check_in() {
        let mut form = booking();
        form.students = vec![checked_in("a")];
        form.items = vec![Item::new("20001", "cam", "Camera")
            .with_time_checked_out_by_client("2026-03-16T09:05:00Z")
            .with_time_checked_in_by_client("2026-03-16T11:00:00Z")];

        form.validate_at(at(9, 6)).unwrap();
        assert_eq!(form.items[0].time_checked_out_by_server(), "2026-03-16T09:06:00Z");
        assert_eq!(form.items[0].time_checked_in_by_server(), "");

        form.validate_at(at(11, 1)).unwrap();
        assert_eq!(form.items[0].time_checked_out_by_server(), "2026-03-16T09:06:00Z");
        assert_eq!(form.items[0].time_checked_in_by_server(), "2026-03-16T11:01:00Z");
    }

    #[test]
    fn test_validate_required_field_order() {
        let mut form = booking();
        form.location.clear();
        let err = form.validate_at(at(9, 0)).unwrap_err();
        assert!(matches!(err, Error::InvalidForm { field: "location", .. }));

        let mut form = booking();
        let err = form.validate_at(at(9, 0)).unwrap_err();
        assert_eq!(err.to_string(), "Invalid students: ");
    }

    #[test]
    fn test_create_id_is_numeric() {
        let id = Form::create_id();
        assert!(id.parse::<i64>().is_ok_and(|millis| millis > 0));
    }

    #[test]
    fn test_to_array_order() {
        let mut form = booking();
        form.booking_id = String::from("BK-12");
        form.tape = true;
        let row = form.to_array().unwrap();

        assert_eq!(row.len(), 13);
        assert_eq!(row[0], json!("1773651600000"));
        assert_eq!(row[3], json!("Studio A"));
        assert_eq!(row[4], json!("BK-12"));
        assert_eq!(row[8], json!(true));
        assert_eq!(row[9], json!(false));
        assert_eq!(row[10], json!("[]"));
    }
}
