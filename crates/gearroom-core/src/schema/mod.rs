//! Column layouts for tabular booking and item rows.
//!
//! The spreadsheet layout belongs to the storage side; this crate only
//! consumes the column offsets. Both maps deserialize from configuration so
//! the layout can change without touching the model.

use serde::{Deserialize, Serialize};

/// Column offsets of a booking row.
///
/// The default layout is the order produced by [`crate::Form::to_array`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormColumns {
    pub id: usize,
    pub start_time: usize,
    pub end_time: usize,
    pub location: usize,
    pub booking_id: usize,
    pub booked_students: usize,
    pub contact: usize,
    pub project: usize,
    pub tape: usize,
    pub overnight: usize,
    pub students: usize,
    pub items: usize,
    pub notes: usize,
}

impl Default for FormColumns {
    fn default() -> Self {
        Self {
            id: 0,
            start_time: 1,
            end_time: 2,
            location: 3,
            booking_id: 4,
            booked_students: 5,
            contact: 6,
            project: 7,
            tape: 8,
            overnight: 9,
            students: 10,
            items: 11,
            notes: 12,
        }
    }
}

/// Column offsets of an inventory row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemColumns {
    pub barcode: usize,
    pub id: usize,
    pub make: usize,
    pub model: usize,
    pub description: usize,
}

impl Default for ItemColumns {
    fn default() -> Self {
        Self {
            barcode: 0,
            id: 1,
            make: 2,
            model: 3,
            description: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_form_columns_are_distinct() {
        let c = FormColumns::default();
        let mut all = vec![
            c.id,
            c.start_time,
            c.end_time,
            c.location,
            c.booking_id,
            c.booked_students,
            c.contact,
            c.project,
            c.tape,
            c.overnight,
            c.students,
            c.items,
            c.notes,
        ];
        all.sort_unstable();
        all.dedup();
        assert_eq!(all, (0..13).collect::<Vec<_>>());
    }

    #[test]
    fn test_partial_layout_keeps_defaults() {
        let columns: ItemColumns = serde_json::from_str(r#"{"description": 7}"#).unwrap();
        assert_eq!(columns.description, 7);
        assert_eq!(columns.barcode, 0);
        assert_eq!(columns.model, 3);
    }
}
