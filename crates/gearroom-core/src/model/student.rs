use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::coerce::{loose_string, truthy};

/// A borrowing student's check record within a booking.
///
/// Keys this type does not know about are kept in `extra` and written back
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(default, deserialize_with = "loose_string")]
    pub id: String,

    #[serde(default, deserialize_with = "loose_string")]
    pub name: String,

    /// When the student arrived; empty until then.
    #[serde(default, deserialize_with = "loose_string")]
    pub check_in: String,

    #[serde(default, deserialize_with = "loose_string")]
    pub check_out: String,

    /// The student left without a formal check-out.
    #[serde(default, deserialize_with = "truthy")]
    pub left: bool,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Student {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_check_in(mut self, time: impl Into<String>) -> Self {
        self.check_in = time.into();
        self
    }

    #[must_use]
    pub fn with_check_out(mut self, time: impl Into<String>) -> Self {
        self.check_out = time.into();
        self
    }

    #[must_use]
    pub fn with_left(mut self, left: bool) -> Self {
        self.left = left;
        self
    }

    #[must_use]
    pub fn is_checked_in(&self) -> bool {
        !self.check_in.is_empty()
    }

    /// Checked in and still on site.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_checked_in() && !(self.has_checked_out() || self.left)
    }

    #[must_use]
    pub fn has_checked_out(&self) -> bool {
        !self.check_out.is_empty()
    }

    /// Nothing outstanding: never arrived, checked out, or left.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        !self.is_checked_in() || self.has_checked_out() || self.left
    }
}
