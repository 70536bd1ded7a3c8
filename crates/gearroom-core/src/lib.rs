//! Core booking model for gearroom.
//!
//! This crate defines the equipment-rental records (Form, Item, Student),
//! the rules that derive a booking's lifecycle state from them, and the
//! normalization that turns raw spreadsheet rows into typed records.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod coerce;
pub mod dates;
pub mod digest;
pub mod error;
pub mod model;
pub mod schema;

pub use error::{Error, Result};
pub use model::{BookingStatus, Form, Item, Student};
pub use schema::{FormColumns, ItemColumns};
