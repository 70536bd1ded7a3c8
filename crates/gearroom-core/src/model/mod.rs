pub mod form;
pub mod item;
pub mod student;

pub use form::{BookingStatus, Form, NO_SHOW_GRACE_MINUTES};
pub use item::{Item, BULK_BARCODES};
pub use student::Student;
