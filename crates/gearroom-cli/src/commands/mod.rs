pub mod config;
pub mod export;
pub mod status;
pub mod validate;

pub use export::{run_export, show_hashes};
pub use status::show_status;
pub use validate::run_validate;
