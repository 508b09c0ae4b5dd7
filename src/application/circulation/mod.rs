mod errors;
mod service;

pub use errors::{CirculationError, Result};
pub use service::{ServiceDependencies, checkout, find_open_entry, list_overdue, return_book};
