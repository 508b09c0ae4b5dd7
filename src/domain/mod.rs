pub mod commands;
pub mod entry;
pub mod value_objects;

pub use entry::*;
pub use value_objects::*;
