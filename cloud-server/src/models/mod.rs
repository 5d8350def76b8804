//! Data models

pub mod envelope;
pub mod record;

pub use envelope::*;
pub use record::*;
