//! HTTP handlers, one module per service area.

pub mod directory;
pub mod participation;
pub mod reports;
pub mod sql;
