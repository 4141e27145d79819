//! Constrained ad-hoc query facility: denylist filtering, execution with
//! tabular result shaping, and schema introspection.

pub mod executor;
pub mod filter;
pub mod introspect;

pub use executor::{run_query, QueryOutcome};
pub use filter::check_query;
pub use introspect::{sample_rows, schema, SamplePage, SchemaInfo};
