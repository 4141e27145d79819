//! Campus event management backend: colleges, students, events,
//! registrations, attendance check-ins, and feedback, with reporting
//! endpoints and a restricted ad-hoc SQL query facility.

pub mod error;
pub mod handlers;
pub mod models;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use error::AppError;
pub use response::{success_many, success_one, success_one_ok};
pub use routes::{api_routes, common_routes};
pub use state::AppState;
pub use store::{apply_schema, connect_pool};
