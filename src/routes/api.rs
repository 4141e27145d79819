//! Entity, participation, reporting, and SQL routes.

use crate::handlers::{directory, participation, reports, sql};
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/colleges",
            get(directory::list_colleges).post(directory::create_college),
        )
        .route(
            "/students",
            get(directory::list_students).post(directory::create_student),
        )
        .route("/students/:id", get(directory::get_student))
        .route(
            "/events",
            get(directory::list_events).post(directory::create_event),
        )
        .route("/events/:id", get(directory::get_event))
        .route("/events/:id/cancel", put(directory::cancel_event))
        .route("/registrations", post(participation::register))
        .route(
            "/registrations/student/:id",
            get(participation::student_registrations),
        )
        .route("/attendance", post(participation::check_in))
        .route("/feedback", post(participation::submit_feedback))
        .route("/reports/events/:id", get(reports::event_report))
        .route("/reports/students/:id", get(reports::student_report))
        .route(
            "/reports/colleges/:id/events",
            get(reports::college_events_report),
        )
        .route("/sql/execute", post(sql::execute_query))
        .route("/sql/schema", get(sql::schema))
        .route("/sql/sample/:table", get(sql::sample))
        .with_state(state)
}
