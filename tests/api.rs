//! End-to-end coverage over an in-memory SQLite store: rule chains,
//! reports, and the constrained query facility.

use campus_events::models::{FeedbackRequest, NewCollege, NewEvent, NewStudent, ParticipationRequest};
use campus_events::service::{DirectoryService, ParticipationService, ReportService};
use campus_events::sql::{run_query, sample_rows, schema};
use campus_events::{api_routes, apply_schema, AppError, AppState};
use chrono::{DateTime, Duration, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

async fn test_pool() -> SqlitePool {
    // A single connection so every statement sees the same in-memory db.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    apply_schema(&pool).await.expect("schema");
    pool
}

async fn college(pool: &SqlitePool) -> i64 {
    DirectoryService::create_college(
        pool,
        &NewCollege {
            name: format!("college-{}", rand_tag()),
            location: "North Campus".into(),
        },
    )
    .await
    .expect("college")
    .id
}

fn rand_tag() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos()
}

async fn student(pool: &SqlitePool, college_id: i64, email: &str) -> i64 {
    DirectoryService::create_student(
        pool,
        &NewStudent {
            name: "Test Student".into(),
            email: email.into(),
            college_id,
        },
    )
    .await
    .expect("student")
    .id
}

async fn event(
    pool: &SqlitePool,
    college_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    max_capacity: i64,
) -> i64 {
    DirectoryService::create_event(
        pool,
        &NewEvent {
            title: "Tech Talk".into(),
            description: "A talk".into(),
            college_id,
            start_time: start,
            end_time: end,
            location: "Auditorium".into(),
            max_capacity,
        },
    )
    .await
    .expect("event")
    .id
}

fn pair(student_id: i64, event_id: i64) -> ParticipationRequest {
    ParticipationRequest { student_id, event_id }
}

#[tokio::test]
async fn student_creation_checks_college_then_email() {
    let pool = test_pool().await;
    let cid = college(&pool).await;

    let missing_college = DirectoryService::create_student(
        &pool,
        &NewStudent {
            name: "X".into(),
            email: "x@example.edu".into(),
            college_id: 9999,
        },
    )
    .await;
    assert!(matches!(missing_college, Err(AppError::NotFound(_))));

    student(&pool, cid, "dup@example.edu").await;
    let duplicate = DirectoryService::create_student(
        &pool,
        &NewStudent {
            name: "Y".into(),
            email: "dup@example.edu".into(),
            college_id: cid,
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn event_times_must_be_ordered() {
    let pool = test_pool().await;
    let cid = college(&pool).await;
    let now = Utc::now();

    let backwards = DirectoryService::create_event(
        &pool,
        &NewEvent {
            title: "Bad".into(),
            description: "".into(),
            college_id: cid,
            start_time: now + Duration::hours(2),
            end_time: now + Duration::hours(1),
            location: "".into(),
            max_capacity: 10,
        },
    )
    .await;
    assert!(matches!(backwards, Err(AppError::InvalidInput(_))));
}

#[tokio::test]
async fn cancel_is_idempotent_and_freezes_registration() {
    let pool = test_pool().await;
    let cid = college(&pool).await;
    let now = Utc::now();
    let eid = event(&pool, cid, now + Duration::hours(1), now + Duration::hours(2), 10).await;
    let sid = student(&pool, cid, "cancel@example.edu").await;

    let first = DirectoryService::cancel_event(&pool, eid).await.unwrap();
    assert!(first.is_cancelled);
    let second = DirectoryService::cancel_event(&pool, eid).await.unwrap();
    assert!(second.is_cancelled);

    let blocked = ParticipationService::register(&pool, &pair(sid, eid), now).await;
    assert!(matches!(blocked, Err(AppError::PolicyViolation(_))));
}

#[tokio::test]
async fn existence_checks_precede_state_checks() {
    let pool = test_pool().await;
    let cid = college(&pool).await;
    let now = Utc::now();
    let eid = event(&pool, cid, now + Duration::hours(1), now + Duration::hours(2), 10).await;
    DirectoryService::cancel_event(&pool, eid).await.unwrap();

    // Unknown student against a cancelled event reports the student.
    let err = ParticipationService::register(&pool, &pair(9999, eid), now)
        .await
        .unwrap_err();
    match err {
        AppError::NotFound(msg) => assert!(msg.contains("student")),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn registration_enforces_window_duplicates_and_capacity() {
    let pool = test_pool().await;
    let cid = college(&pool).await;
    let now = Utc::now();
    let eid = event(&pool, cid, now + Duration::hours(1), now + Duration::hours(2), 2).await;

    let a = student(&pool, cid, "a@example.edu").await;
    let b = student(&pool, cid, "b@example.edu").await;
    let c = student(&pool, cid, "c@example.edu").await;

    ParticipationService::register(&pool, &pair(a, eid), now).await.unwrap();
    let dup = ParticipationService::register(&pool, &pair(a, eid), now).await;
    assert!(matches!(dup, Err(AppError::Conflict(_))));

    // Fill to capacity, then one more.
    ParticipationService::register(&pool, &pair(b, eid), now).await.unwrap();
    let full = ParticipationService::register(&pool, &pair(c, eid), now).await;
    assert!(matches!(full, Err(AppError::PolicyViolation(_))));

    // A started event refuses new sign-ups.
    let started = event(&pool, cid, now + Duration::hours(1), now + Duration::hours(2), 10).await;
    let late = ParticipationService::register(
        &pool,
        &pair(c, started),
        now + Duration::hours(1),
    )
    .await;
    assert!(matches!(late, Err(AppError::PolicyViolation(_))));
}

#[tokio::test]
async fn check_in_requires_registration_and_active_window() {
    let pool = test_pool().await;
    let cid = college(&pool).await;
    let now = Utc::now();
    // Starts in 20 minutes: registration is open and the grace band
    // already covers the present.
    let eid = event(
        &pool,
        cid,
        now + Duration::minutes(20),
        now + Duration::hours(2),
        10,
    )
    .await;
    let sid = student(&pool, cid, "checkin@example.edu").await;

    let unregistered = ParticipationService::check_in(&pool, &pair(sid, eid), now).await;
    assert!(matches!(unregistered, Err(AppError::PolicyViolation(_))));

    ParticipationService::register(&pool, &pair(sid, eid), now).await.unwrap();
    ParticipationService::check_in(&pool, &pair(sid, eid), now).await.unwrap();

    let again = ParticipationService::check_in(&pool, &pair(sid, eid), now).await;
    assert!(matches!(again, Err(AppError::Conflict(_))));

    // An event more than 30 minutes out is not yet active.
    let distant = event(
        &pool,
        cid,
        now + Duration::hours(3),
        now + Duration::hours(4),
        10,
    )
    .await;
    ParticipationService::register(&pool, &pair(sid, distant), now).await.unwrap();
    let early = ParticipationService::check_in(&pool, &pair(sid, distant), now).await;
    assert!(matches!(early, Err(AppError::PolicyViolation(_))));
}

#[tokio::test]
async fn feedback_requires_attendance_and_valid_rating() {
    let pool = test_pool().await;
    let cid = college(&pool).await;
    let now = Utc::now();
    let eid = event(
        &pool,
        cid,
        now + Duration::minutes(20),
        now + Duration::hours(2),
        10,
    )
    .await;
    let sid = student(&pool, cid, "fb@example.edu").await;
    ParticipationService::register(&pool, &pair(sid, eid), now).await.unwrap();

    // Rating range is checked before the attendance requirement.
    for rating in [0, 6, -1] {
        let out_of_range = ParticipationService::submit_feedback(
            &pool,
            &FeedbackRequest { student_id: sid, event_id: eid, rating, comment: None },
            now,
        )
        .await;
        assert!(matches!(out_of_range, Err(AppError::InvalidInput(_))));
    }

    let unattended = ParticipationService::submit_feedback(
        &pool,
        &FeedbackRequest { student_id: sid, event_id: eid, rating: 4, comment: None },
        now,
    )
    .await;
    assert!(matches!(unattended, Err(AppError::PolicyViolation(_))));

    ParticipationService::check_in(&pool, &pair(sid, eid), now).await.unwrap();
    let feedback = ParticipationService::submit_feedback(
        &pool,
        &FeedbackRequest {
            student_id: sid,
            event_id: eid,
            rating: 4,
            comment: Some("solid talk".into()),
        },
        now,
    )
    .await
    .unwrap();
    assert_eq!(feedback.rating, 4);

    let duplicate = ParticipationService::submit_feedback(
        &pool,
        &FeedbackRequest { student_id: sid, event_id: eid, rating: 5, comment: None },
        now,
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn event_report_distinguishes_zero_from_absent() {
    let pool = test_pool().await;
    let cid = college(&pool).await;
    let now = Utc::now();
    let eid = event(&pool, cid, now + Duration::hours(1), now + Duration::hours(2), 10).await;

    let empty = ReportService::event_report(&pool, eid).await.unwrap();
    assert_eq!(empty.total_registrations, 0);
    assert_eq!(empty.attendance_percentage, 0.0);
    assert_eq!(empty.average_feedback, None);
    assert_eq!(empty.total_feedback_count, 0);
}

#[tokio::test]
async fn reports_aggregate_counts_percentages_and_averages() {
    let pool = test_pool().await;
    let cid = college(&pool).await;
    let now = Utc::now();
    let eid = event(
        &pool,
        cid,
        now + Duration::minutes(20),
        now + Duration::hours(2),
        10,
    )
    .await;
    let a = student(&pool, cid, "ra@example.edu").await;
    let b = student(&pool, cid, "rb@example.edu").await;

    for sid in [a, b] {
        ParticipationService::register(&pool, &pair(sid, eid), now).await.unwrap();
    }
    ParticipationService::check_in(&pool, &pair(a, eid), now).await.unwrap();
    ParticipationService::check_in(&pool, &pair(b, eid), now).await.unwrap();
    for (sid, rating) in [(a, 4), (b, 5)] {
        ParticipationService::submit_feedback(
            &pool,
            &FeedbackRequest { student_id: sid, event_id: eid, rating, comment: None },
            now,
        )
        .await
        .unwrap();
    }

    let report = ReportService::event_report(&pool, eid).await.unwrap();
    assert_eq!(report.total_registrations, 2);
    assert_eq!(report.total_attendance, 2);
    assert_eq!(report.attendance_percentage, 100.0);
    assert_eq!(report.average_feedback, Some(4.5));
    assert_eq!(report.total_feedback_count, 2);

    let student_report = ReportService::student_report(&pool, a).await.unwrap();
    assert_eq!(student_report.total_events_attended, 1);
    assert_eq!(student_report.average_feedback_given, Some(4.0));
    assert!(!student_report.college_name.is_empty());

    // Second event with no activity: college report lists both, id order.
    let later = event(&pool, cid, now + Duration::hours(3), now + Duration::hours(4), 5).await;
    let college_report = ReportService::college_events_report(&pool, cid).await.unwrap();
    assert_eq!(college_report.len(), 2);
    assert_eq!(college_report[0].event_id, eid);
    assert_eq!(college_report[1].event_id, later);
    assert_eq!(college_report[1].average_feedback, None);
}

#[tokio::test]
async fn partial_attendance_rounds_percentage() {
    let pool = test_pool().await;
    let cid = college(&pool).await;
    let now = Utc::now();
    let eid = event(
        &pool,
        cid,
        now + Duration::minutes(20),
        now + Duration::hours(2),
        10,
    )
    .await;
    let emails = ["p1@example.edu", "p2@example.edu", "p3@example.edu"];
    let mut ids = Vec::new();
    for email in emails {
        let sid = student(&pool, cid, email).await;
        ParticipationService::register(&pool, &pair(sid, eid), now).await.unwrap();
        ids.push(sid);
    }
    ParticipationService::check_in(&pool, &pair(ids[0], eid), now).await.unwrap();

    let report = ReportService::event_report(&pool, eid).await.unwrap();
    assert_eq!(report.total_registrations, 3);
    assert_eq!(report.total_attendance, 1);
    assert_eq!(report.attendance_percentage, 33.33);
}

#[tokio::test]
async fn query_executor_runs_select_and_shapes_rows() {
    let pool = test_pool().await;
    let outcome = run_query(&pool, "select 1 as one").await.unwrap();
    assert_eq!(outcome.columns, vec!["one"]);
    assert_eq!(outcome.row_count, 1);
    assert_eq!(outcome.rows[0][0], serde_json::json!(1));
    assert!(outcome.execution_time >= 0.0);

    // Zero rows: the column list is empty (known asymmetry).
    let empty = run_query(&pool, "select * from colleges").await.unwrap();
    assert_eq!(empty.row_count, 0);
    assert!(empty.columns.is_empty());
}

#[tokio::test]
async fn query_executor_rejects_and_reports() {
    let pool = test_pool().await;

    let dropped = run_query(&pool, "DROP TABLE events").await.unwrap_err();
    match dropped {
        AppError::QueryRejected(msg) => assert!(msg.contains("drop")),
        other => panic!("expected QueryRejected, got {:?}", other),
    }

    let commented = run_query(&pool, "select * from events; -- comment").await;
    assert!(matches!(commented, Err(AppError::QueryRejected(_))));

    let mutated = run_query(&pool, "update events set title='x'").await;
    assert!(matches!(mutated, Err(AppError::QueryRejected(_))));

    let broken = run_query(&pool, "select * from no_such_table").await;
    assert!(matches!(broken, Err(AppError::ExecutionError(_))));
}

#[tokio::test]
async fn introspection_lists_tables_and_columns() {
    let pool = test_pool().await;
    let info = schema(&pool).await.unwrap();
    assert_eq!(
        info.tables,
        vec!["attendance", "colleges", "events", "feedback", "registrations", "students"]
    );
    let events = &info.schema["events"];
    let id = events.columns.iter().find(|c| c.name == "id").unwrap();
    assert!(id.primary_key);
    let title = events.columns.iter().find(|c| c.name == "title").unwrap();
    assert!(title.not_null);
    assert!(!title.primary_key);
}

#[tokio::test]
async fn sample_preview_validates_table_name_first() {
    let pool = test_pool().await;
    college(&pool).await;

    let page = sample_rows(&pool, "colleges", 5).await.unwrap();
    assert_eq!(page.row_count, 1);
    assert!(page.columns.contains(&"name".to_string()));

    let injected = sample_rows(&pool, "events; drop", 5).await;
    assert!(matches!(injected, Err(AppError::InvalidInput(_))));

    let unknown = sample_rows(&pool, "no_such_table", 5).await;
    assert!(matches!(unknown, Err(AppError::ExecutionError(_))));
}

#[tokio::test]
async fn http_surface_round_trips() {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    let pool = test_pool().await;
    let state = AppState { pool };
    let app = api_routes(state);

    let created = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/colleges")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"name":"HTTP College","location":"Campus"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);

    let queried = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/sql/execute")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"query":"select name from colleges"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(queried.status(), StatusCode::OK);

    let rejected = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/sql/execute")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"query":"DROP TABLE events"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
}
