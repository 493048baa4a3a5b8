// HTTP inbound adapter: thin route handlers over the attendance service.
//
// Status mapping
// - 200 applied and durable, 202 accepted but buffered offline,
//   409 illegal transition, 422 malformed input, 404 nothing recorded today,
//   500 backend failure.

use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::application::errors::ServiceError;
use crate::application::service::Accepted;
use crate::shell::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/clock-in", post(clock_in))
        .route("/break-start", post(break_start))
        .route("/break-end", post(break_end))
        .route("/clock-out", post(clock_out))
        .route("/records/today/{worker_id}", get(today_record))
        .route("/payroll/{worker_id}", get(payroll))
        .route("/sync/status", get(sync_status))
        .route("/sync/reconcile", post(reconcile))
        .with_state(state)
}

#[derive(Deserialize)]
struct ClockBody {
    worker_id: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct PayrollQuery {
    from: NaiveDate,
    to: NaiveDate,
}

async fn clock_in(
    State(state): State<AppState>,
    body: Result<Json<ClockBody>, JsonRejection>,
) -> axum::response::Response {
    let Ok(Json(body)) = body else {
        return StatusCode::UNPROCESSABLE_ENTITY.into_response();
    };
    into_clock_response(state.service.clock_in(&body.worker_id).await)
}

async fn break_start(
    State(state): State<AppState>,
    body: Result<Json<ClockBody>, JsonRejection>,
) -> axum::response::Response {
    let Ok(Json(body)) = body else {
        return StatusCode::UNPROCESSABLE_ENTITY.into_response();
    };
    into_clock_response(state.service.break_start(&body.worker_id).await)
}

async fn break_end(
    State(state): State<AppState>,
    body: Result<Json<ClockBody>, JsonRejection>,
) -> axum::response::Response {
    let Ok(Json(body)) = body else {
        return StatusCode::UNPROCESSABLE_ENTITY.into_response();
    };
    into_clock_response(state.service.break_end(&body.worker_id).await)
}

async fn clock_out(
    State(state): State<AppState>,
    body: Result<Json<ClockBody>, JsonRejection>,
) -> axum::response::Response {
    let Ok(Json(body)) = body else {
        return StatusCode::UNPROCESSABLE_ENTITY.into_response();
    };
    into_clock_response(state.service.clock_out(&body.worker_id).await)
}

async fn today_record(
    State(state): State<AppState>,
    Path(worker_id): Path<String>,
) -> axum::response::Response {
    match state.service.today_record(&worker_id).await {
        Ok(Some(day)) => (StatusCode::OK, Json(day)).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => into_error_response(err),
    }
}

async fn payroll(
    State(state): State<AppState>,
    Path(worker_id): Path<String>,
    Query(range): Query<PayrollQuery>,
) -> axum::response::Response {
    match state.service.payroll(&worker_id, range.from, range.to).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => into_error_response(err),
    }
}

async fn sync_status(State(state): State<AppState>) -> axum::response::Response {
    (StatusCode::OK, Json(state.service.cache_status().await)).into_response()
}

async fn reconcile(State(state): State<AppState>) -> axum::response::Response {
    (StatusCode::OK, Json(state.reconciler.drain_once().await)).into_response()
}

fn into_clock_response(result: Result<Accepted, ServiceError>) -> axum::response::Response {
    match result {
        Ok(accepted) if accepted.durable => (StatusCode::OK, Json(accepted)).into_response(),
        Ok(accepted) => (StatusCode::ACCEPTED, Json(accepted)).into_response(),
        Err(err) => into_error_response(err),
    }
}

fn into_error_response(err: ServiceError) -> axum::response::Response {
    let status = match &err {
        ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Conflict(_) => StatusCode::CONFLICT,
        ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod attendance_http_inbound_tests {
    use super::*;
    use crate::adapters::in_memory::clock::ManualClock;
    use crate::adapters::in_memory::fixed_holiday_calendar::FixedHolidayCalendar;
    use crate::adapters::in_memory::in_memory_pay_configs::InMemoryPayConfigs;
    use crate::adapters::in_memory::in_memory_work_day_store::InMemoryWorkDayStore;
    use crate::application::offline_cache::OfflineCache;
    use crate::application::reconciler::Reconciler;
    use crate::application::service::AttendanceService;
    use crate::core::pay_config::PayConfig;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::NaiveDate;
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct TestContext {
        state: AppState,
        store: Arc<InMemoryWorkDayStore>,
        clock: Arc<ManualClock>,
    }

    fn make_test_context() -> TestContext {
        let store = Arc::new(InMemoryWorkDayStore::new());
        let cache = Arc::new(OfflineCache::new());
        let clock = Arc::new(ManualClock::starting_at(
            NaiveDate::from_ymd_opt(2025, 6, 2)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        ));
        let configs = Arc::new(InMemoryPayConfigs::new());
        configs.insert("worker-0001", PayConfig::hourly(1000));
        let service = Arc::new(AttendanceService::new(
            store.clone(),
            cache.clone(),
            clock.clone(),
            Arc::new(FixedHolidayCalendar::new()),
            configs,
        ));
        let reconciler = Arc::new(Reconciler::new(store.clone(), cache, clock.clone(), 3));
        TestContext {
            state: AppState {
                service,
                reconciler,
            },
            store,
            clock,
        }
    }

    fn clock_request(route: &str) -> Request<Body> {
        Request::post(route)
            .header("content-type", "application/json")
            .body(Body::from(r#"{"worker_id":"worker-0001"}"#))
            .unwrap()
    }

    #[tokio::test]
    async fn it_should_return_200_with_the_record_on_a_valid_clock_in() {
        let context = make_test_context();
        let response = router(context.state)
            .oneshot(clock_request("/clock-in"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["durable"], true);
        assert_eq!(json["work_day"]["status"], "working");
    }

    #[tokio::test]
    async fn it_should_return_409_on_an_illegal_transition() {
        let context = make_test_context();
        let response = router(context.state)
            .oneshot(clock_request("/break-end"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "not currently on break");
    }

    #[tokio::test]
    async fn it_should_return_422_on_invalid_json() {
        let context = make_test_context();
        let response = router(context.state)
            .oneshot(
                Request::post("/clock-in")
                    .header("content-type", "application/json")
                    .body(Body::from("not-json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn it_should_return_202_while_the_store_is_offline() {
        let context = make_test_context();
        context.store.set_offline(true);
        let response = router(context.state)
            .oneshot(clock_request("/clock-in"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["durable"], false);
    }

    #[tokio::test]
    async fn it_should_return_404_when_nothing_was_recorded_today() {
        let context = make_test_context();
        let response = router(context.state)
            .oneshot(
                Request::get("/records/today/worker-0001")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn it_should_return_the_record_after_a_clock_in() {
        let context = make_test_context();
        let app = router(context.state);
        app.clone().oneshot(clock_request("/clock-in")).await.unwrap();

        let response = app
            .oneshot(
                Request::get("/records/today/worker-0001")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["worker_id"], "worker-0001");
    }

    #[tokio::test]
    async fn it_should_report_a_payroll_breakdown_over_a_range() {
        let context = make_test_context();
        let app = router(context.state);
        app.clone().oneshot(clock_request("/clock-in")).await.unwrap();
        context.clock.set(
            NaiveDate::from_ymd_opt(2025, 6, 2)
                .unwrap()
                .and_hms_opt(18, 0, 0)
                .unwrap(),
        );
        app.clone().oneshot(clock_request("/clock-out")).await.unwrap();

        let response = app
            .oneshot(
                Request::get("/payroll/worker-0001?from=2025-06-02&to=2025-06-02")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["regular_minutes"], 480);
        assert_eq!(json["overtime_minutes"], 60);
    }

    #[tokio::test]
    async fn it_should_expose_cache_status_and_force_reconcile() {
        let context = make_test_context();
        context.store.set_offline(true);
        let app = router(context.state);
        app.clone().oneshot(clock_request("/clock-in")).await.unwrap();

        let response = app
            .clone()
            .oneshot(Request::get("/sync/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["pending"], 1);

        context.store.set_offline(false);
        let response = app
            .clone()
            .oneshot(
                Request::post("/sync/reconcile")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["success"], 1);

        let response = app
            .oneshot(Request::get("/sync/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["pending"], 0);
    }
}
