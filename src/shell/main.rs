use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use attendance::adapters::in_memory::clock::SystemClock;
use attendance::adapters::in_memory::fixed_holiday_calendar::FixedHolidayCalendar;
use attendance::adapters::in_memory::in_memory_pay_configs::InMemoryPayConfigs;
use attendance::adapters::in_memory::in_memory_work_day_store::InMemoryWorkDayStore;
use attendance::application::offline_cache::OfflineCache;
use attendance::application::reconciler::Reconciler;
use attendance::application::service::AttendanceService;
use attendance::shell::http::router;
use attendance::shell::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let addr: SocketAddr = env_or("ATTENDANCE_ADDR", "0.0.0.0:8080").parse()?;
    let reconcile_every =
        Duration::from_secs(env_or("ATTENDANCE_RECONCILE_SECS", "30").parse()?);
    let max_sync_attempts: u32 = env_or("ATTENDANCE_MAX_SYNC_ATTEMPTS", "10").parse()?;

    // In-memory deps for now; the durable store port is where a relational
    // backend plugs in.
    let store = Arc::new(InMemoryWorkDayStore::new());
    let cache = Arc::new(OfflineCache::new());
    let clock = Arc::new(SystemClock);
    let calendar = Arc::new(FixedHolidayCalendar::new());
    let configs = Arc::new(InMemoryPayConfigs::new());

    let service = Arc::new(AttendanceService::new(
        store.clone(),
        cache.clone(),
        clock.clone(),
        calendar,
        configs,
    ));
    let reconciler = Arc::new(Reconciler::new(store, cache, clock, max_sync_attempts));

    {
        let reconciler = reconciler.clone();
        let service = service.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(reconcile_every);
            loop {
                ticker.tick().await;
                reconciler.drain_once().await;
                service.sweep_stale().await;
            }
        });
    }

    let app = router(AppState {
        service,
        reconciler,
    })
    .layer(TraceLayer::new_for_http());

    info!("attendance API listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
