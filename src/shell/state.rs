use crate::application::reconciler::Reconciler;
use crate::application::service::AttendanceService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AttendanceService>,
    pub reconciler: Arc<Reconciler>,
}
