use std::fmt;
use std::sync::Arc;

use scanbridge_core::{
    DeviceRegistry, DuplicateGuard, IngestPipeline, ProductAnnotator, ScanRecordStore,
};

use crate::infra::config::Config;
use crate::infra::fanout::FanoutHub;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<DeviceRegistry>,
    pub hub: Arc<FanoutHub>,
    pub pipeline: Arc<IngestPipeline>,
    pub guard: Arc<DuplicateGuard>,
    pub store: Arc<dyn ScanRecordStore>,
    pub annotator: Option<Arc<dyn ProductAnnotator>>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
