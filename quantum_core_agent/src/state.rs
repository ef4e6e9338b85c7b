//! Shared agent state: the local sampler behind an async mutex.

use std::sync::Arc;

use quantum_core::sampler::LocalSampler;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    // CPU share is a delta against the previous sample, so requests share one sampler
    pub sampler: Arc<Mutex<LocalSampler>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            sampler: Arc::new(Mutex::new(LocalSampler::new())),
        }
    }
}
