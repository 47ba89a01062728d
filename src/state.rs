use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::quiz::store::{RecordStore, UserRecordStore};
use crate::quiz::{QuizConfig, QuizEngine};

pub type Engine = QuizEngine<RecordStore>;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    engine: Arc<Engine>,
}

impl AppState {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            engine,
        }
    }

    pub fn create_engine(store: RecordStore, seed: Option<u64>) -> Arc<Engine> {
        let config = QuizConfig::from_env();
        let engine = match seed {
            Some(seed) => QuizEngine::with_seed(config, store, seed),
            None => QuizEngine::new(config, store),
        };
        Arc::new(engine)
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn engine(&self) -> Arc<Engine> {
        Arc::clone(&self.engine)
    }

    pub fn store_backend(&self) -> &'static str {
        self.engine.store().backend()
    }
}
