// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{config::Config, generator::QuizGenerator, store::DynStore};

#[derive(Clone)]
pub struct AppState {
    pub store: DynStore,
    pub generator: Arc<dyn QuizGenerator>,
    pub config: Config,
}

impl FromRef<AppState> for DynStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Arc<dyn QuizGenerator> {
    fn from_ref(state: &AppState) -> Self {
        state.generator.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
