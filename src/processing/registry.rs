//! Model registry: loads one engine handle per model variant, once.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::core::{Event, EventSender, FatalError, ModelKind};
use crate::processing::Engine;
use crate::utils::ModelLoadError;
use crate::worker::WorkerError;

/// Immutable mapping from every model variant to its loaded handle.
#[derive(Debug)]
pub struct ModelSessions<H> {
    handles: HashMap<ModelKind, H>,
}

impl<H> ModelSessions<H> {
    /// Builds the mapping, failing if any variant is missing.
    pub fn new(handles: HashMap<ModelKind, H>) -> Result<Self, ModelLoadError> {
        let missing: Vec<ModelKind> = ModelKind::ALL
            .into_iter()
            .filter(|model| !handles.contains_key(model))
            .collect();
        if !missing.is_empty() {
            return Err(ModelLoadError::Incomplete { missing });
        }
        Ok(Self { handles })
    }

    pub fn get(&self, model: ModelKind) -> Option<&H> {
        self.handles.get(&model)
    }

    /// Loaded models in declaration order
    pub fn models(&self) -> Vec<ModelKind> {
        ModelKind::ALL
            .into_iter()
            .filter(|model| self.handles.contains_key(model))
            .collect()
    }
}

/// Loads every model with at most `concurrency` loads in flight.
///
/// Stops at the first failure; nothing partial is returned.
pub async fn load_models<E: Engine>(
    engine: Arc<E>,
    concurrency: usize,
) -> Result<ModelSessions<E::Handle>, ModelLoadError> {
    let concurrency = concurrency.max(1);
    let mut remaining = ModelKind::ALL.into_iter();
    let mut loading = JoinSet::new();
    let mut handles = HashMap::new();

    loop {
        while loading.len() < concurrency {
            let Some(model) = remaining.next() else {
                break;
            };
            debug!("Loading model {}", model);
            let engine = Arc::clone(&engine);
            loading.spawn_blocking(move || (model, engine.load_model(model)));
        }

        let Some(joined) = loading.join_next().await else {
            break;
        };
        let (model, result) = joined.map_err(|e| {
            ModelLoadError::Aborted(WorkerError::from_join("model-registry", e).to_string())
        })?;

        match result {
            Ok(handle) => {
                debug!("Model {} loaded", model);
                handles.insert(model, handle);
            }
            Err(e) => {
                // Loads already running cannot be interrupted; their results are dropped.
                loading.abort_all();
                return Err(ModelLoadError::Failed {
                    model,
                    source: e.into(),
                });
            }
        }
    }

    ModelSessions::new(handles)
}

/// Loads the models on a separate task and reports the outcome as one event.
pub fn spawn_registry<E: Engine>(engine: Arc<E>, concurrency: usize, events: EventSender<E::Handle>) {
    tokio::spawn(async move {
        let event = match load_models(engine, concurrency).await {
            Ok(sessions) => {
                info!("Loaded {} models", sessions.models().len());
                Event::ModelsLoaded(Arc::new(sessions))
            }
            Err(e) => {
                error!("Model registry failed: {}", e);
                Event::Fatal(FatalError::model_load(&e))
            }
        };
        if events.send(event).is_err() {
            debug!("Session closed before the model registry finished");
        }
    });
}
