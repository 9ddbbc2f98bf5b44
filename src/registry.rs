//! Model registry
//!
//! Process-wide holder for the current trained model. The model and its
//! feature contract live in one [`TrainedModel`] value, so a retrain swaps
//! both together: readers observe either the old consistent pair or the new
//! one, never a mismatched combination.

use crate::learned::TrainedModel;
use std::sync::{Arc, RwLock};

/// Atomically-swappable holder for the current model/contract pair.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    current: RwLock<Option<Arc<TrainedModel>>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current model, if one is trained. The returned handle stays valid
    /// across a concurrent `replace`.
    pub fn current(&self) -> Option<Arc<TrainedModel>> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Replace the current model wholesale. `None` clears it, putting every
    /// caller on the heuristic path.
    pub fn replace(&self, model: Option<TrainedModel>) {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = model.map(Arc::new);
    }
}
