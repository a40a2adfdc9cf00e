// Device model registry

use super::model::DeviceModel;
use crate::civ::error::{RadioError, RadioResult};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Models keyed by id, matched case-insensitively
#[derive(Debug, Default, Clone)]
pub struct DeviceRegistry {
    models: HashMap<String, Arc<DeviceModel>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with every built-in model
    pub fn with_builtin_models() -> Self {
        let mut registry = Self::new();
        for model in super::builtin_models() {
            registry.register(model);
        }
        registry
    }

    /// Add a model, returning the one it replaced
    pub fn register(&mut self, model: DeviceModel) -> Option<Arc<DeviceModel>> {
        let key = model.id.to_ascii_lowercase();
        self.models.insert(key, Arc::new(model))
    }

    pub fn lookup(&self, id: &str) -> RadioResult<Arc<DeviceModel>> {
        self.models
            .get(&id.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| RadioError::UnsupportedDevice(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.models.contains_key(&id.to_ascii_lowercase())
    }

    /// All models, sorted by id
    pub fn list(&self) -> Vec<Arc<DeviceModel>> {
        let mut models: Vec<_> = self.models.values().cloned().collect();
        models.sort_by(|a, b| a.id.cmp(&b.id));
        models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Global model registry
lazy_static::lazy_static! {
    static ref MODEL_REGISTRY: RwLock<DeviceRegistry> = RwLock::new(DeviceRegistry::new());
}

/// Register a model in the global registry
pub fn register_model(model: DeviceModel) {
    tracing::debug!("Registering device model {}", model.id);
    MODEL_REGISTRY
        .write()
        .unwrap_or_else(|e| e.into_inner())
        .register(model);
}

/// Look up a model in the global registry
pub fn lookup_model(id: &str) -> RadioResult<Arc<DeviceModel>> {
    MODEL_REGISTRY
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .lookup(id)
}

/// List all models in the global registry
pub fn list_models() -> Vec<Arc<DeviceModel>> {
    MODEL_REGISTRY
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .list()
}
