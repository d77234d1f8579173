//! Model catalog and selector state.

use tracing::info;

use jarvis_types::error::ModelError;
use jarvis_types::model::{builtin_models, ModelInfo, DEFAULT_MODEL_ID};

/// The selectable models, exactly one of which is selected.
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    models: Vec<ModelInfo>,
    selected: usize,
    selector_open: bool,
}

impl ModelCatalog {
    /// The built-in catalog with the default model selected.
    pub fn new() -> Self {
        let models = builtin_models();
        let selected = models
            .iter()
            .position(|m| m.id == DEFAULT_MODEL_ID)
            .unwrap_or(0);
        Self {
            models,
            selected,
            selector_open: false,
        }
    }

    pub fn models(&self) -> &[ModelInfo] {
        &self.models
    }

    pub fn selected(&self) -> &ModelInfo {
        &self.models[self.selected]
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected().id == id
    }

    /// Select a model by id and close the selector.
    pub fn select(&mut self, id: &str) -> Result<&ModelInfo, ModelError> {
        let index = self
            .models
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| ModelError::NotFound(id.to_string()))?;
        self.selected = index;
        self.selector_open = false;
        info!(model = id, "model selected");
        Ok(&self.models[index])
    }

    pub fn open_selector(&mut self) {
        self.selector_open = true;
    }

    pub fn close_selector(&mut self) {
        self.selector_open = false;
    }

    pub fn is_selector_open(&self) -> bool {
        self.selector_open
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::new()
    }
}
