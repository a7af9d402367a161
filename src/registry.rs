//! The set of models declared by one configuration load.
//!
//! A registry is built fresh for every invocation: `new`, `register` each
//! declared model, resolve triggers against it, then drop it.

use crate::model::{Model, ModelId};
use crate::trigger::TriggerPattern;
use std::ops::Index;

#[derive(Debug, Default, Clone)]
pub struct ModelRegistry {
    models: Vec<Model>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self { models: vec![] }
    }

    /// Appends a model in declaration order and returns its identity.
    pub fn register(&mut self, model: Model) -> ModelId {
        let id = ModelId(self.models.len());
        tracing::trace!(%id, trigger = %model.trigger, label = %model.label, "registered model");
        self.models.push(model);
        id
    }

    /// Models matching `pattern`, in registry order.
    ///
    /// A literal pattern returns every model registered under exactly that
    /// trigger; a wildcard pattern returns every model whose trigger matches.
    pub fn all_for_trigger(&self, pattern: &str) -> Vec<ModelId> {
        let pattern = TriggerPattern::parse(pattern);
        self.iter()
            .filter(|(_, model)| pattern.matches(&model.trigger))
            .map(|(id, _)| id)
            .collect()
    }

    pub fn get(&self, id: ModelId) -> Option<&Model> {
        self.models.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModelId, &Model)> {
        self.models
            .iter()
            .enumerate()
            .map(|(index, model)| (ModelId(index), model))
    }

    /// Distinct triggers in first-declaration order.
    pub fn triggers(&self) -> Vec<&str> {
        let mut triggers: Vec<&str> = vec![];
        for model in &self.models {
            if !triggers.contains(&model.trigger.as_str()) {
                triggers.push(&model.trigger);
            }
        }
        triggers
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Removes every model. Never called while a run is in progress.
    pub fn clear(&mut self) {
        self.models.clear();
    }
}

impl Index<ModelId> for ModelRegistry {
    type Output = Model;

    fn index(&self, id: ModelId) -> &Model {
        &self.models[id.0]
    }
}
