//! Status workflow capability.
//!
//! A holding's lifecycle place is driven by a named state machine the engine
//! treats as opaque: it asks [`Workflow::can`] and, only when that succeeds,
//! calls [`Workflow::apply`]. A refused guard is not an error; the caller skips
//! the transition and carries on with ledger state as the source of truth.
//!
//! Place names and transition guards are data ([`WorkflowDefinition`]) loaded
//! from configuration at startup.

mod definition;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub use definition::{TransitionDefinition, WorkflowDefinition};

use crate::entities::Holding;
use crate::enums::Transition;
use crate::errors::CoreError;

/// Name of the workflow that governs holdings.
pub const MANIFESTATION_WORKFLOW: &str = "manifestation";

pub trait Workflow: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Every place a holding may occupy under this workflow.
    fn places(&self) -> &[String];

    /// Place a newly registered holding starts in.
    fn initial_place(&self) -> &str;

    /// Map a loosely written place name onto a declared place.
    ///
    /// Matching ignores case, surrounding whitespace, and the difference
    /// between `_`, `-`, and runs of spaces. `active` is accepted as a synonym
    /// for `available` when the workflow declares `available`.
    fn normalize_place(&self, raw: &str) -> Option<&str> {
        let wanted = definition::normalize_key(raw);
        if wanted.is_empty() {
            return None;
        }
        let places = self.places();
        let found = places
            .iter()
            .find(|place| definition::normalize_key(place) == wanted);
        match found {
            Some(place) => Some(place.as_str()),
            None if wanted == "active" => places
                .iter()
                .find(|place| definition::normalize_key(place) == "available")
                .map(String::as_str),
            None => None,
        }
    }

    /// Like [`normalize_place`](Self::normalize_place) but fails on unknown input.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if `raw` does not name a declared place.
    fn assert_valid_place(&self, raw: &str) -> Result<String, CoreError> {
        self.normalize_place(raw)
            .map(str::to_string)
            .ok_or_else(|| CoreError::Validation(format!("Invalid status value: '{raw}'")))
    }

    /// Guard: whether `transition` may fire from the holding's current place.
    fn can(&self, holding: &Holding, transition: Transition) -> bool;

    /// Move the holding to the transition's target place.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` when the guard refuses.
    fn apply(&self, holding: &mut Holding, transition: Transition) -> Result<(), CoreError>;
}

/// Named workflows available to the engine.
#[derive(Debug, Clone, Default)]
pub struct WorkflowRegistry {
    workflows: HashMap<String, Arc<dyn Workflow>>,
}

impl WorkflowRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding only the built-in `manifestation` workflow.
    #[must_use]
    pub fn with_default() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(WorkflowDefinition::default()));
        registry
    }

    /// Register a workflow under its own name, replacing any previous one.
    pub fn register(&mut self, workflow: Arc<dyn Workflow>) {
        self.workflows.insert(workflow.name().to_string(), workflow);
    }

    /// Look up a workflow by name.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` if no workflow is registered under `name`.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Workflow>, CoreError> {
        self.workflows
            .get(name)
            .cloned()
            .ok_or_else(|| CoreError::NotFound {
                entity: "Workflow".to_string(),
                id: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_manifestation_workflow() {
        let registry = WorkflowRegistry::with_default();
        let workflow = registry.get(MANIFESTATION_WORKFLOW).unwrap();
        assert_eq!(workflow.name(), "manifestation");
        assert_eq!(workflow.places().len(), 3);
    }

    #[test]
    fn missing_workflow_is_not_found() {
        let registry = WorkflowRegistry::new();
        let err = registry.get("serial").unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
        assert_eq!(err.to_string(), "Workflow not found: serial");
    }
}
