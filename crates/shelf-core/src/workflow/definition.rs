//! Data-driven workflow definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{MANIFESTATION_WORKFLOW, Workflow};
use crate::entities::Holding;
use crate::enums::Transition;
use crate::errors::CoreError;

/// One transition: fires from any of `from`, lands on `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TransitionDefinition {
    pub name: Transition,
    pub from: Vec<String>,
    pub to: String,
}

/// A workflow described entirely by configuration.
///
/// The built-in default is the `manifestation` workflow:
///
/// ```text
/// available ──reserve──▶ reserved
/// available ─┐
/// reserved  ─┴check_out▶ checked_out ──check_in──▶ available
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WorkflowDefinition {
    pub name: String,
    pub initial_place: String,
    pub places: Vec<String>,
    pub transitions: Vec<TransitionDefinition>,
}

impl Default for WorkflowDefinition {
    fn default() -> Self {
        let place = |s: &str| s.to_string();
        Self {
            name: MANIFESTATION_WORKFLOW.to_string(),
            initial_place: place("available"),
            places: vec![place("available"), place("reserved"), place("checked_out")],
            transitions: vec![
                TransitionDefinition {
                    name: Transition::Reserve,
                    from: vec![place("available")],
                    to: place("reserved"),
                },
                TransitionDefinition {
                    name: Transition::CheckOut,
                    from: vec![place("available"), place("reserved")],
                    to: place("checked_out"),
                },
                TransitionDefinition {
                    name: Transition::CheckIn,
                    from: vec![place("checked_out")],
                    to: place("available"),
                },
            ],
        }
    }
}

impl WorkflowDefinition {
    /// Check that every place the definition mentions is declared.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` naming the first undeclared place.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.places.is_empty() {
            return Err(CoreError::Validation(format!(
                "workflow '{}' declares no places",
                self.name
            )));
        }
        let declared = |place: &String| self.places.contains(place);
        if !declared(&self.initial_place) {
            return Err(CoreError::Validation(format!(
                "workflow '{}': initial place '{}' is not declared",
                self.name, self.initial_place
            )));
        }
        for transition in &self.transitions {
            if let Some(undeclared) = transition
                .from
                .iter()
                .chain(std::iter::once(&transition.to))
                .find(|place| !declared(place))
            {
                return Err(CoreError::Validation(format!(
                    "workflow '{}': transition '{}' references undeclared place '{undeclared}'",
                    self.name, transition.name
                )));
            }
        }
        Ok(())
    }

    fn transition(&self, name: Transition) -> Option<&TransitionDefinition> {
        self.transitions.iter().find(|t| t.name == name)
    }
}

pub(super) fn normalize_key(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

impl Workflow for WorkflowDefinition {
    fn name(&self) -> &str {
        &self.name
    }

    fn places(&self) -> &[String] {
        &self.places
    }

    fn initial_place(&self) -> &str {
        &self.initial_place
    }

    fn can(&self, holding: &Holding, transition: Transition) -> bool {
        self.transition(transition)
            .is_some_and(|t| t.from.iter().any(|place| *place == holding.place))
    }

    fn apply(&self, holding: &mut Holding, transition: Transition) -> Result<(), CoreError> {
        let target = self
            .transition(transition)
            .filter(|t| t.from.iter().any(|place| *place == holding.place))
            .map(|t| t.to.clone())
            .ok_or_else(|| CoreError::InvalidTransition {
                entity: "Manifestation".to_string(),
                id: holding.identifier.clone(),
                from: holding.place.clone(),
                transition: transition.to_string(),
            })?;
        holding.place = target;
        Ok(())
    }
}
