//! Step definitions and the pure queries the wizard runs over them.
//!
//! Progress is never stored. Which steps are valid, which are out of reach
//! and where an out-of-order visitor should be sent are all recomputed from
//! the ordered step list and the current form values.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::WizardError;
use crate::values::{field_is_filled, FormValues};

/// Identifier of a step, unique within a wizard
pub type StepId = String;

/// One page of the wizard as seen by progress tracking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,
    /// Fields that must all be filled for the step to count as valid
    #[serde(default)]
    pub fields: Vec<String>,
    pub url: String,
    /// Label for the button that advances past this step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_label: Option<String>,
}

impl Step {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Vec::new(),
            url: url.into(),
            next_label: None,
        }
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_next_label(mut self, label: impl Into<String>) -> Self {
        self.next_label = Some(label.into());
        self
    }

    /// Whether every required field is filled in `values`
    pub fn is_complete(&self, values: &FormValues) -> bool {
        self.fields.iter().all(|field| field_is_filled(values, field))
    }
}

/// Ids of the steps whose required fields are all filled, in step order
pub fn valid_steps(steps: &[Step], values: &FormValues) -> Vec<StepId> {
    steps
        .iter()
        .filter(|step| step.is_complete(values))
        .map(|step| step.id.clone())
        .collect()
}

/// Index of the last valid step, or -1 when none is valid or it is unknown
fn last_valid_index(steps: &[Step], valid: &[StepId]) -> isize {
    valid
        .last()
        .and_then(|last| steps.iter().position(|step| &step.id == last))
        .map_or(-1, |i| i as isize)
}

/// Ids of the steps that cannot be reached yet.
///
/// The step right after the last valid one is where the user is allowed
/// to be, so only steps from two past the last valid one are inactive.
/// With nothing valid, everything but the first step is inactive.
pub fn inactive_steps(steps: &[Step], valid: &[StepId]) -> Vec<StepId> {
    let start = (last_valid_index(steps, valid) + 2) as usize;
    steps.iter().skip(start).map(|step| step.id.clone()).collect()
}

/// The step the user is allowed to work on next
pub fn allowed_step<'a>(steps: &'a [Step], valid: &[StepId]) -> Option<&'a Step> {
    steps.get((last_valid_index(steps, valid) + 1) as usize)
}

/// Where to send a visitor who is viewing step `current` out of order.
///
/// `current == -1` means no step matched the route. Returns `None` when the
/// visitor may stay, otherwise the first step that is neither inactive nor
/// already valid (the first step if every step is one or the other).
pub fn redirect_target<'a>(
    steps: &'a [Step],
    valid: &[StepId],
    inactive: &[StepId],
    current: isize,
) -> Option<&'a Step> {
    let out_of_order = current == -1
        || usize::try_from(current)
            .ok()
            .and_then(|i| steps.get(i))
            .is_some_and(|step| inactive.contains(&step.id));

    if !out_of_order {
        return None;
    }

    steps
        .iter()
        .find(|step| !inactive.contains(&step.id) && !valid.contains(&step.id))
        .or_else(|| steps.first())
}

/// Read-only input for progress indicators
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub current: StepId,
    pub valid: Vec<StepId>,
    pub inactive: Vec<StepId>,
    pub options: Vec<Step>,
}

/// Ordered, id-unique list of steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRegistry {
    steps: Vec<Step>,
}

impl StepRegistry {
    pub fn new(steps: Vec<Step>) -> Result<Self, WizardError> {
        let mut seen = HashSet::new();
        for step in &steps {
            if !seen.insert(step.id.as_str()) {
                return Err(WizardError::DuplicateStep(step.id.clone()));
            }
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step at a route-derived index; negative or past-the-end is `None`
    pub fn get(&self, index: isize) -> Option<&Step> {
        usize::try_from(index).ok().and_then(|i| self.steps.get(i))
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.id == id)
    }

    pub fn valid_steps(&self, values: &FormValues) -> Vec<StepId> {
        valid_steps(&self.steps, values)
    }

    pub fn inactive_steps(&self, valid: &[StepId]) -> Vec<StepId> {
        inactive_steps(&self.steps, valid)
    }

    pub fn allowed_step(&self, valid: &[StepId]) -> Option<&Step> {
        allowed_step(&self.steps, valid)
    }

    pub fn redirect_target(&self, valid: &[StepId], current: isize) -> Option<&Step> {
        let inactive = self.inactive_steps(valid);
        redirect_target(&self.steps, valid, &inactive, current)
    }

    pub fn progress(&self, current: &Step, valid: &[StepId]) -> Progress {
        Progress {
            current: current.id.clone(),
            valid: valid.to_vec(),
            inactive: self.inactive_steps(valid),
            options: self.steps.clone(),
        }
    }
}
