//! Submission handling: the form-state bag, completion and reset hooks, and
//! the gate separating intermediate submits from the final one.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::Value;

use crate::codec::ValueCodec;
use crate::error::WizardError;
use crate::store::PersistenceStore;
use crate::values::FormValues;

/// Transient form-state flags shared with the form layer.
///
/// Also serves as the result handle passed to the completion handler,
/// which reports back through `set_submitting` and `set_status`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionBag {
    touched: BTreeSet<String>,
    submitting: bool,
    status: Option<String>,
}

impl SubmissionBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a field as touched by the user
    pub fn touch(&mut self, field: impl Into<String>) {
        self.touched.insert(field.into());
    }

    pub fn set_touched<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.touched = fields.into_iter().map(Into::into).collect();
    }

    pub fn touched(&self) -> &BTreeSet<String> {
        &self.touched
    }

    pub fn clear_touched(&mut self) {
        self.touched.clear();
    }

    pub fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }

    /// Whether a submit is in flight; the form layer disables its submit
    /// control while this is true
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn set_status(&mut self, status: Option<String>) {
        self.status = status;
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
}

/// Receives the final values of a finished wizard
pub trait CompletionHandler: Send + Sync {
    fn on_submit(&self, values: FormValues, bag: &mut SubmissionBag) -> anyhow::Result<()>;
}

impl<F> CompletionHandler for F
where
    F: Fn(FormValues, &mut SubmissionBag) -> anyhow::Result<()> + Send + Sync,
{
    fn on_submit(&self, values: FormValues, bag: &mut SubmissionBag) -> anyhow::Result<()> {
        self(values, bag)
    }
}

/// Reshapes values before they are saved on configured steps, e.g. to
/// drop a derived selection when the user revisits an earlier step
pub trait StorageResetHook: Send + Sync {
    fn reset(&self, values: FormValues, selected_slot: Option<&Value>) -> FormValues;
}

impl<F> StorageResetHook for F
where
    F: Fn(FormValues, Option<&Value>) -> FormValues + Send + Sync,
{
    fn reset(&self, values: FormValues, selected_slot: Option<&Value>) -> FormValues {
        self(values, selected_slot)
    }
}

/// What a submit did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Values were saved and the user was sent to the next page
    Advanced { to: String },
    /// The completion handler received the final values
    Completed,
}

/// Kind of submit for a page index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitKind {
    Intermediate,
    Final,
}

/// Decides whether a submit ends the wizard and runs the final path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionGate {
    total_pages: usize,
}

impl SubmissionGate {
    pub fn new(total_pages: usize) -> Self {
        Self { total_pages }
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn is_last_page(&self, current: isize) -> bool {
        self.total_pages > 0 && current == self.total_pages as isize - 1
    }

    pub fn classify(&self, current: isize) -> SubmitKind {
        if self.is_last_page(current) {
            SubmitKind::Final
        } else {
            SubmitKind::Intermediate
        }
    }

    /// Final submit: convert to storage form, clear the session and hand
    /// the values to the completion handler.
    pub fn finalize(
        &self,
        codec: &ValueCodec,
        store: &PersistenceStore,
        session_key: &str,
        handler: &Arc<dyn CompletionHandler>,
        values: &FormValues,
        bag: &mut SubmissionBag,
    ) -> Result<SubmitOutcome, WizardError> {
        let stored = codec.to_storage(values);
        store.clear(session_key)?;

        tracing::info!(session_key, fields = stored.len(), "Submitting completed wizard");
        handler
            .on_submit(stored, bag)
            .map_err(|e| WizardError::Completion(e.into()))?;

        Ok(SubmitOutcome::Completed)
    }
}
