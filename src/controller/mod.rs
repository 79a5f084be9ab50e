//! The stateful wizard orchestrator.
//!
//! The controller owns the in-progress form values and the steps they make
//! valid. The current step index belongs to whoever owns routing, so every
//! operation takes it as an argument instead of caching it.

mod options;
mod view;

use std::sync::Arc;

pub use options::{Page, WizardOptions, DEFAULT_SUBMIT_TEXT, DEFAULT_SUPPORT_MESSAGE};
pub use view::{PageAction, PageView, WizardView, DEFAULT_NEXT_LABEL, UNRECOVERABLE_TITLE};

use crate::error::WizardError;
use crate::navigation::Navigator;
use crate::steps::{StepId, StepRegistry};
use crate::store::{KeyValueStore, PersistenceStore};
use crate::submission::{
    CompletionHandler, StorageResetHook, SubmissionBag, SubmissionGate, SubmitKind, SubmitOutcome,
};
use crate::values::{merge_values, FieldErrors, FormValues};


/// Values and validity owned by one wizard session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WizardState {
    pub values: FormValues,
    pub valid_steps: Vec<StepId>,
}

/// Drives a multi-step form: validity, navigation, persistence, submission
pub struct WizardController {
    options: WizardOptions,
    registry: StepRegistry,
    store: PersistenceStore,
    navigator: Arc<dyn Navigator>,
    on_submit: Arc<dyn CompletionHandler>,
    storage_reset: Option<Arc<dyn StorageResetHook>>,
    gate: SubmissionGate,
    state: WizardState,
}

impl WizardController {
    /// Create a controller, restoring any session persisted under the
    /// configured key.
    ///
    /// Persisted values are already in display form and are used as-is.
    /// Without them, the caller's initial values are converted to display
    /// form once and become the seed.
    pub fn new(
        options: WizardOptions,
        store: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
        on_submit: Arc<dyn CompletionHandler>,
    ) -> Result<Self, WizardError> {
        if options.pages.is_empty() {
            return Err(WizardError::Config("a wizard needs at least one page".to_string()));
        }
        if options.routes.len() < options.pages.len() {
            return Err(WizardError::Config(format!(
                "{} pages but only {} routes",
                options.pages.len(),
                options.routes.len()
            )));
        }

        let registry = StepRegistry::new(options.steps.clone())?;
        let store = PersistenceStore::new(store);
        let gate = SubmissionGate::new(options.pages.len());

        let restored = store.load(&options.session_key);
        let restored_session = restored.is_some();
        let values = restored.unwrap_or_else(|| {
            options
                .initial_values
                .as_ref()
                .map(|initial| options.codec.to_display(initial))
                .unwrap_or_default()
        });
        let valid_steps = registry.valid_steps(&values);

        tracing::debug!(
            session_key = %options.session_key,
            restored = restored_session,
            valid = valid_steps.len(),
            "Wizard session initialized"
        );

        Ok(Self {
            options,
            registry,
            store,
            navigator,
            on_submit,
            storage_reset: None,
            gate,
            state: WizardState {
                values,
                valid_steps,
            },
        })
    }

    /// Run `hook` before saving on the configured reset steps
    pub fn with_storage_reset(mut self, hook: Arc<dyn StorageResetHook>) -> Self {
        self.storage_reset = Some(hook);
        self
    }

    pub fn options(&self) -> &WizardOptions {
        &self.options
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn values(&self) -> &FormValues {
        &self.state.values
    }

    pub fn valid_steps(&self) -> &[StepId] {
        &self.state.valid_steps
    }

    pub fn inactive_steps(&self) -> Vec<StepId> {
        self.registry.inactive_steps(&self.state.valid_steps)
    }

    pub fn total_pages(&self) -> usize {
        self.gate.total_pages()
    }

    pub fn is_last_page(&self, current: isize) -> bool {
        self.gate.is_last_page(current)
    }

    /// Replace the caller-supplied defaults used by reconciliation
    pub fn set_initial_values(&mut self, values: Option<FormValues>) {
        self.options.initial_values = values;
    }

    /// Stored values with empty strings filled from the caller's defaults
    pub fn reconciled_values(&self) -> FormValues {
        merge_values(&self.state.values, self.options.initial_values.as_ref())
    }

    fn page(&self, current: isize) -> Option<&Page> {
        usize::try_from(current)
            .ok()
            .and_then(|i| self.options.pages.get(i))
    }

    /// Route of the page at `index`, clamped to the page range
    fn route_for(&self, index: isize) -> &str {
        let last = self.total_pages() as isize - 1;
        // new() guarantees at least one page and a route for every page
        &self.options.routes[index.clamp(0, last) as usize]
    }

    /// Commit `values`, then move to the page after `current`
    pub fn next(&mut self, values: FormValues, current: isize) -> String {
        let valid_steps = self.registry.valid_steps(&values);
        self.state = WizardState {
            values,
            valid_steps,
        };

        let to = self.route_for(current.saturating_add(1)).to_string();
        tracing::debug!(from = current, to = %to, valid = ?self.state.valid_steps, "Advancing wizard");
        self.navigator.push(&to);
        to
    }

    /// Move to the page before `current`; values are left alone
    pub fn previous(&self, current: isize) -> String {
        let to = self.route_for(current.saturating_sub(1)).to_string();
        tracing::debug!(from = current, to = %to, "Going back");
        self.navigator.push(&to);
        to
    }

    /// Run the active page's validator, if it has one
    pub fn validate(&self, values: &FormValues, current: isize) -> FieldErrors {
        self.page(current)
            .and_then(|page| page.validator.as_ref())
            .map(|validator| validator.validate(values))
            .unwrap_or_default()
    }

    /// Url to send the user to when `current` is not reachable yet
    pub fn determine_redirect(&self, current: isize) -> Option<String> {
        self.registry
            .redirect_target(&self.state.valid_steps, current)
            .map(|step| step.url.clone())
    }

    /// Work out what to show at `current` without side effects
    pub fn evaluate(&self, current: isize) -> WizardView {
        // Must run first so an unreachable index never reaches the page lookup
        if let Some(url) = self.determine_redirect(current) {
            return WizardView::Redirect { url };
        }

        let (Some(page), Ok(index)) = (self.page(current), usize::try_from(current)) else {
            tracing::warn!(current, pages = self.total_pages(), "No page at step index");
            return WizardView::Unrecoverable {
                title: UNRECOVERABLE_TITLE.to_string(),
                message: self.options.support_message.clone(),
            };
        };

        let step = self.registry.get(current);
        let progress = step.map(|step| self.registry.progress(step, &self.state.valid_steps));

        let action = if self.is_last_page(current) {
            PageAction::Submit {
                text: self.options.submit_text.clone(),
                custom: self.options.custom_submit,
            }
        } else {
            let label = page
                .next_label
                .clone()
                .or_else(|| step.and_then(|s| s.next_label.clone()))
                .unwrap_or_else(|| DEFAULT_NEXT_LABEL.to_string());
            PageAction::Next { label }
        };

        WizardView::Page(PageView {
            index,
            progress,
            values: self.reconciled_values(),
            show_back: current > 0,
            action,
        })
    }

    /// [`evaluate`](Self::evaluate), pushing the redirect if there is one
    pub fn resolve(&self, current: isize) -> WizardView {
        let view = self.evaluate(current);
        if let Some(url) = view.redirect_url() {
            tracing::debug!(current, url, "Step viewed out of order, redirecting");
            self.navigator.push(url);
        }
        view
    }

    /// Submit the current page.
    ///
    /// The last page converts the values to storage form, clears the
    /// session and calls the completion handler. Any other page saves the
    /// values and advances; touched flags and the submitting flag are reset
    /// afterwards whether or not the save succeeded.
    pub fn handle_submit(
        &mut self,
        values: FormValues,
        current: isize,
        bag: &mut SubmissionBag,
    ) -> Result<SubmitOutcome, WizardError> {
        if self.page(current).is_none() {
            return Err(WizardError::NoActivePage(current));
        }

        bag.set_submitting(true);
        match self.gate.classify(current) {
            SubmitKind::Final => self.gate.finalize(
                &self.options.codec,
                &self.store,
                &self.options.session_key,
                &self.on_submit,
                &values,
                bag,
            ),
            SubmitKind::Intermediate => {
                let result = self.advance(values, current);
                bag.clear_touched();
                bag.set_submitting(false);
                result
            }
        }
    }

    fn advance(&mut self, values: FormValues, current: isize) -> Result<SubmitOutcome, WizardError> {
        let values = self.apply_storage_reset(values, current);
        self.store.save(&self.options.session_key, &values)?;
        let to = self.next(values, current);
        Ok(SubmitOutcome::Advanced { to })
    }

    fn apply_storage_reset(&self, values: FormValues, current: isize) -> FormValues {
        let triggered = usize::try_from(current)
            .is_ok_and(|i| self.options.storage_reset_steps.contains(&i));

        match (&self.storage_reset, triggered) {
            (Some(hook), true) => {
                tracing::debug!(current, "Resetting stored selection");
                hook.reset(values, self.options.available_slots.first())
            }
            _ => values,
        }
    }
}
