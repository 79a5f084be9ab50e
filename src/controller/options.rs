//! Construction options for the wizard controller

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::codec::ValueCodec;
use crate::steps::Step;
use crate::validation::StepValidator;
use crate::values::FormValues;

/// Default label of the final submit control
pub const DEFAULT_SUBMIT_TEXT: &str = "Submit";

/// Default support-contact message shown when no page can be rendered
pub const DEFAULT_SUPPORT_MESSAGE: &str =
    "Please contact support so we can help you finish this form.";

/// One rendered page, matched positionally with the routes
#[derive(Clone, Default)]
pub struct Page {
    pub validator: Option<Arc<dyn StepValidator>>,
    /// Overrides the step's next-button label
    pub next_label: Option<String>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validator(mut self, validator: impl StepValidator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn with_next_label(mut self, label: impl Into<String>) -> Self {
        self.next_label = Some(label.into());
        self
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("has_validator", &self.validator.is_some())
            .field("next_label", &self.next_label)
            .finish()
    }
}

/// Everything the controller needs besides its collaborators
#[derive(Debug, Clone)]
pub struct WizardOptions {
    /// Caller-supplied defaults, in storage form
    pub initial_values: Option<FormValues>,
    /// Key the in-progress values are persisted under
    pub session_key: String,
    pub steps: Vec<Step>,
    /// Route of each page, by page index
    pub routes: Vec<String>,
    pub pages: Vec<Page>,
    /// Page indexes whose submit runs the storage-reset hook
    pub storage_reset_steps: BTreeSet<usize>,
    /// Selectable slots; the first one is handed to the storage-reset hook
    pub available_slots: Vec<Value>,
    pub submit_text: String,
    /// The caller renders its own submit control on the last page
    pub custom_submit: bool,
    pub codec: ValueCodec,
    pub support_message: String,
}

impl Default for WizardOptions {
    fn default() -> Self {
        Self {
            initial_values: None,
            session_key: String::new(),
            steps: Vec::new(),
            routes: Vec::new(),
            pages: Vec::new(),
            storage_reset_steps: BTreeSet::new(),
            available_slots: Vec::new(),
            submit_text: DEFAULT_SUBMIT_TEXT.to_string(),
            custom_submit: false,
            codec: ValueCodec::default(),
            support_message: DEFAULT_SUPPORT_MESSAGE.to_string(),
        }
    }
}

impl WizardOptions {
    /// Options with one page per step, routed to each step's url
    pub fn new(session_key: impl Into<String>, steps: Vec<Step>) -> Self {
        let routes = steps.iter().map(|step| step.url.clone()).collect();
        let pages = steps.iter().map(|_| Page::new()).collect();
        Self {
            session_key: session_key.into(),
            steps,
            routes,
            pages,
            ..Self::default()
        }
    }

    pub fn with_initial_values(mut self, values: FormValues) -> Self {
        self.initial_values = Some(values);
        self
    }

    pub fn with_routes<I, S>(mut self, routes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.routes = routes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_pages(mut self, pages: Vec<Page>) -> Self {
        self.pages = pages;
        self
    }

    /// Replace the page at `index`, if it exists
    pub fn with_page(mut self, index: usize, page: Page) -> Self {
        if let Some(slot) = self.pages.get_mut(index) {
            *slot = page;
        }
        self
    }

    pub fn with_storage_reset_steps(mut self, steps: impl IntoIterator<Item = usize>) -> Self {
        self.storage_reset_steps = steps.into_iter().collect();
        self
    }

    pub fn with_available_slots(mut self, slots: Vec<Value>) -> Self {
        self.available_slots = slots;
        self
    }

    pub fn with_submit_text(mut self, text: impl Into<String>) -> Self {
        self.submit_text = text.into();
        self
    }

    pub fn with_custom_submit(mut self, custom: bool) -> Self {
        self.custom_submit = custom;
        self
    }

    pub fn with_codec(mut self, codec: ValueCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_support_message(mut self, message: impl Into<String>) -> Self {
        self.support_message = message.into();
        self
    }
}
