//! What the wizard asks its renderer to show for a given route

use serde::Serialize;

use crate::steps::Progress;
use crate::values::FormValues;

/// Title of the terminal error view
pub const UNRECOVERABLE_TITLE: &str = "An unrecoverable error has occurred";

/// Label of the advance control when neither page nor step names one
pub const DEFAULT_NEXT_LABEL: &str = "Next";

/// Result of evaluating the wizard at a route-derived step index
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WizardView {
    /// The step is not reachable yet; go here instead
    Redirect { url: String },
    /// No page exists at the index; nothing can be recovered automatically
    Unrecoverable { title: String, message: String },
    Page(PageView),
}

impl WizardView {
    pub fn redirect_url(&self) -> Option<&str> {
        match self {
            WizardView::Redirect { url } => Some(url),
            _ => None,
        }
    }

    pub fn page(&self) -> Option<&PageView> {
        match self {
            WizardView::Page(page) => Some(page),
            _ => None,
        }
    }
}

/// Display input for the active page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    pub index: usize,
    /// Present only when a step is defined at this page index
    pub progress: Option<Progress>,
    /// Stored values reconciled with the caller's defaults
    pub values: FormValues,
    pub show_back: bool,
    pub action: PageAction,
}

/// Primary control at the bottom of a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageAction {
    Next { label: String },
    /// `custom` means the caller renders its own submit control
    Submit { text: String, custom: bool },
}
