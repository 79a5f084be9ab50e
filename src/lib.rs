//! Multipage - multi-step form wizard controller
//!
//! Tracks which steps of a form are complete, persists in-progress answers
//! across reloads, works out which steps are reachable and drives
//! navigation and the final submit. Rendering, routing and storage are
//! supplied by the caller through small traits.

pub mod codec;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod navigation;
pub mod steps;
pub mod store;
pub mod submission;
pub mod validation;
pub mod values;

pub use codec::ValueCodec;
pub use controller::{Page, PageAction, PageView, WizardController, WizardOptions, WizardView};
pub use error::{StoreError, WizardError};
pub use navigation::{Navigator, RecordingNavigator};
pub use steps::{Progress, Step, StepId, StepRegistry};
pub use store::{FileStore, KeyValueStore, MemoryStore, PersistenceStore};
pub use submission::{
    CompletionHandler, StorageResetHook, SubmissionBag, SubmissionGate, SubmitOutcome,
};
pub use validation::{RequiredFieldsValidator, StepValidator};
pub use values::{merge_values, FieldErrors, FormValues};
