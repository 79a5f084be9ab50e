//! Navigation collaborator used to move between wizard pages

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Moves the user to another route. Fire-and-forget: the wizard never
/// inspects the outcome.
pub trait Navigator: Send + Sync {
    fn push(&self, url: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn push(&self, url: &str) {
        self(url);
    }
}

/// Navigator that only records the routes it was asked to push
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    pushes: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self) -> MutexGuard<'_, Vec<String>> {
        self.pushes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every pushed route, oldest first
    pub fn pushes(&self) -> Vec<String> {
        self.log().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.log().last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn push(&self, url: &str) {
        tracing::debug!(url, "Navigation requested");
        self.log().push(url.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_navigator() {
        let nav = RecordingNavigator::new();
        assert!(nav.last().is_none());

        nav.push("/a");
        nav.clone().push("/b");
        assert_eq!(nav.pushes(), vec!["/a", "/b"]);
        assert_eq!(nav.last().as_deref(), Some("/b"));
    }

    #[test]
    fn test_closure_navigator() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let nav: Arc<dyn Navigator> = Arc::new(move |url: &str| {
            sink.lock().unwrap().push(url.to_string());
        });

        nav.push("/next");
        assert_eq!(*seen.lock().unwrap(), vec!["/next".to_string()]);
    }
}
