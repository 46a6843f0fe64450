//! Navigator that records every navigation for later assertions

use crate::navigation::Navigator;
use std::sync::{Arc, Mutex, PoisonError};

/// Records navigations instead of performing them
#[derive(Clone, Debug, Default)]
pub struct RecordingNavigator {
    visited: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every location navigated to, oldest first
    pub fn visited(&self) -> Vec<String> {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<String> {
        self.visited().last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, location: &str) {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(location.to_string());
    }
}
