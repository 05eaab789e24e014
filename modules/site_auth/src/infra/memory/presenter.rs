use parking_lot::Mutex;

use crate::contract::model::SessionView;
use crate::domain::ports::{Presenter, UiUpdate};

/// Presenter that keeps every update, for headless runs and tests.
#[derive(Default)]
pub struct RecordingPresenter {
    updates: Mutex<Vec<UiUpdate>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<UiUpdate> {
        self.updates.lock().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.updates
            .lock()
            .iter()
            .filter_map(|u| match u {
                UiUpdate::Alert(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_alert(&self) -> Option<String> {
        self.alerts().pop()
    }

    /// Most recent session view, if any was rendered.
    pub fn session(&self) -> Option<SessionView> {
        self.updates.lock().iter().rev().find_map(|u| match u {
            UiUpdate::Session(view) => Some(view.clone()),
            _ => None,
        })
    }

    pub fn clear(&self) {
        self.updates.lock().clear();
    }
}

impl Presenter for RecordingPresenter {
    fn present(&self, update: &UiUpdate) {
        self.updates.lock().push(update.clone());
    }
}
