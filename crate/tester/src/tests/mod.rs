use std::sync::{Arc, Mutex};

use crate::{Diagnostic, EventSink, Milestone, TestOutcome};

mod controller_tests;

/// Records every event, in order
#[derive(Default)]
pub(crate) struct RecordingSink {
    pub(crate) notifications: Mutex<Vec<(Milestone, String)>>,
    pub(crate) diagnostics: Mutex<Vec<Diagnostic>>,
    pub(crate) outcomes: Mutex<Vec<TestOutcome>>,
}

impl RecordingSink {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn milestones(&self) -> Vec<Milestone> {
        self.notifications
            .lock()
            .unwrap()
            .iter()
            .map(|(milestone, _)| *milestone)
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn on_notification(&self, milestone: Milestone, detail: &str) {
        self.notifications
            .lock()
            .unwrap()
            .push((milestone, detail.to_owned()));
    }

    fn on_diagnostic(&self, diagnostic: &Diagnostic) {
        self.diagnostics.lock().unwrap().push(diagnostic.clone());
    }

    fn on_outcome(&self, outcome: &TestOutcome) {
        self.outcomes.lock().unwrap().push(outcome.clone());
    }
}
