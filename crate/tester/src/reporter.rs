use std::sync::Arc;

use jacarta_logger::{debug, info, warn};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::{Diagnostic, Milestone, TestOutcome};

/// Receives the events of a run.
///
/// Calls come from the worker executing the run; implementations must not block it.
pub trait EventSink: Send + Sync {
    fn on_notification(&self, milestone: Milestone, detail: &str);

    fn on_diagnostic(&self, diagnostic: &Diagnostic);

    fn on_outcome(&self, outcome: &TestOutcome);
}

/// Forwards the events of one run to a sink.
///
/// [`Reporter::finish`] consumes the reporter: a run yields exactly one outcome.
pub struct Reporter {
    sink: Arc<dyn EventSink>,
}

impl Reporter {
    #[must_use]
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    pub fn notify(&self, milestone: Milestone, detail: &str) {
        info!("{milestone}: {detail}");
        self.sink.on_notification(milestone, detail);
    }

    pub fn diagnose(&self, diagnostic: &Diagnostic) {
        warn!("{diagnostic}");
        self.sink.on_diagnostic(diagnostic);
    }

    pub fn finish(self, outcome: TestOutcome) -> TestOutcome {
        match &outcome {
            TestOutcome::Success => info!("{outcome}"),
            TestOutcome::Failure { .. } => warn!("{outcome}"),
        }
        self.sink.on_outcome(&outcome);
        outcome
    }
}

/// An event as delivered by a [`ChannelSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Notification { milestone: Milestone, detail: String },
    Diagnostic(Diagnostic),
    Outcome(TestOutcome),
}

/// Sends the events over an unbounded channel, so that they never gate the run
pub struct ChannelSink {
    tx: UnboundedSender<Event>,
}

impl ChannelSink {
    #[must_use]
    pub fn new() -> (Self, UnboundedReceiver<Event>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: Event) {
        if self.tx.send(event).is_err() {
            debug!("event receiver dropped, event discarded");
        }
    }
}

impl EventSink for ChannelSink {
    fn on_notification(&self, milestone: Milestone, detail: &str) {
        self.send(Event::Notification {
            milestone,
            detail: detail.to_owned(),
        });
    }

    fn on_diagnostic(&self, diagnostic: &Diagnostic) {
        self.send(Event::Diagnostic(diagnostic.clone()));
    }

    fn on_outcome(&self, outcome: &TestOutcome) {
        self.send(Event::Outcome(outcome.clone()));
    }
}
