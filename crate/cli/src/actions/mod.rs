use std::sync::Arc;

use jacarta_interfaces::Pkcs11Api;
use jacarta_logger::{debug, warn};
use jacarta_tester::{ChannelSink, Event, RunHandle, TestOutcome, TesterConfig, TokenTester};
use tokio::{sync::mpsc::UnboundedReceiver, task::JoinHandle};

use crate::error::{CliError, result::CliResult};

pub mod init_token;
pub mod run;
pub mod slots;

/// Print the events of a run as they arrive
fn spawn_printer(mut rx: UnboundedReceiver<Event>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                Event::Notification { milestone, detail } => println!("{milestone}: {detail}"),
                Event::Diagnostic(diagnostic) => eprintln!("WARNING: {diagnostic}"),
                // printed by the caller once the run is over
                Event::Outcome(outcome) => debug!("outcome received: {outcome}"),
            }
        }
    })
}

/// Start a run on `tester`, print its events, and wait for its outcome.
///
/// Ctrl-C is handled as the device going away: the run in flight fails at its current
/// phase and the token resources are released before returning.
async fn drive<F>(tester: TokenTester, rx: UnboundedReceiver<Event>, start: F) -> CliResult<()>
where
    F: FnOnce(&TokenTester) -> CliResult<RunHandle>,
{
    let printer = spawn_printer(rx);
    let outcome = start(&tester)?.outcome();
    tokio::pin!(outcome);
    let outcome = tokio::select! {
        outcome = &mut outcome => outcome?,
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted: failing the run in flight");
            tester.on_device_gone();
            outcome.await?
        }
    };
    // the last sender goes away with the tester, which ends the printer
    drop(tester);
    if let Err(e) = printer.await {
        warn!("event printer failed: {e}");
    }
    match outcome {
        TestOutcome::Success => {
            println!("{outcome}");
            Ok(())
        }
        TestOutcome::Failure { .. } => Err(CliError::TestFailed(outcome)),
    }
}

/// A tester reporting to a channel, with the receiving end of the channel
fn channel_tester(
    api: Arc<dyn Pkcs11Api>,
    config: TesterConfig,
) -> (TokenTester, UnboundedReceiver<Event>) {
    let (sink, rx) = ChannelSink::new();
    (TokenTester::new(api, config, Arc::new(sink)), rx)
}
