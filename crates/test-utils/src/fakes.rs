use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use syncwatch::errors::Result;
use syncwatch::exec::{ProcessOutput, ProcessRunner, SyncCommand};
use syncwatch::notifier::Notifier;

/// One recorded invocation, with the filter rules as they were on disk at
/// the time of the call.
#[derive(Debug, Clone)]
pub struct FakeCall {
    pub command: SyncCommand,
    pub filter_rules: Option<String>,
}

/// A process runner that:
/// - records every command it is asked to run
/// - succeeds unless a failure was scripted for the destination
/// - can hold its first call open until the test releases it.
#[derive(Debug, Clone, Default)]
pub struct FakeRunner {
    calls: Arc<Mutex<Vec<FakeCall>>>,
    failures: Arc<Mutex<HashMap<String, ProcessOutput>>>,
    spawn_errors: Arc<Mutex<Vec<String>>>,
    hold: Arc<Mutex<Option<Hold>>>,
}

#[derive(Debug)]
struct Hold {
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every sync to `destination` exit with `exit_code` and `stderr`.
    pub fn fail_destination(self, destination: &str, exit_code: i32, stderr: &str) -> Self {
        self.failures.lock().unwrap().insert(
            destination.to_string(),
            ProcessOutput {
                exit_code,
                stderr: stderr.to_string(),
            },
        );
        self
    }

    /// Make every sync to `destination` fail before a process exists.
    pub fn refuse_destination(self, destination: &str) -> Self {
        self.spawn_errors.lock().unwrap().push(destination.to_string());
        self
    }

    /// Block the first call: signal `entered` once it starts, then wait for
    /// `release` before returning.
    pub fn hold_first_call(self, entered: Arc<Notify>, release: Arc<Notify>) -> Self {
        *self.hold.lock().unwrap() = Some(Hold { entered, release });
        self
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn destinations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|c| c.command.destination)
            .collect()
    }
}

impl ProcessRunner for FakeRunner {
    fn execute<'a>(
        &'a self,
        command: &'a SyncCommand,
    ) -> Pin<Box<dyn Future<Output = Result<ProcessOutput>> + Send + 'a>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(FakeCall {
                command: command.clone(),
                filter_rules: std::fs::read_to_string(&command.filter_file).ok(),
            });

            let hold = self.hold.lock().unwrap().take();
            if let Some(hold) = hold {
                hold.entered.notify_one();
                hold.release.notified().await;
            }

            if self
                .spawn_errors
                .lock()
                .unwrap()
                .contains(&command.destination)
            {
                return Err(anyhow::anyhow!("No such file or directory (os error 2)").into());
            }

            let scripted = self
                .failures
                .lock()
                .unwrap()
                .get(&command.destination)
                .cloned();

            Ok(scripted.unwrap_or(ProcessOutput {
                exit_code: 0,
                stderr: String::new(),
            }))
        })
    }
}

/// Notifier that keeps every `(title, message)` it was given.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, title: &str, message: &str) -> anyhow::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
        Ok(())
    }
}
