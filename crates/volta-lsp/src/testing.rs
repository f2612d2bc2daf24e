//! Test doubles for the compiler and the editor.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tower_lsp::lsp_types::{Diagnostic, MessageType, Url};

use crate::bridge::{BridgeError, CompilerRunner, ProcessOutput};
use crate::config::{CompilerLocator, Settings};
use crate::editor::EditorClient;
use crate::session::{Session, SessionOptions};

#[derive(Clone, Debug)]
pub struct Call {
    pub executable: PathBuf,
    pub args: Vec<String>,
    /// Contents of the file argument at the time of the call
    pub contents: Option<String>,
}

struct Rule {
    marker: String,
    stderr: String,
    delay: Duration,
}

/// Compiler stand-in. Responses can depend on the checked file's contents.
#[derive(Default)]
pub struct FakeRunner {
    stdout: String,
    stderr: String,
    rules: Vec<Rule>,
    spawn_fails: bool,
    times_out: bool,
    calls: Mutex<Vec<Call>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stdout(mut self, stdout: &str) -> Self {
        self.stdout = stdout.to_string();
        self
    }

    pub fn with_stderr(mut self, stderr: &str) -> Self {
        self.stderr = stderr.to_string();
        self
    }

    /// When the file contains `marker`, wait `delay` then emit `stderr`
    pub fn when_contains(mut self, marker: &str, stderr: &str, delay: Duration) -> Self {
        self.rules.push(Rule {
            marker: marker.to_string(),
            stderr: stderr.to_string(),
            delay,
        });
        self
    }

    pub fn failing_spawn(mut self) -> Self {
        self.spawn_fails = true;
        self
    }

    pub fn timing_out(mut self) -> Self {
        self.times_out = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[tower_lsp::async_trait]
impl CompilerRunner for FakeRunner {
    async fn invoke(
        &self,
        executable: &Path,
        args: &[OsString],
    ) -> Result<ProcessOutput, BridgeError> {
        let contents = args
            .get(1)
            .and_then(|file| std::fs::read_to_string(file).ok());
        self.calls.lock().unwrap().push(Call {
            executable: executable.to_path_buf(),
            args: args
                .iter()
                .map(|a| a.to_string_lossy().into_owned())
                .collect(),
            contents: contents.clone(),
        });

        if self.spawn_fails {
            return Err(BridgeError::Spawn {
                executable: executable.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
            });
        }

        if self.times_out {
            return Err(BridgeError::Timeout {
                executable: executable.to_path_buf(),
                after: crate::bridge::DEFAULT_TIMEOUT,
            });
        }

        let rule = contents
            .as_deref()
            .and_then(|c| self.rules.iter().find(|r| c.contains(&r.marker)));
        let stderr = match rule {
            Some(rule) => {
                tokio::time::sleep(rule.delay).await;
                rule.stderr.clone()
            }
            None => self.stderr.clone(),
        };

        Ok(ProcessOutput {
            stdout: self.stdout.clone(),
            stderr,
            exit_code: Some(0),
        })
    }
}

#[derive(Clone, Debug)]
pub struct Published {
    pub uri: Url,
    pub diagnostics: Vec<Diagnostic>,
    pub version: Option<i32>,
}

/// Editor stand-in that records everything sent to it
#[derive(Default)]
pub struct RecordingClient {
    published: Mutex<Vec<Published>>,
    messages: Mutex<Vec<(MessageType, String)>>,
    settings: Mutex<Option<Value>>,
    settings_requests: AtomicUsize,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Value) -> Self {
        let client = Self::default();
        *client.settings.lock().unwrap() = Some(settings);
        client
    }

    pub fn set_settings(&self, settings: Value) {
        *self.settings.lock().unwrap() = Some(settings);
    }

    pub fn published(&self) -> Vec<Published> {
        self.published.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<(MessageType, String)> {
        self.messages.lock().unwrap().clone()
    }

    pub fn settings_requests(&self) -> usize {
        self.settings_requests.load(Ordering::SeqCst)
    }
}

#[tower_lsp::async_trait]
impl EditorClient for RecordingClient {
    async fn publish_diagnostics(&self, uri: Url, diagnostics: Vec<Diagnostic>, version: Option<i32>) {
        self.published.lock().unwrap().push(Published {
            uri,
            diagnostics,
            version,
        });
    }

    async fn show_message(&self, typ: MessageType, message: String) {
        self.messages.lock().unwrap().push((typ, message));
    }

    async fn fetch_settings(&self, _scope: Option<&Url>) -> Option<Value> {
        self.settings_requests.fetch_add(1, Ordering::SeqCst);
        self.settings.lock().unwrap().clone()
    }
}

/// Treats the configured compiler path as already resolved
pub struct ConfiguredLocator;

impl CompilerLocator for ConfiguredLocator {
    fn locate(&self, settings: &Settings) -> Option<PathBuf> {
        settings.explicit_compiler().map(PathBuf::from)
    }
}

pub const COMPILER: &str = "/opt/volta/bin/volta";

/// A session over fakes; `compiler` seeds the global compiler path
pub fn session_with(
    runner: FakeRunner,
    client: RecordingClient,
    compiler: Option<&str>,
) -> (Session, Arc<FakeRunner>, Arc<RecordingClient>) {
    let runner = Arc::new(runner);
    let client = Arc::new(client);
    let options = SessionOptions {
        global_settings: Settings {
            compiler_path: compiler.map(str::to_string),
            ..Default::default()
        },
        ..Default::default()
    };
    let session = Session::new(
        client.clone(),
        runner.clone(),
        Arc::new(ConfiguredLocator),
        options,
    );
    (session, runner, client)
}

pub fn uri(name: &str) -> Url {
    Url::parse(&format!("file:///workspace/{}", name)).unwrap()
}
