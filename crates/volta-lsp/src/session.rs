//! Per-server state: open documents, their settings, and when to re-check
//! them.
//!
//! A document is validated immediately the first time it is opened, then
//! again once edits have settled for the debounce period. Each validation
//! takes a revision number when it starts; a result is published only if no
//! newer validation of the same document has started since.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::{DashMap, DashSet};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinSet;
use tower_lsp::lsp_types::{MessageType, Url};
use volta_lsp_core::symbol::{SPAWN_ERROR, TIMEOUT_ERROR};
use volta_lsp_core::QueryResult;

use crate::bridge::{BridgeError, CompilerRunner};
use crate::config::{CompilerLocator, Settings};
use crate::debounce::Debouncer;
use crate::document::Document;
use crate::editor::EditorClient;
use crate::handlers::diagnostics::to_lsp_diagnostics;
use crate::scratch::ScratchFile;
use crate::{symbol_client, validation};

/// Quiet period after the last edit before a document is re-checked
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

const MISSING_COMPILER_MESSAGE: &str = "Volta compiler not found. Set `volta.compilerPath` or put `volta` on your PATH to enable diagnostics.";

/// What happened to a validation request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Diagnostics were published (count after truncation)
    Published(usize),
    /// No compiler, or the document is not open
    Skipped,
    /// A newer validation started while this one ran
    Stale,
    /// The compiler could not be run
    Failed,
}

pub struct SessionOptions {
    pub debounce: Duration,
    pub global_settings: Settings,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            global_settings: Settings::default(),
        }
    }
}

/// Shared handle to the server state; cheap to clone
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

struct Inner {
    client: Arc<dyn EditorClient>,
    runner: Arc<dyn CompilerRunner>,
    locator: Arc<dyn CompilerLocator>,
    documents: DashMap<Url, Document>,
    settings: DashMap<Url, Settings>,
    global_settings: RwLock<Settings>,
    supports_configuration: AtomicBool,
    validated: DashSet<Url>,
    /// Latest revision whose validation has started, per document
    latest_revision: DashMap<Url, u64>,
    next_revision: AtomicU64,
    timers: Debouncer<Url>,
    resolved_compiler: Mutex<Option<PathBuf>>,
    missing_compiler_reported: AtomicBool,
    spawn_failure_reported: AtomicBool,
}

impl Session {
    pub fn new(
        client: Arc<dyn EditorClient>,
        runner: Arc<dyn CompilerRunner>,
        locator: Arc<dyn CompilerLocator>,
        options: SessionOptions,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                runner,
                locator,
                documents: DashMap::new(),
                settings: DashMap::new(),
                global_settings: RwLock::new(options.global_settings),
                supports_configuration: AtomicBool::new(false),
                validated: DashSet::new(),
                latest_revision: DashMap::new(),
                next_revision: AtomicU64::new(0),
                timers: Debouncer::new(options.debounce),
                resolved_compiler: Mutex::new(None),
                missing_compiler_reported: AtomicBool::new(false),
                spawn_failure_reported: AtomicBool::new(false),
            }),
        }
    }

    pub fn set_configuration_support(&self, supported: bool) {
        self.inner
            .supports_configuration
            .store(supported, Ordering::SeqCst);
    }

    pub fn supports_configuration(&self) -> bool {
        self.inner.supports_configuration.load(Ordering::SeqCst)
    }

    pub async fn set_global_settings(&self, settings: Settings) {
        *self.inner.global_settings.write().await = settings;
    }

    pub fn is_open(&self, uri: &Url) -> bool {
        self.inner.documents.contains_key(uri)
    }

    /// Snapshot of an open document
    pub fn document(&self, uri: &Url) -> Option<Document> {
        self.inner.documents.get(uri).map(|doc| doc.clone())
    }

    pub fn open_documents(&self) -> Vec<Url> {
        self.inner
            .documents
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    #[cfg(test)]
    pub fn has_pending_validation(&self, uri: &Url) -> bool {
        self.inner.timers.is_pending(uri)
    }

    /// Track a newly opened document; the first open is validated right away.
    pub async fn open(&self, uri: Url, text: String, version: i32) -> Option<ValidationOutcome> {
        self.inner
            .documents
            .insert(uri.clone(), Document::new(text, version));

        if !self.inner.validated.insert(uri.clone()) {
            return None;
        }
        Some(self.validate(&uri).await)
    }

    /// Replace a document's text and restart its debounce timer.
    pub fn change(&self, uri: Url, text: String, version: i32) {
        match self.inner.documents.get_mut(&uri) {
            Some(mut doc) => doc.update_text(text, version),
            None => {
                tracing::warn!(uri = %uri, "Change for a document that is not open");
                return;
            }
        }

        let session = self.clone();
        self.inner.timers.schedule(uri.clone(), async move {
            session.validate(&uri).await;
        });
    }

    /// Forget everything about a document.
    pub fn close(&self, uri: &Url) {
        if self.inner.timers.cancel(uri) {
            tracing::trace!(uri = %uri, "Cancelled pending validation");
        }
        self.inner.documents.remove(uri);
        self.inner.settings.remove(uri);
        self.inner.validated.remove(uri);
        self.inner.latest_revision.remove(uri);
    }

    /// Cancel every pending validation
    pub fn shutdown(&self) {
        self.inner.timers.cancel_all();
    }

    /// Check the document's current text and publish the diagnostics.
    pub async fn validate(&self, uri: &Url) -> ValidationOutcome {
        let settings = self.settings_for(uri).await;
        let Some(compiler) = self.resolve_compiler(&settings).await else {
            tracing::debug!(uri = %uri, "No compiler available, skipping validation");
            return ValidationOutcome::Skipped;
        };

        let Some((text, version)) = self
            .inner
            .documents
            .get(uri)
            .map(|doc| (doc.text().to_string(), doc.version()))
        else {
            return ValidationOutcome::Skipped;
        };

        let revision = self.inner.next_revision.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.latest_revision.insert(uri.clone(), revision);
        tracing::debug!(uri = %uri, revision, "Validating");

        let result = match ScratchFile::create(&text) {
            Ok(scratch) => {
                validation::check(self.inner.runner.as_ref(), &compiler, scratch.path()).await
            }
            Err(e) => {
                tracing::warn!(uri = %uri, "{e}");
                return ValidationOutcome::Failed;
            }
        };

        let diagnostics = match result {
            Ok(diagnostics) => diagnostics,
            Err(e) => {
                self.report_bridge_error(&e).await;
                return ValidationOutcome::Failed;
            }
        };

        if !self.is_current(uri, revision) {
            tracing::debug!(uri = %uri, revision, "Discarding stale validation result");
            return ValidationOutcome::Stale;
        }

        let diagnostics = to_lsp_diagnostics(&diagnostics, settings.max_diagnostics);
        let count = diagnostics.len();
        self.inner
            .client
            .publish_diagnostics(uri.clone(), diagnostics, Some(version))
            .await;

        ValidationOutcome::Published(count)
    }

    /// React to a configuration change. `settings` replaces the global
    /// settings when the editor pushed them. Returns how many documents
    /// were re-validated.
    pub async fn configuration_changed(&self, settings: Option<Settings>) -> usize {
        if let Some(settings) = settings {
            self.set_global_settings(settings).await;
        }
        self.inner.settings.clear();

        let global = self.inner.global_settings.read().await.clone();
        let current = if self.supports_configuration() {
            match self
                .inner
                .client
                .fetch_settings(None)
                .await
                .and_then(Settings::from_value)
            {
                Some(pulled) => pulled.over(&global),
                None => global,
            }
        } else {
            global
        };

        let resolved = self.inner.locator.locate(&current);
        {
            let mut previous = self.inner.resolved_compiler.lock().await;
            if *previous == resolved {
                tracing::debug!("Compiler path unchanged, nothing to revalidate");
                return 0;
            }
            *previous = resolved.clone();
        }
        tracing::info!(compiler = ?resolved, "Compiler path changed, revalidating open documents");

        let uris = self.open_documents();
        let count = uris.len();
        let mut tasks = JoinSet::new();
        for uri in uris {
            let session = self.clone();
            tasks.spawn(async move { session.validate(&uri).await });
        }
        while tasks.join_next().await.is_some() {}

        count
    }

    /// Ask the compiler about the symbol at `line` (1-indexed) and `column`
    /// (0-indexed). `None` when no compiler is available or the document is
    /// not open.
    pub async fn query_symbol(&self, uri: &Url, line: u32, column: u32) -> Option<QueryResult> {
        let settings = self.settings_for(uri).await;
        let compiler = self.resolve_compiler(&settings).await?;
        let text = self.inner.documents.get(uri).map(|doc| doc.text().to_string())?;

        let scratch = match ScratchFile::create(&text) {
            Ok(scratch) => scratch,
            Err(e) => {
                tracing::warn!(uri = %uri, "{e}");
                return None;
            }
        };

        let mut result = symbol_client::query(
            self.inner.runner.as_ref(),
            &compiler,
            scratch.path(),
            line,
            column,
        )
        .await;

        match &mut result {
            Ok(info) => {
                // The compiler only saw the scratch copy of this document
                if let Some(location) = info.location.as_mut() {
                    if location.file.as_deref().map(Path::new) == Some(scratch.path()) {
                        location.file = None;
                    }
                }
            }
            Err(err) if err.code == SPAWN_ERROR || err.code == TIMEOUT_ERROR => {
                self.report_compiler_failure(&err.message).await
            }
            Err(err) => {
                tracing::debug!(code = %err.code, message = %err.message, "Symbol query failed");
            }
        }

        Some(result)
    }

    fn is_current(&self, uri: &Url, revision: u64) -> bool {
        self.inner.documents.contains_key(uri)
            && self
                .inner
                .latest_revision
                .get(uri)
                .is_some_and(|latest| *latest == revision)
    }

    async fn settings_for(&self, uri: &Url) -> Settings {
        if !self.supports_configuration() {
            return self.inner.global_settings.read().await.clone();
        }

        if let Some(cached) = self.inner.settings.get(uri) {
            return cached.clone();
        }

        let fetched = self
            .inner
            .client
            .fetch_settings(Some(uri))
            .await
            .and_then(Settings::from_value);
        let global = self.inner.global_settings.read().await.clone();
        let settings = match fetched {
            Some(pulled) => pulled.over(&global),
            None => global,
        };

        if self.is_open(uri) {
            self.inner.settings.insert(uri.clone(), settings.clone());
        }
        settings
    }

    async fn resolve_compiler(&self, settings: &Settings) -> Option<PathBuf> {
        let resolved = self.inner.locator.locate(settings);
        *self.inner.resolved_compiler.lock().await = resolved.clone();

        if resolved.is_none() && !self.inner.missing_compiler_reported.swap(true, Ordering::SeqCst) {
            tracing::warn!("No Volta compiler found");
            self.inner
                .client
                .show_message(MessageType::WARNING, MISSING_COMPILER_MESSAGE.to_string())
                .await;
        }

        resolved
    }

    async fn report_bridge_error(&self, err: &BridgeError) {
        self.report_compiler_failure(&err.to_string()).await;
    }

    /// Spawn failures and timeouts: logged every time, shown once.
    async fn report_compiler_failure(&self, detail: &str) {
        tracing::warn!("{detail}");
        if !self.inner.spawn_failure_reported.swap(true, Ordering::SeqCst) {
            self.inner
                .client
                .show_message(
                    MessageType::ERROR,
                    format!("Could not run the Volta compiler: {detail}"),
                )
                .await;
        }
    }
}
