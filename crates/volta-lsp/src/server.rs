use std::sync::Arc;

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::bridge::CompilerRunner;
use crate::capabilities;
use crate::config::{CompilerLocator, Settings};
use crate::handlers;
use crate::session::{Session, SessionOptions, ValidationOutcome};

pub struct Backend {
    client: Client,
    session: Session,
    debug: bool,
}

impl Backend {
    pub fn new(
        client: Client,
        runner: Arc<dyn CompilerRunner>,
        locator: Arc<dyn CompilerLocator>,
        options: SessionOptions,
        debug: bool,
    ) -> Self {
        let session = Session::new(Arc::new(client.clone()), runner, locator, options);
        Self {
            client,
            session,
            debug,
        }
    }

    async fn log_debug(&self, message: &str) {
        tracing::debug!("{message}");
        if self.debug {
            self.client
                .log_message(MessageType::INFO, format!("[DEBUG] {}", message))
                .await;
        }
    }
}

fn supports_configuration(params: &InitializeParams) -> bool {
    params
        .capabilities
        .workspace
        .as_ref()
        .and_then(|w| w.configuration)
        .unwrap_or(false)
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        self.log_debug("Initializing Volta LSP server").await;

        self.session
            .set_configuration_support(supports_configuration(&params));

        if let Some(settings) = params.initialization_options.and_then(Settings::from_value) {
            self.session.set_global_settings(settings).await;
        }

        Ok(InitializeResult {
            capabilities: capabilities::server_capabilities(),
            server_info: Some(ServerInfo {
                name: "volta-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        if self.session.supports_configuration() {
            let registration = Registration {
                id: "volta-configuration".to_string(),
                method: "workspace/didChangeConfiguration".to_string(),
                register_options: None,
            };
            if let Err(e) = self.client.register_capability(vec![registration]).await {
                tracing::warn!("Failed to register for configuration changes: {e}");
            }
        }

        self.client
            .log_message(MessageType::INFO, "Volta LSP server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        self.log_debug("Shutting down server").await;
        self.session.shutdown();
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        self.log_debug(&format!("Document opened: {}", doc.uri)).await;

        if let Some(ValidationOutcome::Published(count)) =
            self.session.open(doc.uri, doc.text, doc.version).await
        {
            self.log_debug(&format!("Published {} diagnostic(s)", count))
                .await;
        }
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        self.log_debug(&format!("Document changed: {}", uri)).await;

        // Full sync: the last change holds the entire text
        if let Some(change) = params.content_changes.into_iter().last() {
            self.session
                .change(uri, change.text, params.text_document.version);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.log_debug(&format!("Document closed: {}", uri)).await;
        self.session.close(&uri);
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        self.log_debug("Configuration changed").await;

        let pushed = if self.session.supports_configuration() {
            None
        } else {
            Settings::from_change(params.settings)
        };
        let revalidated = self.session.configuration_changed(pushed).await;

        self.log_debug(&format!("Revalidated {} document(s)", revalidated))
            .await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        self.log_debug(&format!("Hover request at {:?}", position))
            .await;

        Ok(handlers::hover::get_hover(&self.session, uri, position).await)
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        self.log_debug(&format!("Go to definition at {:?}", position))
            .await;

        Ok(handlers::definition::get_definition(&self.session, uri, position).await)
    }

    async fn completion(
        &self,
        params: CompletionParams,
    ) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        self.log_debug(&format!("Completion request at {:?}", position))
            .await;

        if let Some(doc) = self.session.document(uri) {
            let items = handlers::completion::get_completions(&doc, position);
            Ok(Some(CompletionResponse::Array(items)))
        } else {
            Ok(None)
        }
    }

    async fn signature_help(
        &self,
        params: SignatureHelpParams,
    ) -> Result<Option<SignatureHelp>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        self.log_debug(&format!("Signature help request at {:?}", position))
            .await;

        Ok(handlers::signature_help::get_signature_help(&self.session, uri, position).await)
    }
}
