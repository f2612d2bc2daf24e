//! Outbound requests and notifications to the editor.

use serde_json::Value;
use tower_lsp::lsp_types::{ConfigurationItem, Diagnostic, MessageType, Url};
use tower_lsp::Client;

use crate::config::CONFIG_SECTION;

/// What the session needs from the editor side of the connection
#[tower_lsp::async_trait]
pub trait EditorClient: Send + Sync {
    async fn publish_diagnostics(&self, uri: Url, diagnostics: Vec<Diagnostic>, version: Option<i32>);

    async fn show_message(&self, typ: MessageType, message: String);

    /// Pull the `volta` configuration section, scoped to a document if given
    async fn fetch_settings(&self, scope: Option<&Url>) -> Option<Value>;
}

#[tower_lsp::async_trait]
impl EditorClient for Client {
    async fn publish_diagnostics(&self, uri: Url, diagnostics: Vec<Diagnostic>, version: Option<i32>) {
        Client::publish_diagnostics(self, uri, diagnostics, version).await;
    }

    async fn show_message(&self, typ: MessageType, message: String) {
        Client::show_message(self, typ, message).await;
    }

    async fn fetch_settings(&self, scope: Option<&Url>) -> Option<Value> {
        let item = ConfigurationItem {
            scope_uri: scope.cloned(),
            section: Some(CONFIG_SECTION.to_string()),
        };
        match self.configuration(vec![item]).await {
            Ok(values) => values.into_iter().next(),
            Err(e) => {
                tracing::warn!("workspace/configuration request failed: {e}");
                None
            }
        }
    }
}
