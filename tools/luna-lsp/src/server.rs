// Luna LSP Server implementation

use std::sync::Arc;

use dashmap::DashMap;
use luna_parse::LuaParser;
use lunac::{ChangeQueue, DiskLoader, FileChange, SweepState, Workspace, WorkspaceEvent};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedReceiver;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::convert::to_file_uri;
use crate::sink::{self, ChannelSink, Outgoing};

/// Settings sections requested from the client, in the shape
/// `Settings::update` reads.
const CONFIG_SECTIONS: [&str; 2] = ["files", "luna"];

/// Luna Language Server
pub struct LunaLanguageServer {
    client: Client,
    /// The single writer. Only ever locked on blocking threads.
    workspace: Arc<Mutex<Workspace>>,
    queue: ChangeQueue,
    sweep_state: SweepState,
    /// Open buffers and their last seen version.
    open_documents: DashMap<Url, i32>,
    /// Taken by `initialized`, which starts the forwarding task.
    outgoing: Mutex<Option<UnboundedReceiver<Outgoing>>>,
}

impl LunaLanguageServer {
    pub fn new(client: Client) -> Self {
        let (sink, rx) = ChannelSink::new();
        let workspace = Workspace::new(
            Arc::new(LuaParser),
            Arc::new(DiskLoader),
            Arc::new(sink),
        );
        LunaLanguageServer {
            client,
            queue: workspace.queue(),
            sweep_state: workspace.sweep_state(),
            workspace: Arc::new(Mutex::new(workspace)),
            open_documents: DashMap::new(),
            outgoing: Mutex::new(Some(rx)),
        }
    }

    /// Queue `event` and make sure something will drain it.
    fn submit(&self, event: WorkspaceEvent) {
        self.queue.push(event);
        self.schedule();
    }

    /// Drain the queue on a blocking thread.
    ///
    /// A running sweep drains the queue itself once it finishes, so
    /// nothing is scheduled while one is in flight.
    fn schedule(&self) {
        if self.sweep_state.is_running() {
            tracing::debug!(pending = self.queue.len(), "sweep in flight; change queued");
            return;
        }
        let workspace = Arc::clone(&self.workspace);
        tokio::task::spawn_blocking(move || {
            if let Err(err) = workspace.lock().process_pending() {
                tracing::warn!(%err, "applying workspace changes failed");
            }
        });
    }

    async fn register_file_watcher(&self) {
        let options = DidChangeWatchedFilesRegistrationOptions {
            watchers: vec![FileSystemWatcher {
                glob_pattern: GlobPattern::String("**/*".to_owned()),
                kind: None,
            }],
        };
        let register_options = match serde_json::to_value(options) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(%err, "cannot encode the file watcher registration");
                return;
            }
        };
        let registration = Registration {
            id: "luna-file-watcher".to_owned(),
            method: "workspace/didChangeWatchedFiles".to_owned(),
            register_options: Some(register_options),
        };
        if let Err(err) = self.client.register_capability(vec![registration]).await {
            tracing::warn!(%err, "client refused the file watcher");
        }
    }

    /// Pull the current settings from the client.
    async fn fetch_configuration(&self) -> Option<Value> {
        let items = CONFIG_SECTIONS
            .iter()
            .map(|section| ConfigurationItem {
                scope_uri: None,
                section: Some((*section).to_owned()),
            })
            .collect();
        match self.client.configuration(items).await {
            Ok(values) => Some(settings_object(values)),
            Err(err) => {
                tracing::debug!(%err, "client has no configuration support");
                None
            }
        }
    }
}

/// Rebuild `{ "files": .., "luna": .. }` from per-section answers.
fn settings_object(values: Vec<Value>) -> Value {
    let mut object = serde_json::Map::new();
    for (section, value) in CONFIG_SECTIONS.iter().zip(values) {
        if !value.is_null() {
            object.insert((*section).to_owned(), value);
        }
    }
    Value::Object(object)
}

fn watched_change(kind: FileChangeType) -> Option<FileChange> {
    match kind {
        FileChangeType::CREATED => Some(FileChange::Created),
        FileChangeType::CHANGED => Some(FileChange::Changed),
        FileChangeType::DELETED => Some(FileChange::Deleted),
        _ => None,
    }
}

/// Workspace folders from `initialize`, falling back to the root URI.
#[allow(deprecated, reason = "older clients only send root_uri")]
fn initial_roots(params: &InitializeParams) -> Vec<Url> {
    match &params.workspace_folders {
        Some(folders) if !folders.is_empty() => {
            folders.iter().map(|folder| folder.uri.clone()).collect()
        }
        _ => params.root_uri.iter().cloned().collect(),
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for LunaLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        for url in initial_roots(&params) {
            if let Some(root) = to_file_uri(&url) {
                self.queue.push(WorkspaceEvent::RootAdded(root));
            }
        }
        if let Some(options) = params.initialization_options {
            self.queue.push(WorkspaceEvent::Configuration(options));
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                workspace: Some(WorkspaceServerCapabilities {
                    workspace_folders: Some(WorkspaceFoldersServerCapabilities {
                        supported: Some(true),
                        change_notifications: Some(OneOf::Left(true)),
                    }),
                    file_operations: None,
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "luna-lsp".to_owned(),
                version: Some(env!("CARGO_PKG_VERSION").to_owned()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        if let Some(rx) = self.outgoing.lock().take() {
            tokio::spawn(sink::forward(self.client.clone(), rx));
        }
        self.register_file_watcher().await;
        if let Some(settings) = self.fetch_configuration().await {
            self.queue.push(WorkspaceEvent::Configuration(settings));
        }
        self.submit(WorkspaceEvent::Reload);
        self.client
            .log_message(MessageType::INFO, "Luna language server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        let workspace = Arc::clone(&self.workspace);
        let disposed = tokio::task::spawn_blocking(move || workspace.lock().dispose()).await;
        if let Err(err) = disposed {
            tracing::warn!(%err, "workspace teardown failed");
        }
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let document = params.text_document;
        self.open_documents
            .insert(document.uri.clone(), document.version);
        if let Some(uri) = to_file_uri(&document.uri) {
            self.submit(WorkspaceEvent::Opened {
                uri,
                text: document.text,
            });
        }
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let url = params.text_document.uri;
        let version = params.text_document.version;
        // Full sync: the last change carries the whole text.
        let Some(change) = params.content_changes.into_iter().last() else {
            return;
        };
        let stale = self
            .open_documents
            .get(&url)
            .is_some_and(|known| *known > version);
        if stale {
            tracing::debug!(%url, version, "dropping out-of-order change");
            return;
        }
        self.open_documents.insert(url.clone(), version);
        if let Some(uri) = to_file_uri(&url) {
            self.submit(WorkspaceEvent::Edited {
                uri,
                text: change.text,
            });
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let url = params.text_document.uri;
        self.open_documents.remove(&url);
        if let Some(uri) = to_file_uri(&url) {
            self.submit(WorkspaceEvent::Closed { uri });
        }
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        for event in params.changes {
            // The editor's buffer wins over the disk while it is open.
            if self.open_documents.contains_key(&event.uri) {
                continue;
            }
            let (Some(uri), Some(change)) = (to_file_uri(&event.uri), watched_change(event.typ))
            else {
                continue;
            };
            self.queue.push(WorkspaceEvent::Watched { uri, change });
        }
        self.schedule();
    }

    async fn did_change_workspace_folders(&self, params: DidChangeWorkspaceFoldersParams) {
        for folder in params.event.removed {
            if let Some(uri) = to_file_uri(&folder.uri) {
                self.queue.push(WorkspaceEvent::RootRemoved(uri));
            }
        }
        for folder in params.event.added {
            if let Some(uri) = to_file_uri(&folder.uri) {
                self.queue.push(WorkspaceEvent::RootAdded(uri));
            }
        }
        self.schedule();
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        // Some clients push the settings, others only signal a change.
        let settings = if params.settings.is_null() {
            self.fetch_configuration().await
        } else {
            Some(params.settings)
        };
        if let Some(settings) = settings {
            self.submit(WorkspaceEvent::Configuration(settings));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn settings_sections_are_reassembled() {
        let settings = settings_object(vec![
            json!({ "associations": { "*.luna": "lua" } }),
            Value::Null,
        ]);
        assert_eq!(
            settings,
            json!({ "files": { "associations": { "*.luna": "lua" } } })
        );
    }

    #[test]
    fn watched_change_kinds() {
        assert_eq!(watched_change(FileChangeType::CREATED), Some(FileChange::Created));
        assert_eq!(watched_change(FileChangeType::CHANGED), Some(FileChange::Changed));
        assert_eq!(watched_change(FileChangeType::DELETED), Some(FileChange::Deleted));
    }
}
