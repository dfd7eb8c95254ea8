// Delivery of workspace output to the editor

use luna_diagnostic::Diagnostic;
use luna_vfs::FileUri;
use lunac::DiagnosticSink;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tower_lsp::lsp_types::notification::Notification;
use tower_lsp::lsp_types::{self as lsp, Url};
use tower_lsp::Client;

use crate::convert::{to_lsp_diagnostic, to_url};

/// `luna/progressReport`: sweep progress for the status bar.
pub enum ProgressReport {}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressParams {
    pub text: String,
    pub fraction: f32,
}

impl Notification for ProgressReport {
    type Params = ProgressParams;
    const METHOD: &'static str = "luna/progressReport";
}

/// One message bound for the client.
#[derive(Debug)]
pub enum Outgoing {
    Diagnostics(Url, Vec<lsp::Diagnostic>),
    Progress(ProgressParams),
}

/// Sink used by the workspace on blocking threads. Sending never blocks;
/// the forwarding task delivers messages in order.
pub struct ChannelSink {
    tx: UnboundedSender<Outgoing>,
}

impl ChannelSink {
    pub fn new() -> (Self, UnboundedReceiver<Outgoing>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChannelSink { tx }, rx)
    }

    fn send(&self, message: Outgoing) {
        if self.tx.send(message).is_err() {
            tracing::debug!("client gone; dropping output");
        }
    }
}

impl DiagnosticSink for ChannelSink {
    fn publish_diagnostics(&self, uri: &FileUri, diagnostics: &[Diagnostic]) {
        let Some(url) = to_url(uri) else {
            tracing::warn!(%uri, "cannot publish for a uri the client cannot read");
            return;
        };
        let converted = diagnostics.iter().map(to_lsp_diagnostic).collect();
        self.send(Outgoing::Diagnostics(url, converted));
    }

    fn progress_report(&self, text: &str, fraction: f32) {
        self.send(Outgoing::Progress(ProgressParams {
            text: text.to_owned(),
            fraction,
        }));
    }
}

/// Forward everything from `rx` to the client until every sender is gone.
pub async fn forward(client: Client, mut rx: UnboundedReceiver<Outgoing>) {
    while let Some(message) = rx.recv().await {
        match message {
            Outgoing::Diagnostics(url, diagnostics) => {
                client.publish_diagnostics(url, diagnostics, None).await;
            }
            Outgoing::Progress(params) => {
                client.send_notification::<ProgressReport>(params).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Tests can panic")]

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn messages_arrive_in_order() {
        let (sink, mut rx) = ChannelSink::new();
        let uri = FileUri::parse("file:///w/a.lua").unwrap();
        sink.progress_report("load workspace folders", 0.0);
        sink.publish_diagnostics(&uri, &[]);
        sink.progress_report("Finished!", 1.0);

        let Ok(Outgoing::Progress(first)) = rx.try_recv() else {
            panic!("expected progress first");
        };
        assert_eq!(first.fraction, 0.0);
        let Ok(Outgoing::Diagnostics(url, list)) = rx.try_recv() else {
            panic!("expected diagnostics second");
        };
        assert_eq!(url.as_str(), "file:///w/a.lua");
        assert!(list.is_empty());
        let Ok(Outgoing::Progress(last)) = rx.try_recv() else {
            panic!("expected the final progress report");
        };
        assert_eq!(last.text, "Finished!");
    }

    #[test]
    fn progress_notification_shape() {
        let params = ProgressParams {
            text: "Finished!".to_owned(),
            fraction: 1.0,
        };
        assert_eq!(
            serde_json::to_value(params).unwrap(),
            serde_json::json!({ "text": "Finished!", "fraction": 1.0 })
        );
        assert_eq!(ProgressReport::METHOD, "luna/progressReport");
    }
}
