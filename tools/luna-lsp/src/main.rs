// Luna Language Server Protocol adapter
//
// Connects an editor to the workspace coordinator:
// - Document and watched-file changes become workspace events
// - Diagnostics are published per file after every change or sweep
// - Sweep progress is sent as `luna/progressReport` notifications
//
// Logs go to stderr (enable with RUST_LOG); stdout carries the protocol.

mod convert;
mod server;
mod sink;

use tower_lsp::{LspService, Server};

#[tokio::main]
async fn main() {
    lunac::init_tracing();

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(server::LunaLanguageServer::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
