use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tower_lsp::{LspService, Server};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod bridge;
mod capabilities;
mod config;
mod debounce;
mod document;
mod editor;
mod handlers;
mod scratch;
mod server;
mod session;
mod symbol_client;
#[cfg(test)]
mod testing;
mod validation;

use bridge::ProcessRunner;
use config::{Settings, SystemLocator};
use session::SessionOptions;

#[derive(Parser)]
#[command(name = "volta-lsp")]
#[command(about = "Language Server for Volta")]
struct Cli {
    /// Use stdio for communication (required)
    #[arg(long)]
    stdio: bool,

    /// Enable debug mode
    #[arg(long)]
    debug: bool,

    /// Compiler executable, used when the editor does not configure one
    #[arg(long, value_name = "PATH")]
    compiler_path: Option<PathBuf>,

    /// Quiet period after an edit before the document is re-checked
    #[arg(long, value_name = "MS", default_value_t = 1000)]
    debounce_ms: u64,

    /// Upper bound on a single compiler run
    #[arg(long, value_name = "MS", default_value_t = 10_000)]
    timeout_ms: u64,
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout carries the protocol
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_ansi(false))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    if !args.stdio {
        eprintln!("Error: --stdio flag is required");
        std::process::exit(1);
    }

    init_logging(args.debug);

    let options = SessionOptions {
        debounce: Duration::from_millis(args.debounce_ms),
        global_settings: Settings {
            compiler_path: args
                .compiler_path
                .map(|p| p.to_string_lossy().into_owned()),
            ..Default::default()
        },
    };
    let runner = Arc::new(ProcessRunner::new(Duration::from_millis(args.timeout_ms)));
    let locator = Arc::new(SystemLocator::from_env());

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting volta-lsp");

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let debug = args.debug;
    let (service, socket) = LspService::new(move |client| {
        server::Backend::new(client, runner, locator, options, debug)
    });

    Server::new(stdin, stdout, socket).serve(service).await;
}
