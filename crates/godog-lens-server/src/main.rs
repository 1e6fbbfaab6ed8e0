//! Language server binary for godog feature files.
//!
//! Serves run actions, run targets and reference resolution for the
//! `.feature` documents of a Go module. It communicates via JSON-RPC over
//! stdin/stdout.

use std::ops::ControlFlow;

use async_lsp::concurrency::ConcurrencyLayer;
use async_lsp::panic::CatchUnwindLayer;
use async_lsp::router::Router;
use async_lsp::server::LifecycleLayer;
use async_lsp::tracing::TracingLayer;
use clap::Parser;
use lsp_types::{notification, request};
use tower::ServiceBuilder;
use tracing::info;

use godog_lens_server::config::{LogLevel, ServerConfig};
use godog_lens_server::error::ServerError;
use godog_lens_server::handlers::{
    handle_code_lens, handle_did_change_configuration, handle_did_change_text_document,
    handle_did_change_watched_files, handle_did_close_text_document,
    handle_did_open_text_document, handle_did_save_text_document, handle_execute_command,
    handle_initialise, handle_initialised, handle_shutdown,
};
use godog_lens_server::logging::init_logging;
use godog_lens_server::server::ServerState;

/// Language server for godog feature files.
#[derive(Parser, Debug)]
#[command(name = "godog-lens-lsp", version, about)]
struct Args {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<LogLevel>,

    /// Glob selecting the documents to index.
    #[arg(long)]
    feature_glob: Option<String>,

    /// Glob selecting documents to skip; empty disables exclusion.
    #[arg(long)]
    exclude_glob: Option<String>,
}

fn main() {
    let args = Args::parse();

    let config = match build_config(args) {
        Ok(config) => config,
        Err(e) => {
            let fallback = ServerConfig::default();
            init_logging(&fallback);
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(2);
        }
    };
    init_logging(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        feature_glob = %config.feature_glob,
        "starting godog-lens-lsp"
    );

    if let Err(e) = run_server(config) {
        tracing::error!(error = %e, "server exited with error");
        std::process::exit(1);
    }
}

fn build_config(args: Args) -> Result<ServerConfig, ServerError> {
    let config = ServerConfig::from_env()?.apply_overrides(
        args.log_level,
        args.feature_glob,
        args.exclude_glob,
    );
    config.file_globs()?;
    Ok(config)
}

/// Run the language server.
fn run_server(config: ServerConfig) -> std::io::Result<()> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(run_server_async(config))
}

async fn run_server_async(config: ServerConfig) -> std::io::Result<()> {
    let (server, _client) = async_lsp::MainLoop::new_server(|_client| {
        let state = ServerState::new(config.clone());

        let mut router = Router::new(state);
        router
            .request::<request::Initialize, _>(|st, params| {
                std::future::ready(handle_initialise(st, params))
            })
            .request::<request::Shutdown, _>(|st, _params| std::future::ready(handle_shutdown(st)))
            .request::<request::CodeLensRequest, _>(|st, params| {
                std::future::ready(handle_code_lens(st, params))
            })
            .request::<request::ExecuteCommand, _>(|st, params| {
                std::future::ready(handle_execute_command(st, params))
            })
            .notification::<notification::Initialized>(|st, params| {
                handle_initialised(st, params);
                ControlFlow::Continue(())
            })
            .notification::<notification::Exit>(|_, ()| ControlFlow::Break(Ok(())))
            .notification::<notification::DidOpenTextDocument>(|st, params| {
                handle_did_open_text_document(st, params);
                ControlFlow::Continue(())
            })
            .notification::<notification::DidChangeTextDocument>(|st, params| {
                handle_did_change_text_document(st, params);
                ControlFlow::Continue(())
            })
            .notification::<notification::DidSaveTextDocument>(|st, params| {
                handle_did_save_text_document(st, params);
                ControlFlow::Continue(())
            })
            .notification::<notification::DidCloseTextDocument>(|st, params| {
                handle_did_close_text_document(st, params);
                ControlFlow::Continue(())
            })
            .notification::<notification::DidChangeWatchedFiles>(|st, params| {
                handle_did_change_watched_files(st, params);
                ControlFlow::Continue(())
            })
            .notification::<notification::DidChangeConfiguration>(|st, params| {
                handle_did_change_configuration(st, params);
                ControlFlow::Continue(())
            });

        ServiceBuilder::new()
            .layer(TracingLayer::default())
            .layer(LifecycleLayer::default())
            .layer(CatchUnwindLayer::default())
            .layer(ConcurrencyLayer::default())
            .service(router)
    });

    #[cfg(unix)]
    let (stdin, stdout) = (
        async_lsp::stdio::PipeStdin::lock_tokio()?,
        async_lsp::stdio::PipeStdout::lock_tokio()?,
    );
    #[cfg(not(unix))]
    let (stdin, stdout) = {
        use tokio_util::compat::{TokioAsyncReadCompatExt, TokioAsyncWriteCompatExt};
        (
            tokio::io::stdin().compat(),
            tokio::io::stdout().compat_write(),
        )
    };

    server
        .run_buffered(stdin, stdout)
        .await
        .map_err(std::io::Error::other)?;

    info!("server exited");
    Ok(())
}
