//! CLI entry point for the reference deployment: parses `--config`/
//! `--debug` (teacher's `RecipeExt::cli_command` shape), loads a TOML
//! [`ServerConfig`] the same way the teacher's `RecipeExt::run` loads its
//! recipe config (`config::Config::builder().add_source(File::from_str)`),
//! wires the in-memory collaborators and engine service, then serves it
//! over a plain `hyper`/`hyper-util` TCP accept loop.
//!
//! This last part departs from the teacher: its recipes serve through
//! `axum_server` (TLS-capable, hyper 0.14-era) which isn't in this
//! workspace's dependency set. Serving here is plaintext HTTP/1.1 only;
//! TLS termination is left to a fronting proxy, consistent with the
//! engine treating transport-level authentication as external (spec.md
//! §4.4).

use std::path::PathBuf;
use std::sync::Arc;

use clap::{arg, ArgAction, Command};
use config::{Config, FileFormat};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use ldp_engine::filter::auth::IdentityPrincipalMapper;
use ldp_engine::service::LdpService;
use ldp_server::config::ServerConfig;
use ldp_server::tracing::{get_subscriber, init_subscriber};
use ldp_server::memory;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = cli_command().get_matches();
    let config_path = args.get_one::<PathBuf>("config").expect("--config is required").clone();
    let debug = args.get_flag("debug");

    init_subscriber(get_subscriber(if debug { "debug" } else { "info" }));

    let config_content = tokio::fs::read_to_string(&config_path).await.map_err(|e| {
        error!(path = %config_path.display(), error = %e, "failed to read config file");
        e
    })?;

    let server_config = Config::builder()
        .add_source(config::File::from_str(&config_content, FileFormat::Toml))
        .build()?
        .try_deserialize::<ServerConfig>()
        .map_err(|e| {
            error!(error = %e, "failed to parse configuration");
            e
        })?;

    let engine_config = Arc::new(server_config.engine_config());
    let collaborators = Arc::new(memory::build(server_config.base_url.clone()));
    let service = LdpService::new(engine_config, collaborators, Arc::new(IdentityPrincipalMapper));

    serve(server_config.addr, service).await
}

fn cli_command() -> Command {
    Command::new("ldp_server")
        .about("In-memory reference deployment of the LDP protocol engine")
        .arg(arg!(-c --config <FILE> "Path to a TOML configuration file").required(true).value_parser(clap::value_parser!(PathBuf)))
        .arg(arg!(-d --debug ... "Enable debug-level logging").action(ArgAction::SetTrue))
}

async fn serve(addr: std::net::SocketAddr, service: LdpService) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "failed to accept connection");
                continue;
            }
        };
        let io = TokioIo::new(stream);
        let hyper_service = TowerToHyperService::new(service.clone());

        tokio::spawn(async move {
            if let Err(e) = auto::Builder::new(TokioExecutor::new()).serve_connection(io, hyper_service).await {
                warn!(%peer, error = %e, "connection error");
            }
        });
    }
}
