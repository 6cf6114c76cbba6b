//
// Copyright (c) The radiusd Contributors
//
// SPDX-License-Identifier: MIT
//

#![warn(rust_2018_idioms)]

mod config;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use clap::{App, Arg};
use config::Config;
use radius_api::AppState;
use radius_core::{Kind, Listener};
use radius_db::Store;
use tracing::{error, info};

fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(format!("radiusd={log_level}").parse().unwrap())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
}

/// Seeds a convenience NAS client for local testing on first boot, using
/// `default_secret`, if no NAS clients are registered yet. Real deployments
/// register their own NAS clients through the admin API.
async fn seed_default_nas(store: &Store, default_secret: &str) {
    match store.list_nas().await {
        Ok(nas) if nas.is_empty() => {
            if let Err(error) = store
                .create_nas("127.0.0.1", default_secret, "localhost", "mikrotik")
                .await
            {
                error.log();
            } else {
                info!("seeded default NAS client for 127.0.0.1");
            }
        }
        Ok(_) => {}
        Err(error) => error.log(),
    }
}

fn main() {
    let matches = App::new("radiusd")
        .version(clap::crate_version!())
        .about("RADIUS authentication/accounting daemon")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("file")
                .help("Specify an alternative configuration file."),
        )
        .get_matches();

    let config_file = matches.value_of("config");
    let config = Config::load(config_file);

    init_tracing(&config.log_level);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to create async runtime");

    let exit_code = runtime.block_on(run(config));
    std::process::exit(exit_code);
}

async fn run(config: Config) -> i32 {
    info!("starting up");

    let store = match Store::connect(&config.database_path).await {
        Ok(store) => store,
        Err(error) => {
            error.log();
            return 1;
        }
    };

    if let Err(error) = store
        .seed_defaults(&config.admin_username, &config.admin_password)
        .await
    {
        error.log();
        return 1;
    }
    seed_default_nas(&store, &config.default_secret).await;

    let auth_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), config.auth_port);
    let acct_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), config.acct_port);
    let core_store = Arc::new(store.clone());

    let auth_listener = match Listener::spawn(Kind::Authentication, auth_addr, core_store.clone()) {
        Ok(listener) => listener,
        Err(error) => {
            error.log();
            return 1;
        }
    };
    let acct_listener = match Listener::spawn(Kind::Accounting, acct_addr, core_store) {
        Ok(listener) => listener,
        Err(error) => {
            error.log();
            return 1;
        }
    };
    info!(
        auth = %auth_listener.local_addr(),
        acct = %acct_listener.local_addr(),
        "RADIUS listeners ready"
    );

    let dashboard_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), config.dashboard_port);
    let http_listener = match tokio::net::TcpListener::bind(dashboard_addr).await {
        Ok(listener) => listener,
        Err(error) => {
            error!(%error, addr = %dashboard_addr, "failed to bind admin HTTP API");
            return 1;
        }
    };
    info!(addr = %dashboard_addr, "admin HTTP API ready");

    let api_state = AppState::new(store, config.jwt_secret.into_bytes());
    let app = radius_api::build(api_state);

    let shutdown = shutdown_signal();
    let serve_result = axum::serve(http_listener, app)
        .with_graceful_shutdown(shutdown)
        .await;
    if let Err(error) = serve_result {
        error!(%error, "admin HTTP API server exited with an error");
    }

    auth_listener.shutdown().await;
    acct_listener.shutdown().await;
    info!("shutdown complete");
    0
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("signal received, shutting down");
}
