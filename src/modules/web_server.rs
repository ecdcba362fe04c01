use std::convert::Infallible;
use std::net::SocketAddr;

use tracing::{debug, info, warn};
use warp::{Filter, Rejection, Reply};

use crate::core::handlers::{self, QueryArgs};
use crate::core::AppState;

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// Decoded query string; a missing or undecodable one is treated as empty so
/// the handlers report the missing parameter themselves.
fn query_args() -> impl Filter<Extract = (QueryArgs,), Error = Infallible> + Clone {
    warp::query::<QueryArgs>()
        .or(warp::any().map(QueryArgs::new))
        .unify()
}

/// `/verify`, `/ping`, `/wake` and `/status`, with everything else served
/// from the static asset directory.
pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let verify = warp::path("verify")
        .and(warp::path::end())
        .and(query_args())
        .and(with_state(state.clone()))
        .and_then(handlers::verify);

    let ping = warp::path("ping")
        .and(warp::path::end())
        .and(query_args())
        .and(with_state(state.clone()))
        .and_then(handlers::ping);

    let wake = warp::path("wake")
        .and(warp::path::end())
        .and(query_args())
        .and(with_state(state.clone()))
        .and_then(handlers::wake);

    let status = warp::path("status")
        .and(warp::path::end())
        .and(with_state(state.clone()))
        .and_then(handlers::status);

    let assets = warp::fs::dir(state.config.static_dir.clone());

    let verbose = state.config.verbose;
    let access_log = warp::log::custom(move |info| {
        let elapsed_ms = info.elapsed().as_secs_f64() * 1000.0;
        if verbose {
            info!(
                method = %info.method(),
                path = info.path(),
                status = info.status().as_u16(),
                elapsed_ms,
                "request"
            );
        } else {
            debug!(
                method = %info.method(),
                path = info.path(),
                status = info.status().as_u16(),
                elapsed_ms,
                "request"
            );
        }
    });

    warp::get()
        .and(verify.or(ping).or(wake).or(status).or(assets))
        .with(access_log)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "could not install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn run_web_server(state: AppState) -> Result<(), warp::Error> {
    let addr: SocketAddr = state.config.listen_addr;
    let (bound, server) = warp::serve(routes(state))
        .try_bind_with_graceful_shutdown(addr, shutdown_signal())?;

    info!(addr = %bound, "web server listening");
    server.await;
    info!("web server stopped");
    Ok(())
}
