// Request handlers for /verify, /ping, /wake and /status.
//
// Each handler takes the decoded query string plus the shared AppState and
// always produces a response; failures become JSON envelopes, never
// rejections.

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};
use warp::http::StatusCode;
use warp::reply::{Reply, Response};

use crate::core::error::ValidationError;
use crate::core::sockparse::{parse_ip, parse_port};
use crate::core::types::{HostSnapshot, JsonResponse, ProbeProfile};
use crate::core::{AppState, VerifyMode, WakeMode};

pub type QueryArgs = HashMap<String, String>;

pub const NOT_STARTED: &str = "System not started yet";

fn arg<'a>(args: &'a QueryArgs, key: &str) -> Option<&'a str> {
    args.get(key).map(String::as_str)
}

fn json_reply(body: &JsonResponse, status: StatusCode) -> Response {
    warp::reply::with_status(warp::reply::json(body), status).into_response()
}

fn bad_request(error: impl ToString) -> Response {
    json_reply(&JsonResponse::failure(error.to_string()), StatusCode::BAD_REQUEST)
}

// ── Verify ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyTarget {
    Port(u16),
    RedirectUrl(String),
}

/// A validated `/verify` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyRequest {
    pub host: IpAddr,
    /// `ip` exactly as the caller sent it, echoed back on redirect.
    pub raw_ip: String,
    pub address: String,
    pub target: VerifyTarget,
}

impl VerifyRequest {
    pub fn parse(args: &QueryArgs, mode: VerifyMode) -> Result<Self, ValidationError> {
        let host = parse_ip(arg(args, "ip"))?;
        let target = match mode {
            VerifyMode::Port => VerifyTarget::Port(parse_port(arg(args, "port"))?),
            VerifyMode::RedirectUrl => match arg(args, "redirectURL") {
                Some(url) if !url.is_empty() => VerifyTarget::RedirectUrl(url.to_string()),
                _ => return Err(ValidationError::RedirectUrlNotDefined),
            },
        };
        Ok(Self {
            host,
            raw_ip: arg(args, "ip").unwrap_or_default().to_string(),
            address: arg(args, "address").unwrap_or_default().to_string(),
            target,
        })
    }

    /// Where to send the caller when the host does not answer.
    pub fn redirect_location(&self, base: Option<&str>) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("ip", &self.raw_ip)
            .append_pair("address", &self.address);
        match &self.target {
            VerifyTarget::Port(port) => query.append_pair("port", &port.to_string()),
            VerifyTarget::RedirectUrl(url) => query.append_pair("redirectURL", url),
        };
        let base = base.map(|b| b.trim_end_matches('/')).unwrap_or("");
        format!("{base}/?{}", query.finish())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Confirmed within the checking interval; no probe sent.
    Cached,
    /// Answered a fresh probe and is now cached.
    Confirmed(Duration),
    Unreachable,
}

/// Cached, else probe and cache on a reply, else unreachable.
pub async fn verify_host(state: &AppState, host: IpAddr) -> VerifyOutcome {
    if state.cache.is_present(host).await {
        return VerifyOutcome::Cached;
    }

    let timeout = state.config.probe_timeout(ProbeProfile::Verify);
    match state.prober.probe(host, timeout, 1).await {
        Ok(report) if report.received == 1 => {
            let rtt = report.round_trip.unwrap_or_default();
            state.cache.put(host, rtt).await;
            VerifyOutcome::Confirmed(rtt)
        }
        Ok(_) => VerifyOutcome::Unreachable,
        Err(e) => {
            warn!(%host, error = %e, "verify probe failed");
            VerifyOutcome::Unreachable
        }
    }
}

/// GET /verify
pub async fn verify(args: QueryArgs, state: AppState) -> Result<Response, Infallible> {
    let request = match VerifyRequest::parse(&args, state.config.verify_mode) {
        Ok(request) => request,
        Err(e) => return Ok(bad_request(e)),
    };

    match verify_host(&state, request.host).await {
        VerifyOutcome::Cached => Ok(StatusCode::OK.into_response()),
        VerifyOutcome::Confirmed(rtt) => {
            debug!(host = %request.host, rtt_ms = rtt.as_millis() as u64, "host confirmed");
            Ok(StatusCode::OK.into_response())
        }
        VerifyOutcome::Unreachable => {
            let location = request.redirect_location(state.config.redirect_base.as_deref());
            info!(host = %request.host, %location, "host unreachable, redirecting");
            Ok(warp::reply::with_header(
                StatusCode::TEMPORARY_REDIRECT,
                "location",
                location,
            )
            .into_response())
        }
    }
}

// ── Ping ───────────────────────────────────────────────────────

/// GET /ping
///
/// Polling endpoint. Never writes the cache, so background polling cannot
/// inflate the set of confirmed hosts.
pub async fn ping(args: QueryArgs, state: AppState) -> Result<Response, Infallible> {
    let host = match parse_ip(arg(&args, "ip")) {
        Ok(host) => host,
        Err(e) => return Ok(bad_request(e)),
    };

    if state.cache.is_present(host).await {
        return Ok(json_reply(&JsonResponse::ok(), StatusCode::OK));
    }

    let timeout = state.config.probe_timeout(ProbeProfile::Liveness);
    match state.prober.probe(host, timeout, 1).await {
        Err(e) => {
            warn!(%host, error = %e, "ping probe failed");
            Ok(bad_request(e))
        }
        Ok(report) if report.received == 0 => {
            debug!(%host, "no echo reply");
            Ok(json_reply(&JsonResponse::failure(NOT_STARTED), StatusCode::OK))
        }
        Ok(_) => Ok(json_reply(&JsonResponse::ok(), StatusCode::OK)),
    }
}

// ── Wake ───────────────────────────────────────────────────────

fn wake_destination(args: &QueryArgs, state: &AppState) -> Result<SocketAddr, ValidationError> {
    match state.config.wake_mode {
        WakeMode::Host => {
            let ip = parse_ip(arg(args, "ip"))?;
            let port = parse_port(arg(args, "port"))?;
            Ok(SocketAddr::new(ip, port))
        }
        WakeMode::Broadcast => Ok(state.config.wol_destination()),
    }
}

/// GET /wake
pub async fn wake(args: QueryArgs, state: AppState) -> Result<Response, Infallible> {
    let destination = match wake_destination(&args, &state) {
        Ok(destination) => destination,
        Err(e) => return Ok(bad_request(e)),
    };
    let address = arg(&args, "address").unwrap_or_default();

    match state.waker.wake(address, destination).await {
        Ok(()) => Ok(json_reply(&JsonResponse::ok(), StatusCode::OK)),
        Err(e) => {
            warn!(address, %destination, error = %e, "wake failed");
            Ok(bad_request(e))
        }
    }
}

// ── Status ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct StatusBody {
    checking_interval_secs: u64,
    hosts: Vec<HostSnapshot>,
}

/// GET /status
pub async fn status(state: AppState) -> Result<Response, Infallible> {
    let body = StatusBody {
        checking_interval_secs: state.cache.ttl().as_secs(),
        hosts: state.cache.snapshot().await,
    };
    Ok(warp::reply::json(&body).into_response())
}
